// src/chat/menu.rs
//
// Lazy resolution of per-item moderation capability tokens. One context-menu
// fetch fills every token the response carries, even when only one was asked
// for, so later calls for the same event are served from the cache.

use tracing::debug;

use crate::chat::payload::SessionIdentity;
use crate::chat::types::ChatEvent;
use crate::http::HttpClient;
use crate::json::{get_str, list_at, map_at};
use crate::Error;

const CONTEXT_MENU_API: &str =
    "https://www.youtube.com/youtubei/v1/live_chat/get_item_context_menu?key=";

/// The five moderation capabilities a context menu can expose.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModerationAction {
    Pin,
    Delete,
    Timeout,
    Ban,
    Unban,
}

impl ModerationAction {
    /// Stable description used when wrapping failures.
    pub fn describe(&self) -> &'static str {
        match self {
            ModerationAction::Pin => "couldn't pin chat",
            ModerationAction::Delete => "couldn't delete chat",
            ModerationAction::Timeout => "couldn't time out user",
            ModerationAction::Ban => "couldn't ban user",
            ModerationAction::Unban => "couldn't unban user",
        }
    }

    fn cached<'a>(&self, event: &'a ChatEvent) -> Option<&'a str> {
        let tokens = &event.tokens;
        match self {
            ModerationAction::Pin => tokens.pin.as_deref(),
            ModerationAction::Delete => tokens.delete.as_deref(),
            ModerationAction::Timeout => tokens.timeout.as_deref(),
            ModerationAction::Ban => tokens.ban.as_deref(),
            ModerationAction::Unban => tokens.unban.as_deref(),
        }
    }
}

/// Returns the params token for `action` on `event`, fetching and caching the
/// full context menu when the token is not already present. A second call for
/// any action on the same event instance is a cache hit.
pub async fn resolve(
    http: &dyn HttpClient,
    identity: &mut SessionIdentity,
    event: &mut ChatEvent,
    action: ModerationAction,
) -> Result<String, Error> {
    if let Some(token) = action.cached(event) {
        return Ok(token.to_string());
    }
    let menu_params = event.context_menu_params.clone().ok_or_else(|| {
        Error::Permission("event exposes no context menu".to_string())
    })?;
    if !identity.has_cookies() {
        return Err(Error::Permission(
            "no authenticated identity; set user data first".to_string(),
        ));
    }

    let url = format!(
        "{}{}&params={}",
        CONTEXT_MENU_API,
        identity.api_key,
        urlencoding::encode(&menu_params)
    );
    let body = identity.send_message_payload("");
    let headers = identity.auth_headers();
    let response = http.post_json(url, body.to_string(), headers).await?;
    let tree: serde_json::Value = serde_json::from_str(&response)?;

    let items = list_at(
        &tree,
        &["liveChatItemContextMenuSupportedRenderers", "menuRenderer"],
        "items",
    );
    for item in items.map(|i| i.as_slice()).unwrap_or(&[]) {
        let renderer = match item.get("menuServiceItemRenderer") {
            Some(r) => r,
            None => continue,
        };
        let icon_type = renderer
            .get("icon")
            .and_then(|i| get_str(i, "iconType"))
            .unwrap_or("");
        let action_params = |endpoint: &str| {
            map_at(renderer, &["serviceEndpoint", endpoint])
                .and_then(|e| get_str(e, "params"))
                .map(str::to_string)
        };
        match icon_type {
            "KEEP" => event.tokens.pin = action_params("liveChatActionEndpoint"),
            "DELETE" => event.tokens.delete = action_params("moderateLiveChatEndpoint"),
            "HOURGLASS" => event.tokens.timeout = action_params("moderateLiveChatEndpoint"),
            "REMOVE_CIRCLE" => event.tokens.ban = action_params("moderateLiveChatEndpoint"),
            "ADD_CIRCLE" => event.tokens.unban = action_params("moderateLiveChatEndpoint"),
            // Reporting and moderator management are out of scope.
            "FLAG" | "ADD_MODERATOR" | "REMOVE_MODERATOR" => {}
            other => debug!("ignoring unknown context menu icon type {other:?}"),
        }
    }

    action.cached(event).map(str::to_string).ok_or_else(|| {
        Error::Permission(format!(
            "context menu exposed no token for {action:?}; check permissions"
        ))
    })
}
