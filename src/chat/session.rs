// src/chat/session.rs
//
// Composes the decoder, continuation state machine, payload builder and
// capability resolver into update()-style polling cycles and moderation
// calls. One session owns all mutable state; access must be serialized by
// the caller.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info};

use crate::chat::continuation::{ContinuationState, PollMode, PollState};
use crate::chat::decode::{decode_actions, DecodedActions};
use crate::chat::menu::{self, ModerationAction};
use crate::chat::payload::{Locale, SessionIdentity};
use crate::chat::types::{BootstrapInfo, ChatEvent, DeletedMessage};
use crate::http::HttpClient;
use crate::json::{descend, get_str, list_at, map_at, Key};
use crate::Error;

const LIVE_CHAT_API: &str = "https://www.youtube.com/youtubei/v1/live_chat/get_live_chat?key=";
const LIVE_CHAT_REPLAY_API: &str =
    "https://www.youtube.com/youtubei/v1/live_chat/get_live_chat_replay?key=";
const SEND_MESSAGE_API: &str = "https://www.youtube.com/youtubei/v1/live_chat/send_message?key=";
const MODERATE_API: &str = "https://studio.youtube.com/youtubei/v1/live_chat/moderate?key=";
const LIVE_CHAT_ACTION_API: &str =
    "https://studio.youtube.com/youtubei/v1/live_chat/live_chat_action?key=";

const CONTINUATION_PATH: [&str; 2] = ["continuationContents", "liveChatContinuation"];

pub struct LiveChatSession {
    http: Arc<dyn HttpClient>,
    identity: SessionIdentity,
    locale: Locale,
    continuation: ContinuationState,
    video_id: Option<String>,
    channel_id: Option<String>,
    events: Vec<ChatEvent>,
    ticker_events: Vec<ChatEvent>,
    deletions: Vec<DeletedMessage>,
    banner: Option<ChatEvent>,
}

impl LiveChatSession {
    /// Builds a session from the bootstrap collaborator's output. The seed
    /// tree, when present, supplies the first batch of actions; the first
    /// `update()` call after construction is therefore a suppressed no-op.
    pub fn new(
        http: Arc<dyn HttpClient>,
        bootstrap: BootstrapInfo,
        locale: Locale,
    ) -> Result<Self, Error> {
        let mut session = Self {
            http,
            identity: SessionIdentity::new(String::new()),
            locale,
            continuation: ContinuationState::new(String::new(), PollMode::Live),
            video_id: None,
            channel_id: None,
            events: Vec::new(),
            ticker_events: Vec::new(),
            deletions: Vec::new(),
            banner: None,
        };
        session.apply_bootstrap(bootstrap)?;
        Ok(session)
    }

    /// Re-bootstraps the session in place: all decoded state and counters are
    /// discarded, the cookie jar is kept.
    pub fn reset(&mut self, bootstrap: BootstrapInfo) -> Result<(), Error> {
        info!(video_id = ?bootstrap.video_id, "resetting live chat session");
        self.events.clear();
        self.ticker_events.clear();
        self.deletions.clear();
        self.banner = None;
        self.identity.visitor_data = None;
        self.identity.reset_counters();
        self.apply_bootstrap(bootstrap)
    }

    fn apply_bootstrap(&mut self, bootstrap: BootstrapInfo) -> Result<(), Error> {
        if bootstrap.continuation.is_empty() {
            return Err(Error::Config(
                "bootstrap carried no continuation; invalid video or channel id".to_string(),
            ));
        }
        if bootstrap.api_key.is_empty() {
            return Err(Error::Config("bootstrap carried no API key".to_string()));
        }
        self.identity.api_key = bootstrap.api_key;
        self.identity.data_sync_id = bootstrap.data_sync_id;
        self.identity.send_params = bootstrap.send_params;
        self.video_id = bootstrap.video_id;
        self.channel_id = bootstrap.channel_id;
        let mode = if bootstrap.is_replay {
            PollMode::Replay
        } else {
            PollMode::Live
        };
        self.continuation = ContinuationState::new(bootstrap.continuation, mode);
        if let Some(seed) = &bootstrap.seed {
            self.consume_seed(seed);
        }
        Ok(())
    }

    /// Decodes the bootstrap page's initial chat tree: the first actions
    /// batch, a fresher replay token when one is present, and the
    /// send-message params token.
    fn consume_seed(&mut self, seed: &Value) {
        if self.continuation.mode() == PollMode::Replay {
            let replay_token = descend(
                seed,
                &[
                    Key::Str("continuationContents"),
                    Key::Str("liveChatContinuation"),
                    Key::Str("continuations"),
                    Key::Idx(0),
                    Key::Str("liveChatReplayContinuationData"),
                ],
            )
            .and_then(|data| get_str(data, "continuation"));
            if let Some(token) = replay_token {
                self.continuation.set_token(token.to_string());
            }
        }
        if self.identity.send_params.is_none() {
            let endpoint = map_at(
                seed,
                &[
                    "continuationContents",
                    "liveChatContinuation",
                    "actionPanel",
                    "liveChatMessageInputRenderer",
                    "sendButton",
                    "buttonRenderer",
                    "serviceEndpoint",
                    "sendLiveChatMessageEndpoint",
                ],
            );
            self.identity.send_params = endpoint
                .and_then(|e| get_str(e, "params"))
                .map(str::to_string);
        }
        if let Some(actions) = list_at(seed, &CONTINUATION_PATH, "actions") {
            let mut out = DecodedActions::default();
            decode_actions(actions, &mut out);
            self.absorb_decoded(out);
        }
    }

    /// One polling cycle. The first call after construction or reset is
    /// suppressed; afterwards each call issues exactly one poll request,
    /// replaces the per-poll event lists and chains the continuation token.
    /// Transport failures leave the token untouched, so retrying with the
    /// same session is safe.
    pub async fn update(&mut self, offset_ms: i64) -> Result<(), Error> {
        let token = match self.continuation.begin_update()? {
            Some(token) => token,
            None => {
                debug!("bootstrap batch already decoded; suppressing first poll");
                return Ok(());
            }
        };
        self.events.clear();
        self.ticker_events.clear();
        self.deletions.clear();

        let mode = self.continuation.mode();
        let api = match mode {
            PollMode::Live => LIVE_CHAT_API,
            PollMode::Replay => LIVE_CHAT_REPLAY_API,
        };
        let url = format!("{}{}", api, self.identity.api_key);
        let payload = self
            .identity
            .poll_payload(&self.locale, &token, mode, offset_ms);
        let headers = self.identity.auth_headers();
        let body = self.http.post_json(url, payload.to_string(), headers).await?;
        let tree: Value = serde_json::from_str(&body)?;

        self.harvest_response_context(&tree);

        if let Some(actions) = list_at(&tree, &CONTINUATION_PATH, "actions") {
            let mut out = DecodedActions::default();
            decode_actions(actions, &mut out);
            self.absorb_decoded(out);
        }
        debug!(
            events = self.events.len(),
            deletions = self.deletions.len(),
            "poll cycle decoded"
        );

        let continuations = list_at(&tree, &CONTINUATION_PATH, "continuations");
        self.continuation.absorb(continuations.map(Vec::as_slice));
        Ok(())
    }

    fn absorb_decoded(&mut self, out: DecodedActions) {
        self.events.extend(out.events);
        self.ticker_events.extend(out.ticker_events);
        self.deletions.extend(out.deletions);
        if let Some(banner) = out.banner {
            self.banner = Some(banner);
        }
    }

    /// Picks the visitor-data token and the backend-reported client version
    /// out of the response context, when present.
    fn harvest_response_context(&mut self, tree: &Value) {
        if self.identity.visitor_data.is_none() {
            self.identity.visitor_data = map_at(tree, &["responseContext"])
                .and_then(|ctx| get_str(ctx, "visitorData"))
                .map(str::to_string);
        }
        let services = list_at(tree, &["responseContext"], "serviceTrackingParams");
        for service in services.map(Vec::as_slice).unwrap_or(&[]) {
            if get_str(service, "service") != Some("CSI") {
                continue;
            }
            for param in crate::json::get_list(service, "params")
                .map(Vec::as_slice)
                .unwrap_or(&[])
            {
                if get_str(param, "key") == Some("cver") {
                    if let Some(value) = get_str(param, "value") {
                        self.identity.client_version = Some(value.to_string());
                    }
                }
            }
        }
    }

    /// Sends a chat message. Requires a live (not replay) session, a cookie
    /// identity and the send-params token from bootstrap.
    pub async fn send_message(&mut self, message: &str) -> Result<(), Error> {
        self.send_message_inner(message)
            .await
            .map_err(|e| Error::action("couldn't send a message", e))
    }

    async fn send_message_inner(&mut self, message: &str) -> Result<(), Error> {
        if self.is_replay() {
            return Err(Error::Protocol(
                "this stream is a replay; messages can only be sent to a live chat".to_string(),
            ));
        }
        if !self.identity.has_cookies() {
            return Err(Error::Permission(
                "no authenticated identity; set user data first".to_string(),
            ));
        }
        if self.identity.data_sync_id.is_none() {
            return Err(Error::Protocol(
                "data-sync id is unset; reset the session with user data".to_string(),
            ));
        }
        if self.identity.send_params.is_none() {
            return Err(Error::Protocol(
                "send params are unset; reset the session".to_string(),
            ));
        }
        let url = format!("{}{}", SEND_MESSAGE_API, self.identity.api_key);
        let payload = self.identity.send_message_payload(message);
        let headers = self.identity.auth_headers();
        self.http
            .post_json_fire_and_forget(url, payload.to_string(), headers)
            .await
    }

    pub async fn delete_event(&mut self, event: &mut ChatEvent) -> Result<(), Error> {
        self.moderate(event, ModerationAction::Delete).await
    }

    /// Times the author out (and deletes the chat).
    pub async fn timeout_author(&mut self, event: &mut ChatEvent) -> Result<(), Error> {
        self.moderate(event, ModerationAction::Timeout).await
    }

    /// Permanently bans the author from the channel. Keep the event around if
    /// you may want to unban later.
    pub async fn ban_author(&mut self, event: &mut ChatEvent) -> Result<(), Error> {
        self.moderate(event, ModerationAction::Ban).await
    }

    pub async fn unban_author(&mut self, event: &mut ChatEvent) -> Result<(), Error> {
        self.moderate(event, ModerationAction::Unban).await
    }

    /// Pins the event as the chat banner.
    pub async fn pin_event(&mut self, event: &mut ChatEvent) -> Result<(), Error> {
        self.moderate(event, ModerationAction::Pin).await
    }

    async fn moderate(
        &mut self,
        event: &mut ChatEvent,
        action: ModerationAction,
    ) -> Result<(), Error> {
        self.moderate_inner(event, action)
            .await
            .map_err(|e| Error::action(action.describe(), e))
    }

    async fn moderate_inner(
        &mut self,
        event: &mut ChatEvent,
        action: ModerationAction,
    ) -> Result<(), Error> {
        if self.is_replay() {
            return Err(Error::Protocol(
                "this stream is a replay; moderation needs a live chat".to_string(),
            ));
        }
        if self.identity.data_sync_id.is_none() {
            return Err(Error::Protocol(
                "data-sync id is unset; reset the session with user data".to_string(),
            ));
        }
        let http = Arc::clone(&self.http);
        let params = menu::resolve(http.as_ref(), &mut self.identity, event, action).await?;
        let api = match action {
            ModerationAction::Pin => LIVE_CHAT_ACTION_API,
            _ => MODERATE_API,
        };
        let url = format!("{}{}", api, self.identity.api_key);
        let payload = self.identity.moderation_payload(&params);
        let headers = self.identity.auth_headers();
        self.http
            .post_json_fire_and_forget(url, payload.to_string(), headers)
            .await
    }

    /// Installs the cookie jar used for the authentication header, from a raw
    /// `k=v; k2=v2` header string. Moderation additionally needs a data-sync
    /// id, which comes from a re-bootstrap with these cookies attached.
    pub fn set_user_data(&mut self, cookie_header: &str) {
        self.identity.set_cookie_header(cookie_header);
    }

    pub fn set_user_cookies(&mut self, cookies: std::collections::HashMap<String, String>) {
        self.identity.set_cookies(Some(cookies));
    }

    // Snapshot accessors. Each returns a copy, not a live view.

    /// Events decoded by the most recent poll. The backend may redeliver an
    /// item across polls; callers that retain events should de-duplicate by
    /// `id`.
    pub fn events(&self) -> Vec<ChatEvent> {
        self.events.clone()
    }

    pub fn ticker_events(&self) -> Vec<ChatEvent> {
        self.ticker_events.clone()
    }

    pub fn deletions(&self) -> Vec<DeletedMessage> {
        self.deletions.clone()
    }

    pub fn banner(&self) -> Option<ChatEvent> {
        self.banner.clone()
    }

    pub fn is_replay(&self) -> bool {
        self.continuation.mode() == PollMode::Replay
    }

    pub fn poll_state(&self) -> PollState {
        self.continuation.state()
    }

    pub fn video_id(&self) -> Option<&str> {
        self.video_id.as_deref()
    }

    pub fn channel_id(&self) -> Option<&str> {
        self.channel_id.as_deref()
    }
}
