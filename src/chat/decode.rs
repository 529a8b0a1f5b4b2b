// src/chat/decode.rs
//
// Classifies action envelopes from a poll response into typed chat events.
// The wire schema is shape-shifting: each action carries exactly one of a
// handful of mutually exclusive top-level keys, and each item carries one of
// several renderer variants. Anything unrecognized is ignored so schema drift
// degrades by omission instead of failing the poll.

use serde_json::Value;
use tracing::debug;

use crate::chat::message::{decode_message, pick_thumbnail_url};
use crate::chat::types::{AuthorRole, ChatEvent, ChatEventKind, DeletedMessage};
use crate::json::{get_color, get_i64, get_list, get_str, list_at, map_at};

const TEXT_RENDERER: &str = "liveChatTextMessageRenderer";
const PAID_RENDERER: &str = "liveChatPaidMessageRenderer";
const STICKER_RENDERER: &str = "liveChatPaidStickerRenderer";
const MEMBERSHIP_RENDERER: &str = "liveChatMembershipItemRenderer";
const TICKER_PAID_RENDERER: &str = "liveChatTickerPaidMessageItemRenderer";
const ENGAGEMENT_RENDERER: &str = "liveChatViewerEngagementMessageRenderer";

/// Effects accumulated while decoding one batch of actions.
#[derive(Debug, Default)]
pub struct DecodedActions {
    pub events: Vec<ChatEvent>,
    pub ticker_events: Vec<ChatEvent>,
    pub deletions: Vec<DeletedMessage>,
    pub banner: Option<ChatEvent>,
}

/// Decodes every action in `actions` into `out`. Replay wrappers recurse;
/// add-item actions append events that carry an id; banner commands replace
/// the single tracked banner; mark-as-deleted actions go to the deletion list.
pub fn decode_actions(actions: &[Value], out: &mut DecodedActions) {
    for action in actions {
        if let Some(inner) = list_at(action, &["replayChatItemAction"], "actions") {
            decode_actions(inner, out);
        }
        if let Some(item) = action.get("addChatItemAction").and_then(|a| a.get("item")) {
            let event = decode_item(item);
            // Events without an id cannot be correlated for deletion or
            // moderation later, so they are dropped.
            if event.id.is_some() {
                if event.kind == ChatEventKind::TickerPaidMessage {
                    out.ticker_events.push(event.clone());
                }
                out.events.push(event);
            } else {
                debug!("dropping chat item without id");
            }
        }
        if let Some(contents) = map_at(
            action,
            &[
                "addBannerToLiveChatCommand",
                "bannerRenderer",
                "liveChatBannerRenderer",
                "contents",
            ],
        ) {
            out.banner = Some(decode_item(contents));
        }
        if let Some(deleted) = action.get("markChatItemAsDeletedAction") {
            let (message, segments) = decode_message(deleted.get("deletedStateMessage"));
            out.deletions.push(DeletedMessage {
                target_id: get_str(deleted, "targetItemId").map(str::to_string),
                message,
                segments,
            });
        }
    }
}

/// Decodes one `item` node into an event via the renderer-priority rule.
/// Shape mismatches along the way are not errors; a branch that does not
/// match simply contributes no fields.
pub fn decode_item(item: &Value) -> ChatEvent {
    let mut event = ChatEvent::new();
    apply_item(&mut event, item);
    event
}

fn apply_item(event: &mut ChatEvent, item: &Value) {
    let paid = item.get(PAID_RENDERER);
    let sticker = item.get(STICKER_RENDERER);
    let membership = item.get(MEMBERSHIP_RENDERER);

    // First matching renderer supplies the common fields.
    let base = item
        .get(TEXT_RENDERER)
        .or(paid)
        .or(sticker)
        .or(membership);
    if let Some(base) = base {
        apply_common_fields(event, base);
    }

    // System messages have no human author.
    if let Some(engagement) = item.get(ENGAGEMENT_RENDERER) {
        event.author_name = Some("YouTube".to_string());
        event.author_channel_id = Some("user/YouTube".to_string());
        event.author_roles.insert(AuthorRole::Platform);
        event.id = get_str(engagement, "id").map(str::to_string);
        let (message, segments) = decode_message(engagement.get("message"));
        event.message = message;
        event.segments = segments;
        if let Some(ts) = get_i64(engagement, "timestampUsec") {
            event.timestamp_usec = ts;
        }
        event.kind = ChatEventKind::ViewerEngagementMessage;
    }

    if let Some(paid) = paid {
        event.body_background_color = get_color(paid, "bodyBackgroundColor");
        event.body_text_color = get_color(paid, "bodyTextColor");
        event.header_background_color = get_color(paid, "headerBackgroundColor");
        event.header_text_color = get_color(paid, "headerTextColor");
        event.author_name_text_color = get_color(paid, "authorNameTextColor");
        event.purchase_amount = purchase_amount(paid);
        event.kind = ChatEventKind::PaidMessage;
    }

    if let Some(sticker) = sticker {
        event.background_color = get_color(sticker, "backgroundColor");
        event.purchase_amount = purchase_amount(sticker);
        if let Some(thumbnails) = list_at(sticker, &["sticker"], "thumbnails") {
            event.sticker_icon_url = pick_thumbnail_url(thumbnails);
        }
        event.kind = ChatEventKind::PaidSticker;
    }

    // A ticker wraps an inner paid-message renderer; decode that first, then
    // overlay the ticker-only fields and retag.
    if let Some(ticker) = item.get(TICKER_PAID_RENDERER) {
        if let Some(inner) = map_at(
            ticker,
            &["showItemEndpoint", "showLiveChatItemEndpoint", "renderer"],
        ) {
            apply_item(event, inner);
        }
        event.end_background_color = get_color(ticker, "endBackgroundColor");
        event.duration_sec = get_i64(ticker, "durationSec").unwrap_or(0) as u32;
        event.full_duration_sec = get_i64(ticker, "fullDurationSec").unwrap_or(0) as u32;
        event.kind = ChatEventKind::TickerPaidMessage;
    }

    if let Some(membership) = membership {
        let (message, segments) = decode_message(membership.get("headerSubtext"));
        event.message = message;
        event.segments = segments;
        event.kind = ChatEventKind::NewMemberMessage;
    }
}

fn apply_common_fields(event: &mut ChatEvent, renderer: &Value) {
    event.author_name = renderer
        .get("authorName")
        .and_then(|n| get_str(n, "simpleText"))
        .map(str::to_string);
    event.id = get_str(renderer, "id").map(str::to_string);
    event.author_channel_id = get_str(renderer, "authorExternalChannelId").map(str::to_string);
    let (message, segments) = decode_message(renderer.get("message"));
    event.message = message;
    event.segments = segments;
    if let Some(thumbnails) = list_at(renderer, &["authorPhoto"], "thumbnails") {
        event.author_icon_url = pick_thumbnail_url(thumbnails);
    }
    if let Some(ts) = get_i64(renderer, "timestampUsec") {
        event.timestamp_usec = ts;
    }
    if let Some(badges) = get_list(renderer, "authorBadges") {
        for badge in badges {
            apply_badge(event, badge);
        }
    }
    event.context_menu_params = map_at(
        renderer,
        &["contextMenuEndpoint", "liveChatItemContextMenuEndpoint"],
    )
    .and_then(|e| get_str(e, "params"))
    .map(str::to_string);
}

fn apply_badge(event: &mut ChatEvent, badge: &Value) {
    let renderer = match badge.get("liveChatAuthorBadgeRenderer") {
        Some(r) => r,
        None => return,
    };
    if let Some(icon_type) = renderer.get("icon").and_then(|i| get_str(i, "iconType")) {
        match icon_type {
            "VERIFIED" => {
                event.author_roles.insert(AuthorRole::Verified);
            }
            "OWNER" => {
                event.author_roles.insert(AuthorRole::Owner);
            }
            "MODERATOR" => {
                event.author_roles.insert(AuthorRole::Moderator);
            }
            _ => {}
        }
    }
    // A custom thumbnail is the member badge regardless of icon type.
    if let Some(custom) = renderer.get("customThumbnail") {
        event.author_roles.insert(AuthorRole::Member);
        if let Some(thumbnails) = get_list(custom, "thumbnails") {
            event.member_badge_icon_url = pick_thumbnail_url(thumbnails);
        }
    }
}

fn purchase_amount(renderer: &Value) -> Option<String> {
    renderer
        .get("purchaseAmountText")
        .and_then(|t| get_str(t, "simpleText"))
        .map(str::to_string)
}
