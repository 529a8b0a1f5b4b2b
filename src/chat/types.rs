// src/chat/types.rs
//
// Typed shapes recovered from the live chat wire format.

use std::collections::HashSet;

use serde::Serialize;
use serde_json::Value;

/// Roles attached to a message author via badges. `Normal` is present on every
/// event from creation; badges only ever add to the set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum AuthorRole {
    Normal,
    Verified,
    Owner,
    Member,
    Moderator,
    /// The platform's own pseudo-author on system messages.
    Platform,
}

/// Which renderer variant produced a [`ChatEvent`]. Re-decoding a ticker item
/// upgrades the kind but never mixes fields of unrelated variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum ChatEventKind {
    #[default]
    Message,
    PaidMessage,
    PaidSticker,
    TickerPaidMessage,
    NewMemberMessage,
    ViewerEngagementMessage,
}

/// A custom or standard emoji referenced from a message run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Emoji {
    pub emoji_id: Option<String>,
    pub shortcuts: Vec<String>,
    pub search_terms: Vec<String>,
    pub icon_url: Option<String>,
    pub is_custom_emoji: bool,
}

/// One atomic piece of a rich-text message, in original order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum MessageSegment {
    Text(String),
    Emoji(Emoji),
}

/// Per-event moderation capability tokens, resolved lazily from the item's
/// context menu and cached on the event.
#[derive(Debug, Clone, Default)]
pub struct ModerationTokens {
    pub pin: Option<String>,
    pub delete: Option<String>,
    pub timeout: Option<String>,
    pub ban: Option<String>,
    pub unban: Option<String>,
}

/// One decoded chat item. Common fields are filled from whichever renderer
/// matched first; variant-specific fields are overlaid afterward.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ChatEvent {
    pub kind: ChatEventKind,
    pub id: Option<String>,
    pub author_name: Option<String>,
    pub author_channel_id: Option<String>,
    pub author_icon_url: Option<String>,
    /// Microseconds since the UNIX epoch, parsed from a numeric-string field.
    pub timestamp_usec: i64,
    pub author_roles: HashSet<AuthorRole>,
    pub member_badge_icon_url: Option<String>,
    pub message: Option<String>,
    pub segments: Vec<MessageSegment>,

    // Paid message.
    pub body_background_color: u32,
    pub body_text_color: u32,
    pub header_background_color: u32,
    pub header_text_color: u32,
    pub author_name_text_color: u32,
    pub purchase_amount: Option<String>,

    // Paid sticker.
    pub sticker_icon_url: Option<String>,
    pub background_color: u32,

    // Ticker paid message.
    pub end_background_color: u32,
    pub duration_sec: u32,
    pub full_duration_sec: u32,

    // Moderation plumbing; never serialized out.
    #[serde(skip)]
    pub(crate) context_menu_params: Option<String>,
    #[serde(skip)]
    pub(crate) tokens: ModerationTokens,
}

impl ChatEvent {
    pub fn new() -> Self {
        let mut event = Self::default();
        event.author_roles.insert(AuthorRole::Normal);
        event
    }

    /// The moderation tokens resolved so far for this event instance.
    pub fn moderation_tokens(&self) -> &ModerationTokens {
        &self.tokens
    }

    pub fn has_role(&self, role: AuthorRole) -> bool {
        self.author_roles.contains(&role)
    }

    pub fn is_author_verified(&self) -> bool {
        self.has_role(AuthorRole::Verified)
    }

    pub fn is_author_owner(&self) -> bool {
        self.has_role(AuthorRole::Owner)
    }

    pub fn is_author_moderator(&self) -> bool {
        self.has_role(AuthorRole::Moderator)
    }

    pub fn is_author_member(&self) -> bool {
        self.has_role(AuthorRole::Member)
    }
}

/// A "mark as deleted" effect. Kept in its own list, never merged into the
/// live event list.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DeletedMessage {
    pub target_id: Option<String>,
    /// The replacement text, usually "[message deleted]".
    pub message: Option<String>,
    pub segments: Vec<MessageSegment>,
}

/// Everything the external bootstrap/scraping collaborator hands over when a
/// session is created or reset.
#[derive(Debug, Clone, Default)]
pub struct BootstrapInfo {
    pub continuation: String,
    pub is_replay: bool,
    pub api_key: String,
    pub video_id: Option<String>,
    pub channel_id: Option<String>,
    pub data_sync_id: Option<String>,
    pub send_params: Option<String>,
    /// The `liveChatContinuation`-bearing tree from the bootstrap page, when
    /// the scrape captured one. It seeds the first batch of actions, which is
    /// why the first `update()` after construction is suppressed.
    pub seed: Option<Value>,
}
