// src/chat/mod.rs

pub mod continuation;
pub mod decode;
pub mod menu;
pub mod message;
pub mod payload;
pub mod session;
pub mod types;

pub use continuation::{ContinuationState, PollMode, PollState};
pub use menu::ModerationAction;
pub use payload::{Locale, SessionIdentity};
pub use session::LiveChatSession;
pub use types::{
    AuthorRole, BootstrapInfo, ChatEvent, ChatEventKind, DeletedMessage, Emoji, MessageSegment,
    ModerationTokens,
};
