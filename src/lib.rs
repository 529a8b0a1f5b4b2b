// src/lib.rs

pub mod chat;
pub mod error;
pub mod http;
pub mod json;

pub use chat::{
    AuthorRole, BootstrapInfo, ChatEvent, ChatEventKind, DeletedMessage, Emoji, LiveChatSession,
    Locale, MessageSegment, PollMode, PollState,
};
pub use error::Error;
pub use http::{DefaultHttpClient, HttpClient};
