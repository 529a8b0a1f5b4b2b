// src/error.rs
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Permission error: {0}")]
    Permission(String),

    #[error("Configuration error: {0}")]
    Config(String),

    /// Wraps a lower-level failure with a stable description of the chat
    /// operation that was being attempted.
    #[error("{action}: {source}")]
    Action {
        action: &'static str,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    pub fn action(action: &'static str, source: Error) -> Self {
        Error::Action {
            action,
            source: Box::new(source),
        }
    }

    /// The underlying cause of an `Action` wrapper, or the error itself.
    pub fn cause(&self) -> &Error {
        match self {
            Error::Action { source, .. } => source,
            other => other,
        }
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Protocol(s)
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Protocol(s.to_string())
    }
}
