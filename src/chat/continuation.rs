// src/chat/continuation.rs
//
// Owns the pagination token across polling cycles. Tokens must be chained
// correctly or the feed silently stalls or restarts, so selection of the next
// token is the one place that understands the continuation shapes.

use serde_json::Value;
use tracing::warn;

use crate::json::{get_str, map_at};
use crate::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollMode {
    Live,
    Replay,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    /// Token just obtained from bootstrap; the next `update()` is suppressed
    /// exactly once because the bootstrap fetch already carried the first
    /// batch of actions.
    Bootstrapped,
    LivePolling,
    ReplayPolling,
    /// The token became unset. Every further update fails fast without a
    /// network call until the session is re-bootstrapped.
    Error,
}

#[derive(Debug)]
pub struct ContinuationState {
    token: Option<String>,
    mode: PollMode,
    state: PollState,
}

impl ContinuationState {
    pub fn new(token: String, mode: PollMode) -> Self {
        Self {
            token: Some(token),
            mode,
            state: PollState::Bootstrapped,
        }
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn mode(&self) -> PollMode {
        self.mode
    }

    pub fn state(&self) -> PollState {
        self.state
    }

    /// Replaces the current token without a state transition. Used when the
    /// bootstrap page itself carries a fresher replay token.
    pub fn set_token(&mut self, token: String) {
        self.token = Some(token);
    }

    /// Starts one update cycle. Returns `Ok(None)` when this cycle must be
    /// suppressed (first call after bootstrap), `Ok(Some(token))` with the
    /// token to poll with, or an error once the token is gone for good.
    pub fn begin_update(&mut self) -> Result<Option<String>, Error> {
        match self.state {
            PollState::Bootstrapped => {
                self.state = match self.mode {
                    PollMode::Live => PollState::LivePolling,
                    PollMode::Replay => PollState::ReplayPolling,
                };
                Ok(None)
            }
            PollState::Error => Err(Error::Protocol(
                "continuation is unset; the session must be reset".to_string(),
            )),
            PollState::LivePolling | PollState::ReplayPolling => match &self.token {
                Some(token) => Ok(Some(token.clone())),
                None => {
                    self.state = PollState::Error;
                    Err(Error::Protocol(
                        "continuation is unset; the session must be reset".to_string(),
                    ))
                }
            },
        }
    }

    /// Consumes the continuation list of a successful poll response and
    /// selects the next token.
    ///
    /// Live mode scans the whole list in priority order: invalidation, then
    /// timed, then reload; if none is present the token becomes unset and the
    /// next cycle fails. Replay mode takes the single replay token when
    /// present and otherwise keeps the old one, since replay feeds may
    /// legitimately omit it at end-of-stream.
    pub fn absorb(&mut self, continuations: Option<&[Value]>) {
        let entries = continuations.unwrap_or(&[]);
        match self.mode {
            PollMode::Live => {
                let next = Self::find_token(entries, "invalidationContinuationData")
                    .or_else(|| Self::find_token(entries, "timedContinuationData"))
                    .or_else(|| Self::find_token(entries, "reloadContinuationData"));
                if next.is_none() {
                    warn!("poll response carried no usable continuation");
                }
                self.token = next;
            }
            PollMode::Replay => {
                if let Some(next) = Self::find_token(entries, "liveChatReplayContinuationData") {
                    self.token = Some(next);
                }
            }
        }
    }

    fn find_token(entries: &[Value], shape: &str) -> Option<String> {
        entries
            .iter()
            .find_map(|entry| map_at(entry, &[shape]).and_then(|data| get_str(data, "continuation")))
            .map(str::to_string)
    }
}
