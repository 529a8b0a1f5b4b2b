// src/chat/payload.rs
//
// Builds the outbound JSON bodies and the per-request authentication header.
// The backend rejects headers built too long before use (it embeds the
// current epoch second), so headers are recomputed on every call.

use std::collections::HashMap;

use chrono::{Duration, Utc};
use rand::Rng;
use serde_json::{json, Value};
use sha1::{Digest, Sha1};

use crate::chat::continuation::PollMode;
use crate::Error;

pub const ORIGIN: &str = "https://www.youtube.com";

/// User agent presented on poll requests. Matches a desktop browser; the
/// backend serves a different schema to unknown clients.
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/98.0.4758.102 Safari/537.36,gzip(gfe)";

const CLIENT_MESSAGE_ID_ALPHABET: &[u8] =
    b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ-";
const CLIENT_MESSAGE_ID_LEN: usize = 26;

/// Country and language sent as `gl`/`hl` in every client context.
#[derive(Debug, Clone)]
pub struct Locale {
    country: String,
    language: String,
}

impl Locale {
    pub fn new(country: impl Into<String>, language: impl Into<String>) -> Result<Self, Error> {
        let country = country.into();
        let language = language.into();
        if country.is_empty() {
            return Err(Error::Config("locale must have a country".to_string()));
        }
        if language.is_empty() {
            return Err(Error::Config("locale must have a language".to_string()));
        }
        Ok(Self { country, language })
    }

    pub fn country(&self) -> &str {
        &self.country
    }

    pub fn language(&self) -> &str {
        &self.language
    }
}

impl Default for Locale {
    fn default() -> Self {
        Self {
            country: "US".to_string(),
            language: "en".to_string(),
        }
    }
}

/// Mutable per-session identity: the scraped tokens, the cookie jar and the
/// counters that feed client message ids. One instance per session; not
/// concurrency-safe.
#[derive(Debug, Clone)]
pub struct SessionIdentity {
    pub api_key: String,
    pub visitor_data: Option<String>,
    pub client_version: Option<String>,
    pub data_sync_id: Option<String>,
    pub send_params: Option<String>,
    cookies: Option<HashMap<String, String>>,
    client_message_id: String,
    comment_counter: u32,
}

impl SessionIdentity {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            visitor_data: None,
            client_version: None,
            data_sync_id: None,
            send_params: None,
            cookies: None,
            client_message_id: generate_client_message_id(),
            comment_counter: 0,
        }
    }

    pub fn set_cookies(&mut self, cookies: Option<HashMap<String, String>>) {
        self.cookies = cookies;
    }

    /// Parses a raw `k=v; k2=v2` cookie header string into the jar.
    pub fn set_cookie_header(&mut self, header: &str) {
        let mut cookies = HashMap::new();
        for pair in header.split(';') {
            if let Some((key, value)) = pair.split_once('=') {
                cookies.insert(key.trim().to_string(), value.trim().to_string());
            }
        }
        self.cookies = Some(cookies);
    }

    pub fn has_cookies(&self) -> bool {
        self.cookies.is_some()
    }

    /// Zeroes the send counter and regenerates the client message id base.
    /// Called on session reset.
    pub fn reset_counters(&mut self) {
        self.comment_counter = 0;
        self.client_message_id = generate_client_message_id();
    }

    fn next_client_message_id(&mut self) -> String {
        if self.comment_counter >= i32::MAX as u32 - 1 {
            self.comment_counter = 0;
        }
        let id = format!("{}{}", self.client_message_id, self.comment_counter);
        self.comment_counter += 1;
        id
    }

    /// The effective client version: the one scraped from the page when
    /// available, otherwise a clock-derived default. The default backdates by
    /// a small skew so a freshly rolled-over date is never ahead of the
    /// backend's.
    pub fn client_version(&self) -> String {
        if let Some(version) = &self.client_version {
            return version.clone();
        }
        let date = Utc::now() - Duration::minutes(24);
        format!("2.{}.06.00", date.format("%Y%m%d"))
    }

    fn client_context(&self) -> Value {
        json!({
            "clientName": "WEB",
            "clientVersion": self.client_version(),
        })
    }

    /// The poll body for `get_live_chat`/`get_live_chat_replay`.
    pub fn poll_payload(
        &self,
        locale: &Locale,
        continuation: &str,
        mode: PollMode,
        offset_ms: i64,
    ) -> Value {
        let mut client = self.client_context();
        if let Some(visitor_data) = &self.visitor_data {
            client["visitorData"] = json!(visitor_data);
        }
        client["userAgent"] = json!(USER_AGENT);
        client["gl"] = json!(locale.country());
        client["hl"] = json!(locale.language());
        let mut payload = json!({
            "context": {"client": client},
            "continuation": continuation,
        });
        if mode == PollMode::Replay {
            let offset_ms = offset_ms.max(0);
            payload["currentPlayerState"] = json!({"playerOffsetMs": offset_ms.to_string()});
        }
        payload
    }

    /// The `send_message` body. Advances the per-send counter.
    pub fn send_message_payload(&mut self, message: &str) -> Value {
        let mut payload = json!({
            "clientMessageId": self.next_client_message_id(),
            "context": {
                "client": self.client_context(),
                "user": {},
            },
            "richMessage": {"textSegments": {"text": message}},
        });
        if let Some(data_sync_id) = &self.data_sync_id {
            payload["context"]["user"]["onBehalfOfUser"] = json!(data_sync_id);
        }
        if let Some(params) = &self.send_params {
            payload["params"] = json!(params);
        }
        payload
    }

    /// The generic moderation body: just the action's opaque params token and
    /// the on-behalf-of-user field when the data-sync id is known.
    pub fn moderation_payload(&self, params: &str) -> Value {
        let mut payload = json!({
            "context": {
                "client": self.client_context(),
                "user": {},
            },
            "params": params,
        });
        if let Some(data_sync_id) = &self.data_sync_id {
            payload["context"]["user"]["onBehalfOfUser"] = json!(data_sync_id);
        }
        payload
    }

    /// Authentication headers for one request. Empty when no cookie identity
    /// is set. The hash embeds the current epoch second, so a header built
    /// ahead of time goes stale within about a minute.
    pub fn auth_headers(&self) -> HashMap<String, String> {
        let mut headers = HashMap::new();
        let cookies = match &self.cookies {
            Some(cookies) => cookies,
            None => return headers,
        };
        let time = Utc::now().timestamp();
        let sapisid = cookies.get("SAPISID").map(String::as_str).unwrap_or("");
        headers.insert(
            "Authorization".to_string(),
            format!("SAPISIDHASH {}", sapisidhash(time, sapisid, ORIGIN)),
        );
        headers.insert("X-Origin".to_string(), ORIGIN.to_string());
        headers.insert("Origin".to_string(), ORIGIN.to_string());
        let mut jar = String::new();
        for (key, value) in cookies {
            jar.push_str(key);
            jar.push('=');
            jar.push_str(value);
            jar.push(';');
        }
        headers.insert("Cookie".to_string(), jar);
        headers
    }
}

/// The time-boxed `<epochSeconds>_<hex>` value of the authorization scheme:
/// SHA-1 over the space-joined epoch second, session secret and origin.
pub fn sapisidhash(time: i64, sapisid: &str, origin: &str) -> String {
    let digest = Sha1::digest(format!("{time} {sapisid} {origin}").as_bytes());
    format!("{time}_{digest:x}")
}

fn generate_client_message_id() -> String {
    let mut rng = rand::rng();
    (0..CLIENT_MESSAGE_ID_LEN)
        .map(|_| {
            let idx = rng.random_range(0..CLIENT_MESSAGE_ID_ALPHABET.len());
            CLIENT_MESSAGE_ID_ALPHABET[idx] as char
        })
        .collect()
}
