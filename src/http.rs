//! HTTP client abstraction for the live chat endpoints.
//!
//! The session code never talks to reqwest directly; everything goes through
//! the [`HttpClient`] trait so tests can substitute canned responses without
//! touching the network. The default implementation wraps reqwest.

use async_trait::async_trait;
use std::collections::HashMap;

use crate::Error;

/// A generic trait for the three request shapes the chat backend needs.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// GET, returning the response body as text.
    async fn get_text(
        &self,
        url: String,
        headers: HashMap<String, String>,
    ) -> Result<String, Error>;

    /// POST with a JSON body, returning the response body as text.
    async fn post_json(
        &self,
        url: String,
        body: String,
        headers: HashMap<String, String>,
    ) -> Result<String, Error>;

    /// POST with a JSON body where the response content is not needed.
    /// A non-success status is an error carrying the response body.
    async fn post_json_fire_and_forget(
        &self,
        url: String,
        body: String,
        headers: HashMap<String, String>,
    ) -> Result<(), Error>;
}

#[derive(Clone)]
pub struct DefaultHttpClient {
    client: reqwest::Client,
}

impl DefaultHttpClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for DefaultHttpClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpClient for DefaultHttpClient {
    async fn get_text(
        &self,
        url: String,
        headers: HashMap<String, String>,
    ) -> Result<String, Error> {
        let mut request = self.client.get(&url);
        for (key, value) in headers {
            request = request.header(&key, value);
        }
        let response = request.send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(Error::Transport(format!("GET {url}: HTTP {status}: {text}")));
        }
        Ok(response.text().await?)
    }

    async fn post_json(
        &self,
        url: String,
        body: String,
        headers: HashMap<String, String>,
    ) -> Result<String, Error> {
        let mut request = self
            .client
            .post(&url)
            .header("Content-Type", "application/json");
        for (key, value) in headers {
            request = request.header(&key, value);
        }
        let response = request.body(body).send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(Error::Transport(format!("POST {url}: HTTP {status}: {text}")));
        }
        Ok(response.text().await?)
    }

    async fn post_json_fire_and_forget(
        &self,
        url: String,
        body: String,
        headers: HashMap<String, String>,
    ) -> Result<(), Error> {
        let mut request = self
            .client
            .post(&url)
            .header("Content-Type", "application/json");
        for (key, value) in headers {
            request = request.header(&key, value);
        }
        let response = request.body(body).send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(Error::Transport(format!("POST {url}: HTTP {status}: {text}")));
        }
        Ok(())
    }
}
