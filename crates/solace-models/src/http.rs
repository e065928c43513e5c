//! Shared HTTP plumbing for hosted inference endpoints.

use std::time::Duration;

use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::ModelError;

/// Longest slice of an error body kept in an error message.
const MAX_ERROR_BODY: usize = 200;

/// A JSON-over-HTTP inference endpoint.
#[derive(Debug, Clone)]
pub struct Endpoint {
    client: Client,
    url: Url,
    token: Option<String>,
}

impl Endpoint {
    /// Validate the URL and build a client with the given request timeout.
    pub fn new(url: &str, token: Option<String>, timeout: Duration) -> Result<Self, ModelError> {
        let url = Url::parse(url)
            .map_err(|e| ModelError::Config(format!("invalid endpoint URL '{}': {}", url, e)))?;
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ModelError::Config(format!("HTTP client: {}", e)))?;
        Ok(Self { client, url, token })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// POST `body` as JSON and decode the JSON response.
    ///
    /// Non-2xx statuses become [`ModelError::Unavailable`] carrying the status
    /// and a prefix of the response body.
    pub async fn post_json<B, R>(&self, body: &B) -> Result<R, ModelError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let mut request = self.client.post(self.url.clone()).json(body);
        if let Some(ref token) = self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                ModelError::Unavailable(format!("request to {} timed out", self.url))
            } else {
                ModelError::from(e)
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ModelError::Unavailable(format!(
                "HTTP {}: {}",
                status,
                truncate_chars(&text, MAX_ERROR_BODY)
            )));
        }

        Ok(response.json::<R>().await?)
    }
}

/// Cut `text` to at most `limit` characters on a char boundary.
pub fn truncate_chars(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
