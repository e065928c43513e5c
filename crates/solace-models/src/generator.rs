//! Text-generation adapter.
//!
//! The adapter owns the length budget: callers pass only the prompt.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use solace_core::config::ModelsConfig;

use crate::error::ModelError;
use crate::http::{truncate_chars, Endpoint};

/// Rough upper bound on characters per generated token, used to cap hosted
/// replies that ignore `max_new_tokens`.
const CHARS_PER_TOKEN: usize = 8;

/// Produces a reply for a prompt.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Short backend name for logs.
    fn name(&self) -> &'static str;

    /// Generate a bounded-length reply to `prompt`.
    async fn generate(&self, prompt: &str) -> Result<String, ModelError>;
}

// ---------------------------------------------------------------------------
// HttpGenerator
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct Generated {
    generated_text: String,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum GenerationResponse {
    List(Vec<Generated>),
    Single(Generated),
    Failed { error: String },
}

impl GenerationResponse {
    fn into_text(self) -> Result<String, ModelError> {
        match self {
            GenerationResponse::List(items) => items
                .into_iter()
                .next()
                .map(|g| g.generated_text)
                .ok_or_else(|| ModelError::InvalidResponse("empty generation list".to_string())),
            GenerationResponse::Single(g) => Ok(g.generated_text),
            GenerationResponse::Failed { error } => Err(ModelError::Unavailable(error)),
        }
    }
}

/// Generator backed by a hosted text-generation endpoint.
///
/// Requests `max_new_tokens` new tokens and asks for the full text, so the
/// reply starts with the prompt followed by the continuation.
#[derive(Debug, Clone)]
pub struct HttpGenerator {
    endpoint: Endpoint,
    max_new_tokens: u32,
}

impl HttpGenerator {
    pub fn new(
        url: &str,
        token: Option<String>,
        timeout: Duration,
        max_new_tokens: u32,
    ) -> Result<Self, ModelError> {
        Ok(Self {
            endpoint: Endpoint::new(url, token, timeout)?,
            max_new_tokens,
        })
    }

    pub fn from_config(config: &ModelsConfig) -> Result<Self, ModelError> {
        Self::new(
            &config.generator_url,
            config.api_token.clone(),
            Duration::from_secs(config.timeout_secs),
            config.max_new_tokens,
        )
    }

    fn char_budget(&self, prompt: &str) -> usize {
        prompt.chars().count() + self.max_new_tokens as usize * CHARS_PER_TOKEN
    }
}

#[async_trait]
impl Generator for HttpGenerator {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn generate(&self, prompt: &str) -> Result<String, ModelError> {
        let body = serde_json::json!({
            "inputs": prompt,
            "parameters": {
                "max_new_tokens": self.max_new_tokens,
                "return_full_text": true,
            },
        });
        let response: GenerationResponse = self.endpoint.post_json(&body).await?;
        let text = response.into_text()?;
        let reply = truncate_chars(text.trim(), self.char_budget(prompt)).to_string();
        tracing::debug!(reply_len = reply.len(), "Hosted generator reply");
        Ok(reply)
    }
}

// ---------------------------------------------------------------------------
// EchoGenerator
// ---------------------------------------------------------------------------

const ECHO_CONTINUATION: &str = "Thank you for sharing that with me. I am here to listen, \
    and you can tell me more about how you are feeling whenever you are ready.";

/// Offline generator.
///
/// Mirrors the shape of a full-text model reply: the prompt followed by a
/// fixed supportive continuation, cut to `max_new_tokens` words.
#[derive(Debug, Clone)]
pub struct EchoGenerator {
    max_new_tokens: u32,
}

impl EchoGenerator {
    pub fn new(max_new_tokens: u32) -> Self {
        Self { max_new_tokens }
    }
}

impl Default for EchoGenerator {
    fn default() -> Self {
        Self::new(100)
    }
}

#[async_trait]
impl Generator for EchoGenerator {
    fn name(&self) -> &'static str {
        "echo"
    }

    async fn generate(&self, prompt: &str) -> Result<String, ModelError> {
        if prompt.trim().is_empty() {
            return Err(ModelError::EmptyInput);
        }
        let continuation: Vec<&str> = ECHO_CONTINUATION
            .split_whitespace()
            .take(self.max_new_tokens as usize)
            .collect();
        if continuation.is_empty() {
            return Ok(prompt.trim().to_string());
        }
        Ok(format!("{} {}", prompt.trim(), continuation.join(" ")))
    }
}
