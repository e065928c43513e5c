use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::Result;

/// Top-level configuration for the Solace service.
///
/// Loaded from `~/.solace/config.toml` by default. Every section falls back
/// to its defaults when omitted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SolaceConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub models: ModelsConfig,
    #[serde(default)]
    pub retention: RetentionConfig,
}

impl SolaceConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: SolaceConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }
}

/// General settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Requests per second accepted on the chat routes.
    pub rate_limit_per_sec: u64,
    /// Maximum accepted request body size.
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
            rate_limit_per_sec: 100,
            max_body_bytes: 64 * 1024,
        }
    }
}

/// The single operator account and session lifetime.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub username: String,
    pub password: String,
    pub session_ttl_minutes: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            username: "admin".to_string(),
            password: "password".to_string(),
            session_ttl_minutes: 720,
        }
    }
}

/// Generator backend selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeneratorBackend {
    /// Offline acknowledgement generator.
    #[default]
    Echo,
    /// Hosted text-generation endpoint.
    Http,
}

/// Classifier backend selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassifierBackend {
    /// Offline word-lexicon classifier.
    #[default]
    Lexicon,
    /// Hosted sentiment-analysis endpoint.
    Http,
}

/// External model settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelsConfig {
    pub generator: GeneratorBackend,
    pub generator_url: String,
    /// Generation budget, in tokens for hosted models and words for the echo backend.
    pub max_new_tokens: u32,
    pub classifier: ClassifierBackend,
    pub classifier_url: String,
    /// Optional bearer token sent to hosted endpoints.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_token: Option<String>,
    /// Per adapter call. A call that exceeds it counts as an adapter failure.
    pub timeout_secs: u64,
    /// Longest accepted user message, in characters.
    pub max_message_chars: usize,
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            generator: GeneratorBackend::Echo,
            generator_url:
                "https://api-inference.huggingface.co/models/ibm-granite/granite-3.3-2b-instruct"
                    .to_string(),
            max_new_tokens: 100,
            classifier: ClassifierBackend::Lexicon,
            classifier_url:
                "https://api-inference.huggingface.co/models/distilbert-base-uncased-finetuned-sst-2-english"
                    .to_string(),
            api_token: None,
            timeout_secs: 30,
            max_message_chars: 2000,
        }
    }
}

/// Transcript and concern retention.
///
/// Both caps are unset by default, meaning the logs grow for the lifetime of
/// the process. When set, the oldest entries are evicted first.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetentionConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_transcript_entries: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_concern_entries: Option<usize>,
    /// Number of recent entries shown on the dashboard.
    pub recent_limit: usize,
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            max_transcript_entries: None,
            max_concern_entries: None,
            recent_limit: 5,
        }
    }
}
