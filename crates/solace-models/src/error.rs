//! Error types for the model adapters.

use std::time::Duration;

use solace_core::error::SolaceError;

/// Errors from a generator or classifier backend.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("model input cannot be empty")]
    EmptyInput,
    #[error("model unavailable: {0}")]
    Unavailable(String),
    #[error("model call timed out after {0:?}")]
    Timeout(Duration),
    #[error("invalid model response: {0}")]
    InvalidResponse(String),
    #[error("model configuration error: {0}")]
    Config(String),
}

impl From<reqwest::Error> for ModelError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ModelError::InvalidResponse(err.to_string())
        } else {
            ModelError::Unavailable(err.to_string())
        }
    }
}

impl From<ModelError> for SolaceError {
    fn from(err: ModelError) -> Self {
        SolaceError::Model(err.to_string())
    }
}
