use thiserror::Error;

/// Top-level error type for the Solace service.
///
/// Subsystem crates define their own error types and implement
/// `From<SubsystemError> for SolaceError` (or the reverse) where the `?`
/// operator needs to cross a crate boundary.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SolaceError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Model error: {0}")]
    Model(String),

    #[error("Session error: {0}")]
    Session(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<toml::de::Error> for SolaceError {
    fn from(err: toml::de::Error) -> Self {
        SolaceError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for SolaceError {
    fn from(err: toml::ser::Error) -> Self {
        SolaceError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for SolaceError {
    fn from(err: serde_json::Error) -> Self {
        SolaceError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for Solace operations.
pub type Result<T> = std::result::Result<T, SolaceError>;
