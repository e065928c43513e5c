//! Error types for the session pipeline.

use solace_core::error::SolaceError;
use solace_models::ModelError;

/// Errors from handling one inbound message.
///
/// When any of these is returned nothing has been recorded.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("caller is not authenticated")]
    Unauthenticated,
    #[error("malformed request: {0}")]
    MalformedRequest(String),
    #[error("message exceeds maximum length of {0} characters")]
    MessageTooLong(usize),
    #[error("generation failed: {0}")]
    Generation(#[source] ModelError),
    #[error("classification failed: {0}")]
    Classification(#[source] ModelError),
}

impl From<PipelineError> for SolaceError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::Unauthenticated => SolaceError::Session(err.to_string()),
            PipelineError::Generation(_) | PipelineError::Classification(_) => {
                SolaceError::Model(err.to_string())
            }
            _ => SolaceError::Api(err.to_string()),
        }
    }
}
