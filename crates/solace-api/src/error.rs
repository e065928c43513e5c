//! API error types and JSON error response formatting.
//!
//! ApiError provides a consistent JSON error response format across the JSON
//! endpoints. Internal details are logged, never sent to the caller.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use solace_chat::PipelineError;

/// Shown to callers when a model adapter fails.
pub const GENERIC_FAILURE: &str = "Sorry, I couldn't respond right now. Please try again.";

/// JSON error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Machine-readable error code (e.g., "bad_request", "bad_gateway").
    pub error: String,
    /// Human-readable error message.
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// API error type that maps to HTTP status codes and JSON responses.
#[derive(Debug)]
pub enum ApiError {
    /// 400 Bad Request - missing or invalid input.
    BadRequest(String),
    /// 401 Unauthorized - no active session.
    Unauthorized(String),
    /// 413 Payload Too Large - message over the configured length.
    PayloadTooLarge(String),
    /// 502 Bad Gateway - a model adapter failed or timed out.
    BadGateway(String),
    /// 500 Internal Server Error - unexpected server error.
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::BadGateway(_) => StatusCode::BAD_GATEWAY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg)
            | ApiError::Unauthorized(msg)
            | ApiError::PayloadTooLarge(msg)
            | ApiError::BadGateway(msg)
            | ApiError::Internal(msg) => msg,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "bad_request",
            ApiError::Unauthorized(_) => "unauthorized",
            ApiError::PayloadTooLarge(_) => "payload_too_large",
            ApiError::BadGateway(_) => "bad_gateway",
            ApiError::Internal(_) => "internal_error",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorBody {
            error: self.code().to_string(),
            message: self.message().to_string(),
            details: None,
        };
        (status, Json(body)).into_response()
    }
}

impl From<PipelineError> for ApiError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::Unauthenticated => {
                ApiError::Unauthorized("Please login first.".to_string())
            }
            PipelineError::MalformedRequest(msg) => ApiError::BadRequest(msg),
            PipelineError::MessageTooLong(_) => ApiError::PayloadTooLarge(err.to_string()),
            PipelineError::Generation(_) | PipelineError::Classification(_) => {
                tracing::error!(error = %err, "Pipeline failed");
                ApiError::BadGateway(GENERIC_FAILURE.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use solace_models::ModelError;

    #[test]
    fn test_adapter_failures_hide_details() {
        let err = ApiError::from(PipelineError::Classification(ModelError::Unavailable(
            "HTTP 503: upstream secret".to_string(),
        )));
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(err.message(), GENERIC_FAILURE);
        assert!(!err.message().contains("secret"));
    }

    #[test]
    fn test_pipeline_error_status_mapping() {
        assert_eq!(
            ApiError::from(PipelineError::MalformedRequest("x".to_string())).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(PipelineError::MessageTooLong(10)).status(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
        assert_eq!(
            ApiError::from(PipelineError::Unauthenticated).status(),
            StatusCode::UNAUTHORIZED
        );
        let timeout = ModelError::Timeout(Duration::from_secs(30));
        assert_eq!(
            ApiError::from(PipelineError::Generation(timeout)).status(),
            StatusCode::BAD_GATEWAY
        );
    }
}
