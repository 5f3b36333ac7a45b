//! Error types for msight-va
//!
//! Two distinct failure classes, kept apart at the type level:
//! - [`PipelineError`]: fatal to a whole analysis run, propagates to the
//!   caller with no partial result.
//! - [`ApiError`]: HTTP surface errors with status-code mapping.
//!
//! Per-extraction-task failures are deliberately *not* errors here; they
//! are recovered into fallback data plus an entry in the aggregate's
//! error map (see `services::orchestrator::TaskOutcome`).

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::time::Duration;
use thiserror::Error;

/// Fatal analysis pipeline failures
///
/// Only asset-lifecycle failures abort a run; anything downstream of a
/// ready asset degrades to partial data instead.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The remote upload call itself failed
    #[error("video upload failed: {0}")]
    UploadFailed(String),

    /// The remote service reported the asset as failed
    #[error("video processing failed: {0}")]
    ProcessingFailed(String),

    /// The asset never became ready within the wall-clock budget
    #[error("video processing timed out after {budget:?}")]
    ProcessingTimeout { budget: Duration },

    /// Local file access error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Resource not found (404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Conflict (409) - e.g., job identifier already in use
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error(transparent)]
    Other(#[from] anyhow::Error),

    /// msight-common error
    #[error("Common error: {0}")]
    Common(#[from] msight_common::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", msg),
            ApiError::Io(ref err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "IO_ERROR",
                err.to_string(),
            ),
            ApiError::Other(ref err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                err.to_string(),
            ),
            ApiError::Common(ref err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "COMMON_ERROR",
                err.to_string(),
            ),
        };

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
