use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::analysis::extractor::ExtractionError;
use crate::llm_client::LlmError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
///
/// Analysis gate failures carry real HTTP statuses. A malformed model
/// reply is not an error: it degrades to an empty-but-well-shaped 200
/// result and never reaches this type.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Email already registered")]
    DuplicateEmail,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Invalid file type. Only PDF resumes are allowed.")]
    InvalidFileType,

    #[error("The uploaded PDF is empty or unreadable.")]
    EmptyPdf,

    #[error("{0}")]
    NotResumeLike(String),

    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error("No working model available")]
    NoModelAvailable,

    #[error("Analysis timed out")]
    AnalysisTimeout,

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Video search error: {0}")]
    VideoSearch(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<LlmError> for AppError {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::NoModelAvailable => AppError::NoModelAvailable,
            other => AppError::Llm(other.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::DuplicateEmail => (
                StatusCode::BAD_REQUEST,
                "DUPLICATE_EMAIL",
                self.to_string(),
            ),
            AppError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "INVALID_CREDENTIALS",
                self.to_string(),
            ),
            AppError::InvalidFileType => (
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                "INVALID_FILE_TYPE",
                self.to_string(),
            ),
            AppError::EmptyPdf => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "EMPTY_PDF",
                self.to_string(),
            ),
            AppError::NotResumeLike(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "NOT_RESUME_LIKE",
                msg.clone(),
            ),
            AppError::Extraction(e) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "EXTRACTION_ERROR",
                e.to_string(),
            ),
            AppError::NoModelAvailable => {
                tracing::error!("Model candidate list exhausted");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "NO_MODEL_AVAILABLE",
                    self.to_string(),
                )
            }
            AppError::AnalysisTimeout => (
                StatusCode::GATEWAY_TIMEOUT,
                "ANALYSIS_TIMEOUT",
                self.to_string(),
            ),
            AppError::Llm(msg) => {
                tracing::error!("LLM error: {msg}");
                (
                    StatusCode::BAD_GATEWAY,
                    "LLM_ERROR",
                    "An AI processing error occurred".to_string(),
                )
            }
            AppError::VideoSearch(msg) => {
                tracing::error!("Video search error: {msg}");
                (
                    StatusCode::BAD_GATEWAY,
                    "VIDEO_SEARCH_ERROR",
                    "A video search error occurred".to_string(),
                )
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "A database error occurred".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gate_failures_map_to_client_statuses() {
        assert_eq!(
            AppError::InvalidFileType.into_response().status(),
            StatusCode::UNSUPPORTED_MEDIA_TYPE
        );
        assert_eq!(
            AppError::EmptyPdf.into_response().status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            AppError::DuplicateEmail.into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::InvalidCredentials.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn test_upstream_failures_map_to_server_statuses() {
        assert_eq!(
            AppError::NoModelAvailable.into_response().status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            AppError::AnalysisTimeout.into_response().status(),
            StatusCode::GATEWAY_TIMEOUT
        );
        assert_eq!(
            AppError::Llm("boom".to_string()).into_response().status(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_llm_exhaustion_converts_to_no_model_available() {
        let err: AppError = LlmError::NoModelAvailable.into();
        assert!(matches!(err, AppError::NoModelAvailable));
    }
}
