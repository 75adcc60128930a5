use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::llm_client::LlmError;
use crate::tools::ToolError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
///
/// Any of these raised inside a pipeline task aborts the whole run — there is
/// no per-task retry and no partial-result recovery.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Missing credential: {0}")]
    CredentialMissing(String),

    #[error("Tool unavailable: {0}")]
    ToolUnavailable(String),

    #[error("Model unavailable: {0}")]
    ModelUnavailable(String),

    #[error("Model refused: {0}")]
    ModelRefused(String),

    #[error("Output file missing: {0}")]
    OutputFileMissing(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<LlmError> for AppError {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::CredentialMissing(key) => AppError::CredentialMissing(key),
            LlmError::Refused(msg) => AppError::ModelRefused(msg),
            other => AppError::ModelUnavailable(other.to_string()),
        }
    }
}

impl From<ToolError> for AppError {
    fn from(err: ToolError) -> Self {
        match err {
            ToolError::CredentialMissing(key) => AppError::CredentialMissing(key),
            ToolError::Unavailable(msg) => AppError::ToolUnavailable(msg),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::CredentialMissing(key) => {
                tracing::error!("Missing credential: {key}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "CREDENTIAL_MISSING",
                    "A required API credential is not configured".to_string(),
                )
            }
            AppError::ToolUnavailable(msg) => {
                tracing::error!("Tool unavailable: {msg}");
                (
                    StatusCode::BAD_GATEWAY,
                    "TOOL_UNAVAILABLE",
                    "An external capability failed".to_string(),
                )
            }
            AppError::ModelUnavailable(msg) => {
                tracing::error!("Model unavailable: {msg}");
                (
                    StatusCode::BAD_GATEWAY,
                    "MODEL_UNAVAILABLE",
                    "The language model could not be reached".to_string(),
                )
            }
            AppError::ModelRefused(msg) => {
                tracing::warn!("Model refused: {msg}");
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "MODEL_REFUSED",
                    "The language model declined to process this content".to_string(),
                )
            }
            AppError::OutputFileMissing(name) => (
                StatusCode::NOT_FOUND,
                "OUTPUT_FILE_MISSING",
                format!("Generated file '{name}' is not available"),
            ),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
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
