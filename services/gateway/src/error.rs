use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use types::errors::QueryError;

use crate::keystore::KeyStoreError;

/// Central error type for the Gateway application
#[derive(Debug, Error)]
pub enum AppError {
    /// Credential header absent.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Credential present but not accepted.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    /// Unexpected fault; the message keeps the cause.
    #[error("Internal server error: {0}")]
    InternalError(#[from] anyhow::Error),
}

impl From<QueryError> for AppError {
    fn from(err: QueryError) -> Self {
        match err {
            QueryError::NotFound(msg) => AppError::NotFound(msg),
            QueryError::Validation { .. } => AppError::Validation(err.to_string()),
            QueryError::Storage { .. } => AppError::InternalError(anyhow::Error::new(err)),
        }
    }
}

impl From<KeyStoreError> for AppError {
    fn from(err: KeyStoreError) -> Self {
        match err {
            KeyStoreError::AdminMissing => AppError::Unauthorized(err.to_string()),
            KeyStoreError::AdminInvalid => AppError::Forbidden(err.to_string()),
            KeyStoreError::Persist(_) | KeyStoreError::Audit(_) => {
                AppError::InternalError(anyhow::Error::new(err))
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message, code) = match self {
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg, "UNAUTHORIZED"),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg, "FORBIDDEN"),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg, "NOT_FOUND"),
            AppError::Validation(msg) => {
                (StatusCode::UNPROCESSABLE_ENTITY, msg, "VALIDATION_ERROR")
            }
            AppError::InternalError(err) => {
                tracing::error!(error = %err, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    err.to_string(),
                    "INTERNAL_ERROR",
                )
            }
        };

        let body = Json(json!({
            "error": code,
            "message": error_message
        }));

        (status, body).into_response()
    }
}
