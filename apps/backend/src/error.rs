//! Error handling for the backend API

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use vocab_core::Error as CoreError;

/// API error types
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
}

impl ApiError {
    fn status_and_kind(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::Core(err) => match err {
                // Informational: the caller gets a normal response with a message.
                CoreError::EmptyDueQueue => (StatusCode::OK, "empty_due_queue"),
                CoreError::EmptyTestSet => (StatusCode::BAD_REQUEST, "empty_test_set"),
                CoreError::Import(_) => (StatusCode::BAD_REQUEST, "import_error"),
                CoreError::InvalidItem(_) => (StatusCode::BAD_REQUEST, "invalid_item"),
                CoreError::Config(_) => (StatusCode::BAD_REQUEST, "invalid_config"),
                CoreError::ItemNotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
                CoreError::InvalidAnswerTarget { .. } => {
                    (StatusCode::CONFLICT, "invalid_answer_target")
                }
                CoreError::SessionNotActive => (StatusCode::CONFLICT, "session_not_active"),
                CoreError::Persistence(_) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "persistence_error")
                }
                CoreError::Export(_) => (StatusCode::INTERNAL_SERVER_ERROR, "export_error"),
            },
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            ApiError::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, "database_error"),
            ApiError::Migration(_) => (StatusCode::INTERNAL_SERVER_ERROR, "migration_error"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type) = self.status_and_kind();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        let body = Json(ErrorResponse {
            error: error_type.to_string(),
            message: self.to_string(),
        });

        (status, body).into_response()
    }
}

/// Result type alias for API operations
pub type Result<T> = std::result::Result<T, ApiError>;
