//! Application error type mapping to HTTP status codes and envelope format.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use draugas_types::error::ChatError;

use super::response::ApiResponse;

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// Errors from the chat operations.
    Chat(ChatError),
    /// Malformed request body.
    Validation(String),
}

impl From<ChatError> for AppError {
    fn from(e: ChatError) -> Self {
        AppError::Chat(e)
    }
}

impl From<JsonRejection> for AppError {
    fn from(e: JsonRejection) -> Self {
        AppError::Validation(e.body_text())
    }
}

impl AppError {
    /// HTTP status and machine-readable code for this error.
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::Chat(ChatError::MissingField(_)) => (StatusCode::BAD_REQUEST, "MISSING_FIELD"),
            AppError::Chat(ChatError::InvalidMood(_)) => (StatusCode::BAD_REQUEST, "INVALID_MOOD"),
            AppError::Chat(ChatError::InvalidId(_)) => (StatusCode::BAD_REQUEST, "INVALID_ID"),
            AppError::Chat(ChatError::UserNotFound(_)) => (StatusCode::NOT_FOUND, "USER_NOT_FOUND"),
            AppError::Chat(ChatError::UserConflict(_)) => (StatusCode::CONFLICT, "USER_CONFLICT"),
            AppError::Chat(ChatError::Generation(_)) => (StatusCode::BAD_GATEWAY, "GENERATION_ERROR"),
            AppError::Chat(ChatError::Persistence(_)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "PERSISTENCE_ERROR")
            }
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        let message = match &self {
            AppError::Chat(e) => e.to_string(),
            AppError::Validation(msg) => msg.clone(),
        };

        if status.is_server_error() {
            tracing::error!(%code, %message, "Request failed");
        }

        let body = ApiResponse::error(code, &message, uuid::Uuid::now_v7().to_string(), 0);
        (status, Json(body)).into_response()
    }
}
