//! Application error type mapping to HTTP status codes and envelope format.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use personet_types::error::ChatError;
use personet_types::generation::GenerationError;

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// Chat orchestration errors.
    Chat(ChatError),
    /// Requested resource does not exist.
    NotFound(String),
    /// Validation error.
    Validation(String),
    /// Generic internal error.
    Internal(String),
}

impl From<ChatError> for AppError {
    fn from(e: ChatError) -> Self {
        AppError::Chat(e)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Chat(ChatError::InvalidSessionId(e)) => {
                (StatusCode::BAD_REQUEST, "INVALID_SESSION_ID", e.to_string())
            }
            AppError::Chat(ChatError::PersonaNotFound { user_id }) => (
                StatusCode::NOT_FOUND,
                "PERSONA_NOT_FOUND",
                format!("No persona document found for user '{user_id}'"),
            ),
            AppError::Chat(ChatError::TopicDataNotFound { user_id }) => (
                StatusCode::NOT_FOUND,
                "TOPIC_DATA_NOT_FOUND",
                format!("No topic data found for user '{user_id}'"),
            ),
            AppError::Chat(ChatError::Generation(GenerationError::Timeout(secs))) => (
                StatusCode::GATEWAY_TIMEOUT,
                "GENERATION_TIMEOUT",
                format!("Generation exceeded {secs}s deadline"),
            ),
            AppError::Chat(ChatError::Generation(e)) => {
                (StatusCode::BAD_GATEWAY, "GENERATION_ERROR", e.to_string())
            }
            AppError::Chat(ChatError::Repository(e)) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "REPOSITORY_ERROR",
                e.to_string(),
            ),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
            }
            AppError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                msg.clone(),
            ),
        };

        let body = json!({
            "data": null,
            "meta": {
                "timestamp": chrono::Utc::now().to_rfc3339(),
            },
            "errors": [{
                "code": code,
                "message": message,
            }]
        });

        (
            status,
            [(axum::http::header::CONTENT_TYPE, "application/json")],
            body.to_string(),
        )
            .into_response()
    }
}
