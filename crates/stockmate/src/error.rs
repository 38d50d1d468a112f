//! Error types for the chatbot

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

/// Result type alias for chatbot operations
pub type Result<T> = std::result::Result<T, Error>;

/// Chatbot errors
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Vector index or metadata could not be read
    #[error("Index error: {0}")]
    Index(String),

    /// Embedding error
    #[error("Embedding generation failed: {0}")]
    Embedding(String),

    /// Completion endpoint error (transport or malformed body)
    #[error("Completion error: {0}")]
    Completion(String),

    /// Unknown chat session
    #[error("Session not found: {0}")]
    SessionNotFound(Uuid),

    /// Turn index out of range for a session
    #[error("Turn {index} not found in session {session_id}")]
    TurnNotFound { session_id: Uuid, index: usize },

    /// Malformed request
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Feedback log error
    #[error("Feedback log error: {0}")]
    Feedback(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Spreadsheet archive error
    #[error("Export error: {0}")]
    Export(#[from] zip::result::ZipError),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create an index error
    pub fn index(message: impl Into<String>) -> Self {
        Self::Index(message.into())
    }

    /// Create an embedding error
    pub fn embedding(message: impl Into<String>) -> Self {
        Self::Embedding(message.into())
    }

    /// Create a completion error
    pub fn completion(message: impl Into<String>) -> Self {
        Self::Completion(message.into())
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match &self {
            Error::Config(msg) => (StatusCode::BAD_REQUEST, "config_error", msg.clone()),
            Error::Index(msg) => (StatusCode::SERVICE_UNAVAILABLE, "index_error", msg.clone()),
            Error::Embedding(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "embedding_error", msg.clone())
            }
            Error::Completion(msg) => (StatusCode::BAD_GATEWAY, "completion_error", msg.clone()),
            Error::SessionNotFound(id) => (
                StatusCode::NOT_FOUND,
                "session_not_found",
                format!("Session not found: {}", id),
            ),
            Error::TurnNotFound { session_id, index } => (
                StatusCode::NOT_FOUND,
                "turn_not_found",
                format!("Turn {} not found in session {}", index, session_id),
            ),
            Error::InvalidRequest(msg) => {
                (StatusCode::BAD_REQUEST, "invalid_request", msg.clone())
            }
            Error::Feedback(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "feedback_error", msg.clone())
            }
            Error::Io(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "io_error",
                err.to_string(),
            ),
            Error::Csv(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "csv_error",
                err.to_string(),
            ),
            Error::Export(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "export_error",
                err.to_string(),
            ),
            Error::Internal(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", msg.clone())
            }
        };

        let body = Json(json!({
            "error": {
                "type": error_type,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let id = Uuid::new_v4();
        assert_eq!(
            Error::SessionNotFound(id).into_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            Error::TurnNotFound { session_id: id, index: 3 }.into_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            Error::InvalidRequest("empty".into()).into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            Error::completion("timeout").into_response().status(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_internal_error_status() {
        let response = Error::internal("Task join error: cancelled").into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_display() {
        assert_eq!(
            Error::completion("connection refused").to_string(),
            "Completion error: connection refused"
        );
    }
}
