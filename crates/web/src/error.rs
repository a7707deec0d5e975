//! Error types for the web front end.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chat_core::ChatError;
use concierge::ConciergeError;
use database::DatabaseError;
use thiserror::Error;

/// Errors that can occur while handling a request.
#[derive(Debug, Error)]
pub enum WebError {
    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Chat pipeline error.
    #[error("Chat error: {0}")]
    Concierge(#[from] ConciergeError),

    /// Malformed or rejected input.
    #[error("{0}")]
    BadRequest(String),

    /// Wrong credentials.
    #[error("{0}")]
    Unauthorized(String),

    /// No session for a route that needs one.
    #[error("{0}")]
    Forbidden(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl WebError {
    fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            WebError::Database(err) => database_status(err),
            WebError::Concierge(ConciergeError::Database(err)) => database_status(err),
            WebError::Concierge(ConciergeError::Chat(err)) => {
                tracing::error!("Chat backend error: {}", err);
                let status = match err {
                    ChatError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
                    _ => StatusCode::BAD_GATEWAY,
                };
                (
                    status,
                    "An error occurred while processing the chat.".to_string(),
                )
            }
            WebError::Concierge(err) => {
                tracing::error!("Concierge error: {}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
            }
            WebError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            WebError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            WebError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.clone()),
            WebError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, msg.clone())
            }
        }
    }
}

fn database_status(err: &DatabaseError) -> (StatusCode, String) {
    match err {
        DatabaseError::NotFound { .. } => (StatusCode::NOT_FOUND, err.to_string()),
        DatabaseError::Validation(inner) => (StatusCode::BAD_REQUEST, inner.to_string()),
        DatabaseError::AlreadyExists { .. } | DatabaseError::Conflict(_) => {
            (StatusCode::BAD_REQUEST, err.to_string())
        }
        DatabaseError::Sqlx(_) | DatabaseError::Migration(_) => {
            tracing::error!("Database error: {}", err);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal database error".to_string(),
            )
        }
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();

        let body = serde_json::json!({
            "error": message
        });

        (status, Json(body)).into_response()
    }
}

/// Result type for web handlers.
pub type Result<T> = std::result::Result<T, WebError>;

#[cfg(test)]
mod tests {
    use super::*;
    use database::ValidationError;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (
                WebError::Database(DatabaseError::NotFound {
                    entity: "Reservation",
                    id: "7".to_string(),
                }),
                StatusCode::NOT_FOUND,
            ),
            (
                WebError::Database(DatabaseError::Validation(ValidationError::InvalidStay)),
                StatusCode::BAD_REQUEST,
            ),
            (
                WebError::Concierge(ConciergeError::Database(DatabaseError::Conflict(
                    "busy".to_string(),
                ))),
                StatusCode::BAD_REQUEST,
            ),
            (
                WebError::Concierge(ConciergeError::Chat(ChatError::Network("down".to_string()))),
                StatusCode::BAD_GATEWAY,
            ),
            (
                WebError::Forbidden("no".to_string()),
                StatusCode::FORBIDDEN,
            ),
            (
                WebError::Unauthorized("Invalid credentials".to_string()),
                StatusCode::UNAUTHORIZED,
            ),
        ];

        for (error, expected) in cases {
            assert_eq!(error.into_response().status(), expected);
        }
    }

    #[test]
    fn test_validation_message_is_user_facing() {
        let (_, message) =
            WebError::Database(DatabaseError::Validation(ValidationError::InvalidStay))
                .status_and_message();
        assert_eq!(message, "Check-out must be after check-in");
    }
}
