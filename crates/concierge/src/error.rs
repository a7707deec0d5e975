//! Error types for the chat pipeline.

use chat_core::ChatError;
use database::DatabaseError;
use thiserror::Error;

/// Errors that can occur while handling a chat turn or a follow-up.
#[derive(Debug, Error)]
pub enum ConciergeError {
    /// Persistence failed.
    #[error("database error: {0}")]
    Database(#[from] DatabaseError),

    /// The chat backend failed.
    #[error("chat error: {0}")]
    Chat(#[from] ChatError),

    /// Delivering a follow-up failed.
    #[error("notification failed: {0}")]
    NotifyFailed(String),
}

/// Result alias for concierge operations.
pub type Result<T> = std::result::Result<T, ConciergeError>;
