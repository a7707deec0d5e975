//! Error types for chat completions.

use thiserror::Error;

/// Errors that can occur while talking to a chat backend.
#[derive(Debug, Clone, Error)]
pub enum ChatError {
    /// The backend is missing required configuration.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The request never got a response.
    #[error("network error: {0}")]
    Network(String),

    /// The upstream API answered with a non-success status.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The response body could not be decoded.
    #[error("failed to parse response: {0}")]
    Parse(String),

    /// The response carried no content.
    #[error("empty response")]
    EmptyResponse,
}
