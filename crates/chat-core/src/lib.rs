//! Core trait and types for chat-completion backends.
//!
//! This crate provides the shared interface between the concierge pipeline
//! and whatever produces assistant replies. It defines:
//!
//! - [`ChatModel`] - The trait every backend implements
//! - [`ChatMessage`] - A role/content pair sent upstream
//! - [`Completion`] - A whole reply or a stream of content deltas
//! - [`ChatError`] - Error types for completion requests
//!
//! # Example
//!
//! ```rust
//! use chat_core::{async_trait, ChatError, ChatMessage, ChatModel, Completion};
//!
//! struct Parrot;
//!
//! #[async_trait]
//! impl ChatModel for Parrot {
//!     async fn complete(
//!         &self,
//!         messages: Vec<ChatMessage>,
//!         _stream: bool,
//!     ) -> Result<Completion, ChatError> {
//!         let last = messages.last().map(|m| m.content.clone()).unwrap_or_default();
//!         Ok(Completion::Text(last))
//!     }
//!
//!     fn name(&self) -> &str {
//!         "Parrot"
//!     }
//! }
//! ```

mod completion;
mod error;
mod message;
mod model;
pub mod prompt;

pub use completion::{ChatStream, Completion};
pub use error::ChatError;
pub use message::ChatMessage;
pub use model::ChatModel;

// Re-export async_trait for convenience
pub use async_trait::async_trait;
