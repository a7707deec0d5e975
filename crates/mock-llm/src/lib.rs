//! Mock chat backends for the Concierge pipeline.
//!
//! This crate provides mock implementations of the `ChatModel` trait for testing:
//! - `EchoModel` - Replies with the last user message
//! - `ScriptedModel` - Replies with fixed text, records every request
//!
//! For production use the `llm-client` crate instead.
//!
//! # Example
//!
//! ```rust
//! use mock_llm::{ChatMessage, ChatModel, ScriptedModel};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), mock_llm::ChatError> {
//!     let model = ScriptedModel::new("We have a suite available.");
//!
//!     let reply = model
//!         .complete(vec![ChatMessage::user("Any suites?")], true)
//!         .await?
//!         .into_text()
//!         .await?;
//!     assert_eq!(reply, "We have a suite available.");
//!     assert_eq!(model.requests().len(), 1);
//!     Ok(())
//! }
//! ```

mod echo;
mod scripted;

// Re-export chat-core types for convenience
pub use chat_core::{async_trait, ChatError, ChatMessage, ChatModel, Completion};

pub use echo::EchoModel;
pub use scripted::ScriptedModel;
