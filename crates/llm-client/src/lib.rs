//! OpenAI-compatible chat-completions client.
//!
//! This crate provides a [`ChatModel`] implementation that talks to any
//! `/chat/completions` endpoint speaking the OpenAI wire format, such as the
//! Llama API.
//!
//! # Features
//!
//! - Non-streaming completions read from `choices[0].message.content`
//! - Streaming completions parsed from server-sent events
//! - Configurable via environment variables
//!
//! # Usage
//!
//! ```rust,no_run
//! use llm_client::{ChatMessage, ChatModel, LlmClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = LlmClient::from_env()?;
//!     let reply = client
//!         .complete(vec![ChatMessage::user("Do you have a suite free?")], false)
//!         .await?
//!         .into_text()
//!         .await?;
//!     println!("{reply}");
//!     Ok(())
//! }
//! ```

mod api_types;
mod client;
mod config;
pub mod sse;

pub use client::LlmClient;
pub use config::{LlmConfig, LlmConfigBuilder};

// Re-export chat-core types for convenience
pub use chat_core::{async_trait, ChatError, ChatMessage, ChatModel, ChatStream, Completion};
