//! Chat pipeline for the Concierge hotel assistant.
//!
//! This crate provides the [`Concierge`] type which turns a guest's message
//! into a streamed assistant reply, along with the background pieces that
//! outlive a single request.
//!
//! # Features
//!
//! - Normalizes input and detects intent, entities, sentiment and budget
//! - Remembers booking details per guest ([`MemoryStore`])
//! - Builds prompts from memory, budget-matching rooms and recent history
//! - Logs each exchange through a bounded background queue ([`ConversationWriter`])
//! - Sends check-in messages before booked stays ([`FollowUpScheduler`])
//!
//! # Architecture
//!
//! ```text
//! Guest message (from the web crate)
//!          ↓
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        CONCIERGE                            │
//! │                                                             │
//! │  1. Clean + spell-correct input                             │
//! │         ↓                                                   │
//! │  2. Intent, entities, sentiment, budget                     │
//! │         ↓                                                   │
//! │  3. Update memory (book / modify turns), then recall it     │
//! │         ↓                                                   │
//! │  4. System prompt + last 5 exchanges + input                │
//! │         ↓                                                   │
//! │  5. Stream the model reply to the caller                    │
//! │         ↓                                                   │
//! │  6. Queue the finished exchange for the ConversationWriter  │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//!
//! use concierge::{Concierge, ConversationWriter};
//! use futures::StreamExt;
//! use mock_llm::EchoModel;
//! use nlp::SpellChecker;
//!
//! let writer = ConversationWriter::start(db.clone(), 64);
//! let concierge = Concierge::new(
//!     db.clone(),
//!     Arc::new(EchoModel::new()),
//!     Arc::new(SpellChecker::bundled()),
//!     writer.clone(),
//! );
//!
//! let mut reply = concierge.chat(&user, "Book a suite from 2024-01-01 to 2024-01-05").await?;
//! while let Some(delta) = reply.stream.next().await {
//!     print!("{}", delta?);
//! }
//! writer.shutdown().await;
//! ```

mod concierge;
mod error;
mod follow_up;
mod memory;
mod notifier;
mod prompt;
mod writer;

#[cfg(test)]
mod test_support;

pub use concierge::{follow_up_date, ChatReply, Concierge, PreparedTurn};
pub use error::{ConciergeError, Result};
pub use follow_up::{
    follow_up_message, FollowUpHandle, FollowUpRun, FollowUpScheduler,
    DEFAULT_FOLLOW_UP_INTERVAL,
};
pub use memory::{MemoryContext, MemoryStore};
pub use notifier::{FollowUpNotifier, LoggingNotifier};
pub use prompt::{PromptBuilder, HISTORY_LIMIT, PREFERRED_HOTEL_CHAIN};
pub use writer::{ConversationWriter, DEFAULT_QUEUE_CAPACITY};
