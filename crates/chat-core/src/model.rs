//! The ChatModel trait definition.

use async_trait::async_trait;

use crate::completion::Completion;
use crate::error::ChatError;
use crate::message::ChatMessage;
use crate::prompt::summary_messages;

/// A backend that turns a message list into an assistant reply.
///
/// This trait is object-safe and can be used with `Arc<dyn ChatModel>`.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Request a completion.
    ///
    /// With `stream` set, backends that can stream return
    /// [`Completion::Stream`]; others may still answer with
    /// [`Completion::Text`].
    async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        stream: bool,
    ) -> Result<Completion, ChatError>;

    /// Summarize one user/bot exchange in a conversational tone.
    async fn summarize(&self, user_message: &str, bot_response: &str) -> Result<String, ChatError> {
        let summary = self
            .complete(summary_messages(user_message, bot_response), false)
            .await?
            .into_text()
            .await?;

        if summary.trim().is_empty() {
            return Err(ChatError::EmptyResponse);
        }

        Ok(summary)
    }

    /// Get a human-readable name for this backend.
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct Recorder {
        seen: Mutex<Vec<ChatMessage>>,
        reply: &'static str,
    }

    #[async_trait]
    impl ChatModel for Recorder {
        async fn complete(
            &self,
            messages: Vec<ChatMessage>,
            stream: bool,
        ) -> Result<Completion, ChatError> {
            assert!(!stream);
            self.seen.lock().unwrap().extend(messages);
            Ok(Completion::Text(self.reply.to_string()))
        }

        fn name(&self) -> &str {
            "Recorder"
        }
    }

    #[tokio::test]
    async fn test_default_summarize_sends_summary_prompt() {
        let model = Recorder {
            seen: Mutex::new(Vec::new()),
            reply: "booking a suite",
        };

        let summary = model.summarize("book a suite", "Sure").await.unwrap();
        assert_eq!(summary, "booking a suite");

        let seen = model.seen.lock().unwrap();
        assert_eq!(seen[0].role, "system");
        assert_eq!(seen[1].content, "User: book a suite\nBot: Sure");
    }

    #[tokio::test]
    async fn test_blank_summary_is_an_error() {
        let model = Recorder {
            seen: Mutex::new(Vec::new()),
            reply: "  ",
        };

        assert!(matches!(
            model.summarize("hi", "hello").await,
            Err(ChatError::EmptyResponse)
        ));
    }
}
