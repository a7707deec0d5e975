//! Echo model implementation - replies with the last user message.

use async_trait::async_trait;
use chat_core::{ChatError, ChatMessage, ChatModel, Completion};

/// A simple model that echoes the most recent user message.
///
/// Useful for testing the chat flow without any upstream API.
#[derive(Debug, Clone, Default)]
pub struct EchoModel {
    /// Optional prefix to add before the echo.
    prefix: Option<String>,
}

impl EchoModel {
    /// Create a new EchoModel with no prefix.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new EchoModel with a custom prefix.
    ///
    /// # Example
    ///
    /// ```rust
    /// use mock_llm::EchoModel;
    ///
    /// let model = EchoModel::with_prefix("Echo: ");
    /// // Will respond with "Echo: <last user message>"
    /// ```
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: Some(prefix.into()),
        }
    }
}

#[async_trait]
impl ChatModel for EchoModel {
    async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        stream: bool,
    ) -> Result<Completion, ChatError> {
        let last = messages
            .iter()
            .rev()
            .find(|m| m.role == "user")
            .map(|m| m.content.as_str())
            .unwrap_or_default();

        let reply = match &self.prefix {
            Some(prefix) => format!("{}{}", prefix, last),
            None => last.to_string(),
        };

        if stream {
            // One delta per word, keeping the separating spaces.
            let deltas: Vec<String> = reply.split_inclusive(' ').map(str::to_string).collect();
            return Ok(Completion::from_chunks(deltas));
        }

        Ok(Completion::Text(reply))
    }

    fn name(&self) -> &str {
        "EchoModel"
    }
}
