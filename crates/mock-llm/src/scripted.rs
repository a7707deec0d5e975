//! Scripted model implementation - fixed replies and request recording.

use std::sync::Mutex;

use async_trait::async_trait;
use chat_core::prompt::summary_messages;
use chat_core::{ChatError, ChatMessage, ChatModel, Completion};

/// A model that always gives the same reply and remembers what it was sent.
///
/// Streamed replies are split into chunks of `chunk_size` characters.
#[derive(Debug)]
pub struct ScriptedModel {
    reply: String,
    summary: Option<String>,
    chunk_size: usize,
    failure: Option<ChatError>,
    requests: Mutex<Vec<Vec<ChatMessage>>>,
}

impl ScriptedModel {
    /// Create a model that always answers `reply`.
    pub fn new(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
            summary: None,
            chunk_size: 8,
            failure: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Create a model whose every request fails with `error`.
    pub fn failing(error: ChatError) -> Self {
        Self {
            failure: Some(error),
            ..Self::new("")
        }
    }

    /// Answer summary requests with `summary` instead of the reply.
    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    /// Set how many characters each streamed chunk carries.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Every message list received so far, oldest first.
    pub fn requests(&self) -> Vec<Vec<ChatMessage>> {
        self.lock_requests().clone()
    }

    /// The most recent message list, if any.
    pub fn last_request(&self) -> Option<Vec<ChatMessage>> {
        self.lock_requests().last().cloned()
    }

    fn record(&self, messages: Vec<ChatMessage>) -> Result<(), ChatError> {
        self.lock_requests().push(messages);
        match &self.failure {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }

    fn lock_requests(&self) -> std::sync::MutexGuard<'_, Vec<Vec<ChatMessage>>> {
        // A poisoned lock only means another test thread panicked mid-push.
        self.requests
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn chunks(&self) -> Vec<String> {
        let chars: Vec<char> = self.reply.chars().collect();
        chars
            .chunks(self.chunk_size)
            .map(|chunk| chunk.iter().collect())
            .collect()
    }
}

#[async_trait]
impl ChatModel for ScriptedModel {
    async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        stream: bool,
    ) -> Result<Completion, ChatError> {
        self.record(messages)?;

        if stream {
            return Ok(Completion::from_chunks(self.chunks()));
        }

        Ok(Completion::Text(self.reply.clone()))
    }

    async fn summarize(&self, user_message: &str, bot_response: &str) -> Result<String, ChatError> {
        self.record(summary_messages(user_message, bot_response))?;
        Ok(self.summary.clone().unwrap_or_else(|| self.reply.clone()))
    }

    fn name(&self) -> &str {
        "ScriptedModel"
    }
}
