//! Completion results.

use std::fmt;
use std::pin::Pin;

use futures::{Stream, StreamExt};

use crate::error::ChatError;

/// A stream of content deltas.
pub type ChatStream = Pin<Box<dyn Stream<Item = Result<String, ChatError>> + Send>>;

/// The reply to a completion request.
pub enum Completion {
    /// The whole reply at once.
    Text(String),
    /// Content deltas in arrival order.
    Stream(ChatStream),
}

impl Completion {
    /// Build a stream completion from already-known chunks.
    pub fn from_chunks<I>(chunks: I) -> Self
    where
        I: IntoIterator<Item = String>,
        I::IntoIter: Send + 'static,
    {
        let deltas = chunks.into_iter().map(Ok::<String, ChatError>);
        Completion::Stream(Box::pin(futures::stream::iter(deltas)))
    }

    /// Turn any completion into a delta stream.
    pub fn into_stream(self) -> ChatStream {
        match self {
            Completion::Text(text) => {
                Box::pin(futures::stream::once(async move { Ok::<_, ChatError>(text) }))
            }
            Completion::Stream(stream) => stream,
        }
    }

    /// Collect the whole reply, draining the stream if there is one.
    ///
    /// Stops at the first stream error.
    pub async fn into_text(self) -> Result<String, ChatError> {
        match self {
            Completion::Text(text) => Ok(text),
            Completion::Stream(mut stream) => {
                let mut text = String::new();
                while let Some(delta) = stream.next().await {
                    text.push_str(&delta?);
                }
                Ok(text)
            }
        }
    }
}

impl fmt::Debug for Completion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Completion::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Completion::Stream(_) => f.write_str("Stream(..)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_into_text_concatenates_deltas() {
        let completion = Completion::from_chunks(vec!["Hel".to_string(), "lo".to_string()]);
        assert_eq!(completion.into_text().await.unwrap(), "Hello");

        let completion = Completion::Text("whole".to_string());
        assert_eq!(completion.into_text().await.unwrap(), "whole");
    }

    #[tokio::test]
    async fn test_into_text_stops_on_error() {
        let stream = futures::stream::iter(vec![
            Ok("partial".to_string()),
            Err(ChatError::Network("reset".to_string())),
        ]);
        let completion = Completion::Stream(Box::pin(stream));

        assert!(matches!(
            completion.into_text().await,
            Err(ChatError::Network(_))
        ));
    }

    #[tokio::test]
    async fn test_text_into_stream_yields_once() {
        let chunks: Vec<_> = Completion::Text("one".to_string())
            .into_stream()
            .collect()
            .await;
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].as_deref().ok(), Some("one"));
    }
}
