//! Server-sent events handling for streamed completions.
//!
//! The upstream body is a series of `data: {json}` events ending with
//! `data: [DONE]`. Event framing and UTF-8 decoding across network chunks
//! are left to `eventsource-stream`; this module maps events to content
//! deltas.

use bytes::Bytes;
use chat_core::{ChatError, ChatStream};
use eventsource_stream::Eventsource;
use futures::future;
use futures::stream::{Stream, StreamExt};
use tracing::warn;

use crate::api_types::ChatCompletionChunk;

/// Payload of the final event.
pub const DONE: &str = "[DONE]";

/// Decode one `data:` payload into its content delta.
///
/// Payloads that are not chunk JSON are skipped with a warning.
pub fn parse_delta(payload: &str) -> Option<String> {
    match serde_json::from_str::<ChatCompletionChunk>(payload) {
        Ok(chunk) => chunk.content(),
        Err(e) => {
            warn!(error = %e, "Skipping undecodable stream payload");
            None
        }
    }
}

/// Turn a raw response body into a stream of content deltas.
///
/// Ends at `[DONE]`, at the end of the body, or right after the first
/// transport or decoding error.
pub fn content_stream<S>(bytes: S) -> ChatStream
where
    S: Stream<Item = Result<Bytes, reqwest::Error>> + Send + 'static,
{
    let deltas = bytes
        .eventsource()
        .take_while(|event| {
            future::ready(!matches!(event, Ok(event) if event.data.trim() == DONE))
        })
        .filter_map(|event| {
            future::ready(match event {
                Ok(event) => parse_delta(&event.data).map(Ok),
                Err(e) => Some(Err(ChatError::Network(format!("stream interrupted: {e}")))),
            })
        })
        .scan(false, |failed, item| {
            if *failed {
                return future::ready(None);
            }
            *failed = item.is_err();
            future::ready(Some(item))
        });

    Box::pin(deltas)
}
