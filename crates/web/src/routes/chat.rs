//! Streaming chat endpoint.

use std::convert::Infallible;

use axum::extract::State;
use axum::http::{HeaderName, HeaderValue};
use axum::response::sse::{Event, Sse};
use axum::response::{IntoResponse, Response};
use axum::Json;
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Result, WebError};
use crate::session::MaybeSession;
use crate::state::AppState;

/// Detected intent of the message, e.g. `book_room`.
pub const INTENT_HEADER: HeaderName = HeaderName::from_static("x-intent");
/// Extracted entities as a JSON object.
pub const ENTITIES_HEADER: HeaderName = HeaderName::from_static("x-entities");

/// Shown to the guest when the reply stream breaks off.
const STREAM_FAILED: &str = "An error occurred while processing the chat.";

/// Chat message from the browser.
#[derive(Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

/// Payload of one `data:` event.
#[derive(Serialize)]
#[serde(rename_all = "lowercase")]
enum ChatEvent<'a> {
    Content(&'a str),
    Error(&'a str),
}

impl ChatEvent<'_> {
    fn into_event(self) -> Event {
        let event = match self {
            ChatEvent::Content(_) => Event::default(),
            ChatEvent::Error(_) => Event::default().event("error"),
        };
        event.json_data(&self).unwrap_or_else(|e| {
            warn!(error = %e, "Failed to encode chat event");
            Event::default().event("error")
        })
    }
}

/// Stream the assistant's reply as server-sent events.
///
/// Each content delta is one `data: {"content": "..."}` event, so newlines
/// inside a delta travel JSON-escaped. The stream ends with `data: [DONE]`.
/// A backend failure mid-reply is reported as an `error` event carrying
/// `{"error": "..."}` before the terminator.
pub async fn chat(
    State(state): State<AppState>,
    session: MaybeSession,
    Json(req): Json<ChatRequest>,
) -> Result<Response> {
    let session = session.require("You must be logged in to chat")?;

    if req.message.trim().is_empty() {
        return Err(WebError::BadRequest("Message cannot be empty".to_string()));
    }

    let guest = database::user::get_user(state.db.pool(), session.user_id).await?;
    let reply = state.concierge.chat(&guest, &req.message).await?;
    debug!(user_id = guest.id, intent = %reply.intent, "Streaming reply");

    let events = reply
        .stream
        .map(|delta| {
            let event = match delta {
                Ok(text) => ChatEvent::Content(&text).into_event(),
                Err(e) => {
                    warn!(error = %e, "Reply stream failed");
                    ChatEvent::Error(STREAM_FAILED).into_event()
                }
            };
            Ok::<_, Infallible>(event)
        })
        .chain(stream::once(async {
            Ok::<_, Infallible>(Event::default().data("[DONE]"))
        }));

    let mut response = Sse::new(events).into_response();
    let headers = response.headers_mut();
    headers.insert(INTENT_HEADER, HeaderValue::from_static(reply.intent.as_str()));
    // Entity values come from user text and may not be valid header bytes.
    if let Some(entities) = serde_json::to_string(&reply.entities)
        .ok()
        .and_then(|json| HeaderValue::from_str(&json).ok())
    {
        headers.insert(ENTITIES_HEADER, entities);
    }

    Ok(response)
}
