//! The chat pipeline that ties language processing, memory and the model together.

use std::fmt;
use std::sync::Arc;

use chat_core::{ChatError, ChatMessage, ChatModel, ChatStream};
use chrono::{NaiveDateTime, NaiveTime};
use database::{conversation, room, Database, NewConversation, Room, User};
use futures::stream::{self, StreamExt};
use nlp::{
    analyze_sentiment, detect_intent, extract_budget, extract_entities, preprocess_input,
    Entities, Intent, Sentiment, SpellChecker, ROOM_TYPE,
};
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::memory::MemoryStore;
use crate::prompt::{PromptBuilder, HISTORY_LIMIT};
use crate::writer::ConversationWriter;

/// Everything derived from one user message before the model is called.
#[derive(Debug, Clone)]
pub struct PreparedTurn {
    /// Cleaned and spell-corrected input.
    pub input: String,
    pub intent: Intent,
    pub entities: Entities,
    pub sentiment: Sentiment,
    /// System prompt, replayed history and the current input.
    pub messages: Vec<ChatMessage>,
}

/// A streamed reply plus what was understood from the message.
pub struct ChatReply {
    pub intent: Intent,
    pub entities: Entities,
    pub sentiment: Sentiment,
    /// Content deltas. Once drained, the exchange is queued for saving.
    pub stream: ChatStream,
}

impl fmt::Debug for ChatReply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatReply")
            .field("intent", &self.intent)
            .field("entities", &self.entities)
            .field("sentiment", &self.sentiment)
            .finish_non_exhaustive()
    }
}

/// Hotel reservation assistant.
///
/// The concierge:
/// - Normalizes input and classifies intent, entities and sentiment
/// - Remembers booking details per user
/// - Builds a prompt from memory, budget and recent history
/// - Streams the model's reply and logs the exchange in the background
pub struct Concierge {
    database: Database,
    model: Arc<dyn ChatModel>,
    spelling: Arc<SpellChecker>,
    memory: MemoryStore,
    writer: ConversationWriter,
}

impl Concierge {
    pub fn new(
        database: Database,
        model: Arc<dyn ChatModel>,
        spelling: Arc<SpellChecker>,
        writer: ConversationWriter,
    ) -> Self {
        info!(model = model.name(), "Concierge ready");
        Self {
            memory: MemoryStore::new(database.clone()),
            database,
            model,
            spelling,
            writer,
        }
    }

    pub fn memory(&self) -> &MemoryStore {
        &self.memory
    }

    pub fn writer(&self) -> &ConversationWriter {
        &self.writer
    }

    /// Analyze a message, update memory and assemble the prompt.
    pub async fn prepare_turn(&self, user: &User, raw_message: &str) -> Result<PreparedTurn> {
        let input = preprocess_input(raw_message, &self.spelling);
        let intent = detect_intent(&input);
        let sentiment = analyze_sentiment(&input);

        // Dates and places need the raw text; room types may only appear
        // after spelling correction.
        let mut entities = extract_entities(raw_message);
        if !entities.contains_key(ROOM_TYPE) {
            if let Some(room_type) = extract_entities(&input).get(ROOM_TYPE) {
                entities.insert(ROOM_TYPE, room_type);
            }
        }

        debug!(
            user_id = user.id,
            %intent,
            ?sentiment,
            entities = entities.len(),
            "Analyzed message"
        );

        if intent.updates_memory() {
            self.memory.remember(user.id, &entities).await?;
        }
        let memory = self.memory.recall(user.id).await?;

        let budget = extract_budget(raw_message);
        let budget_rooms: Vec<Room> = match budget {
            Some(budget) => room::list_rooms_within_budget(self.database.pool(), budget).await?,
            None => Vec::new(),
        };

        let history =
            conversation::recent_for_user(self.database.pool(), user.id, HISTORY_LIMIT as i64)
                .await?;

        let mut prompt = PromptBuilder::new(&user.username)
            .memory(&memory)
            .preferred_chain(user.preferred_hotel_chain.as_deref())
            .intent(intent)
            .sentiment(sentiment)
            .history(&history);
        if let Some(budget) = budget {
            prompt = prompt.budget(budget, &budget_rooms);
        }
        let messages = prompt.build(&input);

        Ok(PreparedTurn {
            input,
            intent,
            entities,
            sentiment,
            messages,
        })
    }

    /// Run one chat turn, streaming the reply.
    ///
    /// The exchange is queued for saving once the stream is drained. A
    /// stream that ends in an error is not saved.
    pub async fn chat(&self, user: &User, raw_message: &str) -> Result<ChatReply> {
        let turn = self.prepare_turn(user, raw_message).await?;
        let completion = self.model.complete(turn.messages, true).await?;

        let pending = NewConversation {
            user_id: user.id,
            message: turn.input,
            response: String::new(),
            follow_up_date: follow_up_date(turn.intent, &turn.entities),
        };

        Ok(ChatReply {
            intent: turn.intent,
            entities: turn.entities,
            sentiment: turn.sentiment,
            stream: record_on_completion(completion.into_stream(), pending, self.writer.clone()),
        })
    }

    /// Welcome text for the dashboard, summarizing the last exchange.
    pub async fn greeting(&self, user: &User) -> Result<String> {
        let welcome = format!("Hi {}! Welcome back!", user.username);

        let Some(last) = conversation::latest_for_user(self.database.pool(), user.id).await? else {
            return Ok(format!(
                "{welcome} How can I assist you with your hotel reservation today?"
            ));
        };

        let summary = match self.model.summarize(&last.message, &last.response).await {
            Ok(summary) => summary.trim().to_string(),
            Err(e) => {
                warn!(user_id = user.id, error = %e, "Summary failed, using last message");
                format!("your last message: '{}'", last.message)
            }
        };

        Ok(format!(
            "{welcome} Last time, we talked about {summary}. How can I assist you today?"
        ))
    }
}

/// Booked stays get a follow-up the day before check-in.
pub fn follow_up_date(intent: Intent, entities: &Entities) -> Option<NaiveDateTime> {
    if intent != Intent::BookRoom {
        return None;
    }
    let day_before = entities.check_in_date()?.pred_opt()?;
    Some(day_before.and_time(NaiveTime::MIN))
}

struct Recording {
    inner: ChatStream,
    reply: String,
    pending: Option<NewConversation>,
    writer: ConversationWriter,
}

/// Pass deltas through, queueing the full exchange when the stream ends.
fn record_on_completion(
    inner: ChatStream,
    pending: NewConversation,
    writer: ConversationWriter,
) -> ChatStream {
    let state = Recording {
        inner,
        reply: String::new(),
        pending: Some(pending),
        writer,
    };

    let deltas = stream::unfold(state, |mut state| async move {
        // Nothing pending means the stream already ended or failed.
        state.pending.as_ref()?;

        match state.inner.next().await {
            Some(Ok(delta)) => {
                state.reply.push_str(&delta);
                Some((Ok(delta), state))
            }
            Some(Err(e)) => {
                warn!(error = %e, "Reply stream failed, exchange not saved");
                state.pending = None;
                Some((Err::<String, ChatError>(e), state))
            }
            None => {
                if let Some(mut row) = state.pending.take() {
                    row.response = state.reply.trim().to_string();
                    state.writer.try_enqueue(row);
                }
                None
            }
        }
    });

    Box::pin(deltas)
}
