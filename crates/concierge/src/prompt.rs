//! Prompt assembly for one chat turn.

use chat_core::ChatMessage;
use database::{Conversation, Room};
use nlp::{Intent, Sentiment, ROOM_TYPE};

use crate::memory::MemoryContext;

/// Memory key for the user's preferred hotel chain.
pub const PREFERRED_HOTEL_CHAIN: &str = "preferred_hotel_chain";

/// How many earlier exchanges are replayed to the model.
pub const HISTORY_LIMIT: usize = 5;

/// Builds the message list sent to the chat backend.
///
/// ```rust
/// use concierge::PromptBuilder;
/// use nlp::Intent;
///
/// let messages = PromptBuilder::new("alice")
///     .intent(Intent::BookRoom)
///     .build("i want to book a suite");
///
/// assert_eq!(messages.len(), 2);
/// assert!(messages[0].content.contains("The user's name is alice."));
/// ```
#[derive(Debug, Clone)]
pub struct PromptBuilder<'a> {
    username: &'a str,
    memory: Option<&'a MemoryContext>,
    preferred_chain: Option<&'a str>,
    intent: Intent,
    sentiment: Sentiment,
    budget: Option<(f64, &'a [Room])>,
    history: &'a [Conversation],
}

impl<'a> PromptBuilder<'a> {
    pub fn new(username: &'a str) -> Self {
        Self {
            username,
            memory: None,
            preferred_chain: None,
            intent: Intent::GeneralInquiry,
            sentiment: Sentiment::Neutral,
            budget: None,
            history: &[],
        }
    }

    /// Facts remembered about the user.
    pub fn memory(mut self, memory: &'a MemoryContext) -> Self {
        self.memory = Some(memory);
        self
    }

    /// Chain stored on the user record, used when memory has none.
    pub fn preferred_chain(mut self, chain: Option<&'a str>) -> Self {
        self.preferred_chain = chain;
        self
    }

    pub fn intent(mut self, intent: Intent) -> Self {
        self.intent = intent;
        self
    }

    pub fn sentiment(mut self, sentiment: Sentiment) -> Self {
        self.sentiment = sentiment;
        self
    }

    /// The stated budget and the rooms that fit it.
    pub fn budget(mut self, budget: f64, rooms: &'a [Room]) -> Self {
        self.budget = Some((budget, rooms));
        self
    }

    /// Earlier exchanges, oldest first. Only the last [`HISTORY_LIMIT`] are used.
    pub fn history(mut self, history: &'a [Conversation]) -> Self {
        self.history = history;
        self
    }

    /// The system message text.
    pub fn system_message(&self) -> String {
        let mut system = format!(
            "You are a hotel reservation assistant. The user's name is {}.",
            self.username
        );

        let remembered = |key: &str| self.memory.and_then(|m| m.get(key)).map(String::as_str);

        if let Some(chain) = remembered(PREFERRED_HOTEL_CHAIN).or(self.preferred_chain) {
            system.push_str(&format!(" Their preferred hotel chain is {chain}."));
        }
        if let Some(room_type) = remembered(ROOM_TYPE) {
            system.push_str(&format!(" They prefer {room_type} rooms."));
        }

        match self.intent {
            Intent::BookRoom => system
                .push_str(" The user wants to book a room. Provide options and confirm details."),
            Intent::ModifyReservation => system.push_str(
                " The user wants to modify their reservation. Ask for the new details.",
            ),
            _ => {}
        }

        if let Some((budget, rooms)) = self.budget {
            if rooms.is_empty() {
                system.push_str(&format!(
                    " No rooms are available within the user's budget of ${budget:.2}."
                ));
            } else {
                let listed: Vec<String> = rooms
                    .iter()
                    .map(|room| format!("{} (${:.2}/night)", room.room_type, room.price_per_night))
                    .collect();
                system.push_str(&format!(
                    " Rooms within the user's budget of ${budget:.2}: {}.",
                    listed.join(", ")
                ));
            }
        }

        if self.sentiment == Sentiment::Negative {
            system.push_str(" The user seems unhappy, so respond with extra empathy.");
        }

        system
    }

    /// System message, replayed history, then the current input.
    ///
    /// History is replayed as all user turns followed by all assistant turns.
    pub fn build(&self, input: &str) -> Vec<ChatMessage> {
        let start = self.history.len().saturating_sub(HISTORY_LIMIT);
        let history = &self.history[start..];

        let mut messages = Vec::with_capacity(history.len() * 2 + 2);
        messages.push(ChatMessage::system(self.system_message()));
        messages.extend(history.iter().map(|c| ChatMessage::user(c.message.as_str())));
        messages.extend(
            history
                .iter()
                .map(|c| ChatMessage::assistant(c.response.as_str())),
        );
        messages.push(ChatMessage::user(input));
        messages
    }
}
