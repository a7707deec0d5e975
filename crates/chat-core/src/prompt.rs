//! Fixed prompts shared by every backend.

use crate::message::ChatMessage;

/// System prompt for summarizing a single exchange.
pub const SUMMARY_SYSTEM_PROMPT: &str = "You are a helpful assistant. Summarize the following \
conversation in a conversational tone, focusing on the key points discussed. Do not include \
phrases like 'Bot addresses' or 'User inquires.'";

/// Messages asking a model to summarize one user/bot exchange.
pub fn summary_messages(user_message: &str, bot_response: &str) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(SUMMARY_SYSTEM_PROMPT),
        ChatMessage::user(format!("User: {user_message}\nBot: {bot_response}")),
    ]
}
