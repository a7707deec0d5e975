//! Lightweight language processing for hotel chat messages.
//!
//! Everything here is deterministic: keyword substring tests for intent,
//! regular expressions for entities, and a frequency dictionary for spelling
//! correction.
//!
//! # Example
//!
//! ```rust
//! use nlp::{detect_intent, extract_entities, preprocess_input, Intent, SpellChecker};
//!
//! let checker = SpellChecker::bundled();
//! let raw = "I want to book a suite from 2024-01-01 to 2024-01-05!";
//!
//! let input = preprocess_input(raw, &checker);
//! assert_eq!(detect_intent(&input), Intent::BookRoom);
//!
//! let entities = extract_entities(raw);
//! assert_eq!(entities.get("room_type"), Some("suite"));
//! assert_eq!(entities.get("check_in_date"), Some("2024-01-01"));
//! ```

mod budget;
mod entities;
mod error;
mod intent;
mod sentiment;
mod spelling;
mod text;

pub use budget::extract_budget;
pub use entities::{
    extract_entities, parse_date, Entities, CHECK_IN_DATE, CHECK_OUT_DATE, LOCATION, ROOM_TYPE,
};
pub use error::NlpError;
pub use intent::{detect_intent, Intent};
pub use sentiment::{analyze_sentiment, Sentiment};
pub use spelling::SpellChecker;
pub use text::clean_text;

/// Normalize raw user input: [`clean_text`] followed by spelling correction.
pub fn preprocess_input(text: &str, checker: &SpellChecker) -> String {
    checker.correct(&clean_text(text))
}
