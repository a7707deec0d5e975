//! Regex entity extraction.

use std::sync::LazyLock;

use chrono::NaiveDate;
use indexmap::IndexMap;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::NlpError;

/// Key for the first date in a message.
pub const CHECK_IN_DATE: &str = "check_in_date";
/// Key for the second date in a message.
pub const CHECK_OUT_DATE: &str = "check_out_date";
/// Key for the room type.
pub const ROOM_TYPE: &str = "room_type";
/// Key for a capitalized place name.
pub const LOCATION: &str = "location";

/// Room-type vocabulary, checked in this order.
const ROOM_TYPES: [&str; 4] = ["single", "double", "suite", "deluxe"];

/// Capitalized words that open sentences rather than name places.
const LEADING_WORDS: &[&str] = &[
    "A", "An", "And", "Any", "Are", "Book", "But", "Can", "Cancel", "Change", "Check", "Could",
    "Dear", "Do", "Does", "Find", "Hello", "Hey", "Hi", "How", "In", "Is", "Looking", "Modify",
    "My", "Need", "No", "Ok", "Okay", "Our", "Please", "Reserve", "Show", "Thank", "Thanks",
    "The", "Then", "This", "We", "What", "When", "Where", "Will", "Would", "Yes",
];

static DATE_PATTERN: LazyLock<Option<Regex>> = LazyLock::new(|| {
    // Matches: 2024-01-05
    Regex::new(r"\d{4}-\d{2}-\d{2}").ok()
});

static LOCATION_PATTERN: LazyLock<Option<Regex>> = LazyLock::new(|| {
    // Matches: Paris, New York, San Francisco
    Regex::new(r"\b[A-Z][a-z]+(?:\s[A-Z][a-z]+)*\b").ok()
});

/// Entities pulled from one message, in extraction order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Entities(IndexMap<String, String>);

impl Entities {
    /// Empty set of entities.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a value, replacing any earlier one under the same key.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    /// Value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Whether `key` is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Number of entities.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether nothing was extracted.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate `(key, value)` pairs in extraction order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// The parsed check-in date, if present and valid.
    pub fn check_in_date(&self) -> Option<NaiveDate> {
        self.get(CHECK_IN_DATE).and_then(|d| parse_date(d).ok())
    }

    /// The parsed check-out date, if present and valid.
    pub fn check_out_date(&self) -> Option<NaiveDate> {
        self.get(CHECK_OUT_DATE).and_then(|d| parse_date(d).ok())
    }
}

/// Extract dates, room type and location.
///
/// - first `YYYY-MM-DD` → `check_in_date`, second → `check_out_date`
/// - first of `single`, `double`, `suite`, `deluxe` found anywhere in the
///   lowercased text → `room_type`
/// - first run of capitalized words, minus sentence openers such as "Book"
///   or "Hi" → `location`
///
/// Locations need the original capitalization, so pass raw input rather
/// than the output of [`crate::clean_text`].
pub fn extract_entities(text: &str) -> Entities {
    let mut entities = Entities::new();

    if let Some(pattern) = DATE_PATTERN.as_ref() {
        let mut dates = pattern.find_iter(text).map(|m| m.as_str());
        if let Some(check_in) = dates.next() {
            entities.insert(CHECK_IN_DATE, check_in);
            if let Some(check_out) = dates.next() {
                entities.insert(CHECK_OUT_DATE, check_out);
            }
        }
    }

    let lowered = text.to_lowercase();
    if let Some(room_type) = ROOM_TYPES.iter().find(|room| lowered.contains(**room)) {
        entities.insert(ROOM_TYPE, *room_type);
    }

    if let Some(location) = find_location(text) {
        entities.insert(LOCATION, location);
    }

    entities
}

fn find_location(text: &str) -> Option<String> {
    LOCATION_PATTERN
        .as_ref()?
        .find_iter(text)
        .find_map(|m| {
            let words: Vec<&str> = m
                .as_str()
                .split_whitespace()
                .skip_while(|word| LEADING_WORDS.contains(word))
                .collect();
            (!words.is_empty()).then(|| words.join(" "))
        })
}

/// Parse a `YYYY-MM-DD` date.
pub fn parse_date(value: &str) -> Result<NaiveDate, NlpError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| NlpError::InvalidDate(value.to_string()))
}
