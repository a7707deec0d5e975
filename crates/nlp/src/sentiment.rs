//! Keyword sentiment.

use serde::{Deserialize, Serialize};

/// Coarse mood of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

/// Negative keywords win over positive ones.
pub fn analyze_sentiment(text: &str) -> Sentiment {
    if ["sad", "disappointed"].iter().any(|kw| text.contains(kw)) {
        Sentiment::Negative
    } else if ["happy", "excited"].iter().any(|kw| text.contains(kw)) {
        Sentiment::Positive
    } else {
        Sentiment::Neutral
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentiment() {
        assert_eq!(analyze_sentiment("i am so happy"), Sentiment::Positive);
        assert_eq!(analyze_sentiment("really excited for the trip"), Sentiment::Positive);
        assert_eq!(analyze_sentiment("disappointed with the room"), Sentiment::Negative);
        assert_eq!(analyze_sentiment("happy but sad"), Sentiment::Negative);
        assert_eq!(analyze_sentiment("book a room"), Sentiment::Neutral);
    }
}
