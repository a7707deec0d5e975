//! Keyword intent classification.

use std::fmt;

use serde::{Deserialize, Serialize};

/// What the user is trying to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    BookRoom,
    CancelReservation,
    ModifyReservation,
    CheckAvailability,
    GeneralInquiry,
}

impl Intent {
    /// Every intent, in classification precedence order.
    pub const ALL: [Intent; 5] = [
        Intent::BookRoom,
        Intent::CancelReservation,
        Intent::ModifyReservation,
        Intent::CheckAvailability,
        Intent::GeneralInquiry,
    ];

    /// Wire name, e.g. `book_room`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::BookRoom => "book_room",
            Intent::CancelReservation => "cancel_reservation",
            Intent::ModifyReservation => "modify_reservation",
            Intent::CheckAvailability => "check_availability",
            Intent::GeneralInquiry => "general_inquiry",
        }
    }

    /// Keywords whose presence selects this intent.
    fn keywords(&self) -> &'static [&'static str] {
        match self {
            Intent::BookRoom => &["book", "reserve"],
            Intent::CancelReservation => &["cancel"],
            Intent::ModifyReservation => &["modify", "change"],
            Intent::CheckAvailability => &["availability", "check"],
            Intent::GeneralInquiry => &[],
        }
    }

    /// Whether turns with this intent update the user's memory.
    pub fn updates_memory(&self) -> bool {
        matches!(self, Intent::BookRoom | Intent::ModifyReservation)
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify normalized text by substring tests.
///
/// The first intent in [`Intent::ALL`] with a matching keyword wins, so
/// "book" beats "cancel" when both appear. Text with no keyword is a
/// general inquiry.
pub fn detect_intent(text: &str) -> Intent {
    Intent::ALL
        .into_iter()
        .find(|intent| intent.keywords().iter().any(|kw| text.contains(kw)))
        .unwrap_or(Intent::GeneralInquiry)
}
