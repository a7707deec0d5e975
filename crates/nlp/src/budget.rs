//! Budget extraction.

use std::sync::LazyLock;

use regex::Regex;

static BUDGET_PATTERN: LazyLock<Option<Regex>> = LazyLock::new(|| {
    // Matches: $150, $99.50
    Regex::new(r"\$(\d+(?:\.\d+)?)").ok()
});

/// First dollar amount in the text, if any.
///
/// Works on raw input; [`crate::clean_text`] strips the `$` sign.
pub fn extract_budget(text: &str) -> Option<f64> {
    BUDGET_PATTERN
        .as_ref()?
        .captures(text)?
        .get(1)?
        .as_str()
        .parse()
        .ok()
}
