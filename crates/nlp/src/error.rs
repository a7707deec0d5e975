//! Error types for the language pipeline.

use thiserror::Error;

/// Errors raised by parsing helpers and dictionary loading.
#[derive(Debug, Error)]
pub enum NlpError {
    /// A date was not in `YYYY-MM-DD` form.
    #[error("invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),

    /// The spelling dictionary could not be read.
    #[error("failed to read dictionary: {0}")]
    DictionaryIo(#[from] std::io::Error),

    /// The spelling dictionary had no usable entries.
    #[error("dictionary contains no entries")]
    EmptyDictionary,
}
