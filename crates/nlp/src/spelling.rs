//! Dictionary-based spelling correction.
//!
//! Dictionaries use the common frequency-list format: one `term count` pair
//! per line. The bundled list is a general English lexicon (about 147k
//! terms, inflections and place names included) with counts weighted
//! towards hotel vocabulary. Unknown words are replaced by the closest
//! dictionary term within a small edit distance.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, LazyLock};

use tracing::info;

use crate::error::NlpError;

const BUNDLED_DICTIONARY: &str = include_str!("../data/frequency_dictionary_en.txt");

static BUNDLED: LazyLock<Arc<Lexicon>> =
    LazyLock::new(|| Arc::new(Lexicon::parse(BUNDLED_DICTIONARY)));

/// Words shorter than this are never corrected.
const MIN_CORRECTABLE_LEN: usize = 3;

/// Terms with their counts, plus the same terms bucketed by character length.
#[derive(Debug, Default)]
struct Lexicon {
    counts: HashMap<String, u64>,
    by_len: Vec<Vec<(String, u64)>>,
}

impl Lexicon {
    /// Parse `term count` lines; malformed lines are skipped and terms lowercased.
    fn parse(contents: &str) -> Self {
        let mut counts: HashMap<String, u64> = HashMap::new();
        for line in contents.lines() {
            let mut parts = line.split_whitespace();
            let (Some(term), Some(count)) = (parts.next(), parts.next()) else {
                continue;
            };
            let Ok(count) = count.parse::<u64>() else {
                continue;
            };
            let entry = counts.entry(term.to_lowercase()).or_insert(0);
            *entry = (*entry).max(count);
        }

        let mut by_len: Vec<Vec<(String, u64)>> = Vec::new();
        for (term, &count) in &counts {
            let len = term.chars().count();
            if by_len.len() <= len {
                by_len.resize_with(len + 1, Vec::new);
            }
            by_len[len].push((term.clone(), count));
        }

        Self { counts, by_len }
    }
}

/// Word-by-word spelling corrector.
///
/// Cloning is cheap; clones share the parsed dictionary.
#[derive(Debug, Clone)]
pub struct SpellChecker {
    lexicon: Arc<Lexicon>,
}

impl SpellChecker {
    /// Checker backed by the bundled English dictionary.
    ///
    /// The dictionary is parsed once per process.
    pub fn bundled() -> Self {
        Self {
            lexicon: Arc::clone(&BUNDLED),
        }
    }

    /// Load a frequency dictionary from disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, NlpError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let checker = Self::from_frequency_list(&contents)?;
        info!(
            path = %path.display(),
            terms = checker.len(),
            "Loaded spelling dictionary"
        );
        Ok(checker)
    }

    /// Build a checker from `term count` lines.
    pub fn from_frequency_list(contents: &str) -> Result<Self, NlpError> {
        let lexicon = Lexicon::parse(contents);
        if lexicon.counts.is_empty() {
            return Err(NlpError::EmptyDictionary);
        }
        Ok(Self {
            lexicon: Arc::new(lexicon),
        })
    }

    /// Number of dictionary terms.
    pub fn len(&self) -> usize {
        self.lexicon.counts.len()
    }

    /// Whether the dictionary is empty.
    pub fn is_empty(&self) -> bool {
        self.lexicon.counts.is_empty()
    }

    /// Whether `word` is a dictionary term.
    pub fn contains(&self, word: &str) -> bool {
        self.lexicon.counts.contains_key(word)
    }

    /// Correct every whitespace-separated token of already-cleaned text.
    pub fn correct(&self, text: &str) -> String {
        text.split_whitespace()
            .map(|token| self.correct_word(token))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Correct a single token, returning it unchanged when no candidate fits.
    pub fn correct_word(&self, word: &str) -> String {
        let len = word.chars().count();
        if len < MIN_CORRECTABLE_LEN
            || word.chars().any(|c| c.is_ascii_digit())
            || self.contains(word)
        {
            return word.to_string();
        }

        self.suggest(word)
            .map(str::to_string)
            .unwrap_or_else(|| word.to_string())
    }

    /// Closest dictionary term within the allowed distance for `word`.
    ///
    /// Ties go to the more frequent term, then to the lexicographically
    /// smaller one.
    pub fn suggest(&self, word: &str) -> Option<&str> {
        let chars: Vec<char> = word.chars().collect();
        let max_distance = max_distance_for(chars.len());
        let shortest = chars.len().saturating_sub(max_distance);
        let longest = chars.len() + max_distance;

        let mut best: Option<(usize, u64, &str)> = None;
        let buckets = self
            .lexicon
            .by_len
            .iter()
            .enumerate()
            .filter(|(len, _)| (shortest..=longest).contains(len));

        for (_, bucket) in buckets {
            for (term, count) in bucket {
                let term_chars: Vec<char> = term.chars().collect();
                let Some(distance) = bounded_distance(&chars, &term_chars, max_distance) else {
                    continue;
                };

                let better = match best {
                    None => true,
                    Some((best_distance, best_count, best_term)) => {
                        (distance, std::cmp::Reverse(*count), term.as_str())
                            < (best_distance, std::cmp::Reverse(best_count), best_term)
                    }
                };
                if better {
                    best = Some((distance, *count, term.as_str()));
                }
            }
        }

        best.map(|(_, _, term)| term)
    }
}

impl Default for SpellChecker {
    fn default() -> Self {
        Self::bundled()
    }
}

/// Largest edit distance tried for a word of `len` characters.
fn max_distance_for(len: usize) -> usize {
    match len {
        0..=2 => 0,
        3..=4 => 1,
        _ => 2,
    }
}

/// Damerau-Levenshtein distance (optimal string alignment variant), or
/// `None` once it is certain to exceed `max`.
fn bounded_distance(a: &[char], b: &[char], max: usize) -> Option<usize> {
    if a.len().abs_diff(b.len()) > max {
        return None;
    }

    let m = b.len();
    let mut before_prev: Vec<usize> = vec![0; m + 1];
    let mut prev: Vec<usize> = (0..=m).collect();
    let mut current: Vec<usize> = vec![0; m + 1];

    for i in 1..=a.len() {
        current[0] = i;
        let mut row_min = current[0];
        for j in 1..=m {
            let cost = usize::from(a[i - 1] != b[j - 1]);
            let mut best = (prev[j] + 1)
                .min(current[j - 1] + 1)
                .min(prev[j - 1] + cost);
            if i > 1 && j > 1 && a[i - 1] == b[j - 2] && a[i - 2] == b[j - 1] {
                best = best.min(before_prev[j - 2] + 1);
            }
            current[j] = best;
            row_min = row_min.min(best);
        }
        if row_min > max {
            return None;
        }
        std::mem::swap(&mut before_prev, &mut prev);
        std::mem::swap(&mut prev, &mut current);
    }

    Some(prev[m]).filter(|&distance| distance <= max)
}
