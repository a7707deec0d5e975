//! Text normalization.

/// Lowercase, strip punctuation and collapse whitespace.
///
/// Keeps ASCII letters, digits and whitespace. A hyphen survives only between
/// two digits so ISO dates such as `2024-01-05` stay intact.
pub fn clean_text(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut kept = String::with_capacity(text.len());

    for (i, &c) in chars.iter().enumerate() {
        let keep = if c == '-' {
            let before = i.checked_sub(1).and_then(|j| chars.get(j));
            let after = chars.get(i + 1);
            matches!((before, after), (Some(b), Some(a)) if b.is_ascii_digit() && a.is_ascii_digit())
        } else {
            c.is_ascii_alphanumeric() || c.is_whitespace()
        };

        if keep {
            kept.push(c.to_ascii_lowercase());
        }
    }

    kept.split_whitespace().collect::<Vec<_>>().join(" ")
}
