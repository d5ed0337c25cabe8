//! String utilities for the domain layer.

/// Truncate a string to at most `max_chars` characters, appending `...`
/// when anything was cut.
///
/// Counts characters rather than bytes so multibyte text is never split.
pub fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let keep = max_chars.saturating_sub(3);
    let mut out: String = s.chars().take(keep).collect();
    out.push_str("...");
    out
}

/// Lowercased alphanumeric words of `text`, in order of appearance.
pub fn words(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(|w| w.to_lowercase())
}
