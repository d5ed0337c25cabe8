//! Expertise relevance scoring
//!
//! A pure function from (topic, recent turn texts, expertise tags) to a
//! score. Higher means the persona has more to say about what is currently
//! on the table.

use crate::core::string::words;
use std::collections::BTreeSet;

/// Weight of a tag word that appears in the topic
pub const TOPIC_WEIGHT: u32 = 2;

/// Weight of a tag word that appears in the recent turns
pub const RECENT_WEIGHT: u32 = 1;

/// Shortest shared prefix that counts as the same word (`market`/`marketing`)
const MIN_STEM: usize = 4;

const STOPWORDS: &[&str] = &[
    "about", "after", "also", "and", "are", "but", "can", "could", "for", "from", "has", "have",
    "how", "into", "its", "more", "not", "our", "should", "than", "that", "the", "their", "them",
    "then", "there", "these", "they", "this", "was", "what", "when", "where", "which", "while",
    "who", "why", "will", "with", "would", "you", "your",
];

/// Content words of `text`: lowercased, at least three characters, no stopwords
pub fn keywords(text: &str) -> BTreeSet<String> {
    words(text)
        .filter(|w| w.chars().count() >= 3 && !STOPWORDS.contains(&w.as_str()))
        .collect()
}

fn same_word(a: &str, b: &str) -> bool {
    if a == b {
        return true;
    }
    let (short, long) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    short.chars().count() >= MIN_STEM && long.starts_with(short)
}

fn overlap(tag_words: &BTreeSet<String>, text_words: &BTreeSet<String>) -> u32 {
    tag_words
        .iter()
        .filter(|t| text_words.iter().any(|w| same_word(t, w)))
        .count() as u32
}

/// Score how relevant `expertise` is to the topic and the recent turns.
///
/// Each distinct tag word found in the topic adds [`TOPIC_WEIGHT`]; each
/// distinct tag word found anywhere in `recent_turns` adds
/// [`RECENT_WEIGHT`].
pub fn relevance_score(topic: &str, recent_turns: &[&str], expertise: &BTreeSet<String>) -> u32 {
    let tag_words: BTreeSet<String> = expertise.iter().flat_map(|t| keywords(t)).collect();
    if tag_words.is_empty() {
        return 0;
    }

    let topic_words = keywords(topic);
    let recent_words: BTreeSet<String> = recent_turns.iter().flat_map(|t| keywords(t)).collect();

    TOPIC_WEIGHT * overlap(&tag_words, &topic_words)
        + RECENT_WEIGHT * overlap(&tag_words, &recent_words)
}
