//! Deterministic offline summarizer used when no provider is usable

use std::sync::LazyLock;

use regex::Regex;

use crate::validation::Style;

/// Returned for any style when the text has no sentences
pub const NO_SENTENCES: &str = "[STUB] (no usable sentences found in text)";

const BRIEF_SENTENCES: usize = 2;
const DETAILED_SENTENCES: usize = 4;
const DETAILED_MAX_WORDS: usize = 120;
const BULLET_SOURCE_SENTENCES: usize = 10;
const MAX_BULLETS: usize = 5;
const BULLET_WORDS: usize = 12;

static SENTENCE_END: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[.!?]\s+").expect("valid sentence regex"));

/// Split on `.`, `!` or `?` followed by whitespace; the punctuation stays with its sentence
pub fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;

    for m in SENTENCE_END.find_iter(text) {
        // The terminator is a single ASCII byte
        sentences.push(&text[start..m.start() + 1]);
        start = m.end();
    }
    sentences.push(&text[start..]);

    sentences
        .into_iter()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

/// First `limit` words joined by single spaces, with "..." when words were dropped
fn truncate_words(text: &str, limit: usize) -> String {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.len() > limit {
        format!("{}...", words[..limit].join(" "))
    } else {
        words.join(" ")
    }
}

/// Summarize without a model
pub fn stub_summary(text: &str, style: Style) -> String {
    let sentences = split_sentences(text);
    if sentences.is_empty() {
        return NO_SENTENCES.to_string();
    }

    match style {
        Style::Brief => {
            let take = sentences.len().min(BRIEF_SENTENCES);
            format!("[STUB - brief] {}", sentences[..take].join(" "))
        }
        Style::Detailed => {
            let take = sentences.len().min(DETAILED_SENTENCES);
            let joined = sentences[..take].join(" ");
            let body = if joined.split_whitespace().count() > DETAILED_MAX_WORDS {
                truncate_words(&joined, DETAILED_MAX_WORDS)
            } else {
                joined
            };
            format!("[STUB - detailed] {}", body)
        }
        Style::Bullets => {
            let bullets: Vec<String> = sentences
                .iter()
                .take(BULLET_SOURCE_SENTENCES)
                .take(MAX_BULLETS)
                .map(|s| format!("- {}", truncate_words(s, BULLET_WORDS)))
                .collect();
            format!("[STUB - bullets]\n{}", bullets.join("\n"))
        }
    }
}
