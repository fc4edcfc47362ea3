use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Reading speed used for `reading_time_minutes`.
pub const WORDS_PER_MINUTE: f64 = 200.0;

/// Number of characters kept in a text preview before the ellipsis.
pub const PREVIEW_CHARS: usize = 100;

static SENTENCE_TERMINATORS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[.!?]+").expect("sentence pattern is valid"));

/// Descriptive statistics for a piece of text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub word_count: u64,
    pub character_count: u64,
    pub character_count_no_spaces: u64,
    pub sentence_count: u64,
    pub paragraph_count: u64,
    pub average_word_length: f64,
    pub longest_word: String,
    pub reading_time_minutes: f64,
}

impl AnalysisResult {
    /// Compute statistics for `text`.
    ///
    /// Lengths are measured in characters. A text without any `.`, `!` or `?`
    /// still counts as one sentence.
    pub fn compute(text: &str) -> Self {
        let words: Vec<&str> = text.split_whitespace().collect();
        let word_count = words.len() as u64;

        let character_count = text.chars().count() as u64;
        let character_count_no_spaces = text.chars().filter(|c| *c != ' ').count() as u64;

        let sentence_count = match SENTENCE_TERMINATORS.find_iter(text).count() as u64 {
            0 => 1,
            n => n,
        };

        let paragraph_count = text
            .split("\n\n")
            .filter(|paragraph| !paragraph.trim().is_empty())
            .count() as u64;

        let average_word_length = if word_count > 0 {
            round_to_tenth(character_count_no_spaces as f64 / word_count as f64)
        } else {
            0.0
        };

        Self {
            word_count,
            character_count,
            character_count_no_spaces,
            sentence_count,
            paragraph_count,
            average_word_length,
            longest_word: longest_word(&words).to_string(),
            reading_time_minutes: round_to_tenth(word_count as f64 / WORDS_PER_MINUTE),
        }
    }
}

/// Leftmost word with the greatest character count, or `""` for no words.
fn longest_word<'a>(words: &[&'a str]) -> &'a str {
    let mut longest = "";
    let mut longest_len = 0;
    for &word in words {
        let len = word.chars().count();
        if len > longest_len {
            longest = word;
            longest_len = len;
        }
    }
    longest
}

/// Round to one decimal place using the exact decimal expansion of `value`.
///
/// Going through the formatter avoids the error `(value * 10.0).round()`
/// introduces for quotients such as 0.35 that sit just below a half.
pub fn round_to_tenth(value: f64) -> f64 {
    if !value.is_finite() {
        return value;
    }
    format!("{value:.1}").parse().unwrap_or(value)
}

/// First [`PREVIEW_CHARS`] characters of `text`, followed by `...` when cut.
pub fn text_preview(text: &str) -> String {
    match text.char_indices().nth(PREVIEW_CHARS) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}
