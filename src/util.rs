#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::sync::LazyLock;

use regex::Regex;

/// Runs of whitespace, used as the word separator.
static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

/// Runs of sentence terminators.
static SENTENCE_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[.!?]+").expect("sentence pattern is valid"));

/// Splits `text` on runs of whitespace without trimming first.
///
/// Leading or trailing whitespace yields an empty token, and the empty string
/// yields exactly one empty token, so the result is never empty.
pub fn split_words(text: &str) -> Vec<&str> {
    WHITESPACE.split(text).collect()
}

/// Number of whitespace-separated words in the trimmed text.
///
/// Blank text counts as one (empty) word.
pub fn word_count(text: &str) -> usize {
    split_words(text.trim()).len()
}

/// Number of non-blank segments between `.`, `!` and `?`.
pub fn sentence_count(text: &str) -> usize {
    SENTENCE_BREAK
        .split(text)
        .filter(|segment| !segment.trim().is_empty())
        .count()
}
