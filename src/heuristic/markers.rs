#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Keyword lists and content markers shared by the rubric grader and the
//! exam classifier.

use std::sync::LazyLock;

use regex::Regex;

use crate::{similarity::similarity, tasks::DICTATION_REFERENCE};

/// Business vocabulary counted towards lexical range.
pub const PROFESSIONAL_VOCABULARY: &[&str] = &[
    "professional",
    "apologize",
    "deadline",
    "client",
    "technical",
    "delivery",
    "performance",
    "expectations",
    "management",
    "strategy",
    "analysis",
    "implementation",
];

/// Subject terms from the summarize article. Only the exam classifier counts
/// them as vocabulary; the rubric grader uses them as a task marker instead.
pub const DOMAIN_VOCABULARY: &[&str] =
    &["ai", "artificial intelligence", "supply chain", "inventory", "costs"];

/// Builds a case-insensitive marker pattern.
fn marker(pattern: &str) -> Regex {
    Regex::new(&format!("(?i){pattern}")).expect("marker pattern is valid")
}

/// Email apologizes.
static APOLOGY: LazyLock<Regex> = LazyLock::new(|| marker("sorry|apologize|regret"));

/// Email explains the delay.
static DELAY_EXPLANATION: LazyLock<Regex> =
    LazyLock::new(|| marker("technical|issue|problem|delay"));

/// Email proposes a new date.
static NEW_DATE: LazyLock<Regex> = LazyLock::new(|| marker("friday|date|deadline"));

/// Summary mentions the article's key terms.
static KEY_TERMS: LazyLock<Regex> =
    LazyLock::new(|| marker("ai|artificial intelligence|supply chain|inventory|cost"));

/// Which of the three required email components are present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EmailMarkers {
    /// An apology.
    pub apology:     bool,
    /// A reason for the delay.
    pub explanation: bool,
    /// A new delivery date.
    pub new_date:    bool,
}

impl EmailMarkers {
    /// Scans an email response.
    pub fn scan(text: &str) -> Self {
        Self {
            apology:     APOLOGY.is_match(text),
            explanation: DELAY_EXPLANATION.is_match(text),
            new_date:    NEW_DATE.is_match(text),
        }
    }

    /// Number of components present, 0 to 3.
    pub fn count(&self) -> u32 {
        [self.apology, self.explanation, self.new_date]
            .into_iter()
            .filter(|present| *present)
            .count() as u32
    }
}

/// Whether a summary mentions the article's key terms.
pub fn has_key_terms(text: &str) -> bool {
    KEY_TERMS.is_match(text)
}

/// Whether a summary's length is within the expected 30 to 100 words.
pub fn summary_length_ok(word_count: usize) -> bool {
    (30..=100).contains(&word_count)
}

/// How closely a dictation response matches the reference sentence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DictationAccuracy {
    /// Similarity above 0.8.
    Close,
    /// Similarity above 0.6.
    Partial,
    /// Similarity above 0.4.
    Weak,
    /// Anything lower.
    Miss,
}

impl DictationAccuracy {
    /// Compares a dictation response against the reference sentence.
    pub fn assess(text: &str) -> Self {
        let ratio = similarity(&text.to_lowercase(), DICTATION_REFERENCE);
        if ratio > 0.8 {
            DictationAccuracy::Close
        } else if ratio > 0.6 {
            DictationAccuracy::Partial
        } else if ratio > 0.4 {
            DictationAccuracy::Weak
        } else {
            DictationAccuracy::Miss
        }
    }
}

/// Counts entries of `vocabulary` that occur as case-insensitive substrings
/// of `text`. Each entry counts at most once.
pub fn count_vocabulary(text: &str, vocabulary: &[&str]) -> usize {
    let lowered = text.to_lowercase();
    vocabulary
        .iter()
        .filter(|word| lowered.contains(*word))
        .count()
}
