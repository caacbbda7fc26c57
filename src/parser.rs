#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Extracts structured grades from the model's free-text reply.
//!
//! Parsing never fails: each field that is missing or unreadable is replaced
//! by its default and the rest of the reply is still used.
//!
//! | Field            | Accepted value            | Default                              |
//! |------------------|---------------------------|--------------------------------------|
//! | `FLUENCY:` etc.  | integer or decimal        | `3`                                  |
//! | `FEEDBACK:`      | text up to a blank line   | `"Assessment completed successfully."` |
//! | `OVERALL_SCORE:` | `A1`..`C2`, any case      | `B2`                                 |
//! | `EXPLANATION:`   | text up to a blank line   | `"Assessment completed successfully."` |

use std::sync::LazyLock;

use regex::Regex;

use crate::types::{CefrBand, ExamResult, RubricScore};

/// Value substituted for a rubric dimension that could not be read.
pub const DEFAULT_DIMENSION: f64 = 3.0;

/// Band substituted when no CEFR band could be read.
pub const DEFAULT_BAND: CefrBand = CefrBand::B2;

/// Text substituted when no feedback or explanation could be read.
pub const DEFAULT_COMMENTARY: &str = "Assessment completed successfully.";

/// Builds the pattern for a numeric field. Tolerates markdown emphasis and
/// brackets around the label and value.
fn numeric_field(label: &str) -> Regex {
    Regex::new(&format!(
        r#"(?i)\b{label}\**\s*:\**\s*[\[("'*]*\s*(-?\d+(?:\.\d+)?)"#
    ))
    .expect("numeric field pattern is valid")
}

/// Builds the pattern for a free-text field, which ends at a blank line or
/// the end of the reply.
fn text_field(label: &str) -> Regex {
    Regex::new(&format!(r"(?is)\b{label}\**\s*:\**\s*(.+?)(?:\n[ \t\r]*\n|$)"))
        .expect("text field pattern is valid")
}

/// `FLUENCY:` value.
static FLUENCY: LazyLock<Regex> = LazyLock::new(|| numeric_field("FLUENCY"));
/// `LEXICAL:` value.
static LEXICAL: LazyLock<Regex> = LazyLock::new(|| numeric_field("LEXICAL"));
/// `GRAMMAR:` value.
static GRAMMAR: LazyLock<Regex> = LazyLock::new(|| numeric_field("GRAMMAR"));
/// `TASK:` value.
static TASK: LazyLock<Regex> = LazyLock::new(|| numeric_field("TASK"));
/// `FEEDBACK:` text.
static FEEDBACK: LazyLock<Regex> = LazyLock::new(|| text_field("FEEDBACK"));
/// `EXPLANATION:` text.
static EXPLANATION: LazyLock<Regex> = LazyLock::new(|| text_field("EXPLANATION"));
/// `OVERALL_SCORE:` band.
static OVERALL_SCORE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\bOVERALL_SCORE\**\s*:\**\s*[\[("'*]*\s*([A-C][1-2])"#)
        .expect("overall score pattern is valid")
});

/// Clamps a rubric value to `[1, 5]` and rounds it to the nearest half point.
pub fn quantize(value: f64) -> f64 {
    (value.clamp(1.0, 5.0) * 2.0).round() / 2.0
}

/// Reads one rubric dimension, or the default if absent or unparseable.
fn dimension(pattern: &Regex, raw: &str, label: &str) -> f64 {
    let parsed = pattern
        .captures(raw)
        .and_then(|caps| caps.get(1))
        .and_then(|value| value.as_str().parse::<f64>().ok());

    match parsed {
        Some(value) => quantize(value),
        None => {
            tracing::debug!(field = label, "rubric field missing from model reply; using default");
            DEFAULT_DIMENSION
        }
    }
}

/// Reads a free-text field and strips surrounding brackets and quotes.
fn commentary(pattern: &Regex, raw: &str, label: &str) -> String {
    let text = pattern
        .captures(raw)
        .and_then(|caps| caps.get(1))
        .map(|value| clean_commentary(value.as_str()))
        .filter(|text| !text.is_empty());

    text.unwrap_or_else(|| {
        tracing::debug!(field = label, "text field missing from model reply; using default");
        DEFAULT_COMMENTARY.to_string()
    })
}

/// Trims whitespace and any leading or trailing `[`, `]`, `"` or `'`.
fn clean_commentary(text: &str) -> String {
    text.trim()
        .trim_matches(|c| matches!(c, '[' | ']' | '"' | '\''))
        .trim()
        .to_string()
}

/// Parses a single-task grading reply.
pub fn parse_rubric(raw: &str) -> RubricScore {
    RubricScore {
        fluency:  dimension(&FLUENCY, raw, "FLUENCY"),
        lexical:  dimension(&LEXICAL, raw, "LEXICAL"),
        grammar:  dimension(&GRAMMAR, raw, "GRAMMAR"),
        task:     dimension(&TASK, raw, "TASK"),
        feedback: commentary(&FEEDBACK, raw, "FEEDBACK"),
    }
}

/// Parses a whole-exam grading reply.
pub fn parse_exam(raw: &str) -> ExamResult {
    let overall_score = OVERALL_SCORE
        .captures(raw)
        .and_then(|caps| caps.get(1))
        .and_then(|band| band.as_str().parse::<CefrBand>().ok())
        .unwrap_or_else(|| {
            tracing::debug!("OVERALL_SCORE missing from model reply; defaulting to B2");
            DEFAULT_BAND
        });

    ExamResult {
        overall_score,
        explanation: commentary(&EXPLANATION, raw, "EXPLANATION"),
    }
}
