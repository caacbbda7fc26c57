#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Deterministic scoring used when the remote model is unavailable.

/// Whole-exam CEFR classification.
pub mod exam;
/// Shared keyword lists and content markers.
pub mod markers;
/// Single-response rubric scoring.
pub mod rubric;

pub use exam::{ExamTally, canned_explanation, grade_exam_heuristic};
pub use rubric::grade_heuristic;
