//! # cefr-grader
//!
//! Grades English assessment tasks (email, summary, dictation, speaking) on a
//! four-dimension rubric and assigns an overall CEFR band, using a remote
//! language model with a deterministic heuristic fallback.

#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

/// Process-wide settings read from the environment
pub mod config;
/// Streaming text generation through the AI gateway
pub mod gateway;
/// The grading orchestrator
pub mod grade;
/// Rule-based scoring used when the model is unavailable
pub mod heuristic;
/// Registry of models the gateway can route to
pub mod models;
/// Extracts scores from model replies
pub mod parser;
/// Grading instructions sent to the model
pub mod prompts;
/// HTTP endpoints
pub mod server;
/// Lexical overlap between two texts
pub mod similarity;
/// Fixed content of the assessment tasks
pub mod tasks;
/// Submissions, scores and results
pub mod types;
/// Text helpers shared by the scorers
pub mod util;

pub use grade::{Grader, GradingScope};
pub use types::{
    CefrBand, ExamResult, ExamSubmission, GradingOutcome, QuestionType, ResponseSubmission,
    RubricScore,
};
