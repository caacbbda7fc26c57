#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

/// The four task types a candidate completes during an assessment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionType {
    /// Professional email writing.
    Email,
    /// Reading and summarizing an article.
    Summarize,
    /// Listening and typing back a sentence.
    Dictation,
    /// Recorded spoken response.
    Speaking,
}

impl QuestionType {
    /// All task types in exam order.
    pub const ALL: [QuestionType; 4] = [
        QuestionType::Email,
        QuestionType::Summarize,
        QuestionType::Dictation,
        QuestionType::Speaking,
    ];

    /// Returns the lowercase wire name of the task type.
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionType::Email => "email",
            QuestionType::Summarize => "summarize",
            QuestionType::Dictation => "dictation",
            QuestionType::Speaking => "speaking",
        }
    }
}

impl Display for QuestionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuestionType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "email" => Ok(QuestionType::Email),
            "summarize" => Ok(QuestionType::Summarize),
            "dictation" => Ok(QuestionType::Dictation),
            "speaking" => Ok(QuestionType::Speaking),
            other => Err(ValidationError::UnknownQuestionType(other.to_string())),
        }
    }
}

/// Errors raised when a submission does not have the shape grading needs.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field was absent or empty.
    #[error("Missing required field `{0}`")]
    MissingField(&'static str),
    /// The `questionType` value is not one of the four task types.
    #[error("Unknown question type `{0}`; expected one of email, summarize, dictation, speaking")]
    UnknownQuestionType(String),
    /// An exam was submitted without any responses.
    #[error("Missing or invalid exam responses")]
    EmptyExam,
}

/// One task attempt by a candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseSubmission {
    /// Which task this response answers.
    pub question_type: QuestionType,
    /// The task instruction shown to the candidate.
    #[serde(default)]
    pub prompt:        String,
    /// The candidate's text. For speaking this is a fixed placeholder.
    pub user_response: String,
}

impl ResponseSubmission {
    /// Creates a new submission.
    pub fn new(
        question_type: QuestionType,
        prompt: impl Into<String>,
        user_response: impl Into<String>,
    ) -> Self {
        Self {
            question_type,
            prompt: prompt.into(),
            user_response: user_response.into(),
        }
    }
}

/// An ordered, non-empty sequence of task submissions graded together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExamSubmission(Vec<ResponseSubmission>);

impl ExamSubmission {
    /// Wraps the responses, rejecting an empty sequence.
    pub fn new(responses: Vec<ResponseSubmission>) -> Result<Self, ValidationError> {
        if responses.is_empty() {
            return Err(ValidationError::EmptyExam);
        }
        Ok(Self(responses))
    }

    /// Returns the responses in submission order.
    pub fn responses(&self) -> &[ResponseSubmission] {
        &self.0
    }

    /// Number of responses; never zero.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; kept for API symmetry with slices.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Result of grading a single response against the four-dimension rubric.
///
/// Every dimension lies in `[1, 5]` at half-point granularity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RubricScore {
    /// Sentence flow and organization.
    pub fluency:  f64,
    /// Vocabulary range and appropriateness.
    pub lexical:  f64,
    /// Grammatical accuracy.
    pub grammar:  f64,
    /// Task achievement.
    pub task:     f64,
    /// One to three sentences of feedback.
    pub feedback: String,
}

impl RubricScore {
    /// Returns the four dimensions with their labels, in rubric order.
    pub fn dimensions(&self) -> [(&'static str, f64); 4] {
        [
            ("Fluency", self.fluency),
            ("Lexical", self.lexical),
            ("Grammar", self.grammar),
            ("Task", self.task),
        ]
    }
}

/// Display tier for a rubric value, as used for color coding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreTier {
    /// Rounded score of 4 or 5.
    Excellent,
    /// Rounded score of 3.
    Good,
    /// Anything lower.
    NeedsWork,
}

impl ScoreTier {
    /// Classifies a rubric value; half points round up.
    pub fn of(score: f64) -> Self {
        let rounded = score.round();
        if rounded >= 4.0 {
            ScoreTier::Excellent
        } else if rounded >= 3.0 {
            ScoreTier::Good
        } else {
            ScoreTier::NeedsWork
        }
    }
}

/// The six CEFR proficiency bands, lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CefrBand {
    /// Beginner.
    A1,
    /// Elementary.
    A2,
    /// Intermediate.
    B1,
    /// Upper-intermediate.
    B2,
    /// Advanced.
    C1,
    /// Proficient.
    C2,
}

/// Coarse grouping of bands used when presenting a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BandTier {
    /// C1 and C2.
    Strong,
    /// B1 and B2.
    Intermediate,
    /// A2.
    Elementary,
    /// A1.
    Beginner,
}

impl CefrBand {
    /// All bands, lowest first.
    pub const ALL: [CefrBand; 6] = [
        CefrBand::A1,
        CefrBand::A2,
        CefrBand::B1,
        CefrBand::B2,
        CefrBand::C1,
        CefrBand::C2,
    ];

    /// Returns the band label, e.g. `"B2"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            CefrBand::A1 => "A1",
            CefrBand::A2 => "A2",
            CefrBand::B1 => "B1",
            CefrBand::B2 => "B2",
            CefrBand::C1 => "C1",
            CefrBand::C2 => "C2",
        }
    }

    /// Returns a short human-readable description of the band.
    pub fn description(&self) -> &'static str {
        match self {
            CefrBand::A1 => "Beginner - Basic phrases, very limited vocabulary",
            CefrBand::A2 => "Elementary - Simple sentences, basic communication",
            CefrBand::B1 => "Intermediate - Can handle most situations, good basic communication",
            CefrBand::B2 => {
                "Upper-Intermediate - Effective communication, good vocabulary and grammar"
            }
            CefrBand::C1 => "Advanced - Fluent and sophisticated language use",
            CefrBand::C2 => "Proficient - Near-native level proficiency",
        }
    }

    /// Returns the presentation tier of the band.
    pub fn tier(&self) -> BandTier {
        match self {
            CefrBand::C1 | CefrBand::C2 => BandTier::Strong,
            CefrBand::B1 | CefrBand::B2 => BandTier::Intermediate,
            CefrBand::A2 => BandTier::Elementary,
            CefrBand::A1 => BandTier::Beginner,
        }
    }
}

impl Display for CefrBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CefrBand {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase();
        CefrBand::ALL
            .into_iter()
            .find(|band| band.as_str() == normalized)
            .ok_or_else(|| format!("`{s}` is not a CEFR band"))
    }
}

/// Result of grading a whole exam.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamResult {
    /// Overall CEFR band.
    pub overall_score: CefrBand,
    /// Two to three sentences explaining the band.
    pub explanation:   String,
}

/// Which path produced a grading result.
///
/// Both variants carry a value of the same shape; callers usually collapse
/// the tag with [`GradingOutcome::into_inner`].
#[derive(Debug, Clone, PartialEq)]
pub enum GradingOutcome<T> {
    /// The remote model replied and its output was parsed.
    Success(T),
    /// The remote call failed and the heuristic path produced the value.
    Fallback(T),
}

impl<T> GradingOutcome<T> {
    /// Discards the tag and returns the result.
    pub fn into_inner(self) -> T {
        match self {
            GradingOutcome::Success(value) | GradingOutcome::Fallback(value) => value,
        }
    }

    /// Borrows the result regardless of the path taken.
    pub fn value(&self) -> &T {
        match self {
            GradingOutcome::Success(value) | GradingOutcome::Fallback(value) => value,
        }
    }

    /// Returns true when the heuristic path produced the result.
    pub fn is_fallback(&self) -> bool {
        matches!(self, GradingOutcome::Fallback(_))
    }

    /// Short tag used in log fields.
    pub fn tag(&self) -> &'static str {
        match self {
            GradingOutcome::Success(_) => "success",
            GradingOutcome::Fallback(_) => "fallback",
        }
    }
}
