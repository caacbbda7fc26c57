#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use super::markers::{
    DOMAIN_VOCABULARY, DictationAccuracy, EmailMarkers, PROFESSIONAL_VOCABULARY, count_vocabulary,
    has_key_terms, summary_length_ok,
};
use crate::{
    types::{CefrBand, ExamResult, ExamSubmission, QuestionType, ResponseSubmission},
    util::word_count,
};

/// Signals accumulated across every response of an exam.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ExamTally {
    /// Words across all responses.
    pub total_word_count:        usize,
    /// Task completion points across all responses.
    pub total_task_score:        u32,
    /// Vocabulary hits across all responses.
    pub professional_word_count: usize,
    /// Number of responses tallied.
    pub response_count:          usize,
}

impl ExamTally {
    /// Tallies every response of the exam.
    pub fn of(exam: &ExamSubmission) -> Self {
        exam.responses()
            .iter()
            .fold(Self::default(), |tally, response| tally.add(response))
    }

    /// Adds one response to the tally.
    fn add(mut self, response: &ResponseSubmission) -> Self {
        let text = response.user_response.as_str();
        let words = word_count(text);

        self.total_word_count += words;
        self.professional_word_count += count_vocabulary(text, PROFESSIONAL_VOCABULARY)
            + count_vocabulary(text, DOMAIN_VOCABULARY);
        self.total_task_score += task_points(text, response.question_type, words);
        self.response_count += 1;
        self
    }

    /// Mean words per response.
    pub fn avg_word_count(&self) -> f64 {
        self.total_word_count as f64 / self.response_count.max(1) as f64
    }

    /// Applies the band thresholds; the first matching rule wins.
    pub fn band(&self) -> CefrBand {
        let rich_vocabulary = self.professional_word_count >= 3;
        let developed = self.avg_word_count() >= 40.0;

        if self.total_task_score >= 10 && rich_vocabulary && developed {
            CefrBand::B2
        } else if self.total_task_score >= 7 && (rich_vocabulary || developed) {
            CefrBand::B1
        } else if self.total_task_score >= 5 {
            CefrBand::A2
        } else {
            CefrBand::A1
        }
    }
}

/// Completion points one response contributes to the exam tally.
fn task_points(text: &str, question_type: QuestionType, words: usize) -> u32 {
    match question_type {
        QuestionType::Email => EmailMarkers::scan(text).count(),
        QuestionType::Summarize => {
            let key_terms = if has_key_terms(text) { 2 } else { 1 };
            key_terms + u32::from(summary_length_ok(words))
        }
        QuestionType::Dictation => match DictationAccuracy::assess(text) {
            DictationAccuracy::Close => 3,
            DictationAccuracy::Partial => 2,
            DictationAccuracy::Weak => 1,
            DictationAccuracy::Miss => 0,
        },
        // A recording was made; there is no transcript to inspect.
        QuestionType::Speaking => 2,
    }
}

/// Fixed explanation for each band the classifier can assign.
pub fn canned_explanation(band: CefrBand) -> &'static str {
    match band {
        CefrBand::C1 | CefrBand::C2 | CefrBand::B2 => {
            "Demonstrates strong English proficiency with effective task completion, good \
             vocabulary range, and appropriate professional communication across all sections."
        }
        CefrBand::B1 => {
            "Shows competent English skills with generally successful task completion. Some areas \
             for improvement in vocabulary range or response development."
        }
        CefrBand::A2 => {
            "Basic English communication skills demonstrated. Can complete simple tasks but would \
             benefit from developing vocabulary and fluency for professional contexts."
        }
        CefrBand::A1 => {
            "Beginning level English skills. Requires significant development in vocabulary, \
             grammar, and task completion for professional communication."
        }
    }
}

/// Assigns a CEFR band to an exam from keyword and length rules.
///
/// Never fails and never touches the network. The highest band it assigns
/// is B2.
pub fn grade_exam_heuristic(exam: &ExamSubmission) -> ExamResult {
    let band = ExamTally::of(exam).band();
    ExamResult {
        overall_score: band,
        explanation:   canned_explanation(band).to_string(),
    }
}
