#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Grading instructions sent to the model.
//!
//! The field labels in `rubric_format.md` and `exam_instructions.md`
//! (`FLUENCY:`, `OVERALL_SCORE:`, ...) are the ones [`crate::parser`] looks
//! for. Change both together.

use std::fmt::Write;

use itertools::Itertools;

use crate::{
    tasks::DICTATION_AUDIO,
    types::{QuestionType, ResponseSubmission},
};

/// Prompt templates embedded in the binary.
#[derive(Debug, Clone)]
pub struct GradingPrompts {
    /// Assessor role for single-task grading.
    rubric_intro:       String,
    /// The four rubric dimensions.
    rubric_criteria:    String,
    /// Email-specific task criteria.
    email_criteria:     String,
    /// Summarize-specific task criteria.
    summarize_criteria: String,
    /// Dictation-specific task criteria.
    dictation_criteria: String,
    /// Speaking-specific task criteria.
    speaking_criteria:  String,
    /// Output contract for single-task grading.
    rubric_format:      String,
    /// Assessor role for whole-exam grading.
    exam_intro:         String,
    /// CEFR scale and output contract for whole-exam grading.
    exam_instructions:  String,
}

impl Default for GradingPrompts {
    fn default() -> Self {
        Self::load()
    }
}

impl GradingPrompts {
    /// Load prompt templates embedded in the binary.
    pub fn load() -> Self {
        Self {
            rubric_intro:       include_str!("prompts/rubric_intro.md").to_string(),
            rubric_criteria:    include_str!("prompts/rubric_criteria.md").to_string(),
            email_criteria:     include_str!("prompts/criteria_email.md").to_string(),
            summarize_criteria: include_str!("prompts/criteria_summarize.md").to_string(),
            dictation_criteria: include_str!("prompts/criteria_dictation.md")
                .replace("{reference}", DICTATION_AUDIO),
            speaking_criteria:  include_str!("prompts/criteria_speaking.md").to_string(),
            rubric_format:      include_str!("prompts/rubric_format.md").to_string(),
            exam_intro:         include_str!("prompts/exam_intro.md").to_string(),
            exam_instructions:  include_str!("prompts/exam_instructions.md").to_string(),
        }
    }

    /// Returns the task-specific criteria appended to the rubric.
    pub fn task_criteria(&self, question_type: QuestionType) -> &str {
        match question_type {
            QuestionType::Email => &self.email_criteria,
            QuestionType::Summarize => &self.summarize_criteria,
            QuestionType::Dictation => &self.dictation_criteria,
            QuestionType::Speaking => &self.speaking_criteria,
        }
    }

    /// Returns the single-task output contract.
    pub fn rubric_format(&self) -> &str {
        &self.rubric_format
    }

    /// Builds the instruction for grading one response.
    ///
    /// The task instruction and candidate text are embedded verbatim inside
    /// double quotes.
    pub fn build_grading_prompt(
        &self,
        response: &str,
        question_type: QuestionType,
        original_prompt: &str,
    ) -> String {
        let mut prompt = String::new();
        prompt.push_str(self.rubric_intro.trim_end());
        prompt.push_str("\n\n");
        let _ = write!(
            prompt,
            "TASK TYPE: {}\nPROMPT: \"{}\"\nCANDIDATE RESPONSE: \"{}\"\n\n",
            question_type.as_str().to_uppercase(),
            original_prompt,
            response
        );
        prompt.push_str(self.rubric_criteria.trim_end());
        prompt.push_str("\n\n");
        prompt.push_str(self.task_criteria(question_type).trim_end());
        prompt.push_str("\n\n");
        prompt.push_str(self.rubric_format.trim_end());
        prompt.push('\n');
        prompt
    }

    /// Builds the instruction for grading a whole exam, one section per task
    /// in submission order.
    pub fn build_exam_prompt(&self, responses: &[ResponseSubmission]) -> String {
        let sections = responses
            .iter()
            .enumerate()
            .map(|(index, response)| {
                format!(
                    "\nTASK {} - {}:\nPROMPT: \"{}\"\nCANDIDATE RESPONSE: \"{}\"\n\n",
                    index + 1,
                    response.question_type.as_str().to_uppercase(),
                    response.prompt,
                    response.user_response
                )
            })
            .join("");

        format!("\n{}{}\n{}", self.exam_intro, sections, self.exam_instructions)
    }
}
