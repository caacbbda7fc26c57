#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Remote grading with a heuristic fallback.
//!
//! Every call makes one attempt against the gateway. If the attempt fails
//! for any transport reason the matching heuristic grades the same input, so
//! a well-formed result is always returned. There are no retries.

use std::{sync::Arc, time::Duration};

use bon::Builder;

use crate::{
    config::ConfigState,
    gateway::{
        EXAM_MAX_OUTPUT_TOKENS, GatewayClient, GenerationRequest, RUBRIC_MAX_OUTPUT_TOKENS,
        TextGenerator, generate,
    },
    heuristic::{grade_exam_heuristic, grade_heuristic},
    parser::{parse_exam, parse_rubric},
    prompts::GradingPrompts,
    types::{ExamResult, ExamSubmission, GradingOutcome, ResponseSubmission, RubricScore},
};

/// Default bound on one remote attempt.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Something that can be graded: a single response or a whole exam.
///
/// Each scope supplies its prompt, output ceiling, parser and fallback, and
/// [`Grader::assess`] drives them all the same way.
pub trait GradingScope: Send + Sync {
    /// The result shape shared by the remote and heuristic paths.
    type Output: Send;

    /// Name used in log fields.
    const LABEL: &'static str;

    /// Output token ceiling for the remote call.
    const MAX_OUTPUT_TOKENS: u32;

    /// Builds the grading instruction.
    fn prompt(&self, prompts: &GradingPrompts) -> String;

    /// Parses the model's reply. Never fails.
    fn parse(raw: &str) -> Self::Output;

    /// Grades without the model. Never fails.
    fn fallback(&self) -> Self::Output;
}

impl GradingScope for ResponseSubmission {
    type Output = RubricScore;

    const LABEL: &'static str = "response";
    const MAX_OUTPUT_TOKENS: u32 = RUBRIC_MAX_OUTPUT_TOKENS;

    fn prompt(&self, prompts: &GradingPrompts) -> String {
        prompts.build_grading_prompt(&self.user_response, self.question_type, &self.prompt)
    }

    fn parse(raw: &str) -> RubricScore {
        parse_rubric(raw)
    }

    fn fallback(&self) -> RubricScore {
        grade_heuristic(&self.user_response, self.question_type)
    }
}

impl GradingScope for ExamSubmission {
    type Output = ExamResult;

    const LABEL: &'static str = "exam";
    const MAX_OUTPUT_TOKENS: u32 = EXAM_MAX_OUTPUT_TOKENS;

    fn prompt(&self, prompts: &GradingPrompts) -> String {
        prompts.build_exam_prompt(self.responses())
    }

    fn parse(raw: &str) -> ExamResult {
        parse_exam(raw)
    }

    fn fallback(&self) -> ExamResult {
        grade_exam_heuristic(self)
    }
}

/// Public entry point for grading.
#[derive(Builder, Clone)]
#[builder(on(String, into))]
pub struct Grader {
    /// Backend used for the remote attempt.
    generator: Arc<dyn TextGenerator>,
    /// Model key sent with every request.
    model_key: String,
    /// Bound on one remote attempt.
    #[builder(default = DEFAULT_TIMEOUT)]
    timeout:   Duration,
    /// Prompt templates.
    #[builder(default)]
    prompts:   GradingPrompts,
}

impl Grader {
    /// Builds a grader backed by the AI gateway from the process
    /// configuration.
    pub fn from_config(config: &ConfigState) -> Self {
        Grader::builder()
            .generator(Arc::new(GatewayClient::from_config(config)))
            .model_key(config.default_model())
            .timeout(config.gateway_timeout())
            .prompts(config.prompts().clone())
            .build()
    }

    /// Returns the model key used for grading.
    pub fn model_key(&self) -> &str {
        &self.model_key
    }

    /// Grades `scope`, reporting which path produced the result.
    pub async fn assess<S: GradingScope>(&self, scope: &S) -> GradingOutcome<S::Output> {
        let request = GenerationRequest::builder()
            .model_key(self.model_key.as_str())
            .prompt(scope.prompt(&self.prompts))
            .max_output_tokens(S::MAX_OUTPUT_TOKENS)
            .build();

        match generate(self.generator.as_ref(), request, self.timeout).await {
            Ok(generation) => {
                tracing::info!(
                    scope = S::LABEL,
                    outcome = "success",
                    reply_chars = generation.text.len(),
                    "graded with model"
                );
                GradingOutcome::Success(S::parse(&generation.text))
            }
            Err(err) => {
                tracing::warn!(
                    scope = S::LABEL,
                    outcome = "fallback",
                    reason = %err,
                    "remote grading failed; using heuristic grader"
                );
                GradingOutcome::Fallback(scope.fallback())
            }
        }
    }

    /// Grades one response on the four-dimension rubric.
    pub async fn grade_response(&self, submission: &ResponseSubmission) -> RubricScore {
        self.assess(submission).await.into_inner()
    }

    /// Assigns a CEFR band to a whole exam.
    pub async fn grade_exam(&self, exam: &ExamSubmission) -> ExamResult {
        self.assess(exam).await.into_inner()
    }
}
