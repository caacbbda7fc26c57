#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use super::markers::{
    DictationAccuracy, EmailMarkers, PROFESSIONAL_VOCABULARY, count_vocabulary, has_key_terms,
    summary_length_ok,
};
use crate::{
    types::{QuestionType, RubricScore},
    util::{sentence_count, word_count},
};

/// Starting value for every dimension.
const BASE_SCORE: f64 = 3.0;

/// Highest value any dimension may take.
const MAX_SCORE: f64 = 5.0;

/// Scores at or above this get the "strong" feedback phrase.
const STRONG_THRESHOLD: f64 = 4.0;

/// Scores a single response from length, punctuation and keyword rules.
///
/// Never fails and never touches the network.
pub fn grade_heuristic(response: &str, question_type: QuestionType) -> RubricScore {
    let words = word_count(response);
    let sentences = sentence_count(response);
    let words_per_sentence = words as f64 / sentences.max(1) as f64;

    let mut fluency = BASE_SCORE;
    if words_per_sentence > 8.0 && words_per_sentence < 25.0 {
        fluency += 1.0;
    }
    if sentences >= 3 {
        fluency += 1.0;
    }

    let mut lexical = BASE_SCORE;
    if count_vocabulary(response, PROFESSIONAL_VOCABULARY) >= 2 {
        lexical += 1.0;
    }
    if words >= 50 {
        lexical += 1.0;
    }

    let trimmed = response.trim();
    let mut grammar = BASE_SCORE;
    if trimmed.starts_with(|c: char| c.is_ascii_uppercase()) {
        grammar += 1.0;
    }
    if trimmed.ends_with(['.', '!', '?']) {
        grammar += 1.0;
    }

    let task = task_score(response, question_type, words);

    let fluency = fluency.min(MAX_SCORE);
    let lexical = lexical.min(MAX_SCORE);
    let grammar = grammar.min(MAX_SCORE);
    let task = task.min(MAX_SCORE);

    RubricScore {
        fluency,
        lexical,
        grammar,
        task,
        feedback: compose_feedback(fluency, lexical, grammar, task, question_type),
    }
}

/// Task achievement before clamping.
fn task_score(response: &str, question_type: QuestionType, words: usize) -> f64 {
    match question_type {
        QuestionType::Email => BASE_SCORE + f64::from(EmailMarkers::scan(response).count()),
        QuestionType::Summarize => {
            let mut task = BASE_SCORE;
            if has_key_terms(response) {
                task += 1.0;
            }
            if summary_length_ok(words) {
                task += 1.0;
            }
            task
        }
        // Overrides the base rather than adding to it.
        QuestionType::Dictation => match DictationAccuracy::assess(response) {
            DictationAccuracy::Close => 5.0,
            DictationAccuracy::Partial => 4.0,
            DictationAccuracy::Weak | DictationAccuracy::Miss => BASE_SCORE,
        },
        // No transcript to analyse.
        QuestionType::Speaking => BASE_SCORE,
    }
}

/// One clause per dimension, joined into a single sentence.
fn compose_feedback(
    fluency: f64,
    lexical: f64,
    grammar: f64,
    task: f64,
    question_type: QuestionType,
) -> String {
    let clauses = [
        if fluency >= STRONG_THRESHOLD {
            "Well-structured and coherent response"
        } else {
            "Consider improving sentence flow and organization"
        },
        if lexical >= STRONG_THRESHOLD {
            "good use of professional vocabulary"
        } else {
            "expand vocabulary range for enhanced impact"
        },
        if grammar >= STRONG_THRESHOLD {
            "strong grammatical accuracy"
        } else {
            "review grammar and sentence structure"
        },
        if task >= STRONG_THRESHOLD {
            "effectively addresses the task requirements"
        } else {
            match question_type {
                QuestionType::Email => {
                    "ensure all email components are included (apology, explanation, new date)"
                }
                QuestionType::Summarize => "focus on capturing key points more comprehensively",
                QuestionType::Dictation | QuestionType::Speaking => {
                    "better alignment with task objectives needed"
                }
            }
        },
    ];

    format!("{}.", clauses.join(", "))
}
