#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! The fixed content of the four assessment tasks.

use crate::types::QuestionType;

/// Placeholder submitted in place of a speaking transcript.
pub const SPEAKING_PLACEHOLDER: &str = "[30-second recorded response]";

/// Lowercase form of the sentence read aloud in the dictation task.
pub const DICTATION_REFERENCE: &str =
    "quarterly earnings exceeded expectations due to strong performance in the apac region";

/// The dictation sentence as it is spoken to the candidate.
pub const DICTATION_AUDIO: &str =
    "Our quarterly earnings exceeded expectations due to strong performance in the APAC region.";

/// Instruction for the email task.
pub const EMAIL_INSTRUCTION: &str = "You are a project manager. Your team has missed an important \
                                     deadline for a client, 'Global Innovations Inc.' Write a \
                                     professional email (150-200 words) to the client. You need \
                                     to apologize, briefly explain the reason for the delay (a \
                                     technical issue), and provide a new, confident delivery date \
                                     for this Friday.";

/// Instruction for the summarize task; the article follows it.
pub const SUMMARIZE_INSTRUCTION: &str =
    "Read the following article and summarize the key points in 3-4 sentences:";

/// Article shown in the summarize task.
pub const SUMMARIZE_ARTICLE: &str = include_str!("prompts/article.md");

/// Instruction for the dictation task.
pub const DICTATION_INSTRUCTION: &str = "Click the play button and type exactly what you hear:";

/// Instruction for the speaking task.
pub const SPEAKING_INSTRUCTION: &str = "You are in a job interview. The interviewer asks: \"Can \
                                        you tell me about a time you had to handle a difficult \
                                        colleague?\" Prepare a brief, 30-second response. Click \
                                        'Record' to begin.";

/// Returns the instruction shown for a task, with the article appended for
/// the summarize task.
pub fn default_prompt(question_type: QuestionType) -> String {
    match question_type {
        QuestionType::Email => EMAIL_INSTRUCTION.to_string(),
        QuestionType::Summarize => {
            format!("{SUMMARIZE_INSTRUCTION}\n\n{}", SUMMARIZE_ARTICLE.trim())
        }
        QuestionType::Dictation => DICTATION_INSTRUCTION.to_string(),
        QuestionType::Speaking => SPEAKING_INSTRUCTION.to_string(),
    }
}
