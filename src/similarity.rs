#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use crate::util::split_words;

/// Lexical overlap between `candidate` and `reference`, in `[0, 1]`.
///
/// Counts the words of `candidate` that occur anywhere in `reference`
/// (duplicates count each time) and divides by the longer word sequence.
/// Callers lowercase the inputs. Empty input splits into one empty token, so
/// the denominator is never zero.
pub fn similarity(candidate: &str, reference: &str) -> f64 {
    let candidate_words = split_words(candidate);
    let reference_words = split_words(reference);

    let common = candidate_words
        .iter()
        .filter(|word| reference_words.contains(word))
        .count();

    common as f64 / candidate_words.len().max(reference_words.len()) as f64
}
