//! Answer aggregation: applies one submission to a question's tally.
//!
//! The rules depend only on the question kind:
//!
//! | Kind | Accepted shape | Tally effect |
//! |------|----------------|--------------|
//! | single-choice | one string | `+1` for that string |
//! | multiple-choice | string or non-empty list | `+1` per list element, duplicates included |
//! | free-text | one string | `+1` per lower-cased whitespace-separated word |
//!
//! Every accepted submission adds exactly one to `response_count`. Values
//! that are not listed options are counted like any other key. A rejected
//! submission leaves the question untouched.

use livepoll_types::{Question, QuestionKind, RawAnswer, Tally};

use crate::error::AnswerError;

/// Tunable counting rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AggregationRules {
    /// Count a free-text submission that produces no words as a response.
    pub count_empty_free_text: bool,
}

impl Default for AggregationRules {
    fn default() -> Self {
        Self {
            count_empty_free_text: true,
        }
    }
}

/// What a successful [`apply`] did to the question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Applied {
    /// Number of tally increments made.
    pub increments: usize,
}

/// Apply one submission to `question`.
///
/// # Errors
///
/// Returns an [`AnswerError`] when the answer shape does not fit the
/// question kind. The question is not modified in that case.
pub fn apply(
    question: &mut Question,
    answer: RawAnswer,
    rules: AggregationRules,
) -> Result<Applied, AnswerError> {
    let keys = match (question.kind, answer) {
        (QuestionKind::SingleChoice, RawAnswer::One(choice)) => vec![choice],
        (QuestionKind::SingleChoice, RawAnswer::Many(_)) => {
            return Err(AnswerError::ExpectedSingle);
        }
        (QuestionKind::MultipleChoice, answer) => {
            let selections = answer.into_selections();
            if selections.is_empty() {
                return Err(AnswerError::EmptySelection);
            }
            selections
        }
        (QuestionKind::FreeText, RawAnswer::One(text)) => {
            let tokens = tokenize(&text);
            if tokens.is_empty() && !rules.count_empty_free_text {
                return Err(AnswerError::NoTokens);
            }
            tokens
        }
        (QuestionKind::FreeText, RawAnswer::Many(_)) => return Err(AnswerError::ExpectedText),
    };

    let increments = keys.len();
    for key in keys {
        increment(&mut question.tally, key);
    }
    question.response_count = question.response_count.saturating_add(1);

    Ok(Applied { increments })
}

/// Split free text into lower-cased words on runs of whitespace.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split_whitespace()
        .map(str::to_lowercase)
        .filter(|word| !word.is_empty())
        .collect()
}

fn increment(tally: &mut Tally, key: String) {
    let count = tally.entry(key).or_insert(0);
    *count = count.saturating_add(1);
}
