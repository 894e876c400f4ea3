//! Error types for session operations.
//!
//! Every error here is local to one action: the action is dropped and the
//! session is left exactly as it was. Nothing in this crate is fatal to the
//! process.

use livepoll_types::{QuestionId, QuestionKind, Scope};

/// A question creation request was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// The title was empty after trimming.
    #[error("question title must not be empty")]
    EmptyTitle,

    /// A choice question had fewer than two non-empty options.
    #[error("{kind} questions need at least 2 non-empty options, got {found}")]
    TooFewOptions {
        /// Kind of the rejected question.
        kind: QuestionKind,
        /// Number of non-empty options supplied.
        found: usize,
    },
}

/// A submission did not fit the question's kind.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AnswerError {
    /// A list was sent to a single-choice question.
    #[error("single-choice questions take exactly one answer")]
    ExpectedSingle,

    /// A list was sent to a free-text question.
    #[error("free-text questions take a text answer")]
    ExpectedText,

    /// An empty list was sent to a multiple-choice question.
    #[error("at least one option must be selected")]
    EmptySelection,

    /// A free-text answer contained no words and empty answers are not
    /// counted.
    #[error("answer contains no words")]
    NoTokens,
}

/// Errors returned by the session coordinator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// Question creation failed validation.
    #[error("invalid question: {0}")]
    Validation(#[from] ValidationError),

    /// The answer shape does not match the question kind.
    #[error("invalid answer: {0}")]
    Answer(#[from] AnswerError),

    /// No question with this id exists.
    #[error("question not found: {0}")]
    QuestionNotFound(QuestionId),

    /// The question exists but is not accepting answers.
    #[error("question {0} is not active")]
    QuestionNotActive(QuestionId),

    /// The connection's scope may not perform this action.
    #[error("{action} is not allowed for {scope} connections")]
    Forbidden {
        /// Wire name of the refused action.
        action: &'static str,
        /// Scope of the caller.
        scope: Scope,
    },
}
