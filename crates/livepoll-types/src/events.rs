//! The event vocabulary exchanged with connected clients.
//!
//! Both directions use adjacently tagged JSON objects:
//!
//! ```json
//! { "event": "submit-answer", "data": { "questionId": "…", "answer": "Red" } }
//! ```
//!
//! Events without a payload omit `data`. Anything that does not match one
//! of the variants below is rejected at deserialization time, so handlers
//! never see a half-formed payload.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::ids::QuestionId;
use crate::structs::{NewQuestion, Question, RawAnswer, ResultsPayload};

/// An action sent by a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
#[ts(export, export_to = "bindings/")]
pub enum ClientEvent {
    /// Ask for the full question list (operator only).
    GetQuestions,
    /// Create a question (operator only).
    CreateQuestion(NewQuestion),
    /// Make a question the active one (operator only).
    ActivateQuestion {
        /// Question to activate.
        #[serde(rename = "questionId")]
        question_id: QuestionId,
    },
    /// Return the session to idle (operator only).
    DeactivateQuestion,
    /// Remove a question (operator only).
    DeleteQuestion {
        /// Question to remove.
        #[serde(rename = "questionId")]
        question_id: QuestionId,
    },
    /// Reset a question's tally (operator only).
    ClearAnswers {
        /// Question to reset.
        #[serde(rename = "questionId")]
        question_id: QuestionId,
    },
    /// Submit an answer (any scope).
    SubmitAnswer {
        /// Question being answered.
        #[serde(rename = "questionId")]
        question_id: QuestionId,
        /// The raw answer: a string or a list of strings.
        answer: RawAnswer,
    },
}

impl ClientEvent {
    /// Wire name of the event, used in logs and rejection replies.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::GetQuestions => "get-questions",
            Self::CreateQuestion(_) => "create-question",
            Self::ActivateQuestion { .. } => "activate-question",
            Self::DeactivateQuestion => "deactivate-question",
            Self::DeleteQuestion { .. } => "delete-question",
            Self::ClearAnswers { .. } => "clear-answers",
            Self::SubmitAnswer { .. } => "submit-answer",
        }
    }

    /// Whether only the operator scope may send this event.
    pub const fn is_operator_only(&self) -> bool {
        !matches!(self, Self::SubmitAnswer { .. })
    }
}

/// A notification pushed by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
#[ts(export, export_to = "bindings/")]
pub enum ServerEvent {
    /// Full question list, insertion ordered (operator scope).
    QuestionsUpdated {
        /// Every question in the session.
        questions: Vec<Question>,
    },
    /// A question became active (all scopes).
    QuestionActivated {
        /// Snapshot of the question, including its current tally.
        question: Question,
    },
    /// No question is active any more (all scopes).
    QuestionDeactivated,
    /// A question's tally changed (operator and viewer scopes).
    ResultsUpdated(ResultsPayload),
    /// The caller's last action was refused. Sent to that caller only.
    ActionRejected {
        /// Wire name of the refused action.
        action: String,
        /// Human-readable reason.
        reason: String,
    },
}

impl ServerEvent {
    /// Wire name of the event.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::QuestionsUpdated { .. } => "questions-updated",
            Self::QuestionActivated { .. } => "question-activated",
            Self::QuestionDeactivated => "question-deactivated",
            Self::ResultsUpdated(_) => "results-updated",
            Self::ActionRejected { .. } => "action-rejected",
        }
    }
}
