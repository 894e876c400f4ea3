//! Core entity structs for a polling session.
//!
//! Covers [`Question`] with its [`Tally`], the creation request
//! [`NewQuestion`], the raw submission shape [`RawAnswer`], and the
//! [`ResultsPayload`] projection sent to result displays.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::QuestionKind;
use crate::ids::QuestionId;

/// Mapping from answer key to accumulated count.
///
/// Keys are unbounded: free-text tokens and unlisted choice values are
/// counted like any listed option.
pub type Tally = BTreeMap<String, u64>;

// ---------------------------------------------------------------------------
// Question
// ---------------------------------------------------------------------------

/// A question in the session together with its running tally.
///
/// Identity, title, kind and options never change after creation. Only
/// `tally` and `response_count` move, through submissions or an explicit
/// clear.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct Question {
    /// Unique identifier assigned at creation.
    pub id: QuestionId,
    /// Display text, never empty.
    pub title: String,
    /// Counting rule for submissions.
    pub kind: QuestionKind,
    /// Ordered options. Empty for free-text questions.
    pub options: Vec<String>,
    /// Answer key to count.
    pub tally: Tally,
    /// Number of accepted submissions (not tally increments).
    pub response_count: u64,
    /// Wall-clock creation time.
    pub created_at: DateTime<Utc>,
}

impl Question {
    /// Build an empty question with a fresh identifier.
    ///
    /// No validation happens here; the registry is responsible for
    /// rejecting empty titles and short option lists.
    pub fn new(title: String, kind: QuestionKind, options: Vec<String>) -> Self {
        Self {
            id: QuestionId::new(),
            title,
            kind,
            options,
            tally: Tally::new(),
            response_count: 0,
            created_at: Utc::now(),
        }
    }

    /// Reset the tally and response count, keeping identity and options.
    pub fn clear_answers(&mut self) {
        self.tally.clear();
        self.response_count = 0;
    }

    /// Sum of all tally counts.
    pub fn tally_total(&self) -> u64 {
        self.tally
            .values()
            .fold(0_u64, |acc, count| acc.saturating_add(*count))
    }

    /// Project the current results for result displays.
    pub fn results(&self) -> ResultsPayload {
        ResultsPayload {
            question_id: self.id,
            answers: self.tally.clone(),
            total_responses: self.response_count,
        }
    }
}

/// Aggregated results for one question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct ResultsPayload {
    /// The question these results belong to.
    pub question_id: QuestionId,
    /// Answer key to count.
    pub answers: Tally,
    /// Number of accepted submissions.
    pub total_responses: u64,
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// Operator request to create a question.
///
/// Accepts `type` as a legacy alias for `kind`. `options` may be omitted
/// for free-text questions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct NewQuestion {
    /// Display text.
    pub title: String,
    /// Question kind.
    #[serde(alias = "type")]
    pub kind: QuestionKind,
    /// Candidate options, trimmed and filtered on creation.
    #[serde(default)]
    pub options: Vec<String>,
}

/// A submission as it arrives from a respondent.
///
/// A JSON string maps to [`RawAnswer::One`], a JSON array to
/// [`RawAnswer::Many`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(untagged)]
#[ts(export, export_to = "bindings/")]
pub enum RawAnswer {
    /// A single value: a chosen option or free text.
    One(String),
    /// A list of chosen options.
    Many(Vec<String>),
}

impl RawAnswer {
    /// Treat the answer as a selection list. A lone string becomes a list of
    /// one.
    pub fn into_selections(self) -> Vec<String> {
        match self {
            Self::One(value) => vec![value],
            Self::Many(values) => values,
        }
    }
}

impl From<&str> for RawAnswer {
    fn from(value: &str) -> Self {
        Self::One(value.to_owned())
    }
}

impl From<Vec<&str>> for RawAnswer {
    fn from(values: Vec<&str>) -> Self {
        Self::Many(values.into_iter().map(str::to_owned).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn color_question() -> Question {
        Question::new(
            String::from("Color?"),
            QuestionKind::SingleChoice,
            vec![String::from("Red"), String::from("Blue")],
        )
    }

    #[test]
    fn new_question_starts_empty() {
        let q = color_question();
        assert!(q.tally.is_empty());
        assert_eq!(q.response_count, 0);
        assert_eq!(q.tally_total(), 0);
    }

    #[test]
    fn clear_answers_keeps_identity() {
        let mut q = color_question();
        q.tally.insert(String::from("Red"), 4);
        q.response_count = 4;
        let before = q.clone();

        q.clear_answers();

        assert!(q.tally.is_empty());
        assert_eq!(q.response_count, 0);
        assert_eq!(q.id, before.id);
        assert_eq!(q.title, before.title);
        assert_eq!(q.kind, before.kind);
        assert_eq!(q.options, before.options);
    }

    #[test]
    fn results_use_wire_field_names() {
        let mut q = color_question();
        q.tally.insert(String::from("Red"), 2);
        q.response_count = 2;

        let json = serde_json::to_value(q.results()).unwrap_or_default();
        assert_eq!(json["questionId"], serde_json::json!(q.id.to_string()));
        assert_eq!(json["answers"]["Red"], 2);
        assert_eq!(json["totalResponses"], 2);
    }

    #[test]
    fn raw_answer_accepts_string_or_list() {
        let one: Result<RawAnswer, _> = serde_json::from_str("\"Red\"");
        let many: Result<RawAnswer, _> = serde_json::from_str("[\"A\", \"B\"]");
        assert_eq!(one.ok(), Some(RawAnswer::from("Red")));
        assert_eq!(many.ok(), Some(RawAnswer::from(vec!["A", "B"])));
        assert!(serde_json::from_str::<RawAnswer>("42").is_err());
    }

    #[test]
    fn lone_string_becomes_single_selection() {
        assert_eq!(RawAnswer::from("A").into_selections(), vec![String::from("A")]);
    }

    #[test]
    fn new_question_accepts_legacy_type_field() {
        let json = r#"{"title": "Why?", "type": "freetext"}"#;
        let parsed: Result<NewQuestion, _> = serde_json::from_str(json);
        let parsed = parsed.ok();
        assert_eq!(parsed.as_ref().map(|n| n.kind), Some(QuestionKind::FreeText));
        assert_eq!(parsed.map(|n| n.options.len()), Some(0));
    }
}
