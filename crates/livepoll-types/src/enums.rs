//! Enumeration types for the Livepoll session.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Question kinds
// ---------------------------------------------------------------------------

/// The kind of a question, fixed at creation.
///
/// The kind selects the counting rule the aggregator applies to each
/// submission. Legacy wire names (`single`, `multiple`, `freetext`) are
/// accepted on input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "kebab-case")]
#[ts(export, export_to = "bindings/")]
pub enum QuestionKind {
    /// Exactly one option per submission.
    #[serde(alias = "single")]
    SingleChoice,
    /// One or more options per submission.
    #[serde(alias = "multiple")]
    MultipleChoice,
    /// Free text, tallied per lower-cased word.
    #[serde(alias = "freetext")]
    FreeText,
}

impl QuestionKind {
    /// Whether questions of this kind need a list of at least two options.
    pub const fn requires_options(self) -> bool {
        matches!(self, Self::SingleChoice | Self::MultipleChoice)
    }

    /// Wire name of this kind.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SingleChoice => "single-choice",
            Self::MultipleChoice => "multiple-choice",
            Self::FreeText => "free-text",
        }
    }
}

impl core::fmt::Display for QuestionKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Audience scopes
// ---------------------------------------------------------------------------

/// Audience category declared once by a connection at setup time.
///
/// The scope decides which server events a connection receives and which
/// client actions it may perform.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum Scope {
    /// The person running the poll. Sees everything and drives the session.
    #[serde(alias = "admin")]
    Operator,
    /// A read-only results display.
    Viewer,
    /// Anyone answering questions. Never sees tallies.
    #[default]
    Respondent,
}

impl Scope {
    /// Every scope, in broadcast order.
    pub const ALL: [Self; 3] = [Self::Operator, Self::Viewer, Self::Respondent];

    /// Wire name of this scope.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Operator => "operator",
            Self::Viewer => "viewer",
            Self::Respondent => "respondent",
        }
    }
}

impl core::fmt::Display for Scope {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}
