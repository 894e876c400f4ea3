//! Shared type definitions for the Livepoll session server.
//!
//! This crate is the single source of truth for every type that crosses the
//! wire. Types defined here flow downstream to `TypeScript` via `ts-rs` for
//! the operator, viewer and respondent front ends.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers for entity identifiers
//! - [`enums`] -- Question kinds and audience scopes
//! - [`structs`] -- Questions, tallies, raw answers and result projections
//! - [`events`] -- Client and server event tagged unions

pub mod enums;
pub mod events;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{QuestionKind, Scope};
pub use events::{ClientEvent, ServerEvent};
pub use ids::QuestionId;
pub use structs::{NewQuestion, Question, RawAnswer, ResultsPayload, Tally};
