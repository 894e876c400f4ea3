//! Session state machine and broadcast protocol for Livepoll.
//!
//! This crate owns everything with real invariants: which questions exist,
//! how answers are counted, which single question is active, and who gets
//! told about each change. It performs no I/O; transport adapters feed it
//! decoded [`ClientEvent`]s and forward the [`ServerEvent`]s it publishes.
//!
//! # Modules
//!
//! - [`registry`] -- Insertion-ordered question store with creation
//!   validation.
//! - [`aggregator`] -- Kind-specific counting rules for one submission.
//! - [`session`] -- [`SessionCoordinator`], the active-question state
//!   machine and protocol dispatcher.
//! - [`broadcast`] -- [`Audience`], per-scope fan-out and late-join
//!   catch-up.
//! - [`config`] -- Configuration loading from `livepoll-config.yaml`.
//! - [`error`] -- Validation, answer and session errors.
//!
//! [`ClientEvent`]: livepoll_types::ClientEvent
//! [`ServerEvent`]: livepoll_types::ServerEvent
//! [`SessionCoordinator`]: session::SessionCoordinator
//! [`Audience`]: broadcast::Audience

pub mod aggregator;
pub mod broadcast;
pub mod config;
pub mod error;
pub mod registry;
pub mod session;

pub use error::{AnswerError, SessionError, ValidationError};
pub use session::{ActiveQuestion, SessionCoordinator, Subscription};
