//! HTTP and `WebSocket` adapter for the Livepoll session.
//!
//! This crate provides an Axum server that exposes:
//!
//! - **`WebSocket` endpoint** (`/ws?role=...`) carrying the poll event
//!   protocol. Each connection declares its audience scope once and then
//!   receives that scope's broadcasts via [`tokio::sync::broadcast`].
//! - **REST endpoints** for read-only session views (status, questions).
//! - **Minimal HTML status page** (`GET /`).
//!
//! # Architecture
//!
//! The server holds one [`SessionCoordinator`] behind a mutex in
//! [`AppState`]. Each inbound action takes the lock, mutates and broadcasts,
//! then releases it, so actions from different connections never
//! interleave. Connections receive events through per-scope broadcast
//! channels with automatic lag handling.
//!
//! [`SessionCoordinator`]: livepoll_core::SessionCoordinator

pub mod error;
pub mod handlers;
pub mod router;
pub mod server;
pub mod state;
pub mod ws;

// Re-export primary types for convenience.
pub use router::build_router;
pub use server::{ServerConfig, ServerError, serve, start_server};
pub use state::AppState;
