//! Axum router construction for the Livepoll server.
//!
//! Assembles all routes (REST + `WebSocket`) into a single [`Router`]
//! with CORS middleware enabled for cross-origin front ends.

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;
use crate::ws;

/// Build the complete Axum router for the Livepoll server.
///
/// The router includes:
/// - `GET /` -- minimal HTML status page
/// - `GET /ws` -- `WebSocket` session (`?role=operator|viewer|respondent`)
/// - `GET /api/status` -- session status
/// - `GET /api/questions` -- list questions
/// - `GET /api/questions/{id}` -- single question
///
/// CORS is configured to allow any origin. Access control is left to
/// whatever sits in front of the server.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Status page
        .route("/", get(handlers::index))
        // WebSocket
        .route("/ws", get(ws::ws_session))
        // REST API
        .route("/api/status", get(handlers::status))
        .route("/api/questions", get(handlers::list_questions))
        .route("/api/questions/{id}", get(handlers::get_question))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
