//! Shared application state for the Livepoll server.
//!
//! [`AppState`] wraps the one [`SessionCoordinator`] in a
//! [`tokio::sync::Mutex`]. Every connection handler takes the lock for the
//! whole of one action (mutation plus broadcast), which gives the
//! run-to-completion discipline the session relies on.

use std::sync::Arc;

use livepoll_core::config::SessionConfig;
use livepoll_core::{SessionCoordinator, SessionError, Subscription};
use livepoll_types::{ClientEvent, Scope, ServerEvent};
use tokio::sync::Mutex;

/// Shared state for the Axum application.
///
/// Wrapped in [`Arc`] and injected via Axum's `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The live session. Hold the lock for one action at a time.
    pub session: Arc<Mutex<SessionCoordinator>>,
}

impl AppState {
    /// Create state around a fresh, empty session.
    pub fn new(config: SessionConfig) -> Self {
        Self::with_session(SessionCoordinator::new(config))
    }

    /// Create state around an existing session.
    pub fn with_session(session: SessionCoordinator) -> Self {
        Self {
            session: Arc::new(Mutex::new(session)),
        }
    }

    /// Subscribe a new connection and collect its catch-up events.
    pub async fn connect(&self, scope: Scope) -> Subscription {
        self.session.lock().await.connect(scope)
    }

    /// Run one client action to completion under the session lock.
    ///
    /// # Errors
    ///
    /// Propagates the [`SessionError`] of the refused action.
    pub async fn dispatch(
        &self,
        scope: Scope,
        event: ClientEvent,
    ) -> Result<Option<ServerEvent>, SessionError> {
        self.session.lock().await.dispatch(scope, event)
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}
