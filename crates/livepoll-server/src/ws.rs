//! `WebSocket` handler for operator, viewer and respondent connections.
//!
//! Clients connect to `GET /ws?role=<scope>` where the scope is `operator`,
//! `viewer` or `respondent` (the default when `role` is absent). The scope is
//! fixed for the lifetime of the connection.
//!
//! After the upgrade the handler subscribes to the scope's broadcast channel,
//! sends the catch-up events, and then does two things concurrently:
//!
//! - forwards every broadcast [`ServerEvent`] as a JSON text frame;
//! - decodes every inbound text frame as a [`ClientEvent`], runs it against
//!   the session, and replies to this connection only when there is a direct
//!   reply or the action was refused (`action-rejected`).
//!
//! If a client falls behind, lagged broadcast messages are skipped and the
//! client resumes from the oldest retained event.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Query, State, WebSocketUpgrade};
use axum::response::IntoResponse;
use livepoll_core::Subscription;
use livepoll_types::{ClientEvent, Scope, ServerEvent};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, warn};

use crate::state::AppState;

/// Query parameters accepted on the upgrade request.
#[derive(Debug, Default, serde::Deserialize)]
pub struct ConnectParams {
    /// Audience scope of the connection.
    #[serde(default)]
    pub role: Scope,
}

/// Upgrade an HTTP request to a `WebSocket` session for the requested scope.
///
/// # Route
///
/// `GET /ws?role=operator|viewer|respondent`
pub async fn ws_session(
    ws: WebSocketUpgrade,
    Query(params): Query<ConnectParams>,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let scope = params.role;
    ws.on_upgrade(move |socket| handle_ws(socket, state, scope))
}

/// Handle the `WebSocket` lifecycle for one connection.
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>, scope: Scope) {
    debug!(%scope, "WebSocket client connected");

    let Subscription {
        mut receiver,
        catch_up,
    } = state.connect(scope).await;

    for event in &catch_up {
        if send_event(&mut socket, event).await.is_err() {
            debug!(%scope, "WebSocket client disconnected during catch-up");
            return;
        }
    }

    loop {
        tokio::select! {
            // Receive a broadcast for this scope.
            result = receiver.recv() => {
                match result {
                    Ok(event) => {
                        if send_event(&mut socket, &event).await.is_err() {
                            debug!(%scope, "WebSocket client disconnected (send failed)");
                            return;
                        }
                    }
                    Err(RecvError::Lagged(n)) => {
                        debug!(%scope, skipped = n, "WebSocket client lagged, skipping ahead");
                    }
                    Err(RecvError::Closed) => {
                        debug!("Broadcast channel closed, shutting down WebSocket");
                        return;
                    }
                }
            }
            // Handle an inbound frame from the client.
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        if let Some(reply) = handle_frame(&state, scope, text.as_str()).await {
                            if send_event(&mut socket, &reply).await.is_err() {
                                debug!(%scope, "WebSocket client disconnected (reply failed)");
                                return;
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        debug!(%scope, "WebSocket client disconnected");
                        return;
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if socket.send(Message::Pong(data)).await.is_err() {
                            debug!(%scope, "WebSocket client disconnected (pong failed)");
                            return;
                        }
                    }
                    Some(Err(e)) => {
                        debug!(%scope, "WebSocket error: {e}");
                        return;
                    }
                    _ => {
                        // Binary and pong frames carry nothing for us.
                    }
                }
            }
        }
    }
}

/// Decode one text frame and run it against the session.
///
/// Returns the event to send back to this connection only: the direct
/// reply of the action, or `action-rejected` when the frame is malformed
/// or the action was refused. State is never touched for a rejected frame.
pub async fn handle_frame(state: &AppState, scope: Scope, text: &str) -> Option<ServerEvent> {
    let event = match serde_json::from_str::<ClientEvent>(text) {
        Ok(event) => event,
        Err(e) => {
            let action = event_name(text);
            warn!(%scope, action = %action, error = %e, "malformed client event");
            return Some(ServerEvent::ActionRejected {
                action,
                reason: format!("malformed event: {e}"),
            });
        }
    };

    let action = event.name();
    match state.dispatch(scope, event).await {
        Ok(reply) => reply,
        Err(e) => {
            warn!(%scope, action, error = %e, "action rejected");
            Some(ServerEvent::ActionRejected {
                action: action.to_owned(),
                reason: e.to_string(),
            })
        }
    }
}

/// Best-effort extraction of the `event` name from an undecodable frame.
fn event_name(text: &str) -> String {
    serde_json::from_str::<serde_json::Value>(text)
        .ok()
        .and_then(|v| v.get("event").and_then(serde_json::Value::as_str).map(str::to_owned))
        .unwrap_or_else(|| String::from("unknown"))
}

/// Serialize and send one event. Serialization failures are logged and
/// skipped; only transport failures are returned.
async fn send_event(socket: &mut WebSocket, event: &ServerEvent) -> Result<(), axum::Error> {
    let json = match serde_json::to_string(event) {
        Ok(j) => j,
        Err(e) => {
            warn!(event = event.name(), "Failed to serialize server event: {e}");
            return Ok(());
        }
    };
    socket.send(Message::Text(json.into())).await
}
