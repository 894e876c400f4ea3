//! Livepoll server binary.
//!
//! Hosts a single live polling session: an operator manages questions,
//! respondents submit answers, and viewers watch results update in real
//! time over `WebSocket`.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `livepoll-config.yaml` (defaults if absent)
//! 2. Initialize structured logging (tracing)
//! 3. Create the session state
//! 4. Serve HTTP + `WebSocket` until `Ctrl-C`

mod error;

use std::path::Path;
use std::sync::Arc;

use livepoll_core::config::PollConfig;
use livepoll_server::{AppState, ServerConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::AppError;

const CONFIG_PATH: &str = "livepoll-config.yaml";

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let config = PollConfig::load_or_default(Path::new(CONFIG_PATH))?;

    // RUST_LOG wins over the configured level.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with_target(true)
        .init();

    info!(
        host = config.server.host,
        port = config.server.port,
        require_active_question = config.session.require_active_question,
        count_empty_free_text = config.session.count_empty_free_text,
        broadcast_capacity = config.session.broadcast_capacity,
        "Configuration loaded"
    );

    let server_config = ServerConfig {
        host: config.server.host.clone(),
        port: config.server.port,
    };
    let state = Arc::new(AppState::new(config.session));

    livepoll_server::start_server(&server_config, state).await?;

    info!("livepoll stopped");
    Ok(())
}
