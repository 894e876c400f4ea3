//! Error types for the Livepoll binary.

/// Top-level error for the Livepoll binary.
///
/// Wraps every failure `main` can hit so it can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: livepoll_core::config::ConfigError,
    },

    /// The HTTP server failed to bind or stopped with an error.
    #[error("server error: {source}")]
    Server {
        /// The underlying server error.
        #[from]
        source: livepoll_server::ServerError,
    },
}
