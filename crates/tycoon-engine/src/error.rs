//! Error types for the game server binary.
//!
//! [`EngineError`] is the top-level error type that wraps all possible
//! failure modes during startup and shutdown.

/// Top-level error for the game server binary.
///
/// Each variant wraps a specific subsystem error, providing a single
/// error type that `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: tycoon_core::config::ConfigError,
    },

    /// Connecting, migrating, loading or saving failed.
    #[error("database error: {source}")]
    Database {
        /// The underlying database error.
        #[from]
        source: tycoon_db::DbError,
    },

    /// The action API could not bind or stopped serving.
    #[error("server error: {source}")]
    Server {
        /// The underlying server error.
        #[from]
        source: tycoon_api::ServerError,
    },

    /// A background task panicked or was cancelled.
    #[error("task error: {source}")]
    Task {
        /// The underlying join error.
        #[from]
        source: tokio::task::JoinError,
    },

    /// Installing the signal handler failed.
    #[error("signal error: {source}")]
    Signal {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },
}
