//! Error types for the `quakeview` binary.
//!
//! [`EngineError`] wraps every failure that can end a command, so `main`
//! can propagate with `?`.

/// Top-level error for the `quakeview` binary.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: quakeview_core::config::ConfigError,
    },

    /// The configured or requested filter is invalid.
    #[error("filter error: {source}")]
    Filter {
        /// The underlying filter error.
        #[from]
        source: quakeview_filter::FilterError,
    },

    /// The event catalogue could not be loaded.
    #[error("catalogue error: {source}")]
    Store {
        /// The underlying store error.
        #[from]
        source: quakeview_store::StoreError,
    },

    /// Writing command output failed.
    #[error("output error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// An event could not be encoded as JSON.
    #[error("JSON error: {source}")]
    Json {
        /// The underlying serialization error.
        #[from]
        source: serde_json::Error,
    },

    /// A background task panicked or was cancelled.
    #[error("task error: {source}")]
    Task {
        /// The underlying join error.
        #[from]
        source: tokio::task::JoinError,
    },
}
