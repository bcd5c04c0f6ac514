//! Error types for the episode engine binary.

/// Top-level error for the engine binary.
///
/// Every startup or run failure converts into this so `main` can use `?`.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: wayfarer_core::ConfigError,
    },

    /// The episode could not be created or aborted mid-run.
    #[error("episode error: {source}")]
    Episode {
        /// The underlying episode error.
        #[from]
        source: wayfarer_core::EpisodeError,
    },

    /// The HTTP decision policy could not be built.
    #[error("policy error: {message}")]
    Policy {
        /// Description of the failure.
        message: String,
    },

    /// Observer API server failed to start.
    #[error("observer error: {source}")]
    Observer {
        /// The underlying server error.
        #[from]
        source: wayfarer_observer::ServerError,
    },
}
