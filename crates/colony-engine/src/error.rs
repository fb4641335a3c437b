//! Error types for the engine binary.
//!
//! [`EngineError`] wraps every failure mode during startup and the run, so
//! `main` can propagate with `?`.

/// Top-level error for the engine binary.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: colony_core::config::ConfigError,
    },

    /// The clock rejected its configuration or failed to seed.
    #[error("clock error: {source}")]
    Clock {
        /// The underlying clock error.
        #[from]
        source: colony_core::clock::ClockError,
    },

    /// The command loop failed.
    #[error("runner error: {source}")]
    Runner {
        /// The underlying runner error.
        #[from]
        source: colony_core::runner::RunnerError,
    },

    /// The stdin reader thread could not be started.
    #[error("input error: {source}")]
    Input {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },
}
