//! Error types for the Guildhall engine binary.
//!
//! [`EngineError`] is the top-level error type that wraps all possible
//! failure modes during startup and the console loop.

use guildhall_core::{ConfigError, SupervisorError};

/// Top-level error for the engine binary.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: ConfigError,
    },

    /// A supervisor operation failed.
    #[error("supervisor error: {source}")]
    Supervisor {
        /// The underlying supervisor error.
        #[from]
        source: SupervisorError,
    },

    /// Reading the console failed.
    #[error("console I/O error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Status could not be rendered as JSON.
    #[error("status encoding error: {source}")]
    Json {
        /// The underlying serialization error.
        #[from]
        source: serde_json::Error,
    },

    /// The operator typed something that is not a command.
    #[error("unknown command {input:?} (type `help` for the list)")]
    UnknownCommand {
        /// What was typed.
        input: String,
    },
}
