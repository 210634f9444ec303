//! Error types for the supervisor.

use guildhall_agents::AgentError;
use guildhall_store::StoreError;
use guildhall_types::EngineState;

use crate::config::ConfigError;

/// Errors returned by [`Supervisor`](crate::Supervisor) operations.
#[derive(Debug, thiserror::Error)]
pub enum SupervisorError {
    /// The requested lifecycle operation is not allowed from the current
    /// state.
    #[error("cannot {action} while {from}")]
    InvalidTransition {
        /// State the supervisor was in.
        from: EngineState,
        /// Operation that was refused.
        action: &'static str,
    },

    /// The configuration cannot drive a simulation.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: ConfigError,
    },

    /// The party could not be assembled.
    #[error("agent error: {source}")]
    Agent {
        /// The underlying agent error.
        #[from]
        source: AgentError,
    },

    /// The shared store could not be built.
    #[error("store error: {source}")]
    Store {
        /// The underlying store error.
        #[from]
        source: StoreError,
    },
}
