//! Serializable views of a run for the console and for tests.

use guildhall_events::StatsSummary;
use guildhall_types::{AgentSnapshot, EngineState, StoreSnapshot, WorldStatus};
use serde::{Deserialize, Serialize};

use crate::control::EndReason;

/// JSON-serializable status of a run.
///
/// Each part is read under its own primitive while heroes keep acting, so
/// the parts are individually consistent but not taken at one instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationStatus {
    /// Supervisor lifecycle state.
    pub state: EngineState,
    /// Whether background tasks are held.
    pub paused: bool,
    /// Whether a stop has been requested.
    pub stop_requested: bool,
    /// Elapsed wall-clock seconds since start.
    pub elapsed_seconds: u64,
    /// Configured maximum real-time seconds (0 = unlimited).
    pub max_real_time_seconds: u64,
    /// ISO 8601 timestamp of when the run started, once started.
    pub started_at: Option<String>,
    /// Number of heroes still standing.
    pub heroes_alive: usize,
    /// Every hero, in roster order.
    pub heroes: Vec<AgentSnapshot>,
    /// World progression.
    pub world: WorldStatus,
    /// Shared resources.
    pub store: StoreSnapshot,
    /// Narrative events logged so far.
    pub chronicle_total: u64,
    /// The reason the run ended, if applicable.
    pub end_reason: Option<EndReason>,
}

/// Everything [`Supervisor::shutdown`](crate::Supervisor::shutdown) learned
/// while tearing the run down.
#[derive(Debug, Clone, Serialize)]
pub struct ShutdownReport {
    /// Status after every task has been joined or aborted.
    pub status: SimulationStatus,
    /// Action counts per category and per hero.
    pub stats: StatsSummary,
    /// Tasks that missed the shutdown timeout and were aborted.
    pub lagging: Vec<String>,
    /// Deferred callbacks (restocks, effect reverts) cancelled unfired.
    pub cancelled_timers: usize,
}
