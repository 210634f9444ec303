//! Supervising engine for the Guildhall hero simulation.
//!
//! A [`Supervisor`] owns one run: the shared store, the world, the party of
//! heroes, and three background tasks (loot generator, world-event
//! generator, monitor). It moves through
//! `Created -> Running -> (Paused <-> Running)* -> Ending -> Ended` and can be
//! observed at any point through [`Supervisor::status`].
//!
//! # Modules
//!
//! - [`config`] -- `guildhall-config.yaml` loading and validation
//! - [`control`] -- pause gate, stop flag and end reason shared with the
//!   background tasks
//! - [`supervisor`] -- the lifecycle state machine
//! - [`status`] -- serializable status and shutdown reports
//! - [`error`] -- [`SupervisorError`]

pub mod config;
pub mod control;
pub mod error;
mod generators;
mod monitor;
pub mod status;
pub mod supervisor;

pub use config::{ConfigError, SimulationConfig};
pub use control::{ControlState, EndReason};
pub use error::SupervisorError;
pub use status::{ShutdownReport, SimulationStatus};
pub use supervisor::Supervisor;
