//! World progression for the Guildhall hero simulation.
//!
//! The world is a handful of global counters that every hero nudges:
//! stability and corruption drift with hero actions and random events,
//! combined contribution pushes the realm through three phases, and each
//! phase reveals artifacts that heroes race to claim.
//!
//! # Modules
//!
//! - [`state`] -- [`WorldState`] and its locking discipline.
//! - [`events`] -- Weighted random [`WorldEvent`]s.
//! - [`settings`] -- [`WorldSettings`] with validation.
//! - [`error`] -- [`WorldError`] for rejected settings.

pub mod error;
pub mod events;
pub mod settings;
pub mod state;

pub use error::WorldError;
pub use events::WorldEvent;
pub use settings::{PhaseThreshold, WorldSettings};
pub use state::{ClaimOutcome, FINAL_PHASE, FIRST_PHASE, MAX_LEVEL, PhaseAdvance, WorldState};
