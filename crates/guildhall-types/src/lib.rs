//! Shared type definitions for the Guildhall hero simulation.
//!
//! This crate is the single source of truth for the plain data types that
//! cross crate boundaries: hero roles, positions, analytics records and the
//! status snapshots the supervisor hands to the outside world.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers for event identifiers
//! - [`enums`] -- Enumeration types (roles, event categories, effects, lifecycle)
//! - [`structs`] -- Positions, analytics records and status snapshots
//! - [`sync`] -- Poison-tolerant helpers for `std::sync` locks

pub mod enums;
pub mod ids;
pub mod structs;
pub mod sync;

// Re-export all public types at crate root for convenience.
pub use enums::{DefeatReason, EffectKind, EngineState, EventCategory, Role};
pub use ids::EventId;
pub use structs::{
    AgentSnapshot, AnalyticsEvent, ArtifactStatus, Outcome, Position, StoreSnapshot, WorldStatus,
};
