//! Autonomous heroes for the Guildhall simulation.
//!
//! A hero owns its private state behind one mutex, publishes a lock-free
//! view of it, and runs an independent act-then-sleep loop that reaches the
//! rest of the game only through the shared store and the world.
//!
//! # Modules
//!
//! - [`agent`] -- [`Agent`] and [`AgentCore`]: state, loop, control surface.
//! - [`roles`] -- The [`Capability`] interface and the Warrior, Stealth and
//!   Caster kits.
//! - [`effects`] -- Transient ability overlays.
//! - [`public`] -- Lock-free [`PublicState`] and [`PeerProfile`].
//! - [`inventory`] -- Private, optionally capped inventory.
//! - [`config`] -- [`AgentConfig`] and role defaults.
//! - [`roster`] -- Party assembly with duplicate-name rejection.
//! - [`error`] -- [`AgentError`].

pub mod agent;
pub mod config;
pub mod effects;
pub mod error;
pub mod inventory;
pub mod public;
pub mod roles;
pub mod roster;

pub use agent::{Agent, AgentCore, AgentDeps};
pub use config::{AgentConfig, DEFAULT_EFFECT_DURATION, DEFAULT_LURK_TIMEOUT, default_interval, default_max_health};
pub use effects::{ActiveEffect, EffectSet};
pub use error::AgentError;
pub use inventory::Inventory;
pub use public::{PeerProfile, PublicState};
pub use roles::{ActionReport, Capability, Interaction, Kit, RoleStats};
pub use roster::assemble_party;
