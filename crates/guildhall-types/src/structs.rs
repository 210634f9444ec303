//! Core data structs shared across the Guildhall workspace.
//!
//! Snapshot types in this module are plain owned data: they are produced by
//! the owning component under its own synchronization and can be serialized
//! or printed without holding any lock.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::enums::{DefeatReason, EventCategory, Role};
use crate::ids::EventId;

// ---------------------------------------------------------------------------
// Position
// ---------------------------------------------------------------------------

/// Integer grid position of a hero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    /// Horizontal coordinate.
    pub x: i32,
    /// Vertical coordinate.
    pub y: i32,
}

impl Position {
    /// Create a position from coordinates.
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Return this position moved by `(dx, dy)`, saturating at the `i32` range.
    #[must_use]
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x.saturating_add(dx),
            y: self.y.saturating_add(dy),
        }
    }
}

impl core::fmt::Display for Position {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

// ---------------------------------------------------------------------------
// Analytics
// ---------------------------------------------------------------------------

/// A structured record of something a hero (or the world) did.
///
/// Delivered fire-and-forget to an analytics sink; the producer never waits
/// for a response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyticsEvent {
    /// Unique record identifier.
    pub id: EventId,
    /// Name of the hero (or `"world"`) that produced the event.
    pub actor: String,
    /// Coarse classification used for aggregation.
    pub category: EventCategory,
    /// Free-form description.
    pub description: String,
    /// When the event was produced.
    pub timestamp: DateTime<Utc>,
}

impl AnalyticsEvent {
    /// Create a record stamped with a fresh id and the current time.
    pub fn new(actor: impl Into<String>, category: EventCategory, description: impl Into<String>) -> Self {
        Self {
            id: EventId::new(),
            actor: actor.into(),
            category,
            description: description.into(),
            timestamp: Utc::now(),
        }
    }

    /// Serialize the record as a single JSON line.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

// ---------------------------------------------------------------------------
// Snapshots
// ---------------------------------------------------------------------------

/// Point-in-time view of one hero, assembled from lock-free getters.
///
/// Each field is individually consistent; fields may come from slightly
/// different instants while the hero keeps acting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentSnapshot {
    /// Hero name.
    pub name: String,
    /// Hero role.
    pub role: Role,
    /// Current health.
    pub health: u32,
    /// Maximum health.
    pub max_health: u32,
    /// Whether the hero is alive.
    pub alive: bool,
    /// Whether the hero's loop is allowed to run.
    pub active: bool,
    /// Current position.
    pub position: Position,
    /// Number of items in the private inventory.
    pub inventory_len: usize,
    /// Label of the role-specific headline stat (e.g. `"mana"`).
    pub headline_label: String,
    /// Value of the role-specific headline stat.
    pub headline_value: u32,
}

/// Point-in-time view of the shared resources.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreSnapshot {
    /// Vault balances per resource kind.
    pub vault: BTreeMap<String, u64>,
    /// Current mana pool level.
    pub mana_pool: u64,
    /// Items waiting in the loot queue.
    pub loot_queued: usize,
    /// Loot queue capacity.
    pub loot_capacity: usize,
    /// Items in the shared inventory, in insertion order.
    pub shared_inventory: Vec<String>,
    /// Trading post items currently available.
    pub items_for_sale: Vec<String>,
    /// Trading post items sold and awaiting restock, with their buyer.
    pub sold_items: BTreeMap<String, String>,
}

/// Claim status of one revealed artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactStatus {
    /// Artifact name.
    pub name: String,
    /// Hero that claimed it, if any.
    pub claimed_by: Option<String>,
}

/// Final outcome of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Outcome {
    /// Every artifact was recovered in the final phase.
    Victory {
        /// Hero with the highest contribution.
        champion: String,
    },
    /// The realm fell.
    Defeat {
        /// Why the realm fell.
        reason: DefeatReason,
    },
}

/// Point-in-time view of world progression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldStatus {
    /// Stability, 0--100.
    pub stability: u32,
    /// Corruption, 0--100.
    pub corruption: u32,
    /// Current phase, 1--3.
    pub phase: u8,
    /// Contribution per hero.
    pub contributions: BTreeMap<String, u64>,
    /// Revealed artifacts and their claimants.
    pub artifacts: Vec<ArtifactStatus>,
    /// Outcome, once decided.
    pub outcome: Option<Outcome>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_offset_saturates() {
        let p = Position::new(i32::MAX, 0).offset(1, -1);
        assert_eq!(p, Position::new(i32::MAX, -1));
        assert_eq!(p.to_string(), format!("({}, -1)", i32::MAX));
    }

    #[test]
    fn analytics_event_serializes() {
        let event = AnalyticsEvent::new("Aldric", EventCategory::Quest, "completed a quest");
        let json = event.to_json().unwrap_or_default();
        assert!(json.contains("\"actor\":\"Aldric\""));
        assert!(json.contains("\"category\":\"quest\""));

        let parsed: Result<AnalyticsEvent, _> = serde_json::from_str(&json);
        assert!(matches!(parsed, Ok(ref e) if e.id == event.id));
    }

    #[test]
    fn outcome_is_tagged() {
        let outcome = Outcome::Defeat {
            reason: DefeatReason::CorruptionOverwhelmed,
        };
        let json = serde_json::to_string(&outcome).unwrap_or_default();
        assert_eq!(json, r#"{"kind":"defeat","reason":"corruption_overwhelmed"}"#);
    }
}
