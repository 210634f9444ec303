//! Enumeration types for the Guildhall simulation.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Roles
// ---------------------------------------------------------------------------

/// The closed set of hero roles.
///
/// A role decides which actions a hero picks, how long it waits between
/// actions, and which shared resources it touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Front-line fighter: quests, fights, guards the vault.
    Warrior,
    /// Thief: pilfers the vault, scavenges loot, stashes goods.
    Stealth,
    /// Spellcaster: spends and restores mana.
    Caster,
}

impl Role {
    /// All roles, in declaration order.
    pub const ALL: [Self; 3] = [Self::Warrior, Self::Stealth, Self::Caster];

    /// Human-readable role name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Warrior => "Warrior",
            Self::Stealth => "Stealth",
            Self::Caster => "Caster",
        }
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Analytics categories
// ---------------------------------------------------------------------------

/// Category of an analytics event emitted by a hero or the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventCategory {
    /// A hero moved.
    Movement,
    /// Damage dealt or received.
    Combat,
    /// A quest completed.
    Quest,
    /// Gold taken from the vault.
    Theft,
    /// Loot taken from the loot queue or stashed.
    Loot,
    /// Mana spent, restored or regenerated.
    Magic,
    /// A trading post transaction.
    Trade,
    /// A special ability was used.
    Ability,
    /// An artifact was claimed.
    Artifact,
    /// Two heroes interacted.
    Social,
    /// A world event fired.
    World,
    /// A hero started, stopped, or fell.
    Lifecycle,
}

// ---------------------------------------------------------------------------
// Effects
// ---------------------------------------------------------------------------

/// Transient ability effects that expire after a fixed delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectKind {
    /// Warrior armor bonus.
    ArmorUp,
    /// Stealth level bonus.
    ShadowVeil,
    /// Caster damage ward.
    ArcaneWard,
}

impl EffectKind {
    /// Human-readable effect name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::ArmorUp => "Armor Up",
            Self::ShadowVeil => "Shadow Veil",
            Self::ArcaneWard => "Arcane Ward",
        }
    }
}

// ---------------------------------------------------------------------------
// Supervisor lifecycle
// ---------------------------------------------------------------------------

/// Lifecycle state of the supervisor.
///
/// `Created -> Running -> (Paused <-> Running)* -> Ending -> Ended`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineState {
    /// Constructed, no task launched yet.
    Created,
    /// Hero tasks and background tasks are running.
    Running,
    /// Hero tasks have been stopped; background tasks wait on the pause gate.
    Paused,
    /// Shutdown in progress.
    Ending,
    /// Shutdown complete; terminal.
    Ended,
}

impl core::fmt::Display for EngineState {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let label = match self {
            Self::Created => "created",
            Self::Running => "running",
            Self::Paused => "paused",
            Self::Ending => "ending",
            Self::Ended => "ended",
        };
        f.write_str(label)
    }
}

/// Why the realm was lost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefeatReason {
    /// Corruption reached 100.
    CorruptionOverwhelmed,
    /// Stability dropped to 0.
    StabilityCollapsed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_names() {
        assert_eq!(Role::Warrior.to_string(), "Warrior");
        assert_eq!(Role::Stealth.name(), "Stealth");
        assert_eq!(Role::ALL.len(), 3);
    }

    #[test]
    fn role_serializes_snake_case() {
        let json = serde_json::to_string(&Role::Caster).unwrap_or_default();
        assert_eq!(json, "\"caster\"");
        let parsed: Result<Role, _> = serde_json::from_str("\"stealth\"");
        assert!(matches!(parsed, Ok(Role::Stealth)));
    }

    #[test]
    fn engine_state_display() {
        assert_eq!(EngineState::Paused.to_string(), "paused");
        assert_eq!(EngineState::Ended.to_string(), "ended");
    }
}
