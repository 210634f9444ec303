//! Per-hero configuration.
//!
//! The supervisor builds one [`AgentConfig`] per roster entry of
//! `guildhall-config.yaml`; tests build them with [`AgentConfig::new`] and
//! struct update syntax.

use std::time::Duration;

use guildhall_types::{Position, Role};

/// Default lifetime of a special ability effect.
pub const DEFAULT_EFFECT_DURATION: Duration = Duration::from_secs(6);

/// Default bound on a Lurk's wait for loot.
pub const DEFAULT_LURK_TIMEOUT: Duration = Duration::from_secs(3);

/// Default pause between two actions of a hero with `role`.
pub const fn default_interval(role: Role) -> Duration {
    match role {
        Role::Warrior => Duration::from_millis(2000),
        Role::Stealth => Duration::from_millis(1500),
        Role::Caster => Duration::from_millis(2500),
    }
}

/// Default maximum health of a hero with `role`.
pub const fn default_max_health(role: Role) -> u32 {
    match role {
        Role::Warrior => 120,
        Role::Stealth => 90,
        Role::Caster => 80,
    }
}

/// Everything needed to construct one hero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentConfig {
    /// Unique name within the party.
    pub name: String,
    /// Role, fixed for the hero's lifetime.
    pub role: Role,
    /// Maximum (and starting) health.
    pub max_health: u32,
    /// Starting position.
    pub start: Position,
    /// Private inventory slots; `None` means unbounded.
    pub inventory_capacity: Option<usize>,
    /// Pause between two actions.
    pub interval: Duration,
    /// How long a special ability lasts.
    pub effect_duration: Duration,
    /// Longest a Lurk waits for loot.
    pub lurk_timeout: Duration,
}

impl AgentConfig {
    /// Role defaults for a hero called `name`.
    pub fn new(name: impl Into<String>, role: Role) -> Self {
        Self {
            name: name.into(),
            role,
            max_health: default_max_health(role),
            start: Position::default(),
            inventory_capacity: None,
            interval: default_interval(role),
            effect_duration: DEFAULT_EFFECT_DURATION,
            lurk_timeout: DEFAULT_LURK_TIMEOUT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_defaults() {
        let warrior = AgentConfig::new("Aldric", Role::Warrior);
        assert_eq!(warrior.interval, Duration::from_millis(2000));
        assert_eq!(warrior.max_health, 120);
        assert_eq!(AgentConfig::new("Vex", Role::Stealth).interval, Duration::from_millis(1500));
        assert_eq!(AgentConfig::new("Mira", Role::Caster).interval, Duration::from_millis(2500));
    }
}
