//! Role capabilities.
//!
//! Heroes differ only in which actions they roll, how often, and which
//! shared resources those actions touch. Each role implements
//! [`Capability`]; the hero dispatches through the closed [`Kit`] enum.
//!
//! Every action follows the same discipline: roll the action (and any
//! random amounts) first, then call into the store and the world, then take
//! the hero's own mutex for the hero's own bookkeeping. No lock is held
//! across a call into another structure, and no RNG survives an `.await`.

pub mod caster;
pub mod stealth;
pub mod warrior;

use std::future::Future;
use std::sync::Arc;

use guildhall_store::{SharedResourceStore, TimerService};
use guildhall_types::{EffectKind, EventCategory, Role};
use guildhall_world::{ClaimOutcome, PhaseAdvance, WorldState};
use rand::Rng;
use rand::seq::IndexedRandom;

use crate::agent::AgentCore;
use crate::effects::EffectSet;
use crate::error::AgentError;
use crate::public::PeerProfile;

pub use caster::{Caster, CasterStats};
pub use stealth::{Stealth, StealthStats};
pub use warrior::{Warrior, WarriorStats};

/// What one action did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionReport {
    /// Action name, e.g. `"Quest"`.
    pub action: &'static str,
    /// Analytics category.
    pub category: EventCategory,
    /// Narrative, without the hero's name.
    pub description: String,
}

impl ActionReport {
    /// Build a report.
    pub fn new(action: &'static str, category: EventCategory, description: impl Into<String>) -> Self {
        Self {
            action,
            category,
            description: description.into(),
        }
    }
}

/// Outcome of one hero engaging another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interaction {
    /// The other hero.
    pub peer: String,
    /// Narrative, without the acting hero's name.
    pub description: String,
}

impl Interaction {
    fn new(peer: &PeerProfile, description: impl Into<String>) -> Self {
        Self {
            peer: peer.name().to_owned(),
            description: description.into(),
        }
    }
}

/// Everything an action may touch.
#[derive(Debug, Clone, Copy)]
pub struct Turn<'a> {
    /// The acting hero.
    pub core: &'a Arc<AgentCore>,
    /// Shared resources.
    pub store: &'a SharedResourceStore,
    /// World progression.
    pub world: &'a WorldState,
    /// Profiles of every other hero.
    pub peers: &'a [PeerProfile],
}

/// Role-specific behaviour behind one interface.
pub trait Capability: Send + Sync {
    /// Display name of the role.
    fn role_name(&self) -> &'static str;

    /// Perform exactly one role action.
    fn act(&self, turn: &Turn<'_>) -> impl Future<Output = ActionReport> + Send;

    /// Engage `peer`, reading only its public profile and changing only the
    /// caller's own state.
    fn interact(&self, core: &AgentCore, peer: &PeerProfile) -> Interaction;

    /// Apply the role's transient effect and schedule its revert.
    fn special_ability(&self, core: &Arc<AgentCore>, timers: &TimerService) -> ActionReport;
}

/// Closed set of role kits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kit {
    /// Front-line fighter.
    Warrior(Warrior),
    /// Thief and scout.
    Stealth(Stealth),
    /// Spellcaster.
    Caster(Caster),
}

impl Kit {
    /// Kit for `role`.
    pub const fn for_role(role: Role) -> Self {
        match role {
            Role::Warrior => Self::Warrior(Warrior),
            Role::Stealth => Self::Stealth(Stealth),
            Role::Caster => Self::Caster(Caster),
        }
    }

    /// Display name of the role.
    pub fn role_name(self) -> &'static str {
        match self {
            Self::Warrior(kit) => kit.role_name(),
            Self::Stealth(kit) => kit.role_name(),
            Self::Caster(kit) => kit.role_name(),
        }
    }

    /// Perform one action.
    pub async fn act(self, turn: &Turn<'_>) -> ActionReport {
        match self {
            Self::Warrior(kit) => kit.act(turn).await,
            Self::Stealth(kit) => kit.act(turn).await,
            Self::Caster(kit) => kit.act(turn).await,
        }
    }

    /// Engage a peer.
    pub fn interact(self, core: &AgentCore, peer: &PeerProfile) -> Interaction {
        match self {
            Self::Warrior(kit) => kit.interact(core, peer),
            Self::Stealth(kit) => kit.interact(core, peer),
            Self::Caster(kit) => kit.interact(core, peer),
        }
    }

    /// Use the special ability.
    pub fn special_ability(self, core: &Arc<AgentCore>, timers: &TimerService) -> ActionReport {
        match self {
            Self::Warrior(kit) => kit.special_ability(core, timers),
            Self::Stealth(kit) => kit.special_ability(core, timers),
            Self::Caster(kit) => kit.special_ability(core, timers),
        }
    }
}

/// Role-specific resources, kept under the hero's own mutex.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleStats {
    /// Warrior armor and quest tally.
    Warrior(WarriorStats),
    /// Stealth level and heist tally.
    Stealth(StealthStats),
    /// Private mana reserve.
    Caster(CasterStats),
}

impl RoleStats {
    /// Starting stats for `role`.
    pub fn for_role(role: Role) -> Self {
        match role {
            Role::Warrior => Self::Warrior(WarriorStats::default()),
            Role::Stealth => Self::Stealth(StealthStats::default()),
            Role::Caster => Self::Caster(CasterStats::default()),
        }
    }

    /// Label of the headline stat shown in status reports.
    pub const fn headline_label(role: Role) -> &'static str {
        match role {
            Role::Warrior => "armor",
            Role::Stealth => "stealth",
            Role::Caster => "mana",
        }
    }

    /// Headline stat including active effect overlays.
    pub fn headline(&self, effects: &EffectSet) -> u32 {
        match self {
            Self::Warrior(stats) => stats.armor.saturating_add(effects.bonus(EffectKind::ArmorUp)),
            Self::Stealth(stats) => stats
                .stealth
                .saturating_add(effects.bonus(EffectKind::ShadowVeil)),
            Self::Caster(stats) => stats.mana,
        }
    }

    /// Flat damage reduction from base stats and protective effects.
    pub fn mitigation(&self, effects: &EffectSet) -> u32 {
        let base = match self {
            Self::Warrior(stats) => stats.armor,
            Self::Stealth(_) | Self::Caster(_) => 0,
        };
        base.saturating_add(effects.bonus(EffectKind::ArmorUp))
            .saturating_add(effects.bonus(EffectKind::ArcaneWard))
    }
}

/// Pick from a weight table.
pub(crate) fn weighted<T: Copy, R: Rng + ?Sized>(table: &[(T, u32)], rng: &mut R) -> Option<T> {
    let total = table
        .iter()
        .fold(0_u32, |acc, &(_, weight)| acc.saturating_add(weight));
    if total == 0 {
        return None;
    }
    let roll = rng.random_range(0..total);
    let mut cumulative = 0_u32;
    for &(entry, weight) in table {
        cumulative = cumulative.saturating_add(weight);
        if roll < cumulative {
            return Some(entry);
        }
    }
    None
}

/// Random step of at most `reach` on each axis.
pub(crate) fn random_step(reach: i32) -> (i32, i32) {
    let mut rng = rand::rng();
    (
        rng.random_range(-reach..=reach),
        rng.random_range(-reach..=reach),
    )
}

/// Uniform pick from `items`.
pub(crate) fn pick<T: Clone>(items: &[T]) -> Option<T> {
    items.choose(&mut rand::rng()).cloned()
}

/// Put `item` in the hero's pack, or in the shared inventory when the pack
/// is full. Returns a narrative fragment.
pub(crate) fn keep_or_share(turn: &Turn<'_>, item: String) -> String {
    match turn.core.add_to_inventory(item) {
        Ok(()) => String::from("pockets it"),
        Err(AgentError::InventoryFull { item, .. }) => {
            turn.store.inventory().add(item);
            String::from("leaves it in the shared inventory (pack full)")
        }
        Err(other) => format!("drops it ({other})"),
    }
}

/// Credit a contribution and narrate any phase it unlocked.
pub(crate) fn contribute(turn: &Turn<'_>, amount: u64) {
    let advances = turn.world.record_contribution(turn.core.name(), amount);
    narrate_advances(turn, &advances);
}

/// Narrate phase transitions this hero caused.
pub(crate) fn narrate_advances(turn: &Turn<'_>, advances: &[PhaseAdvance]) {
    for advance in advances {
        let revealed = if advance.reveals.is_empty() {
            String::from("nothing new")
        } else {
            advance.reveals.join(", ")
        };
        turn.core.announce(format!(
            "The realm enters phase {} thanks to {}! Revealed: {revealed}",
            advance.phase,
            turn.core.name()
        ));
    }
}

/// Try to claim a random unclaimed artifact.
pub(crate) fn seek_artifact(turn: &Turn<'_>) -> ActionReport {
    let Some(artifact) = pick(&turn.world.unclaimed_artifacts()) else {
        return ActionReport::new(
            "Seek Artifact",
            EventCategory::Artifact,
            "searches for artifacts but none are revealed and unclaimed",
        );
    };
    let description = match turn.world.claim_artifact(&artifact, turn.core.name()) {
        ClaimOutcome::Claimed { advances } => {
            narrate_advances(turn, &advances);
            format!("claims the {artifact}!")
        }
        ClaimOutcome::AlreadyClaimed { by } => {
            format!("reaches the {artifact} moments after {by}")
        }
        ClaimOutcome::NotRevealed => format!("chases rumours of the {artifact}"),
    };
    ActionReport::new("Seek Artifact", EventCategory::Artifact, description)
}

/// Engage a random other hero through `kit`.
pub(crate) fn rally<C: Capability + ?Sized>(kit: &C, turn: &Turn<'_>) -> ActionReport {
    let Some(peer) = pick(turn.peers) else {
        return ActionReport::new("Rally", EventCategory::Social, "looks for companions but walks alone");
    };
    let interaction = kit.interact(turn.core, &peer);
    ActionReport::new("Rally", EventCategory::Social, interaction.description)
}
