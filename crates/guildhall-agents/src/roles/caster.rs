//! Caster: spends a private mana reserve, topped up from the shared pool.

use std::sync::Arc;

use guildhall_store::TimerService;
use guildhall_types::{EffectKind, EventCategory, Role};
use rand::Rng;

use super::{
    ActionReport, Capability, Interaction, RoleStats, Turn, contribute, keep_or_share, rally,
    seek_artifact, weighted,
};
use crate::agent::AgentCore;
use crate::public::PeerProfile;

/// Private mana recovered by meditating.
const MEDITATE_REGEN: u32 = 15;
/// Private mana spent per spell.
const SPELL_COST: u32 = 30;
/// Contribution for a purifying spell.
const CAST_CONTRIBUTION: u64 = 6;
/// Contribution for an enchanted item.
const ENCHANT_CONTRIBUTION: u64 = 4;
/// Private mana gained when attuning with another caster.
const ATTUNE_BONUS: u32 = 5;

#[derive(Debug, Clone, Copy)]
enum Action {
    Meditate,
    Cast,
    Channel,
    ArcaneWard,
    Enchant,
    SeekArtifact,
    Rally,
}

const ACTIONS: [(Action, u32); 7] = [
    (Action::Meditate, 20),
    (Action::Cast, 20),
    (Action::Channel, 15),
    (Action::ArcaneWard, 10),
    (Action::Enchant, 15),
    (Action::SeekArtifact, 10),
    (Action::Rally, 10),
];

/// Caster resources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CasterStats {
    /// Private mana.
    pub mana: u32,
    /// Private mana ceiling.
    pub max_mana: u32,
    /// Spells cast.
    pub spells: u32,
}

impl Default for CasterStats {
    fn default() -> Self {
        Self {
            mana: 50,
            max_mana: 100,
            spells: 0,
        }
    }
}

/// Caster capability.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Caster;

impl Capability for Caster {
    fn role_name(&self) -> &'static str {
        "Caster"
    }

    async fn act(&self, turn: &Turn<'_>) -> ActionReport {
        let action = weighted(&ACTIONS, &mut rand::rng()).unwrap_or(Action::Meditate);
        match action {
            Action::Meditate => meditate(turn.core, MEDITATE_REGEN),
            Action::Cast => cast(turn),
            Action::Channel => channel(turn),
            Action::ArcaneWard => self.special_ability(turn.core, turn.store.timers()),
            Action::Enchant => enchant(turn),
            Action::SeekArtifact => seek_artifact(turn),
            Action::Rally => rally(self, turn),
        }
    }

    fn interact(&self, core: &AgentCore, peer: &PeerProfile) -> Interaction {
        if !peer.is_alive() {
            return Interaction::new(peer, format!("lights a candle for {}", peer.name()));
        }
        if peer.role() == Role::Caster {
            let mana = gain_mana(core, ATTUNE_BONUS);
            return Interaction::new(
                peer,
                format!("attunes with {} and gathers mana ({mana})", peer.name()),
            );
        }
        Interaction::new(
            peer,
            format!(
                "reads {}'s aura: {}/{} health",
                peer.name(),
                peer.health(),
                peer.max_health()
            ),
        )
    }

    fn special_ability(&self, core: &Arc<AgentCore>, timers: &TimerService) -> ActionReport {
        let effect = core.apply_effect(EffectKind::ArcaneWard, timers);
        ActionReport::new(
            "Arcane Ward",
            EventCategory::Ability,
            format!("weaves an arcane ward (absorbs {} damage per hit)", effect.bonus),
        )
    }
}

/// Add private mana up to the ceiling. Returns the new reserve.
fn gain_mana(core: &AgentCore, amount: u32) -> u32 {
    core.with_body(|body| match &mut body.stats {
        RoleStats::Caster(stats) => {
            stats.mana = stats.mana.saturating_add(amount).min(stats.max_mana);
            stats.mana
        }
        RoleStats::Warrior(_) | RoleStats::Stealth(_) => 0,
    })
}

fn meditate(core: &AgentCore, amount: u32) -> ActionReport {
    let mana = gain_mana(core, amount);
    ActionReport::new(
        "Meditate",
        EventCategory::Magic,
        format!("meditates and recovers mana ({mana})"),
    )
}

fn cast(turn: &Turn<'_>) -> ActionReport {
    let shortfall = turn.core.with_body(|body| match &body.stats {
        RoleStats::Caster(stats) => SPELL_COST.saturating_sub(stats.mana),
        RoleStats::Warrior(_) | RoleStats::Stealth(_) => SPELL_COST,
    });

    let mut drew = 0_u32;
    if shortfall > 0 {
        if !turn.store.mana().consume(u64::from(shortfall)) {
            return ActionReport::new(
                "Cast",
                EventCategory::Magic,
                "reaches for the mana pool but it runs dry; the spell fizzles",
            );
        }
        drew = shortfall;
    }

    let cast = turn.core.with_body(|body| match &mut body.stats {
        RoleStats::Caster(stats) => {
            // Pool mana may lift the reserve past its ceiling for this one spell.
            let available = stats.mana.saturating_add(drew);
            if available < SPELL_COST {
                stats.mana = available.min(stats.max_mana);
                return false;
            }
            stats.mana = available.saturating_sub(SPELL_COST).min(stats.max_mana);
            stats.spells = stats.spells.saturating_add(1);
            true
        }
        RoleStats::Warrior(_) | RoleStats::Stealth(_) => false,
    });
    if !cast {
        return ActionReport::new("Cast", EventCategory::Magic, "loses the spell's thread");
    }

    turn.world.adjust(1, -4);
    contribute(turn, CAST_CONTRIBUTION);
    let source = if drew > 0 {
        format!(" drawing {drew} mana from the pool")
    } else {
        String::new()
    };
    ActionReport::new(
        "Cast",
        EventCategory::Magic,
        format!("casts a purifying spell{source}"),
    )
}

fn channel(turn: &Turn<'_>) -> ActionReport {
    let amount = rand::rng().random_range(20..=50_u64);
    let level = turn.store.mana().restore(amount);
    ActionReport::new(
        "Channel",
        EventCategory::Magic,
        format!("channels {amount} mana into the pool (now {level})"),
    )
}

fn enchant(turn: &Turn<'_>) -> ActionReport {
    let Some(item) = turn.store.inventory().take_first() else {
        return ActionReport::new(
            "Enchant",
            EventCategory::Magic,
            "finds nothing in the shared inventory to enchant",
        );
    };
    let enchanted = format!("Enchanted {item}");
    let kept = keep_or_share(turn, enchanted.clone());
    contribute(turn, ENCHANT_CONTRIBUTION);
    ActionReport::new(
        "Enchant",
        EventCategory::Magic,
        format!("turns {item} into {enchanted} and {kept}"),
    )
}
