//! Stealth: lifts gold from the vault and scavenges loot.
//!
//! Lurk is the only suspending action in the game: it waits on the loot
//! queue, bounded by the configured timeout and by the hero's stop signal.

use std::sync::Arc;

use guildhall_store::{GOLD, TimerService};
use guildhall_types::{EffectKind, EventCategory};
use rand::Rng;

use super::{
    ActionReport, Capability, Interaction, RoleStats, Turn, contribute, keep_or_share,
    random_step, rally, seek_artifact, weighted,
};
use crate::agent::AgentCore;
use crate::public::PeerProfile;

/// Contribution for a successful heist.
const PILFER_CONTRIBUTION: u64 = 8;
/// Contribution for found loot.
const LOOT_CONTRIBUTION: u64 = 2;
/// Base chance (percent) of a pilfer going unnoticed.
const PILFER_BASE_CHANCE: u32 = 60;

#[derive(Debug, Clone, Copy)]
enum Action {
    Sneak,
    Pilfer,
    Scavenge,
    Lurk,
    Stash,
    ShadowVeil,
    SeekArtifact,
    Rally,
}

const ACTIONS: [(Action, u32); 8] = [
    (Action::Sneak, 20),
    (Action::Pilfer, 20),
    (Action::Scavenge, 15),
    (Action::Lurk, 10),
    (Action::Stash, 10),
    (Action::ShadowVeil, 10),
    (Action::SeekArtifact, 5),
    (Action::Rally, 10),
];

/// Stealth resources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StealthStats {
    /// Base stealth level.
    pub stealth: u32,
    /// Successful heists.
    pub heists: u32,
}

impl Default for StealthStats {
    fn default() -> Self {
        Self {
            stealth: 10,
            heists: 0,
        }
    }
}

/// Stealth capability.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stealth;

impl Capability for Stealth {
    fn role_name(&self) -> &'static str {
        "Stealth"
    }

    async fn act(&self, turn: &Turn<'_>) -> ActionReport {
        let action = weighted(&ACTIONS, &mut rand::rng()).unwrap_or(Action::Sneak);
        match action {
            Action::Sneak => sneak(turn),
            Action::Pilfer => pilfer(turn),
            Action::Scavenge => scavenge(turn),
            Action::Lurk => lurk(turn).await,
            Action::Stash => stash(turn),
            Action::ShadowVeil => self.special_ability(turn.core, turn.store.timers()),
            Action::SeekArtifact => seek_artifact(turn),
            Action::Rally => rally(self, turn),
        }
    }

    fn interact(&self, core: &AgentCore, peer: &PeerProfile) -> Interaction {
        if !peer.is_alive() {
            return Interaction::new(peer, format!("quietly checks {}'s empty pockets", peer.name()));
        }
        let target = peer.position();
        let here = core.public().position();
        let position = core.move_by(step_toward(here.x, target.x), step_toward(here.y, target.y));
        Interaction::new(
            peer,
            format!("shadows {} to {position}, unseen", peer.name()),
        )
    }

    fn special_ability(&self, core: &Arc<AgentCore>, timers: &TimerService) -> ActionReport {
        let effect = core.apply_effect(EffectKind::ShadowVeil, timers);
        ActionReport::new(
            "Shadow Veil",
            EventCategory::Ability,
            format!("melts into the shadows (+{} stealth)", effect.bonus),
        )
    }
}

/// One unit step from `from` toward `to`.
const fn step_toward(from: i32, to: i32) -> i32 {
    if to > from {
        1
    } else if to < from {
        -1
    } else {
        0
    }
}

fn sneak(turn: &Turn<'_>) -> ActionReport {
    let (dx, dy) = random_step(3);
    let position = turn.core.move_by(dx, dy);
    ActionReport::new(
        "Sneak",
        EventCategory::Movement,
        format!("slips through the alleys to {position}"),
    )
}

fn pilfer(turn: &Turn<'_>) -> ActionReport {
    let stealth = turn.core.public().headline();
    let (unnoticed, amount, bruise) = {
        let mut rng = rand::rng();
        let chance = PILFER_BASE_CHANCE.saturating_add(stealth.min(30));
        (
            rng.random_range(0..100_u32) < chance,
            rng.random_range(5..=25_u64)
                .saturating_add(u64::from(stealth.saturating_div(4))),
            rng.random_range(3..=8_u32),
        )
    };

    if !unnoticed {
        let fatal = turn.core.take_damage(bruise);
        let description = if fatal {
            String::from("is caught by the vault guards and does not get up")
        } else {
            format!("is spotted by the vault guards and takes {bruise} damage escaping")
        };
        return ActionReport::new("Pilfer", EventCategory::Theft, description);
    }
    if !turn.store.vault().withdraw(GOLD, amount) {
        return ActionReport::new(
            "Pilfer",
            EventCategory::Theft,
            format!("cracks the vault but there are not {amount} gold to take"),
        );
    }

    turn.world.adjust(0, 3);
    turn.core.with_body(|body| {
        if let RoleStats::Stealth(stats) = &mut body.stats {
            stats.heists = stats.heists.saturating_add(1);
        }
    });
    contribute(turn, PILFER_CONTRIBUTION);
    ActionReport::new(
        "Pilfer",
        EventCategory::Theft,
        format!("pilfers {amount} gold from the vault"),
    )
}

fn scavenge(turn: &Turn<'_>) -> ActionReport {
    match turn.store.loot().try_take() {
        Some(item) => {
            let kept = keep_or_share(turn, item.clone());
            contribute(turn, LOOT_CONTRIBUTION);
            ActionReport::new(
                "Scavenge",
                EventCategory::Loot,
                format!("scavenges {item} and {kept}"),
            )
        }
        None => ActionReport::new("Scavenge", EventCategory::Loot, "scavenges but the loot pile is bare"),
    }
}

async fn lurk(turn: &Turn<'_>) -> ActionReport {
    let timeout = turn.core.config().lurk_timeout;
    let waited = turn
        .core
        .unless_stopped(tokio::time::timeout(timeout, turn.store.loot().take()))
        .await;
    match waited {
        Some(Ok(item)) => {
            let kept = keep_or_share(turn, item.clone());
            contribute(turn, LOOT_CONTRIBUTION);
            ActionReport::new(
                "Lurk",
                EventCategory::Loot,
                format!("lurks until {item} turns up and {kept}"),
            )
        }
        Some(Err(_)) => ActionReport::new(
            "Lurk",
            EventCategory::Loot,
            "lurks in the shadows but nothing turns up",
        ),
        None => ActionReport::new("Lurk", EventCategory::Loot, "abandons the lurk"),
    }
}

fn stash(turn: &Turn<'_>) -> ActionReport {
    let Some(item) = turn.core.with_body(|body| body.inventory.take_first()) else {
        return ActionReport::new("Stash", EventCategory::Loot, "has nothing to stash");
    };
    turn.store.inventory().add(item.clone());
    ActionReport::new(
        "Stash",
        EventCategory::Loot,
        format!("stashes {item} in the shared inventory"),
    )
}
