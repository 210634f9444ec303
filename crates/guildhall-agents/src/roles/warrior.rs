//! Warrior: quests for gold, fights for loot, shops at the trading post.

use std::sync::Arc;

use guildhall_store::{GOLD, TimerService};
use guildhall_types::{EffectKind, EventCategory};
use rand::Rng;

use super::{
    ActionReport, Capability, Interaction, RoleStats, Turn, contribute, keep_or_share, pick,
    random_step, rally, seek_artifact, weighted,
};
use crate::agent::AgentCore;
use crate::public::PeerProfile;

/// Contribution for a completed quest.
const QUEST_CONTRIBUTION: u64 = 10;
/// Contribution for a won fight.
const FIGHT_CONTRIBUTION: u64 = 5;
/// Gold paid at the trading post.
const BARTER_PRICE: u64 = 15;
/// Health recovered when rallying with a living companion.
const RALLY_HEAL: u32 = 3;

#[derive(Debug, Clone, Copy)]
enum Action {
    Patrol,
    Quest,
    Fight,
    ArmorUp,
    Barter,
    SeekArtifact,
    Rally,
}

const ACTIONS: [(Action, u32); 7] = [
    (Action::Patrol, 20),
    (Action::Quest, 20),
    (Action::Fight, 15),
    (Action::ArmorUp, 10),
    (Action::Barter, 10),
    (Action::SeekArtifact, 10),
    (Action::Rally, 15),
];

/// Warrior resources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WarriorStats {
    /// Base armor; also flat damage reduction.
    pub armor: u32,
    /// Quests completed.
    pub quests: u32,
}

impl Default for WarriorStats {
    fn default() -> Self {
        Self { armor: 4, quests: 0 }
    }
}

/// Warrior capability.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Warrior;

impl Capability for Warrior {
    fn role_name(&self) -> &'static str {
        "Warrior"
    }

    async fn act(&self, turn: &Turn<'_>) -> ActionReport {
        let action = weighted(&ACTIONS, &mut rand::rng()).unwrap_or(Action::Patrol);
        match action {
            Action::Patrol => patrol(turn),
            Action::Quest => quest(turn),
            Action::Fight => fight(turn),
            Action::ArmorUp => self.special_ability(turn.core, turn.store.timers()),
            Action::Barter => barter(turn),
            Action::SeekArtifact => seek_artifact(turn),
            Action::Rally => rally(self, turn),
        }
    }

    fn interact(&self, core: &AgentCore, peer: &PeerProfile) -> Interaction {
        if !peer.is_alive() {
            return Interaction::new(peer, format!("salutes the fallen {}", peer.name()));
        }
        let health = core.heal(RALLY_HEAL);
        Interaction::new(
            peer,
            format!(
                "rallies with {} the {} and catches breath ({health} health)",
                peer.name(),
                peer.role()
            ),
        )
    }

    fn special_ability(&self, core: &Arc<AgentCore>, timers: &TimerService) -> ActionReport {
        let effect = core.apply_effect(EffectKind::ArmorUp, timers);
        ActionReport::new(
            "Armor Up",
            EventCategory::Ability,
            format!("raises a shield wall (+{} armor)", effect.bonus),
        )
    }
}

fn patrol(turn: &Turn<'_>) -> ActionReport {
    let (dx, dy) = random_step(2);
    let position = turn.core.move_by(dx, dy);
    ActionReport::new(
        "Patrol",
        EventCategory::Movement,
        format!("patrols to {position}"),
    )
}

fn quest(turn: &Turn<'_>) -> ActionReport {
    let reward = rand::rng().random_range(10..=40_u64);
    let balance = turn.store.vault().deposit(GOLD, reward);
    turn.world.adjust(2, 0);
    turn.core.with_body(|body| {
        if let RoleStats::Warrior(stats) = &mut body.stats {
            stats.quests = stats.quests.saturating_add(1);
        }
    });
    contribute(turn, QUEST_CONTRIBUTION);
    ActionReport::new(
        "Quest",
        EventCategory::Quest,
        format!("completes a quest and deposits {reward} gold (vault: {balance})"),
    )
}

fn fight(turn: &Turn<'_>) -> ActionReport {
    let wound = rand::rng().random_range(0..=12_u32);
    if turn.core.take_damage(wound) {
        return ActionReport::new("Fight", EventCategory::Combat, "falls in battle");
    }
    turn.world.adjust(0, -1);
    contribute(turn, FIGHT_CONTRIBUTION);
    let spoils = match turn.store.loot().try_take() {
        Some(item) => {
            let kept = keep_or_share(turn, item.clone());
            format!("and claims {item} from the loot pile, then {kept}")
        }
        None => String::from("but finds no spoils"),
    };
    ActionReport::new(
        "Fight",
        EventCategory::Combat,
        format!("defeats a monster {spoils}"),
    )
}

fn barter(turn: &Turn<'_>) -> ActionReport {
    let post = turn.store.trading_post();
    let Some(item) = pick(&post.available_items()) else {
        return ActionReport::new("Barter", EventCategory::Trade, "finds the trading post sold out");
    };
    if !turn.store.vault().withdraw(GOLD, BARTER_PRICE) {
        return ActionReport::new(
            "Barter",
            EventCategory::Trade,
            format!("cannot afford the {item}: the vault is short of gold"),
        );
    }
    if post.trade(&item, turn.core.name()) {
        let kept = keep_or_share(turn, item.clone());
        ActionReport::new(
            "Barter",
            EventCategory::Trade,
            format!("buys the {item} for {BARTER_PRICE} gold and {kept}"),
        )
    } else {
        turn.store.vault().deposit(GOLD, BARTER_PRICE);
        ActionReport::new(
            "Barter",
            EventCategory::Trade,
            format!("loses the {item} to a faster buyer"),
        )
    }
}
