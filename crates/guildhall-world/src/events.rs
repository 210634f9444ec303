//! Random world events.
//!
//! The world-event generator rolls one [`WorldEvent`] per interval from a
//! fixed weight table:
//!
//! | Event     | Weight | World effect          | Caller effect               |
//! |-----------|--------|-----------------------|-----------------------------|
//! | Tremor    | 15     | stability -6          | --                          |
//! | Calm      | 20     | stability +4          | --                          |
//! | Blight    | 15     | corruption +6         | --                          |
//! | Cleansing | 15     | corruption -5         | --                          |
//! | Ambush    | 15     | stability -2          | damage a random living hero |
//! | ManaSurge | 10     | --                    | restore the mana pool       |
//! | Windfall  | 10     | --                    | deposit gold into the vault |
//!
//! The world only applies its own counters; effects on heroes and the store
//! belong to the caller, which owns those references.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Something that happens to the realm independently of the heroes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WorldEvent {
    /// The ground shakes; stability drops.
    Tremor,
    /// A quiet spell; stability recovers.
    Calm,
    /// Rot spreads; corruption rises.
    Blight,
    /// A cleansing rite; corruption falls.
    Cleansing,
    /// Raiders strike a hero.
    Ambush {
        /// Damage dealt to the ambushed hero.
        damage: u32,
    },
    /// Ley lines flare and refill the mana pool.
    ManaSurge {
        /// Mana restored.
        mana: u64,
    },
    /// A caravan pays tribute to the vault.
    Windfall {
        /// Gold deposited.
        gold: u64,
    },
}

/// Relative weights of each event kind, in roll order.
const WEIGHTS: [(EventKind, u32); 7] = [
    (EventKind::Tremor, 15),
    (EventKind::Calm, 20),
    (EventKind::Blight, 15),
    (EventKind::Cleansing, 15),
    (EventKind::Ambush, 15),
    (EventKind::ManaSurge, 10),
    (EventKind::Windfall, 10),
];

#[derive(Debug, Clone, Copy)]
enum EventKind {
    Tremor,
    Calm,
    Blight,
    Cleansing,
    Ambush,
    ManaSurge,
    Windfall,
}

impl WorldEvent {
    /// Roll a weighted random event.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let total = WEIGHTS
            .iter()
            .fold(0_u32, |acc, &(_, weight)| acc.saturating_add(weight));
        let roll = rng.random_range(0..total);

        let mut cumulative = 0_u32;
        let mut picked = EventKind::Calm;
        for &(kind, weight) in &WEIGHTS {
            cumulative = cumulative.saturating_add(weight);
            if roll < cumulative {
                picked = kind;
                break;
            }
        }

        match picked {
            EventKind::Tremor => Self::Tremor,
            EventKind::Calm => Self::Calm,
            EventKind::Blight => Self::Blight,
            EventKind::Cleansing => Self::Cleansing,
            EventKind::Ambush => Self::Ambush {
                damage: rng.random_range(5..=20),
            },
            EventKind::ManaSurge => Self::ManaSurge {
                mana: rng.random_range(50..=150),
            },
            EventKind::Windfall => Self::Windfall {
                gold: rng.random_range(20..=80),
            },
        }
    }

    /// `(stability, corruption)` change this event applies to the world.
    pub const fn world_deltas(self) -> (i32, i32) {
        match self {
            Self::Tremor => (-6, 0),
            Self::Calm => (4, 0),
            Self::Blight => (0, 6),
            Self::Cleansing => (0, -5),
            Self::Ambush { .. } => (-2, 0),
            Self::ManaSurge { .. } | Self::Windfall { .. } => (0, 0),
        }
    }

    /// Short event name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Tremor => "Tremor",
            Self::Calm => "Calm",
            Self::Blight => "Blight",
            Self::Cleansing => "Cleansing",
            Self::Ambush { .. } => "Ambush",
            Self::ManaSurge { .. } => "Mana Surge",
            Self::Windfall { .. } => "Windfall",
        }
    }

    /// One-line narrative of the event.
    pub fn describe(self) -> String {
        match self {
            Self::Tremor => String::from("The earth trembles beneath the guildhall."),
            Self::Calm => String::from("A calm settles over the realm."),
            Self::Blight => String::from("A creeping blight spreads through the fields."),
            Self::Cleansing => String::from("Pilgrims perform a cleansing rite."),
            Self::Ambush { damage } => format!("Raiders spring an ambush ({damage} damage)."),
            Self::ManaSurge { mana } => format!("The ley lines surge (+{mana} mana)."),
            Self::Windfall { gold } => format!("A merchant caravan pays tribute (+{gold} gold)."),
        }
    }
}

impl core::fmt::Display for WorldEvent {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}
