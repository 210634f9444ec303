//! Shared resource store for the Guildhall hero simulation.
//!
//! Every cross-hero mutable resource lives here, and each one owns exactly
//! one synchronization primitive chosen for its access pattern:
//!
//! | Resource | Primitive | Module |
//! |----------|-----------|--------|
//! | [`Vault`] | `RwLock` (many readers, one writer) | [`vault`] |
//! | [`ManaPool`] | `AtomicU64` with a CAS consume loop | [`mana`] |
//! | [`LootQueue`] | `Mutex<VecDeque>` + `Notify` | [`loot`] |
//! | [`SharedInventory`] | `Mutex<Vec>` | [`inventory`] |
//! | [`TradingPost`] | `Mutex<BTreeMap>` + timed restock | [`trading_post`] |
//!
//! No lock is ever held across a call into a different resource, and no lock
//! is held across an `.await`, so lock-ordering cycles cannot form.
//!
//! Deferred work (restocks, ability reverts) runs on the [`TimerService`].

pub mod error;
pub mod inventory;
pub mod loot;
pub mod mana;
pub mod timer;
pub mod trading_post;
pub mod vault;

use std::collections::BTreeMap;
use std::time::Duration;

use guildhall_types::StoreSnapshot;

pub use error::StoreError;
pub use inventory::SharedInventory;
pub use loot::{DEFAULT_LOOT_CAPACITY, LootQueue};
pub use mana::{CONSUME_RETRY_BUDGET, ManaPool};
pub use timer::TimerService;
pub use trading_post::{DEFAULT_RESTOCK_DELAY, Listing, TradingPost};
pub use vault::Vault;

/// Vault resource kind heroes earn from quests and pilfer from.
pub const GOLD: &str = "Gold";

/// Initial contents and tuning of the shared resources.
///
/// The engine builds this from `guildhall-config.yaml`; tests construct it
/// directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Initial vault balances (default: Gold 500, Gems 40, Relics 5).
    pub vault: BTreeMap<String, u64>,
    /// Initial mana pool level (default: 1000).
    pub mana_pool: u64,
    /// Loot queue capacity (default: 50).
    pub loot_capacity: usize,
    /// Delay between a trading post sale and its restock (default: 5s).
    pub restock_delay: Duration,
    /// Goods listed at the trading post.
    pub trade_goods: Vec<String>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            vault: BTreeMap::from([
                (String::from(GOLD), 500),
                (String::from("Gems"), 40),
                (String::from("Relics"), 5),
            ]),
            mana_pool: 1000,
            loot_capacity: DEFAULT_LOOT_CAPACITY,
            restock_delay: DEFAULT_RESTOCK_DELAY,
            trade_goods: vec![
                String::from("Steel Sword"),
                String::from("Healing Draught"),
                String::from("Shadow Cloak"),
                String::from("Mana Crystal"),
                String::from("Rope Ladder"),
            ],
        }
    }
}

/// Every shared resource of one simulation run.
///
/// Constructed once by the supervisor and injected into every hero as
/// `Arc<SharedResourceStore>`.
#[derive(Debug)]
pub struct SharedResourceStore {
    vault: Vault,
    mana: ManaPool,
    loot: LootQueue,
    inventory: SharedInventory,
    trading_post: TradingPost,
    timers: TimerService,
}

impl SharedResourceStore {
    /// Build the store from its configuration.
    pub fn new(config: &StoreConfig, timers: TimerService) -> Self {
        Self {
            vault: Vault::new(config.vault.clone()),
            mana: ManaPool::new(config.mana_pool),
            loot: LootQueue::new(config.loot_capacity),
            inventory: SharedInventory::new(),
            trading_post: TradingPost::new(
                config.trade_goods.iter().cloned(),
                config.restock_delay,
                timers.clone(),
            ),
            timers,
        }
    }

    /// The treasure vault.
    pub const fn vault(&self) -> &Vault {
        &self.vault
    }

    /// The mana pool.
    pub const fn mana(&self) -> &ManaPool {
        &self.mana
    }

    /// The loot queue.
    pub const fn loot(&self) -> &LootQueue {
        &self.loot
    }

    /// The shared inventory.
    pub const fn inventory(&self) -> &SharedInventory {
        &self.inventory
    }

    /// The trading post.
    pub const fn trading_post(&self) -> &TradingPost {
        &self.trading_post
    }

    /// The timer service used for deferred work.
    pub const fn timers(&self) -> &TimerService {
        &self.timers
    }

    /// Snapshot of every resource.
    ///
    /// Each resource is read under its own primitive in turn; the snapshot
    /// is per-resource consistent, not a single global instant.
    pub fn snapshot(&self) -> StoreSnapshot {
        StoreSnapshot {
            vault: self.vault.view(),
            mana_pool: self.mana.level(),
            loot_queued: self.loot.len(),
            loot_capacity: self.loot.capacity(),
            shared_inventory: self.inventory.view(),
            items_for_sale: self.trading_post.available_items(),
            sold_items: self.trading_post.sold_items(),
        }
    }
}
