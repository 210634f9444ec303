//! Background producers: the loot generator and the world-event generator.
//!
//! Both loops are paced by [`ControlState::pace`], so they hold while the
//! run is paused and exit promptly once a stop is requested.

use std::sync::Arc;
use std::time::Duration;

use guildhall_agents::Agent;
use guildhall_events::{AnalyticsSink, Chronicle};
use guildhall_store::{GOLD, SharedResourceStore};
use guildhall_types::{AnalyticsEvent, EventCategory};
use guildhall_world::{WorldEvent, WorldState};
use rand::seq::IndexedRandom;
use tracing::debug;

use crate::control::ControlState;

/// Actor name recorded for world-driven events.
const WORLD_ACTOR: &str = "world";

/// Handles every background task shares.
#[derive(Clone)]
pub(crate) struct BackgroundContext {
    pub(crate) control: Arc<ControlState>,
    pub(crate) store: Arc<SharedResourceStore>,
    pub(crate) world: Arc<WorldState>,
    pub(crate) chronicle: Arc<Chronicle>,
    pub(crate) analytics: Arc<dyn AnalyticsSink>,
    pub(crate) heroes: Vec<Arc<Agent>>,
}

impl BackgroundContext {
    /// Log `text` to the chronicle and record it as a world event.
    pub(crate) fn narrate(&self, text: String) {
        self.chronicle.log_event(text.clone());
        self.analytics
            .record(AnalyticsEvent::new(WORLD_ACTOR, EventCategory::World, text));
    }
}

/// Offer one item from `table` to the loot queue every `every`.
pub(crate) async fn loot_generator(ctx: BackgroundContext, every: Duration, table: Vec<String>) {
    let mut offered: u64 = 0;
    while ctx.control.pace(every).await {
        let item = {
            let mut rng = rand::rng();
            table.choose(&mut rng).cloned()
        };
        let Some(item) = item else {
            break;
        };
        match ctx.store.loot().offer(item) {
            Ok(()) => offered = offered.saturating_add(1),
            Err(e) => debug!(error = %e, "loot generator skipped an item"),
        }
    }
    debug!(offered, "loot generator stopped");
}

/// Roll and apply one world event every `every`.
pub(crate) async fn world_event_generator(ctx: BackgroundContext, every: Duration) {
    let mut rolled: u64 = 0;
    while ctx.control.pace(every).await {
        let (event, target) = {
            let mut rng = rand::rng();
            let event = WorldEvent::random(&mut rng);
            let living: Vec<Arc<Agent>> = ctx
                .heroes
                .iter()
                .filter(|hero| hero.is_alive())
                .cloned()
                .collect();
            (event, living.choose(&mut rng).cloned())
        };
        apply_world_event(&ctx, event, target.as_deref());
        rolled = rolled.saturating_add(1);
    }
    debug!(rolled, "world-event generator stopped");
}

/// Apply `event` to the world, then to `target` or the store as the event
/// requires, and narrate the result.
pub(crate) fn apply_world_event(ctx: &BackgroundContext, event: WorldEvent, target: Option<&Agent>) {
    let (stability, corruption) = ctx.world.apply_event(event);
    let consequence = match event {
        WorldEvent::Ambush { damage } => match target {
            Some(hero) if hero.take_damage(damage) => {
                format!(" {} falls to the raiders.", hero.name())
            }
            Some(hero) => format!(" {} is caught in the fray.", hero.name()),
            None => String::from(" No hero is left to strike."),
        },
        WorldEvent::ManaSurge { mana } => {
            let level = ctx.store.mana().restore(mana);
            format!(" The mana pool swells to {level}.")
        }
        WorldEvent::Windfall { gold } => {
            let balance = ctx.store.vault().deposit(GOLD, gold);
            format!(" The vault now holds {balance} gold.")
        }
        WorldEvent::Tremor | WorldEvent::Calm | WorldEvent::Blight | WorldEvent::Cleansing => {
            String::new()
        }
    };
    debug!(event = event.name(), stability, corruption, "world event applied");
    ctx.narrate(format!("{}{consequence}", event.describe()));
}

#[cfg(test)]
mod tests {
    use guildhall_agents::{AgentConfig, AgentDeps, assemble_party};
    use guildhall_events::ActionStats;
    use guildhall_store::{StoreConfig, TimerService};
    use guildhall_types::Role;
    use guildhall_world::WorldSettings;
    use tokio::runtime::Handle;

    use super::*;

    fn context(stats: &Arc<ActionStats>) -> BackgroundContext {
        let store = Arc::new(SharedResourceStore::new(
            &StoreConfig::default(),
            TimerService::with_handle(Handle::current()),
        ));
        let world = Arc::new(WorldState::new(WorldSettings::default()));
        let chronicle = Arc::new(Chronicle::default());
        let analytics: Arc<dyn AnalyticsSink> = stats.clone();
        let deps = AgentDeps {
            store: Arc::clone(&store),
            world: Arc::clone(&world),
            chronicle: Arc::clone(&chronicle),
            analytics: Arc::clone(&analytics),
        };
        let heroes = assemble_party([AgentConfig::new("Aldric", Role::Warrior)], &deps)
            .unwrap_or_default();
        BackgroundContext {
            control: Arc::new(ControlState::new(0)),
            store,
            world,
            chronicle,
            analytics,
            heroes,
        }
    }

    #[tokio::test]
    async fn windfall_fills_the_vault() {
        let stats = Arc::new(ActionStats::new());
        let ctx = context(&stats);
        apply_world_event(&ctx, WorldEvent::Windfall { gold: 40 }, None);
        assert_eq!(ctx.store.vault().balance(GOLD), 540);
        assert_eq!(ctx.chronicle.total(), 1);
        assert_eq!(stats.count(WORLD_ACTOR, EventCategory::World), 1);
    }

    #[tokio::test]
    async fn mana_surge_restores_the_pool() {
        let stats = Arc::new(ActionStats::new());
        let ctx = context(&stats);
        assert!(ctx.store.mana().consume(300));
        apply_world_event(&ctx, WorldEvent::ManaSurge { mana: 120 }, None);
        assert_eq!(ctx.store.mana().level(), 820);
    }

    #[tokio::test]
    async fn ambush_strikes_its_target() {
        let stats = Arc::new(ActionStats::new());
        let ctx = context(&stats);
        let hero = ctx.heroes.first().cloned();
        let before = hero.as_ref().map(|h| h.health()).unwrap_or_default();
        apply_world_event(&ctx, WorldEvent::Ambush { damage: 20 }, hero.as_deref());
        let after = hero.as_ref().map(|h| h.health()).unwrap_or_default();
        assert!(after < before, "{after} >= {before}");
        assert_eq!(ctx.world.status().stability, 58);
    }

    #[tokio::test]
    async fn ambush_without_target_only_moves_the_world() {
        let stats = Arc::new(ActionStats::new());
        let ctx = context(&stats);
        apply_world_event(&ctx, WorldEvent::Ambush { damage: 20 }, None);
        assert_eq!(ctx.chronicle.count_matching("No hero is left"), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn loot_generator_fills_queue_until_stopped() {
        let stats = Arc::new(ActionStats::new());
        let ctx = context(&stats);
        let task = tokio::spawn(loot_generator(
            ctx.clone(),
            Duration::from_millis(100),
            vec![String::from("Ruby")],
        ));
        tokio::time::sleep(Duration::from_millis(550)).await;
        assert_eq!(ctx.store.loot().len(), 5);

        ctx.control.request_stop();
        let joined = tokio::time::timeout(Duration::from_millis(10), task).await;
        assert!(matches!(joined, Ok(Ok(()))));
        assert_eq!(ctx.store.loot().try_take().as_deref(), Some("Ruby"));
    }

    #[tokio::test(start_paused = true)]
    async fn paused_generator_holds() {
        let stats = Arc::new(ActionStats::new());
        let ctx = context(&stats);
        ctx.control.pause();
        let task = tokio::spawn(world_event_generator(ctx.clone(), Duration::from_millis(10)));
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(ctx.chronicle.total(), 0);

        ctx.control.request_stop();
        let joined = tokio::time::timeout(Duration::from_millis(10), task).await;
        assert!(joined.is_ok());
    }
}
