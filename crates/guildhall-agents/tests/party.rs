//! A whole party running concurrently against one store and one world.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;
use std::time::Duration;

use guildhall_agents::{AgentConfig, AgentDeps, AgentError, assemble_party};
use guildhall_events::{ActionStats, Chronicle};
use guildhall_store::{SharedResourceStore, StoreConfig, TimerService};
use guildhall_types::{EventCategory, Role};
use guildhall_world::WorldState;

fn deps(stats: Arc<ActionStats>) -> AgentDeps {
    AgentDeps {
        store: Arc::new(SharedResourceStore::new(
            &StoreConfig::default(),
            TimerService::new().unwrap(),
        )),
        world: Arc::new(WorldState::default()),
        chronicle: Arc::new(Chronicle::default()),
        analytics: stats,
    }
}

fn quick(name: &str, role: Role) -> AgentConfig {
    AgentConfig {
        interval: Duration::from_millis(5),
        lurk_timeout: Duration::from_millis(20),
        inventory_capacity: Some(5),
        ..AgentConfig::new(name, role)
    }
}

#[tokio::test]
async fn duplicate_names_are_rejected() {
    let deps = deps(Arc::new(ActionStats::new()));
    let result = assemble_party(
        [quick("Aldric", Role::Warrior), quick("Aldric", Role::Caster)],
        &deps,
    );
    assert!(matches!(result, Err(AgentError::DuplicateName(name)) if name == "Aldric"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn party_runs_concurrently_and_stops_cleanly() {
    let stats = Arc::new(ActionStats::new());
    let deps = deps(Arc::clone(&stats));
    let party = assemble_party(
        [
            quick("Aldric", Role::Warrior),
            quick("Vex", Role::Stealth),
            quick("Mira", Role::Caster),
            quick("Brann", Role::Warrior),
        ],
        &deps,
    )
    .unwrap();

    for hero in &party {
        assert_eq!(hero.peers().len(), party.len() - 1);
    }

    let tasks: Vec<_> = party
        .iter()
        .map(|hero| {
            hero.activate();
            let hero = Arc::clone(hero);
            tokio::spawn(async move { hero.run().await })
        })
        .collect();

    tokio::time::sleep(Duration::from_millis(300)).await;
    for hero in &party {
        hero.stop();
    }
    for task in tasks {
        let joined = tokio::time::timeout(Duration::from_secs(2), task).await;
        assert!(matches!(joined, Ok(Ok(()))));
    }

    for hero in &party {
        let snap = hero.snapshot();
        assert!(snap.health <= snap.max_health);
        assert!(snap.inventory_len <= 5);
        assert!(!hero.is_running());
    }
    assert_eq!(
        deps.chronicle.count_matching("stopped acting"),
        party.len()
    );

    let summary = stats.summary();
    assert!(summary.total > u64::try_from(party.len()).unwrap());
    let lifecycle = summary
        .by_category
        .get(&EventCategory::Lifecycle)
        .copied()
        .unwrap_or(0);
    assert!(lifecycle >= u64::try_from(party.len()).unwrap());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn relaunch_keeps_state() {
    let deps = deps(Arc::new(ActionStats::new()));
    let party = assemble_party([quick("Vex", Role::Stealth)], &deps).unwrap();
    let vex = Arc::clone(party.first().unwrap());

    vex.move_by(40, 40);
    vex.take_damage(25);
    vex.add_to_inventory("Lucky Coin").unwrap();

    for _ in 0..2 {
        vex.activate();
        let hero = Arc::clone(&vex);
        let task = tokio::spawn(async move { hero.run().await });
        tokio::time::sleep(Duration::from_millis(30)).await;
        vex.stop();
        task.await.unwrap();
    }

    // Stealth heroes never heal, so the earlier wound persists.
    assert!(vex.health() <= 65);
    let coin = String::from("Lucky Coin");
    assert!(vex.inventory().contains(&coin) || deps.store.inventory().view().contains(&coin));
    assert_eq!(deps.chronicle.count_matching("Vex stopped acting"), 2);
}
