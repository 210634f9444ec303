//! The supervisor: owns one run and drives its lifecycle.
//!
//! ```text
//! Created -> Running -> (Paused <-> Running)* -> Ending -> Ended
//! ```
//!
//! Lifecycle operations are serialized on the task table's async mutex, so
//! a `pause` that is still joining hero tasks cannot interleave with a
//! `resume` or a `shutdown`. The lifecycle state itself sits behind a short
//! std mutex so [`Supervisor::state`] and [`Supervisor::status`] never wait
//! on an operation in progress.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use guildhall_agents::{Agent, AgentDeps, assemble_party};
use guildhall_events::{ActionStats, AnalyticsSink, Chronicle, FanOut};
use guildhall_store::{SharedResourceStore, TimerService};
use guildhall_types::{AgentSnapshot, EngineState, sync};
use guildhall_world::WorldState;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::config::SimulationConfig;
use crate::control::{ControlState, EndReason};
use crate::error::SupervisorError;
use crate::generators::{self, BackgroundContext};
use crate::monitor;
use crate::status::{ShutdownReport, SimulationStatus};

/// Spawned tasks still owned by the supervisor.
#[derive(Default)]
struct TaskTable {
    heroes: Vec<(String, JoinHandle<()>)>,
    background: Vec<(String, JoinHandle<()>)>,
}

/// Owner of one simulation run.
pub struct Supervisor {
    config: SimulationConfig,
    heroes: Vec<Arc<Agent>>,
    store: Arc<SharedResourceStore>,
    world: Arc<WorldState>,
    chronicle: Arc<Chronicle>,
    stats: Arc<ActionStats>,
    analytics: Arc<dyn AnalyticsSink>,
    control: Arc<ControlState>,
    state: Mutex<EngineState>,
    tasks: tokio::sync::Mutex<TaskTable>,
}

impl core::fmt::Debug for Supervisor {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Supervisor")
            .field("world", &self.config.world.name)
            .field("heroes", &self.heroes.len())
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

impl Supervisor {
    /// Validate `config` and build the store, the world and the party.
    ///
    /// Must be called inside a tokio runtime; deferred callbacks are bound
    /// to it.
    pub fn new(config: SimulationConfig) -> Result<Self, SupervisorError> {
        Self::build(config, None)
    }

    /// Like [`new`](Self::new), additionally recording every analytics
    /// event to `sink`.
    pub fn with_analytics(
        config: SimulationConfig,
        sink: Arc<dyn AnalyticsSink>,
    ) -> Result<Self, SupervisorError> {
        Self::build(config, Some(sink))
    }

    fn build(
        config: SimulationConfig,
        extra_sink: Option<Arc<dyn AnalyticsSink>>,
    ) -> Result<Self, SupervisorError> {
        config.validate()?;

        let timers = TimerService::new()?;
        let store = Arc::new(SharedResourceStore::new(&config.store_config(), timers));
        let world = Arc::new(WorldState::new(config.world_settings()));
        let chronicle = Arc::new(Chronicle::default());
        let stats = Arc::new(ActionStats::new());
        let stats_sink: Arc<dyn AnalyticsSink> = stats.clone();
        let analytics: Arc<dyn AnalyticsSink> = match extra_sink {
            Some(extra) => Arc::new(FanOut::new(vec![stats_sink, extra])),
            None => stats_sink,
        };

        let deps = AgentDeps {
            store: Arc::clone(&store),
            world: Arc::clone(&world),
            chronicle: Arc::clone(&chronicle),
            analytics: Arc::clone(&analytics),
        };
        let heroes = assemble_party(config.agent_configs(), &deps)?;
        let control = Arc::new(ControlState::new(config.world.max_real_time_seconds));

        info!(
            world = config.world.name,
            heroes = heroes.len(),
            "supervisor created"
        );
        Ok(Self {
            config,
            heroes,
            store,
            world,
            chronicle,
            stats,
            analytics,
            control,
            state: Mutex::new(EngineState::Created),
            tasks: tokio::sync::Mutex::new(TaskTable::default()),
        })
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    /// Created -> Running: launch every hero, both generators and the
    /// monitor.
    pub async fn start(&self) -> Result<(), SupervisorError> {
        let mut tasks = self.tasks.lock().await;
        self.transition("start", &[EngineState::Created], EngineState::Running)?;
        self.control.mark_started();
        self.chronicle.log_event(format!(
            "{} opens its doors to {} heroes.",
            self.config.world.name,
            self.heroes.len()
        ));

        for hero in &self.heroes {
            hero.activate();
            tasks.heroes.push(spawn_hero(hero));
        }

        let ctx = self.background_context();
        tasks.background.push((
            String::from("loot-generator"),
            tokio::spawn(generators::loot_generator(
                ctx.clone(),
                Duration::from_millis(self.config.store.loot_interval_ms),
                self.config.store.loot_table.clone(),
            )),
        ));
        tasks.background.push((
            String::from("world-event-generator"),
            tokio::spawn(generators::world_event_generator(
                ctx.clone(),
                Duration::from_millis(self.config.progression.event_interval_ms),
            )),
        ));
        tasks.background.push((
            String::from("monitor"),
            tokio::spawn(monitor::monitor(
                ctx,
                Duration::from_millis(self.config.supervisor.monitor_interval_ms),
            )),
        ));

        info!(heroes = self.heroes.len(), "simulation started");
        Ok(())
    }

    /// Running -> Paused: stop every hero and wait for each to finish its
    /// current action; hold the background tasks.
    pub async fn pause(&self) -> Result<(), SupervisorError> {
        let mut tasks = self.tasks.lock().await;
        self.transition("pause", &[EngineState::Running], EngineState::Paused)?;
        self.control.pause();
        for hero in &self.heroes {
            hero.stop();
        }
        for (name, handle) in tasks.heroes.drain(..) {
            if let Err(e) = handle.await {
                warn!(hero = %name, error = %e, "hero task ended abnormally");
            }
        }
        self.chronicle.log_event("The guild rests.");
        info!("simulation paused");
        Ok(())
    }

    /// Paused -> Running: relaunch the same heroes with their state intact.
    ///
    /// Fallen heroes stay down.
    pub async fn resume(&self) -> Result<(), SupervisorError> {
        let mut tasks = self.tasks.lock().await;
        self.transition("resume", &[EngineState::Paused], EngineState::Running)?;
        let mut relaunched: usize = 0;
        for hero in self.heroes.iter().filter(|hero| hero.is_alive()) {
            hero.activate();
            tasks.heroes.push(spawn_hero(hero));
            relaunched = relaunched.saturating_add(1);
        }
        self.control.resume();
        self.chronicle.log_event("The guild takes up its work again.");
        info!(relaunched, "simulation resumed");
        Ok(())
    }

    /// Running/Paused -> Ending -> Ended: stop every task, wait up to the
    /// configured timeout for each, abort the laggards and cancel pending
    /// timers.
    ///
    /// From Created the supervisor goes straight to Ended. From Ending or
    /// Ended this is an error.
    pub async fn shutdown(&self) -> Result<ShutdownReport, SupervisorError> {
        let mut tasks = self.tasks.lock().await;
        {
            let mut state = sync::lock(&self.state);
            match *state {
                EngineState::Created => *state = EngineState::Ended,
                EngineState::Running | EngineState::Paused => *state = EngineState::Ending,
                from @ (EngineState::Ending | EngineState::Ended) => {
                    return Err(SupervisorError::InvalidTransition {
                        from,
                        action: "shut down",
                    });
                }
            }
        }

        self.control.request_stop();
        for hero in &self.heroes {
            hero.stop();
        }
        self.control.finish(EndReason::OperatorStop).await;

        let timeout = Duration::from_millis(self.config.supervisor.shutdown_timeout_ms);
        let table = &mut *tasks;
        let pending: Vec<_> = table
            .heroes
            .drain(..)
            .chain(table.background.drain(..))
            .collect();
        let mut lagging = Vec::new();
        for (name, handle) in pending {
            if !join_within(&name, handle, timeout).await {
                lagging.push(name);
            }
        }

        let timers = self.store.timers();
        let cancelled_timers = timers.pending();
        timers.shutdown();

        *sync::lock(&self.state) = EngineState::Ended;
        self.chronicle.log_event(format!("{} closes its doors.", self.config.world.name));
        info!(lagging = lagging.len(), cancelled_timers, "simulation ended");

        Ok(ShutdownReport {
            status: self.status().await,
            stats: self.stats.summary(),
            lagging,
            cancelled_timers,
        })
    }

    /// Resolve once the run has ended, by its own end condition or by
    /// [`shutdown`](Self::shutdown).
    pub async fn wait_for_end(&self) -> EndReason {
        self.control.wait_for_end().await
    }

    // -----------------------------------------------------------------------
    // Observation
    // -----------------------------------------------------------------------

    /// Current lifecycle state.
    pub fn state(&self) -> EngineState {
        *sync::lock(&self.state)
    }

    /// Snapshot of the whole run while heroes keep acting.
    pub async fn status(&self) -> SimulationStatus {
        let heroes: Vec<AgentSnapshot> = self.heroes.iter().map(|hero| hero.snapshot()).collect();
        let heroes_alive = heroes.iter().filter(|hero| hero.alive).count();
        SimulationStatus {
            state: self.state(),
            paused: self.control.is_paused(),
            stop_requested: self.control.is_stop_requested(),
            elapsed_seconds: self.control.elapsed_seconds(),
            max_real_time_seconds: self.control.max_real_time_seconds(),
            started_at: self.control.started_at().map(|at| at.to_rfc3339()),
            heroes_alive,
            heroes,
            world: self.world.status(),
            store: self.store.snapshot(),
            chronicle_total: self.chronicle.total(),
            end_reason: self.control.end_reason().await,
        }
    }

    /// The configuration this run was built from.
    pub const fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Every hero, in roster order.
    pub fn heroes(&self) -> &[Arc<Agent>] {
        &self.heroes
    }

    /// The shared resource store.
    pub const fn store(&self) -> &Arc<SharedResourceStore> {
        &self.store
    }

    /// The world.
    pub const fn world(&self) -> &Arc<WorldState> {
        &self.world
    }

    /// The narrative chronicle.
    pub const fn chronicle(&self) -> &Arc<Chronicle> {
        &self.chronicle
    }

    /// The run control state.
    pub const fn control(&self) -> &Arc<ControlState> {
        &self.control
    }

    /// Action counts recorded so far.
    pub const fn stats(&self) -> &Arc<ActionStats> {
        &self.stats
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn transition(
        &self,
        action: &'static str,
        allowed: &[EngineState],
        to: EngineState,
    ) -> Result<(), SupervisorError> {
        let mut state = sync::lock(&self.state);
        if !allowed.contains(&*state) {
            return Err(SupervisorError::InvalidTransition {
                from: *state,
                action,
            });
        }
        *state = to;
        Ok(())
    }

    fn background_context(&self) -> BackgroundContext {
        BackgroundContext {
            control: Arc::clone(&self.control),
            store: Arc::clone(&self.store),
            world: Arc::clone(&self.world),
            chronicle: Arc::clone(&self.chronicle),
            analytics: Arc::clone(&self.analytics),
            heroes: self.heroes.clone(),
        }
    }
}

fn spawn_hero(hero: &Arc<Agent>) -> (String, JoinHandle<()>) {
    let runner = Arc::clone(hero);
    (
        hero.name().to_owned(),
        tokio::spawn(async move { runner.run().await }),
    )
}

/// Wait up to `timeout` for `handle`; abort it if it does not finish.
///
/// Returns `false` for a task that had to be aborted.
async fn join_within(name: &str, mut handle: JoinHandle<()>, timeout: Duration) -> bool {
    match tokio::time::timeout(timeout, &mut handle).await {
        Ok(Ok(())) => true,
        Ok(Err(e)) => {
            warn!(task = name, error = %e, "task ended abnormally");
            true
        }
        Err(_) => {
            handle.abort();
            warn!(task = name, ?timeout, "task missed the shutdown timeout; aborted");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn join_within_aborts_a_task_that_misses_the_timeout() {
        let handle = tokio::spawn(std::future::pending::<()>());
        let abort = handle.abort_handle();

        let joined = join_within("stuck", handle, Duration::from_millis(10)).await;
        assert!(!joined);
        let cancelled = tokio::time::timeout(Duration::from_secs(1), async {
            while !abort.is_finished() {
                tokio::task::yield_now().await;
            }
        })
        .await;
        assert!(cancelled.is_ok(), "lagging task was not aborted");
    }

    #[tokio::test]
    async fn join_within_reports_finished_tasks() {
        let handle = tokio::spawn(async {});
        assert!(join_within("quick", handle, Duration::from_secs(1)).await);
    }
}
