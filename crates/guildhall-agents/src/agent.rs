//! The hero: private state, the action loop, and its control surface.
//!
//! # State
//!
//! All mutable hero state (health, position, inventory, role stats,
//! effects) sits in one mutex owned by [`AgentCore`]. Every mutation goes
//! through [`AgentCore::with_body`], which mirrors the public fields into
//! [`PublicState`] atomics before releasing the lock; status reports and
//! other heroes only ever read those atomics.
//!
//! # Loop
//!
//! [`Agent::run`] alternates one action with one interval of suspension
//! while the hero is active and alive. The suspension races a [`Notify`]
//! that [`Agent::stop`] (and a fatal blow) signals, so a stopped hero
//! leaves its sleep immediately instead of finishing the interval.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, OnceLock};

use guildhall_events::{AnalyticsSink, Chronicle};
use guildhall_store::{SharedResourceStore, TimerService};
use guildhall_types::{AgentSnapshot, AnalyticsEvent, EffectKind, EventCategory, Position, Role, sync};
use guildhall_world::WorldState;
use tokio::sync::Notify;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::config::AgentConfig;
use crate::effects::{ActiveEffect, EffectSet, default_bonus};
use crate::error::AgentError;
use crate::inventory::Inventory;
use crate::public::{PeerProfile, PublicState};
use crate::roles::{ActionReport, Interaction, Kit, RoleStats, Turn};

/// Actor name used for world-level narration.
const WORLD_ACTOR: &str = "world";

/// Mutable hero state guarded by the hero's own mutex.
#[derive(Debug)]
pub(crate) struct Body {
    pub(crate) health: u32,
    pub(crate) alive: bool,
    pub(crate) position: Position,
    pub(crate) inventory: Inventory,
    pub(crate) stats: RoleStats,
    pub(crate) effects: EffectSet,
}

/// Shared dependencies injected into every hero.
#[derive(Clone)]
pub struct AgentDeps {
    /// Shared resources.
    pub store: Arc<SharedResourceStore>,
    /// World progression.
    pub world: Arc<WorldState>,
    /// Narrative log.
    pub chronicle: Arc<Chronicle>,
    /// Analytics destination.
    pub analytics: Arc<dyn AnalyticsSink>,
}

impl core::fmt::Debug for AgentDeps {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AgentDeps")
            .field("store", &self.store)
            .field("world", &self.world)
            .finish_non_exhaustive()
    }
}

/// Hero state and control signals, shared with scheduled effect reverts.
pub struct AgentCore {
    config: AgentConfig,
    public: Arc<PublicState>,
    body: Mutex<Body>,
    wake: Notify,
    running: AtomicBool,
    chronicle: Arc<Chronicle>,
    analytics: Arc<dyn AnalyticsSink>,
}

impl core::fmt::Debug for AgentCore {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AgentCore")
            .field("name", &self.config.name)
            .field("role", &self.config.role)
            .finish_non_exhaustive()
    }
}

impl AgentCore {
    fn new(config: AgentConfig, chronicle: Arc<Chronicle>, analytics: Arc<dyn AnalyticsSink>) -> Self {
        let stats = RoleStats::for_role(config.role);
        let body = Body {
            health: config.max_health,
            alive: config.max_health > 0,
            position: config.start,
            inventory: Inventory::new(config.inventory_capacity),
            stats,
            effects: EffectSet::default(),
        };
        let public = Arc::new(PublicState::new(
            config.name.clone(),
            config.role,
            config.max_health,
            config.start,
            RoleStats::headline_label(config.role),
        ));
        let core = Self {
            config,
            public,
            body: Mutex::new(body),
            wake: Notify::new(),
            running: AtomicBool::new(false),
            chronicle,
            analytics,
        };
        // Publish the initial headline stat.
        core.with_body(|_| ());
        core
    }

    /// Hero name.
    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// Hero role.
    pub const fn role(&self) -> Role {
        self.config.role
    }

    /// Construction parameters.
    pub const fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// Lock-free view.
    pub fn public(&self) -> &PublicState {
        &self.public
    }

    /// Profile other heroes may hold.
    pub fn profile(&self) -> PeerProfile {
        PeerProfile::new(Arc::clone(&self.public))
    }

    /// Run `f` under the hero mutex, then publish the public fields.
    pub(crate) fn with_body<T>(&self, f: impl FnOnce(&mut Body) -> T) -> T {
        let mut body = sync::lock(&self.body);
        let out = f(&mut body);
        self.public.mirror(
            body.health,
            body.alive,
            body.position,
            body.inventory.len(),
            body.stats.headline(&body.effects),
        );
        out
    }

    /// Deal `amount` damage, reduced by armor and wards.
    ///
    /// Health clamps at 0. Returns `true` only for the call that kills the
    /// hero; damage to a fallen hero is ignored.
    pub fn take_damage(&self, amount: u32) -> bool {
        let fatal = self.with_body(|body| {
            if !body.alive {
                return false;
            }
            let dealt = amount.saturating_sub(body.stats.mitigation(&body.effects));
            body.health = body.health.saturating_sub(dealt);
            if body.health == 0 {
                body.alive = false;
                return true;
            }
            false
        });
        if fatal {
            warn!(hero = self.name(), "hero has fallen");
            self.observe(EventCategory::Lifecycle, "has fallen");
            self.wake.notify_waiters();
        }
        fatal
    }

    /// Restore up to `amount` health, capped at the maximum. A fallen hero
    /// stays at 0. Returns the resulting health.
    pub fn heal(&self, amount: u32) -> u32 {
        let max = self.config.max_health;
        self.with_body(|body| {
            if body.alive {
                body.health = body.health.saturating_add(amount).min(max);
            }
            body.health
        })
    }

    /// Move by `(dx, dy)`. Returns the new position.
    pub fn move_by(&self, dx: i32, dy: i32) -> Position {
        self.with_body(|body| {
            body.position = body.position.offset(dx, dy);
            body.position
        })
    }

    /// Put `item` in the private inventory.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::InventoryFull`] when a capped inventory has no
    /// free slot; the item is handed back inside the error.
    pub fn add_to_inventory(&self, item: impl Into<String>) -> Result<(), AgentError> {
        let item = item.into();
        self.with_body(|body| body.inventory.add(item))
    }

    /// Apply `kind` and schedule its revert after the configured duration.
    pub fn apply_effect(self: &Arc<Self>, kind: EffectKind, timers: &TimerService) -> ActiveEffect {
        let duration = self.config.effect_duration;
        let effect = self.with_body(|body| body.effects.apply(kind, default_bonus(kind), duration));

        let hero = Arc::downgrade(self);
        let id = effect.id;
        let scheduled = timers.schedule(duration, move || {
            if let Some(hero) = hero.upgrade() {
                hero.revert_effect(id);
            }
        });
        if !scheduled {
            debug!(hero = self.name(), effect = kind.name(), "revert not scheduled; effect lingers until the next start");
        }
        effect
    }

    /// Remove effect `id`. A no-op (returning `false`) when the hero is
    /// fallen or inactive; such effects are purged on the next start once
    /// their duration has passed.
    pub fn revert_effect(&self, id: u64) -> bool {
        if !self.public.is_alive() || !self.public.is_active() {
            debug!(hero = self.name(), id, "effect revert skipped");
            return false;
        }
        let Some(effect) = self.with_body(|body| body.effects.revert(id)) else {
            return false;
        };
        self.observe(EventCategory::Ability, format!("feels {} wear off", effect.kind.name()));
        true
    }

    /// Record `description` to the chronicle and the analytics sink.
    pub fn observe(&self, category: EventCategory, description: impl Into<String>) {
        let description = description.into();
        self.chronicle
            .log_event(format!("{} {description}", self.name()));
        self.analytics
            .record(AnalyticsEvent::new(self.name(), category, description));
    }

    /// Record world-level narration triggered by this hero.
    pub fn announce(&self, text: impl Into<String>) {
        let text = text.into();
        self.chronicle.log_event(text.clone());
        self.analytics
            .record(AnalyticsEvent::new(WORLD_ACTOR, EventCategory::World, text));
    }

    /// Clear `active` and wake a suspended loop.
    pub fn stop(&self) {
        self.public.set_active(false);
        self.wake.notify_waiters();
    }

    /// Set `active` ahead of a (re)launch.
    pub fn activate(&self) {
        self.public.set_active(true);
    }

    /// Drive `fut` unless the hero is stopped or falls first.
    ///
    /// Returns `None` as soon as a stop is signalled; `fut` is dropped, so
    /// it must be cancel-safe.
    pub async fn unless_stopped<F: Future>(&self, fut: F) -> Option<F::Output> {
        let notified = self.wake.notified();
        tokio::pin!(notified);
        // Register before the check so a stop between the two still wakes us.
        notified.as_mut().enable();
        if !self.public.is_active() || !self.public.is_alive() {
            return None;
        }
        tokio::select! {
            out = fut => Some(out),
            () = &mut notified => None,
        }
    }
}

/// Clears the running flag however the loop exits.
struct RunGuard<'a>(&'a AtomicBool);

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// An autonomous hero.
#[derive(Debug)]
pub struct Agent {
    core: Arc<AgentCore>,
    kit: Kit,
    store: Arc<SharedResourceStore>,
    world: Arc<WorldState>,
    peers: OnceLock<Vec<PeerProfile>>,
}

impl Agent {
    /// Build a hero from its configuration and the shared dependencies.
    ///
    /// The hero starts inactive; [`activate`](Self::activate) it before
    /// [`run`](Self::run).
    pub fn new(config: AgentConfig, deps: &AgentDeps) -> Self {
        let kit = Kit::for_role(config.role);
        Self {
            core: Arc::new(AgentCore::new(
                config,
                Arc::clone(&deps.chronicle),
                Arc::clone(&deps.analytics),
            )),
            kit,
            store: Arc::clone(&deps.store),
            world: Arc::clone(&deps.world),
            peers: OnceLock::new(),
        }
    }

    /// Introduce the rest of the party. Profiles with this hero's own name
    /// are skipped. Only the first call takes effect.
    pub fn set_peers(&self, peers: impl IntoIterator<Item = PeerProfile>) -> bool {
        let others = peers
            .into_iter()
            .filter(|peer| peer.name() != self.name())
            .collect();
        self.peers.set(others).is_ok()
    }

    /// Profiles of the other heroes.
    pub fn peers(&self) -> &[PeerProfile] {
        self.peers.get().map(Vec::as_slice).unwrap_or_default()
    }

    /// Shared state handle.
    pub const fn core(&self) -> &Arc<AgentCore> {
        &self.core
    }

    /// Hero name.
    pub fn name(&self) -> &str {
        self.core.name()
    }

    /// Hero role.
    pub fn role(&self) -> Role {
        self.core.role()
    }

    /// Display name of the role.
    pub fn role_name(&self) -> &'static str {
        self.kit.role_name()
    }

    /// Perform exactly one role action and record it.
    ///
    /// A fallen hero does nothing.
    pub async fn act(&self) -> ActionReport {
        if !self.is_alive() {
            return ActionReport::new("Rest", EventCategory::Lifecycle, "lies still");
        }
        let turn = Turn {
            core: &self.core,
            store: &self.store,
            world: &self.world,
            peers: self.peers(),
        };
        let report = self.kit.act(&turn).await;
        self.core.observe(report.category, report.description.clone());
        debug!(hero = self.name(), action = report.action, "action complete");
        report
    }

    /// Act, then wait one interval, while active and alive.
    ///
    /// A second concurrent call for the same hero returns immediately.
    /// Effects whose revert was skipped while the hero was inactive are
    /// purged on entry; effects still within their duration carry over. Exactly
    /// one "stopped acting" observation is recorded on exit.
    pub async fn run(&self) {
        if self.core.running.swap(true, Ordering::AcqRel) {
            warn!(hero = self.name(), "run loop already active; second launch ignored");
            return;
        }
        let _guard = RunGuard(&self.core.running);

        let now = Instant::now();
        let purged = self.core.with_body(|body| body.effects.purge_expired(now));
        if purged > 0 {
            debug!(hero = self.name(), purged, "purged lingering effects");
        }

        info!(hero = self.name(), role = %self.role(), "hero started acting");
        let interval = self.core.config.interval;
        while self.is_active() && self.is_alive() {
            self.act().await;
            if self
                .core
                .unless_stopped(tokio::time::sleep(interval))
                .await
                .is_none()
            {
                break;
            }
        }

        self.core.observe(EventCategory::Lifecycle, "stopped acting");
        info!(hero = self.name(), alive = self.is_alive(), "hero stopped acting");
    }

    /// Ask the loop to stop at its next boundary; wakes it if suspended.
    pub fn stop(&self) {
        self.core.stop();
    }

    /// Allow the loop to run.
    pub fn activate(&self) {
        self.core.activate();
    }

    /// Engage `peer` and record the exchange.
    pub fn interact(&self, peer: &PeerProfile) -> Interaction {
        let interaction = self.kit.interact(&self.core, peer);
        self.core
            .observe(EventCategory::Social, interaction.description.clone());
        interaction
    }

    /// Use the role's special ability and record it.
    pub fn special_ability(&self) -> ActionReport {
        let report = self.kit.special_ability(&self.core, self.store.timers());
        self.core.observe(report.category, report.description.clone());
        report
    }

    /// See [`AgentCore::take_damage`].
    pub fn take_damage(&self, amount: u32) -> bool {
        self.core.take_damage(amount)
    }

    /// See [`AgentCore::heal`].
    pub fn heal(&self, amount: u32) -> u32 {
        self.core.heal(amount)
    }

    /// See [`AgentCore::move_by`].
    pub fn move_by(&self, dx: i32, dy: i32) -> Position {
        self.core.move_by(dx, dy)
    }

    /// See [`AgentCore::add_to_inventory`].
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::InventoryFull`] when a capped inventory is full.
    pub fn add_to_inventory(&self, item: impl Into<String>) -> Result<(), AgentError> {
        self.core.add_to_inventory(item)
    }

    /// Current health (lock-free).
    pub fn health(&self) -> u32 {
        self.core.public.health()
    }

    /// Whether the hero is alive (lock-free).
    pub fn is_alive(&self) -> bool {
        self.core.public.is_alive()
    }

    /// Whether the loop may run (lock-free).
    pub fn is_active(&self) -> bool {
        self.core.public.is_active()
    }

    /// Whether a loop is currently executing.
    pub fn is_running(&self) -> bool {
        self.core.running.load(Ordering::Acquire)
    }

    /// Current position (lock-free).
    pub fn position(&self) -> Position {
        self.core.public.position()
    }

    /// Number of carried items (lock-free).
    pub fn inventory_len(&self) -> usize {
        self.core.public.inventory_len()
    }

    /// Role headline stat including overlays (lock-free).
    pub fn headline_stat(&self) -> u32 {
        self.core.public.headline()
    }

    /// Profile other heroes may hold.
    pub fn profile(&self) -> PeerProfile {
        self.core.profile()
    }

    /// Lock-free snapshot.
    pub fn snapshot(&self) -> AgentSnapshot {
        self.core.public.snapshot()
    }

    /// Copy of the carried items.
    pub fn inventory(&self) -> Vec<String> {
        self.core.with_body(|body| body.inventory.items().to_vec())
    }

    /// Copy of the role stats.
    pub fn stats(&self) -> RoleStats {
        self.core.with_body(|body| body.stats.clone())
    }

    /// Copy of the active effects.
    pub fn active_effects(&self) -> Vec<ActiveEffect> {
        self.core.with_body(|body| body.effects.active().to_vec())
    }
}
