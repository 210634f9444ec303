//! Lock-free public view of a hero.
//!
//! Every field a status report or another hero may read is mirrored into an
//! atomic while the hero's own mutex is held. Readers never take that
//! mutex, so a snapshot can be built while the hero keeps acting, and a
//! [`PeerProfile`] lets one hero look at another without any lock.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicI32, AtomicU32, AtomicUsize, Ordering};

use guildhall_types::{AgentSnapshot, Position, Role};

/// Atomically mirrored hero state.
#[derive(Debug)]
pub struct PublicState {
    name: String,
    role: Role,
    max_health: u32,
    headline_label: &'static str,
    health: AtomicU32,
    alive: AtomicBool,
    active: AtomicBool,
    x: AtomicI32,
    y: AtomicI32,
    inventory_len: AtomicUsize,
    headline: AtomicU32,
}

impl PublicState {
    pub(crate) fn new(
        name: String,
        role: Role,
        max_health: u32,
        position: Position,
        headline_label: &'static str,
    ) -> Self {
        Self {
            name,
            role,
            max_health,
            headline_label,
            health: AtomicU32::new(max_health),
            alive: AtomicBool::new(max_health > 0),
            active: AtomicBool::new(false),
            x: AtomicI32::new(position.x),
            y: AtomicI32::new(position.y),
            inventory_len: AtomicUsize::new(0),
            headline: AtomicU32::new(0),
        }
    }

    /// Hero name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Hero role.
    pub const fn role(&self) -> Role {
        self.role
    }

    /// Maximum health.
    pub const fn max_health(&self) -> u32 {
        self.max_health
    }

    /// Current health.
    pub fn health(&self) -> u32 {
        self.health.load(Ordering::Relaxed)
    }

    /// Whether the hero is alive.
    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    /// Whether the hero's loop may run.
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Current position.
    pub fn position(&self) -> Position {
        Position::new(self.x.load(Ordering::Relaxed), self.y.load(Ordering::Relaxed))
    }

    /// Number of carried items.
    pub fn inventory_len(&self) -> usize {
        self.inventory_len.load(Ordering::Relaxed)
    }

    /// Label of the role's headline stat.
    pub const fn headline_label(&self) -> &'static str {
        self.headline_label
    }

    /// Value of the role's headline stat.
    pub fn headline(&self) -> u32 {
        self.headline.load(Ordering::Relaxed)
    }

    /// Assemble a snapshot from the getters.
    pub fn snapshot(&self) -> AgentSnapshot {
        AgentSnapshot {
            name: self.name.clone(),
            role: self.role,
            health: self.health(),
            max_health: self.max_health,
            alive: self.is_alive(),
            active: self.is_active(),
            position: self.position(),
            inventory_len: self.inventory_len(),
            headline_label: String::from(self.headline_label),
            headline_value: self.headline(),
        }
    }

    pub(crate) fn set_active(&self, active: bool) {
        self.active.store(active, Ordering::SeqCst);
    }

    pub(crate) fn mirror(
        &self,
        health: u32,
        alive: bool,
        position: Position,
        inventory_len: usize,
        headline: u32,
    ) {
        self.health.store(health, Ordering::Relaxed);
        self.x.store(position.x, Ordering::Relaxed);
        self.y.store(position.y, Ordering::Relaxed);
        self.inventory_len.store(inventory_len, Ordering::Relaxed);
        self.headline.store(headline, Ordering::Relaxed);
        self.alive.store(alive, Ordering::SeqCst);
    }
}

/// What one hero may see of another.
///
/// Holds only the other hero's public atomics, never its mutex or a strong
/// reference to the hero itself, so profiles cannot form reference cycles.
#[derive(Debug, Clone)]
pub struct PeerProfile {
    public: Arc<PublicState>,
}

impl PeerProfile {
    pub(crate) const fn new(public: Arc<PublicState>) -> Self {
        Self { public }
    }

    /// Peer name.
    pub fn name(&self) -> &str {
        self.public.name()
    }

    /// Peer role.
    pub fn role(&self) -> Role {
        self.public.role()
    }

    /// Whether the peer is alive.
    pub fn is_alive(&self) -> bool {
        self.public.is_alive()
    }

    /// Peer health.
    pub fn health(&self) -> u32 {
        self.public.health()
    }

    /// Peer maximum health.
    pub fn max_health(&self) -> u32 {
        self.public.max_health()
    }

    /// Peer position.
    pub fn position(&self) -> Position {
        self.public.position()
    }
}
