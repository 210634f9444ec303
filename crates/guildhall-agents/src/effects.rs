//! Transient ability effects.
//!
//! A special ability adds an [`ActiveEffect`] overlay to the hero's role
//! stat and schedules its revert on the timer service. Effects are never
//! folded into the base stat, so reverting is just removing the overlay.
//! One effect of each kind is active at a time; re-applying replaces it and
//! the older revert finds nothing to remove.

use std::time::Duration;

use guildhall_types::EffectKind;
use tokio::time::Instant;

/// Bonus granted by each ability.
pub const fn default_bonus(kind: EffectKind) -> u32 {
    match kind {
        EffectKind::ArmorUp => 6,
        EffectKind::ShadowVeil => 15,
        EffectKind::ArcaneWard => 8,
    }
}

/// One applied effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveEffect {
    /// Identifier handed to the scheduled revert.
    pub id: u64,
    /// Which ability produced it.
    pub kind: EffectKind,
    /// Amount added to the role stat.
    pub bonus: u32,
    /// When the scheduled revert fires.
    pub expires_at: Instant,
}

/// Effects currently overlaying one hero.
#[derive(Debug, Clone, Default)]
pub struct EffectSet {
    active: Vec<ActiveEffect>,
    next_id: u64,
}

impl EffectSet {
    /// Apply `kind` for `duration`, replacing an active effect of the same
    /// kind.
    pub fn apply(&mut self, kind: EffectKind, bonus: u32, duration: Duration) -> ActiveEffect {
        self.active.retain(|effect| effect.kind != kind);
        let effect = ActiveEffect {
            id: self.next_id,
            kind,
            bonus,
            expires_at: Instant::now()
                .checked_add(duration)
                .unwrap_or_else(Instant::now),
        };
        self.next_id = self.next_id.wrapping_add(1);
        self.active.push(effect);
        effect
    }

    /// Remove the effect with `id`, if it is still active.
    pub fn revert(&mut self, id: u64) -> Option<ActiveEffect> {
        let index = self.active.iter().position(|effect| effect.id == id)?;
        Some(self.active.remove(index))
    }

    /// Drop effects that expired at or before `now`. Returns how many were
    /// removed.
    pub fn purge_expired(&mut self, now: Instant) -> usize {
        let before = self.active.len();
        self.active.retain(|effect| effect.expires_at > now);
        before.saturating_sub(self.active.len())
    }

    /// Total bonus currently granted by `kind`.
    pub fn bonus(&self, kind: EffectKind) -> u32 {
        self.active
            .iter()
            .filter(|effect| effect.kind == kind)
            .fold(0_u32, |acc, effect| acc.saturating_add(effect.bonus))
    }

    /// Active effects in application order.
    pub fn active(&self) -> &[ActiveEffect] {
        &self.active
    }
}
