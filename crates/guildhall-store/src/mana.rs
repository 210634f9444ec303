//! The shared mana pool.
//!
//! A single atomic register. [`ManaPool::consume`] is an explicit
//! optimistic compare-and-swap loop; [`ManaPool::restore`] is an
//! unconditional atomic add. The pool can never go below zero because a
//! swap is only attempted when the observed level covers the request.
//!
//! The retry loop is bounded by [`CONSUME_RETRY_BUDGET`]. It is not
//! starvation-proof under pathological contention, which is acceptable for
//! a handful of heroes: a caller that exhausts the budget simply sees a
//! failed consume, the same as insufficient mana.

use std::sync::atomic::{AtomicU64, Ordering};

use tracing::warn;

/// Maximum compare-and-swap attempts per [`ManaPool::consume`] call.
pub const CONSUME_RETRY_BUDGET: u32 = 1024;

/// Shared mana reservoir.
#[derive(Debug, Default)]
pub struct ManaPool {
    level: AtomicU64,
}

impl ManaPool {
    /// Create a pool holding `initial` mana.
    pub const fn new(initial: u64) -> Self {
        Self {
            level: AtomicU64::new(initial),
        }
    }

    /// Try to remove `amount` mana.
    ///
    /// Returns `false` without changing the pool if the level is (or becomes)
    /// lower than `amount`, or if the retry budget is exhausted.
    pub fn consume(&self, amount: u64) -> bool {
        let mut current = self.level.load(Ordering::Acquire);
        for _ in 0..CONSUME_RETRY_BUDGET {
            let Some(next) = current.checked_sub(amount) else {
                return false;
            };
            match self
                .level
                .compare_exchange_weak(current, next, Ordering::AcqRel, Ordering::Acquire)
            {
                Ok(_) => return true,
                Err(observed) => {
                    current = observed;
                    std::hint::spin_loop();
                }
            }
        }
        warn!(amount, "mana pool consume gave up after retry budget");
        false
    }

    /// Add `amount` mana unconditionally. Returns the new level.
    pub fn restore(&self, amount: u64) -> u64 {
        self.level
            .fetch_add(amount, Ordering::AcqRel)
            .saturating_add(amount)
    }

    /// Current level.
    pub fn level(&self) -> u64 {
        self.level.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn consume_within_level() {
        let pool = ManaPool::new(100);
        assert!(pool.consume(40));
        assert_eq!(pool.level(), 60);
    }

    #[test]
    fn consume_exact_level() {
        let pool = ManaPool::new(100);
        assert!(pool.consume(100));
        assert_eq!(pool.level(), 0);
    }

    #[test]
    fn consume_beyond_level_fails_without_change() {
        let pool = ManaPool::new(100);
        assert!(!pool.consume(101));
        assert_eq!(pool.level(), 100);
    }

    #[test]
    fn restore_has_no_upper_bound() {
        let pool = ManaPool::new(1000);
        assert_eq!(pool.restore(500), 1500);
        assert_eq!(pool.level(), 1500);
    }

    #[test]
    fn consume_zero_always_succeeds() {
        let pool = ManaPool::new(0);
        assert!(pool.consume(0));
        assert_eq!(pool.level(), 0);
    }
}
