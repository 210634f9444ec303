//! Error types for the shared resource store.
//!
//! Contention failures that callers are expected to inspect and retry
//! (insufficient funds, insufficient mana, an item already sold) are plain
//! `bool`/`Option` results on the resource itself. [`StoreError`] covers the
//! conditions a caller has to handle differently.

/// Errors returned by shared resource operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// The loot queue is at capacity; the offered item was not enqueued.
    #[error("loot queue full (capacity {capacity}): {item} was not enqueued")]
    LootQueueFull {
        /// Queue capacity.
        capacity: usize,
        /// The rejected item, handed back to the caller.
        item: String,
    },

    /// The timer service was created outside a tokio runtime.
    #[error("no tokio runtime available for timers: {reason}")]
    NoRuntime {
        /// Description from the runtime lookup.
        reason: String,
    },
}
