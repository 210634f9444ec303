//! Bounded FIFO loot queue.
//!
//! Items live in a `VecDeque` behind one mutex, so enqueue order is the
//! dequeue order regardless of how many producers and consumers race.
//! Producers never block: [`LootQueue::offer`] reports a full queue instead.
//! Consumers either poll ([`LootQueue::try_take`]) or suspend
//! ([`LootQueue::take`]) until a producer signals the [`Notify`].

use std::collections::VecDeque;
use std::sync::Mutex;

use guildhall_types::sync;
use tokio::sync::Notify;
use tracing::trace;

use crate::error::StoreError;

/// Default queue capacity.
pub const DEFAULT_LOOT_CAPACITY: usize = 50;

/// Shared buffer of discoverable items.
#[derive(Debug)]
pub struct LootQueue {
    capacity: usize,
    items: Mutex<VecDeque<String>>,
    available: Notify,
}

impl Default for LootQueue {
    fn default() -> Self {
        Self::new(DEFAULT_LOOT_CAPACITY)
    }
}

impl LootQueue {
    /// Create an empty queue holding at most `capacity` items.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            items: Mutex::new(VecDeque::with_capacity(capacity)),
            available: Notify::new(),
        }
    }

    /// Enqueue `item` without blocking.
    ///
    /// Fails with [`StoreError::LootQueueFull`] (returning the item) when the
    /// queue is at capacity.
    pub fn offer(&self, item: impl Into<String>) -> Result<(), StoreError> {
        let item = item.into();
        {
            let mut items = sync::lock(&self.items);
            if items.len() >= self.capacity {
                return Err(StoreError::LootQueueFull {
                    capacity: self.capacity,
                    item,
                });
            }
            trace!(item = %item, queued = items.len(), "loot offered");
            items.push_back(item);
        }
        self.available.notify_one();
        Ok(())
    }

    /// Dequeue the oldest item, or `None` if the queue is empty.
    pub fn try_take(&self) -> Option<String> {
        sync::lock(&self.items).pop_front()
    }

    /// Dequeue the oldest item, suspending until one is available.
    ///
    /// Cancel-safe: dropping the future before it completes never loses an
    /// item.
    pub async fn take(&self) -> String {
        loop {
            let notified = self.available.notified();
            if let Some(item) = self.try_take() {
                return item;
            }
            notified.await;
        }
    }

    /// Number of queued items.
    pub fn len(&self) -> usize {
        sync::lock(&self.items).len()
    }

    /// Whether the queue is empty.
    pub fn is_empty(&self) -> bool {
        sync::lock(&self.items).is_empty()
    }

    /// Maximum number of queued items.
    pub const fn capacity(&self) -> usize {
        self.capacity
    }
}
