//! Shared party inventory.
//!
//! Contention is low, so every operation (including reads) goes through a
//! single mutex. There is no reader/writer distinction.

use std::sync::Mutex;

use guildhall_types::sync;

/// Ordered bag of item names shared by all heroes.
#[derive(Debug, Default)]
pub struct SharedInventory {
    items: Mutex<Vec<String>>,
}

impl SharedInventory {
    /// Create an empty shared inventory.
    pub const fn new() -> Self {
        Self {
            items: Mutex::new(Vec::new()),
        }
    }

    /// Append an item.
    pub fn add(&self, item: impl Into<String>) {
        sync::lock(&self.items).push(item.into());
    }

    /// Remove the first occurrence of `item`. Returns whether one was removed.
    pub fn remove(&self, item: &str) -> bool {
        let mut items = sync::lock(&self.items);
        let Some(index) = items.iter().position(|held| held == item) else {
            return false;
        };
        items.remove(index);
        true
    }

    /// Remove and return the oldest item, if any.
    pub fn take_first(&self) -> Option<String> {
        let mut items = sync::lock(&self.items);
        if items.is_empty() {
            None
        } else {
            Some(items.remove(0))
        }
    }

    /// Snapshot of the contents, in insertion order.
    pub fn view(&self) -> Vec<String> {
        sync::lock(&self.items).clone()
    }

    /// Number of items held.
    pub fn len(&self) -> usize {
        sync::lock(&self.items).len()
    }

    /// Whether the inventory is empty.
    pub fn is_empty(&self) -> bool {
        sync::lock(&self.items).is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_and_view_preserve_order() {
        let inv = SharedInventory::new();
        inv.add("rope");
        inv.add("torch");
        assert_eq!(inv.view(), vec![String::from("rope"), String::from("torch")]);
    }

    #[test]
    fn remove_first_occurrence_only() {
        let inv = SharedInventory::new();
        inv.add("potion");
        inv.add("rope");
        inv.add("potion");
        assert!(inv.remove("potion"));
        assert_eq!(inv.view(), vec![String::from("rope"), String::from("potion")]);
        assert!(!inv.remove("lantern"));
    }

    #[test]
    fn take_first_drains_in_order() {
        let inv = SharedInventory::new();
        assert!(inv.take_first().is_none());
        inv.add("a");
        inv.add("b");
        assert_eq!(inv.take_first().as_deref(), Some("a"));
        assert_eq!(inv.len(), 1);
    }
}
