//! Private hero inventory.
//!
//! An ordered list of item names with an optional slot limit. It lives
//! inside the hero's own mutex, so none of these methods synchronize.

use crate::error::AgentError;

/// Ordered bag of items carried by one hero.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Inventory {
    items: Vec<String>,
    capacity: Option<usize>,
}

impl Inventory {
    /// Create an empty inventory; `None` means unbounded.
    pub const fn new(capacity: Option<usize>) -> Self {
        Self {
            items: Vec::new(),
            capacity,
        }
    }

    /// Append `item`.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::InventoryFull`] with the item when every slot
    /// is taken.
    pub fn add(&mut self, item: String) -> Result<(), AgentError> {
        if let Some(capacity) = self.capacity
            && self.items.len() >= capacity
        {
            return Err(AgentError::InventoryFull { item, capacity });
        }
        self.items.push(item);
        Ok(())
    }

    /// Remove and return the oldest item.
    pub fn take_first(&mut self) -> Option<String> {
        if self.items.is_empty() {
            None
        } else {
            Some(self.items.remove(0))
        }
    }

    /// Remove the first occurrence of `item`.
    pub fn remove(&mut self, item: &str) -> bool {
        let Some(index) = self.items.iter().position(|held| held == item) else {
            return false;
        };
        self.items.remove(index);
        true
    }

    /// Items in pickup order.
    pub fn items(&self) -> &[String] {
        &self.items
    }

    /// Number of items carried.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether nothing is carried.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Whether a capped inventory has no free slot.
    pub fn is_full(&self) -> bool {
        self.capacity.is_some_and(|cap| self.items.len() >= cap)
    }

    /// Slot limit, if any.
    pub const fn capacity(&self) -> Option<usize> {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unbounded_accepts_everything() {
        let mut inv = Inventory::new(None);
        for i in 0..100 {
            assert!(inv.add(format!("pebble {i}")).is_ok());
        }
        assert_eq!(inv.len(), 100);
        assert!(!inv.is_full());
    }

    #[test]
    fn capped_rejects_when_full() {
        let mut inv = Inventory::new(Some(2));
        assert!(inv.add(String::from("rope")).is_ok());
        assert!(inv.add(String::from("torch")).is_ok());
        assert!(inv.is_full());
        assert_eq!(
            inv.add(String::from("lantern")),
            Err(AgentError::InventoryFull {
                item: String::from("lantern"),
                capacity: 2,
            })
        );
        assert_eq!(inv.items(), [String::from("rope"), String::from("torch")]);
    }

    #[test]
    fn take_and_remove() {
        let mut inv = Inventory::new(Some(5));
        assert!(inv.add(String::from("a")).is_ok());
        assert!(inv.add(String::from("b")).is_ok());
        assert!(inv.remove("b"));
        assert!(!inv.remove("b"));
        assert_eq!(inv.take_first().as_deref(), Some("a"));
        assert!(inv.take_first().is_none());
        assert!(inv.is_empty());
    }
}
