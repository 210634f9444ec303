//! The trading post: a fixed catalogue of goods that sell out and restock.
//!
//! Every state change (a sale, a restock, a new listing) is a conditional
//! transition performed inside the same mutex section, so a restock can
//! never interleave with a concurrent trade of the same item.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use guildhall_types::sync;
use tracing::{debug, info};

use crate::timer::TimerService;

/// Default delay between a sale and the item becoming available again.
pub const DEFAULT_RESTOCK_DELAY: Duration = Duration::from_secs(5);

/// State of one catalogue entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Listing {
    /// Ready to be bought.
    Available,
    /// Bought and awaiting restock.
    Sold {
        /// Hero that bought it.
        buyer: String,
    },
}

type Listings = Arc<Mutex<BTreeMap<String, Listing>>>;

/// Shared marketplace with timed restocking.
#[derive(Debug)]
pub struct TradingPost {
    listings: Listings,
    restock_delay: Duration,
    timers: TimerService,
}

impl TradingPost {
    /// Create a trading post offering each of `goods`.
    pub fn new<I, S>(goods: I, restock_delay: Duration, timers: TimerService) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let listings = goods
            .into_iter()
            .map(|item| (item.into(), Listing::Available))
            .collect();
        Self {
            listings: Arc::new(Mutex::new(listings)),
            restock_delay,
            timers,
        }
    }

    /// Buy `item` for `buyer`.
    ///
    /// Succeeds only if the item is listed and currently available; the
    /// item is then sold and a restock is scheduled after the restock delay.
    pub fn trade(&self, item: &str, buyer: &str) -> bool {
        {
            let mut listings = sync::lock(&self.listings);
            let Some(slot) = listings.get_mut(item) else {
                return false;
            };
            if *slot != Listing::Available {
                return false;
            }
            *slot = Listing::Sold {
                buyer: buyer.to_owned(),
            };
        }
        debug!(item, buyer, "trading post sale");

        let listings = Arc::clone(&self.listings);
        let restocked = item.to_owned();
        if !self.timers.schedule(self.restock_delay, move || {
            if restock(&listings, &restocked) {
                info!(item = %restocked, "trading post restocked");
            }
        }) {
            debug!(item, "restock not scheduled; item stays sold");
        }
        true
    }

    /// Add `item` to the catalogue as available. Returns `false` if it is
    /// already listed.
    pub fn stock(&self, item: impl Into<String>) -> bool {
        let mut listings = sync::lock(&self.listings);
        let item = item.into();
        if listings.contains_key(&item) {
            return false;
        }
        listings.insert(item, Listing::Available);
        true
    }

    /// Current state of `item`, if listed.
    pub fn listing(&self, item: &str) -> Option<Listing> {
        sync::lock(&self.listings).get(item).cloned()
    }

    /// Items currently available, in catalogue order.
    pub fn available_items(&self) -> Vec<String> {
        sync::lock(&self.listings)
            .iter()
            .filter(|(_, listing)| **listing == Listing::Available)
            .map(|(item, _)| item.clone())
            .collect()
    }

    /// Items awaiting restock, with their buyer.
    pub fn sold_items(&self) -> BTreeMap<String, String> {
        sync::lock(&self.listings)
            .iter()
            .filter_map(|(item, listing)| match listing {
                Listing::Sold { buyer } => Some((item.clone(), buyer.clone())),
                Listing::Available => None,
            })
            .collect()
    }
}

/// Sold -> Available. Returns whether the transition happened.
fn restock(listings: &Mutex<BTreeMap<String, Listing>>, item: &str) -> bool {
    let mut listings = sync::lock(listings);
    let Some(slot) = listings.get_mut(item) else {
        return false;
    };
    if !matches!(slot, Listing::Sold { .. }) {
        return false;
    }
    *slot = Listing::Available;
    true
}

#[cfg(test)]
mod tests {
    use tokio::runtime::Handle;

    use super::*;

    fn post(delay: Duration) -> TradingPost {
        TradingPost::new(
            ["Steel Sword", "Healing Draught"],
            delay,
            TimerService::with_handle(Handle::current()),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn sale_then_restock() {
        let post = post(Duration::from_secs(5));
        assert!(post.trade("Steel Sword", "Aldric"));
        assert_eq!(
            post.listing("Steel Sword"),
            Some(Listing::Sold {
                buyer: String::from("Aldric")
            })
        );
        assert!(!post.trade("Steel Sword", "Vex"));

        tokio::time::sleep(Duration::from_secs(6)).await;
        assert_eq!(post.listing("Steel Sword"), Some(Listing::Available));
        assert!(post.trade("Steel Sword", "Vex"));
    }

    #[tokio::test]
    async fn unknown_item_cannot_be_traded() {
        let post = post(Duration::from_secs(5));
        assert!(!post.trade("Dragon Egg", "Aldric"));
        assert!(post.listing("Dragon Egg").is_none());
    }

    #[tokio::test]
    async fn stock_adds_new_listing_once() {
        let post = post(Duration::from_secs(5));
        assert!(post.stock("Lantern"));
        assert!(!post.stock("Lantern"));
        assert!(post.available_items().contains(&String::from("Lantern")));
    }

    #[tokio::test]
    async fn sold_items_lists_buyers() {
        let post = post(Duration::from_secs(60));
        assert!(post.trade("Healing Draught", "Mira"));
        let sold = post.sold_items();
        assert_eq!(sold.get("Healing Draught").map(String::as_str), Some("Mira"));
        assert_eq!(post.available_items(), vec![String::from("Steel Sword")]);
    }

    #[tokio::test(start_paused = true)]
    async fn closed_timers_leave_item_sold() {
        let post = post(Duration::from_secs(1));
        post.timers.shutdown();
        assert!(post.trade("Steel Sword", "Aldric"));
        tokio::time::sleep(Duration::from_secs(3)).await;
        assert!(matches!(post.listing("Steel Sword"), Some(Listing::Sold { .. })));
    }
}
