//! The treasure vault: resource kind to non-negative quantity.
//!
//! Multiple readers / single writer. [`Vault::view`] and
//! [`Vault::balance`] take the shared read section and never block each
//! other; [`Vault::deposit`] and [`Vault::withdraw`] take the exclusive
//! write section, so the withdraw check-and-decrement cannot interleave
//! with any other mutation.

use std::collections::BTreeMap;
use std::sync::RwLock;

use guildhall_types::sync;
use tracing::trace;

/// Shared treasure ledger.
#[derive(Debug, Default)]
pub struct Vault {
    balances: RwLock<BTreeMap<String, u64>>,
}

impl Vault {
    /// Create a vault seeded with the given balances.
    pub const fn new(initial: BTreeMap<String, u64>) -> Self {
        Self {
            balances: RwLock::new(initial),
        }
    }

    /// Add `amount` of `kind`. Always succeeds; returns the new balance.
    ///
    /// The balance saturates at `u64::MAX`.
    pub fn deposit(&self, kind: &str, amount: u64) -> u64 {
        let mut balances = sync::write(&self.balances);
        let slot = balances.entry(kind.to_owned()).or_insert(0);
        *slot = slot.saturating_add(amount);
        trace!(kind, amount, balance = *slot, "vault deposit");
        *slot
    }

    /// Remove `amount` of `kind` if at least that much is held.
    ///
    /// Returns `false` (and changes nothing) on insufficient funds.
    pub fn withdraw(&self, kind: &str, amount: u64) -> bool {
        let mut balances = sync::write(&self.balances);
        let current = balances.get(kind).copied().unwrap_or(0);
        let Some(remaining) = current.checked_sub(amount) else {
            trace!(kind, amount, current, "vault withdraw refused");
            return false;
        };
        if let Some(slot) = balances.get_mut(kind) {
            *slot = remaining;
        }
        trace!(kind, amount, remaining, "vault withdraw");
        true
    }

    /// Snapshot of every balance.
    pub fn view(&self) -> BTreeMap<String, u64> {
        sync::read(&self.balances).clone()
    }

    /// Current balance of `kind` (0 if never deposited).
    pub fn balance(&self, kind: &str) -> u64 {
        sync::read(&self.balances).get(kind).copied().unwrap_or(0)
    }

    /// Sum of all balances, saturating.
    pub fn total(&self) -> u64 {
        sync::read(&self.balances)
            .values()
            .fold(0_u64, |acc, qty| acc.saturating_add(*qty))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded() -> Vault {
        Vault::new(BTreeMap::from([(String::from("Gold"), 500)]))
    }

    #[test]
    fn deposit_adds() {
        let vault = seeded();
        assert_eq!(vault.deposit("Gold", 25), 525);
        assert_eq!(vault.deposit("Gems", 3), 3);
        assert_eq!(vault.total(), 528);
    }

    #[test]
    fn withdraw_within_balance() {
        let vault = seeded();
        assert!(vault.withdraw("Gold", 300));
        assert_eq!(vault.balance("Gold"), 200);
    }

    #[test]
    fn withdraw_exact_balance_empties() {
        let vault = seeded();
        assert!(vault.withdraw("Gold", 500));
        assert_eq!(vault.balance("Gold"), 0);
    }

    #[test]
    fn insufficient_funds_is_refused_without_change() {
        let vault = seeded();
        assert!(!vault.withdraw("Gold", 501));
        assert_eq!(vault.balance("Gold"), 500);
    }

    #[test]
    fn unknown_kind_has_nothing_to_withdraw() {
        let vault = seeded();
        assert!(!vault.withdraw("Relics", 1));
        assert!(vault.view().get("Relics").is_none());
    }

    #[test]
    fn deposit_saturates() {
        let vault = Vault::new(BTreeMap::from([(String::from("Gold"), u64::MAX.saturating_sub(1))]));
        assert_eq!(vault.deposit("Gold", 10), u64::MAX);
    }
}
