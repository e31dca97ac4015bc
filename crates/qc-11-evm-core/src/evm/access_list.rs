//! # Access List (EIP-2929)
//!
//! Warm/cold tracking of accounts and storage slots for one transaction.

use crate::domain::value_objects::{Address, StorageKey};
use std::collections::HashSet;

/// Whether an account or slot was already touched in this transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AccessStatus {
    /// Touched before.
    Warm,
    /// First touch.
    Cold,
}

#[derive(Clone, Copy, Debug)]
enum Touch {
    Account(Address),
    Slot(Address, StorageKey),
}

/// In-memory access list.
///
/// Touches made by a frame that fails are undone with [`AccessList::revert_to`].
#[derive(Clone, Debug, Default)]
pub struct AccessList {
    /// Warm accounts.
    warm_accounts: HashSet<Address>,
    /// Warm storage slots.
    warm_storage: HashSet<(Address, StorageKey)>,
    journal: Vec<Touch>,
}

impl AccessList {
    /// Create a new empty access list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with pre-warmed accounts and slots (EIP-2930 style).
    #[must_use]
    pub fn with_prewarmed(
        accounts: impl IntoIterator<Item = Address>,
        storage: impl IntoIterator<Item = (Address, StorageKey)>,
    ) -> Self {
        Self {
            warm_accounts: accounts.into_iter().collect(),
            warm_storage: storage.into_iter().collect(),
            journal: Vec::new(),
        }
    }

    /// Marks an account warm and reports its previous status.
    pub fn touch_account(&mut self, address: Address) -> AccessStatus {
        if self.warm_accounts.insert(address) {
            self.journal.push(Touch::Account(address));
            AccessStatus::Cold
        } else {
            AccessStatus::Warm
        }
    }

    /// Marks a slot warm and reports its previous status.
    pub fn touch_storage(&mut self, address: Address, key: StorageKey) -> AccessStatus {
        if self.warm_storage.insert((address, key)) {
            self.journal.push(Touch::Slot(address, key));
            AccessStatus::Cold
        } else {
            AccessStatus::Warm
        }
    }

    /// True if the account was touched.
    #[must_use]
    pub fn is_account_warm(&self, address: Address) -> bool {
        self.warm_accounts.contains(&address)
    }

    /// True if the slot was touched.
    #[must_use]
    pub fn is_storage_warm(&self, address: Address, key: StorageKey) -> bool {
        self.warm_storage.contains(&(address, key))
    }

    /// Marks the current journal position.
    #[must_use]
    pub fn checkpoint(&self) -> usize {
        self.journal.len()
    }

    /// Forgets every touch made after `checkpoint`.
    pub fn revert_to(&mut self, checkpoint: usize) {
        for touch in self.journal.drain(checkpoint.min(self.journal.len())..) {
            match touch {
                Touch::Account(address) => {
                    self.warm_accounts.remove(&address);
                }
                Touch::Slot(address, key) => {
                    self.warm_storage.remove(&(address, key));
                }
            }
        }
    }

    /// Clear all access tracking.
    pub fn clear(&mut self) {
        self.warm_accounts.clear();
        self.warm_storage.clear();
        self.journal.clear();
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_access() {
        let mut list = AccessList::new();
        let addr = Address::new([1u8; 20]);
        let key = StorageKey::from(1u64);

        assert_eq!(list.touch_storage(addr, key), AccessStatus::Cold);
        assert_eq!(list.touch_storage(addr, key), AccessStatus::Warm);
        assert!(list.is_storage_warm(addr, key));
        assert!(!list.is_storage_warm(addr, StorageKey::from(2u64)));
    }

    #[test]
    fn test_prewarmed() {
        let addr = Address::new([2u8; 20]);
        let key = StorageKey::from(9u64);
        let mut list = AccessList::with_prewarmed([addr], [(addr, key)]);

        assert_eq!(list.touch_account(addr), AccessStatus::Warm);
        assert_eq!(list.touch_storage(addr, key), AccessStatus::Warm);
    }

    #[test]
    fn test_revert_forgets_touches() {
        let mut list = AccessList::new();
        let addr = Address::new([3u8; 20]);
        let key = StorageKey::from(1u64);

        list.touch_account(addr);
        let checkpoint = list.checkpoint();
        list.touch_storage(addr, key);

        list.revert_to(checkpoint);

        assert!(list.is_account_warm(addr));
        assert!(!list.is_storage_warm(addr, key));
        assert_eq!(list.touch_storage(addr, key), AccessStatus::Cold);
    }
}
