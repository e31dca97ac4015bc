//! # Transient Storage (EIP-1153)
//!
//! Backing map for `TLOAD` and `TSTORE`.
//!
//! Transient storage lives for one transaction:
//! - unset keys read as zero
//! - writes are visible to every later frame of the same transaction
//! - writes made by a frame that reverts or halts are undone
//! - everything is dropped at transaction end, with no refund

use crate::domain::value_objects::{Address, StorageKey, StorageValue};
use std::collections::HashMap;

type Slot = (Address, StorageKey);

/// Transient storage for a single transaction.
#[derive(Debug, Default, Clone)]
pub struct TransientStorage {
    /// Storage per contract address.
    data: HashMap<Address, HashMap<StorageKey, StorageValue>>,
    /// Previous value of every write, oldest first.
    journal: Vec<(Slot, StorageValue)>,
}

impl TransientStorage {
    /// Creates a new empty transient storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a value from transient storage (TLOAD).
    ///
    /// Returns zero if the key has not been set.
    #[must_use]
    pub fn tload(&self, address: &Address, key: &StorageKey) -> StorageValue {
        self.data
            .get(address)
            .and_then(|storage| storage.get(key))
            .copied()
            .unwrap_or_default()
    }

    /// Store a value in transient storage (TSTORE).
    pub fn tstore(&mut self, address: Address, key: StorageKey, value: StorageValue) {
        let previous = self
            .data
            .entry(address)
            .or_default()
            .insert(key, value)
            .unwrap_or_default();
        self.journal.push(((address, key), previous));
    }

    /// Marks the current journal position.
    #[must_use]
    pub fn checkpoint(&self) -> usize {
        self.journal.len()
    }

    /// Undoes every write made after `checkpoint`.
    pub fn revert_to(&mut self, checkpoint: usize) {
        while self.journal.len() > checkpoint {
            let Some(((address, key), previous)) = self.journal.pop() else {
                break;
            };
            if let Some(storage) = self.data.get_mut(&address) {
                storage.insert(key, previous);
            }
        }
    }

    /// Clear all transient storage (called at end of transaction).
    pub fn clear(&mut self) {
        self.data.clear();
        self.journal.clear();
    }

    /// Get the number of contracts with transient storage.
    #[must_use]
    pub fn contract_count(&self) -> usize {
        self.data.len()
    }

    /// Get the total number of non-zero slots across all contracts.
    #[must_use]
    pub fn slot_count(&self) -> usize {
        self.data
            .values()
            .flat_map(HashMap::values)
            .filter(|value| !value.is_zero())
            .count()
    }
}

// =============================================================================
// TESTS
// =============================================================================
