//! # State Adapter
//!
//! In-memory, journaled world state for tests and the service facade.
//! A production node would back [`WorldState`] with its state trie.

use crate::domain::value_objects::{Address, StorageKey, StorageValue};
use crate::ports::outbound::WorldState;
use std::collections::HashMap;

type Slot = (Address, StorageKey);

/// In-memory world state with a committed layer and a pending layer.
///
/// Writes land in the pending layer and are recorded in a journal so nested
/// frames can be rolled back to a checkpoint.
#[derive(Debug, Default)]
pub struct InMemoryWorldState {
    /// Durable storage.
    committed: HashMap<Slot, StorageValue>,
    /// Writes made by the current transaction.
    pending: HashMap<Slot, StorageValue>,
    /// Previous pending value of every write, oldest first.
    journal: Vec<(Slot, Option<StorageValue>)>,
}

impl InMemoryWorldState {
    /// Create a new empty state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a committed slot, bypassing the journal.
    pub fn insert_committed(&mut self, address: Address, key: StorageKey, value: StorageValue) {
        self.committed.insert((address, key), value);
    }

    /// Number of slots with uncommitted writes.
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}

impl WorldState for InMemoryWorldState {
    fn storage(&self, address: Address, key: StorageKey) -> StorageValue {
        let slot = (address, key);
        self.pending
            .get(&slot)
            .or_else(|| self.committed.get(&slot))
            .copied()
            .unwrap_or(StorageValue::ZERO)
    }

    fn original_storage(&self, address: Address, key: StorageKey) -> StorageValue {
        self.committed
            .get(&(address, key))
            .copied()
            .unwrap_or(StorageValue::ZERO)
    }

    fn set_storage(&mut self, address: Address, key: StorageKey, value: StorageValue) {
        let slot = (address, key);
        let previous = self.pending.insert(slot, value);
        self.journal.push((slot, previous));
    }

    fn checkpoint(&mut self) -> usize {
        self.journal.len()
    }

    fn revert_to(&mut self, checkpoint: usize) {
        while self.journal.len() > checkpoint {
            let Some((slot, previous)) = self.journal.pop() else {
                break;
            };
            match previous {
                Some(value) => self.pending.insert(slot, value),
                None => self.pending.remove(&slot),
            };
        }
    }

    fn commit(&mut self) {
        for (slot, value) in self.pending.drain() {
            if value.is_zero() {
                self.committed.remove(&slot);
            } else {
                self.committed.insert(slot, value);
            }
        }
        self.journal.clear();
    }

    fn discard(&mut self) {
        self.pending.clear();
        self.journal.clear();
    }
}

// =============================================================================
// TESTS
// =============================================================================
