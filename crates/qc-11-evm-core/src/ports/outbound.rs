//! # Driven Ports (SPI - Outbound)
//!
//! The persistent storage view the interpreter reads and writes.
//!
//! The interpreter loop is synchronous and single-threaded, so the port is a
//! plain `&mut` trait rather than an async one. Implementations must honour
//! read-your-writes within one call tree; whether pending writes become
//! durable is decided by the caller through [`WorldState::commit`] and
//! [`WorldState::discard`].

use crate::domain::value_objects::{Address, StorageKey, StorageValue};

// =============================================================================
// WORLD STATE
// =============================================================================

/// Persistent account storage as seen by one transaction.
pub trait WorldState: Send {
    /// Current value of a slot, including writes made earlier in this transaction.
    ///
    /// Slots never written read as zero.
    fn storage(&self, address: Address, key: StorageKey) -> StorageValue;

    /// Value of a slot as it was when the transaction started.
    ///
    /// Used by net gas metering to price `SSTORE`.
    fn original_storage(&self, address: Address, key: StorageKey) -> StorageValue;

    /// Writes a slot. Visible immediately to subsequent reads.
    fn set_storage(&mut self, address: Address, key: StorageKey, value: StorageValue);

    /// Marks the current write journal position.
    fn checkpoint(&mut self) -> usize;

    /// Undoes every write made after `checkpoint`.
    fn revert_to(&mut self, checkpoint: usize);

    /// Makes all pending writes durable.
    fn commit(&mut self);

    /// Drops all pending writes.
    fn discard(&mut self);
}
