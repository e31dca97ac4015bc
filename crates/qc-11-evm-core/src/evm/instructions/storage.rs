//! Storage instructions: persistent `SLOAD`/`SSTORE` and transient
//! `TLOAD`/`TSTORE`.
//!
//! Every storage instruction pops its operands as part of computing its cost.
//! When the gas check then fails the operands stay popped, nothing is pushed
//! and no storage is touched; the result still carries the computed cost.
//! Writes inside a static frame are rejected before any gas check.

use super::{metered, require_gas};
use crate::domain::value_objects::{StorageKey, StorageValue};
use crate::errors::HaltReason;
use crate::evm::frame::Frame;
use crate::evm::opcodes::OperationResult;
use crate::evm::schedule::SstoreInputs;

/// `SLOAD`: warm/cold priced read of the executing account's slot.
pub fn sload(frame: &mut Frame<'_>) -> OperationResult {
    metered(frame, |frame, cost| {
        let key = StorageKey::from(frame.pop()?);
        let access = frame.storage_access_status(key);
        *cost = frame.schedule().sload_cost(access);
        require_gas(frame, *cost)?;
        frame.touch_storage(key);
        let value = frame.storage_get(key);
        frame.push(value.to_u256())
    })
}

/// `SSTORE`: writes a slot and adjusts the refund counter.
pub fn sstore(frame: &mut Frame<'_>) -> OperationResult {
    metered(frame, |frame, cost| {
        let key = StorageKey::from(frame.pop()?);
        let new = StorageValue::from(frame.pop()?);
        let schedule = frame.schedule();
        let charge = schedule.sstore_charge(&SstoreInputs {
            original: frame.storage_original(key),
            current: frame.storage_get(key),
            new,
            access: frame.storage_access_status(key),
        });
        *cost = charge.cost;
        if frame.is_static() {
            return Err(HaltReason::IllegalStateChange);
        }

        if let Some(sentry) = schedule.sstore_sentry() {
            if frame.gas_remaining() <= sentry {
                return Err(HaltReason::InsufficientGas);
            }
        }
        require_gas(frame, *cost)?;

        frame.touch_storage(key);
        frame.storage_set(key, new);
        frame.add_refund(charge.refund);
        Ok(())
    })
}

/// `TLOAD` (EIP-1153): unset keys read as zero.
pub fn tload(frame: &mut Frame<'_>) -> OperationResult {
    metered(frame, |frame, cost| {
        let key = StorageKey::from(frame.pop()?);
        *cost = frame.schedule().transient_access_cost();
        require_gas(frame, *cost)?;
        let value = frame.transient_get(key);
        frame.push(value.to_u256())
    })
}

/// `TSTORE` (EIP-1153): pops the key, then the value.
///
/// Never touches the refund counter, including for zero writes.
pub fn tstore(frame: &mut Frame<'_>) -> OperationResult {
    metered(frame, |frame, cost| {
        let key = StorageKey::from(frame.pop()?);
        let value = StorageValue::from(frame.pop()?);
        *cost = frame.schedule().transient_access_cost();
        if frame.is_static() {
            return Err(HaltReason::IllegalStateChange);
        }
        require_gas(frame, *cost)?;
        frame.transient_set(key, value);
        Ok(())
    })
}

// =============================================================================
// TESTS
// =============================================================================
