//! # Instruction Implementations
//!
//! Effects of every defined opcode, grouped by family.
//!
//! Fixed-cost instructions are plain effects: the interpreter has already
//! checked and deducted their gas. Dynamic-cost instructions pop their inputs,
//! price themselves, check the remaining gas and only then apply; the
//! interpreter deducts the returned cost.

pub mod arithmetic;
pub mod bitwise;
pub mod control;
pub mod environment;
pub mod memory;
pub mod stack;
pub mod storage;

use crate::domain::value_objects::U256;
use crate::errors::HaltReason;
use crate::evm::frame::Frame;
use crate::evm::opcodes::OperationResult;

/// Runs a dynamic-cost body and reports whatever cost it had priced when it
/// finished or failed.
pub(crate) fn metered<'a>(
    frame: &mut Frame<'a>,
    body: impl FnOnce(&mut Frame<'a>, &mut u64) -> Result<(), HaltReason>,
) -> OperationResult {
    let mut cost = 0;
    match body(frame, &mut cost) {
        Ok(()) => OperationResult::ok(cost),
        Err(reason) => OperationResult::halt(cost, reason),
    }
}

/// Fails with `InsufficientGas` when `cost` exceeds the remaining gas.
pub(crate) fn require_gas(frame: &Frame<'_>, cost: u64) -> Result<(), HaltReason> {
    if frame.gas_remaining() < cost {
        return Err(HaltReason::InsufficientGas);
    }
    Ok(())
}

pub(crate) fn bool_word(value: bool) -> U256 {
    if value {
        U256::one()
    } else {
        U256::zero()
    }
}
