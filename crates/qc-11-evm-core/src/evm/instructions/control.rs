//! Control-flow and halting instructions.

use super::memory::{expansion_cost, grow};
use super::{metered, require_gas};
use crate::domain::value_objects::{Bytes, U256};
use crate::errors::HaltReason;
use crate::evm::frame::Frame;
use crate::evm::memory::Region;
use crate::evm::opcodes::OperationResult;
use crate::evm::schedule::FeeParam;

/// `STOP`.
pub fn stop(frame: &mut Frame<'_>) -> Result<(), HaltReason> {
    frame.succeed(Bytes::new());
    Ok(())
}

/// `JUMP`.
pub fn jump(frame: &mut Frame<'_>) -> Result<(), HaltReason> {
    let dest = frame.pop()?;
    frame.jump(dest)
}

/// `JUMPI`: jumps when the condition is non-zero.
pub fn jumpi(frame: &mut Frame<'_>) -> Result<(), HaltReason> {
    let dest = frame.pop()?;
    let condition = frame.pop()?;
    if condition.is_zero() {
        return Ok(());
    }
    frame.jump(dest)
}

/// `PC`: offset of this instruction.
pub fn pc(frame: &mut Frame<'_>) -> Result<(), HaltReason> {
    let pc = frame.pc();
    frame.push(U256::from(pc))
}

/// `JUMPDEST`.
pub fn jumpdest(_frame: &mut Frame<'_>) -> Result<(), HaltReason> {
    Ok(())
}

/// `INVALID` (0xFE): the designated invalid instruction.
pub fn invalid(_frame: &mut Frame<'_>) -> Result<(), HaltReason> {
    Err(HaltReason::InvalidOperation(0xFE))
}

/// `RETURN`.
pub fn ret(frame: &mut Frame<'_>) -> OperationResult {
    metered(frame, |frame, cost| {
        let output = read_output(frame, cost)?;
        frame.succeed(output);
        Ok(())
    })
}

/// `REVERT`: ends the frame and keeps unused gas. Its state changes are
/// rolled back by whoever owns the frame.
pub fn revert(frame: &mut Frame<'_>) -> OperationResult {
    metered(frame, |frame, cost| {
        let output = read_output(frame, cost)?;
        frame.revert(output);
        Ok(())
    })
}

fn read_output(frame: &mut Frame<'_>, cost: &mut u64) -> Result<Bytes, HaltReason> {
    let offset = frame.pop()?;
    let len = frame.pop()?;
    *cost = frame.schedule().cost(FeeParam::Zero);
    let Some(region) = Region::from_words(offset, len)? else {
        require_gas(frame, *cost)?;
        return Ok(Bytes::new());
    };
    *cost += expansion_cost(frame, Some(region.end()));
    require_gas(frame, *cost)?;
    grow(frame, Some(region.end()))?;
    Ok(Bytes::from(frame.memory().read_region(region)))
}
