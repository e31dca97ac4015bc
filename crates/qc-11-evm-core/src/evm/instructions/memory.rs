//! Memory instructions: `MLOAD`, `MSTORE`, `MSTORE8`, `MSIZE`, `MCOPY`.
//!
//! Growth is priced before memory is touched: the instruction's base fee
//! plus the schedule's expansion cost from the current word size to the
//! word size covering the addressed region.

use super::{metered, require_gas};
use crate::domain::value_objects::U256;
use crate::errors::HaltReason;
use crate::evm::frame::Frame;
use crate::evm::memory::{Region, WORD_SIZE};
use crate::evm::opcodes::OperationResult;
use crate::evm::schedule::FeeParam;

/// Expansion cost of touching `end` bytes, zero when `end` is `None`.
pub(crate) fn expansion_cost(frame: &Frame<'_>, end: Option<usize>) -> u64 {
    end.map_or(0, |end| {
        let memory = frame.memory();
        frame
            .schedule()
            .memory_expansion_cost(memory.word_size(), memory.words_after(end))
    })
}

/// Grows memory to cover `end`, if any.
pub(crate) fn grow(frame: &mut Frame<'_>, end: Option<usize>) -> Result<(), HaltReason> {
    match end {
        Some(end) => frame.memory_mut().ensure(end),
        None => Ok(()),
    }
}

fn word_region(offset: U256) -> Result<Region, HaltReason> {
    Region::from_words(offset, U256::from(WORD_SIZE))?.ok_or(HaltReason::InsufficientGas)
}

/// `MLOAD`.
pub fn mload(frame: &mut Frame<'_>) -> OperationResult {
    metered(frame, |frame, cost| {
        let offset = frame.pop()?;
        *cost = frame.schedule().cost(FeeParam::VeryLow);
        let region = word_region(offset)?;
        *cost += expansion_cost(frame, Some(region.end()));
        require_gas(frame, *cost)?;
        grow(frame, Some(region.end()))?;
        let value = frame.memory().read_word(region.offset);
        frame.push(value)
    })
}

/// `MSTORE`.
pub fn mstore(frame: &mut Frame<'_>) -> OperationResult {
    metered(frame, |frame, cost| {
        let offset = frame.pop()?;
        let value = frame.pop()?;
        *cost = frame.schedule().cost(FeeParam::VeryLow);
        let region = word_region(offset)?;
        *cost += expansion_cost(frame, Some(region.end()));
        require_gas(frame, *cost)?;
        grow(frame, Some(region.end()))?;
        frame.memory_mut().write_word(region.offset, value);
        Ok(())
    })
}

/// `MSTORE8`: stores the low byte of the value.
pub fn mstore8(frame: &mut Frame<'_>) -> OperationResult {
    metered(frame, |frame, cost| {
        let offset = frame.pop()?;
        let value = frame.pop()?;
        *cost = frame.schedule().cost(FeeParam::VeryLow);
        let region =
            Region::from_words(offset, U256::one())?.ok_or(HaltReason::InsufficientGas)?;
        *cost += expansion_cost(frame, Some(region.end()));
        require_gas(frame, *cost)?;
        grow(frame, Some(region.end()))?;
        frame.memory_mut().write_byte(region.offset, value.byte(0));
        Ok(())
    })
}

/// `MSIZE`: memory size in bytes.
pub fn msize(frame: &mut Frame<'_>) -> Result<(), HaltReason> {
    let size = frame.memory().len();
    frame.push(U256::from(size))
}

/// `MCOPY` (EIP-5656): overlapping regions behave like memmove.
pub fn mcopy(frame: &mut Frame<'_>) -> OperationResult {
    metered(frame, |frame, cost| {
        let dest = frame.pop()?;
        let src = frame.pop()?;
        let len = frame.pop()?;
        *cost = frame.schedule().cost(FeeParam::VeryLow);

        let dest = Region::from_words(dest, len)?;
        let src = Region::from_words(src, len)?;
        let (Some(dest), Some(src)) = (dest, src) else {
            return require_gas(frame, *cost);
        };

        let end = Some(dest.end().max(src.end()));
        *cost += frame.schedule().copy_cost(dest.len as u64) + expansion_cost(frame, end);
        require_gas(frame, *cost)?;
        grow(frame, end)?;
        frame.memory_mut().copy(dest.offset, src.offset, dest.len);
        Ok(())
    })
}

// =============================================================================
// TESTS
// =============================================================================
