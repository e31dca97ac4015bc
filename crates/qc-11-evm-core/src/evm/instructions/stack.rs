//! Stack instructions: `POP`, `PUSH0`-`PUSH32`, `DUP1`-`DUP16`, `SWAP1`-`SWAP16`.
//!
//! The width of `PUSH`, `DUP` and `SWAP` is encoded in the opcode byte.

use crate::domain::value_objects::U256;
use crate::errors::HaltReason;
use crate::evm::frame::Frame;

/// `POP`.
pub fn pop(frame: &mut Frame<'_>) -> Result<(), HaltReason> {
    frame.pop().map(drop)
}

/// `PUSHn`: pushes the n immediate bytes following the opcode.
///
/// Immediates cut off by the end of code read as zero.
pub fn push(frame: &mut Frame<'_>) -> Result<(), HaltReason> {
    let n = usize::from(frame.current_opcode() - 0x5F);
    let start = frame.pc() + 1;
    let code = frame.code();

    let mut bytes = [0u8; 32];
    if start < code.len() {
        let available = &code[start..code.len().min(start + n)];
        bytes[32 - n..32 - n + available.len()].copy_from_slice(available);
    }

    frame.push(U256::from_big_endian(&bytes))?;
    frame.skip_immediates(n);
    Ok(())
}

/// `DUPn`.
pub fn dup(frame: &mut Frame<'_>) -> Result<(), HaltReason> {
    let n = usize::from(frame.current_opcode() - 0x7F);
    frame.stack_mut().dup(n - 1)
}

/// `SWAPn`.
pub fn swap(frame: &mut Frame<'_>) -> Result<(), HaltReason> {
    let n = usize::from(frame.current_opcode() - 0x8F);
    frame.stack_mut().swap(n)
}
