//! Frame-local environment instructions.

use crate::domain::value_objects::U256;
use crate::errors::HaltReason;
use crate::evm::frame::Frame;

/// `ADDRESS`: the executing account.
pub fn address(frame: &mut Frame<'_>) -> Result<(), HaltReason> {
    let address = frame.address().to_u256();
    frame.push(address)
}

/// `CALLER`.
pub fn caller(frame: &mut Frame<'_>) -> Result<(), HaltReason> {
    let caller = frame.caller().to_u256();
    frame.push(caller)
}

/// `CODESIZE`.
pub fn codesize(frame: &mut Frame<'_>) -> Result<(), HaltReason> {
    let size = frame.code().len();
    frame.push(U256::from(size))
}

/// `GAS`: remaining gas after this instruction's own cost.
pub fn gas(frame: &mut Frame<'_>) -> Result<(), HaltReason> {
    let remaining = frame.gas_remaining();
    frame.push(U256::from(remaining))
}
