//! Arithmetic instructions (0x01-0x0B). All arithmetic wraps modulo 2^256.

use super::{metered, require_gas};
use crate::domain::value_objects::U256;
use crate::errors::HaltReason;
use crate::evm::frame::Frame;
use crate::evm::opcodes::OperationResult;
use primitive_types::U512;

/// `ADD`: a + b.
pub fn add(frame: &mut Frame<'_>) -> Result<(), HaltReason> {
    let a = frame.pop()?;
    let b = frame.pop()?;
    frame.push(a.overflowing_add(b).0)
}

/// `MUL`: a * b.
pub fn mul(frame: &mut Frame<'_>) -> Result<(), HaltReason> {
    let a = frame.pop()?;
    let b = frame.pop()?;
    frame.push(a.overflowing_mul(b).0)
}

/// `SUB`: a - b.
pub fn sub(frame: &mut Frame<'_>) -> Result<(), HaltReason> {
    let a = frame.pop()?;
    let b = frame.pop()?;
    frame.push(a.overflowing_sub(b).0)
}

/// `DIV`: a / b, zero when b is zero.
pub fn div(frame: &mut Frame<'_>) -> Result<(), HaltReason> {
    let a = frame.pop()?;
    let b = frame.pop()?;
    frame.push(a.checked_div(b).unwrap_or_default())
}

/// `SDIV`: signed a / b.
pub fn sdiv(frame: &mut Frame<'_>) -> Result<(), HaltReason> {
    let a = frame.pop()?;
    let b = frame.pop()?;
    frame.push(signed_div(a, b))
}

/// `MOD`: a % b, zero when b is zero.
pub fn modulo(frame: &mut Frame<'_>) -> Result<(), HaltReason> {
    let a = frame.pop()?;
    let b = frame.pop()?;
    frame.push(a.checked_rem(b).unwrap_or_default())
}

/// `SMOD`: signed a % b.
pub fn smod(frame: &mut Frame<'_>) -> Result<(), HaltReason> {
    let a = frame.pop()?;
    let b = frame.pop()?;
    frame.push(signed_mod(a, b))
}

/// `ADDMOD`: (a + b) % n without intermediate wrap.
pub fn addmod(frame: &mut Frame<'_>) -> Result<(), HaltReason> {
    let a = frame.pop()?;
    let b = frame.pop()?;
    let n = frame.pop()?;
    let result = if n.is_zero() {
        U256::zero()
    } else {
        // 512-bit intermediate so the sum cannot wrap
        narrow((widen(a) + widen(b)) % widen(n))
    };
    frame.push(result)
}

/// `MULMOD`: (a * b) % n without intermediate wrap.
pub fn mulmod(frame: &mut Frame<'_>) -> Result<(), HaltReason> {
    let a = frame.pop()?;
    let b = frame.pop()?;
    let n = frame.pop()?;
    let result = if n.is_zero() {
        U256::zero()
    } else {
        narrow((widen(a) * widen(b)) % widen(n))
    };
    frame.push(result)
}

/// `EXP`: priced per significant byte of the exponent.
pub fn exp(frame: &mut Frame<'_>) -> OperationResult {
    metered(frame, |frame, cost| {
        let base = frame.pop()?;
        let exponent = frame.pop()?;
        *cost = frame.schedule().exp_cost(exponent);
        require_gas(frame, *cost)?;
        frame.push(base.overflowing_pow(exponent).0)
    })
}

/// `SIGNEXTEND`: extends the sign bit of byte k of x.
pub fn signextend(frame: &mut Frame<'_>) -> Result<(), HaltReason> {
    let k = frame.pop()?;
    let x = frame.pop()?;
    let result = if k < U256::from(31) {
        let bit_index = 8 * k.as_usize() + 7;
        let mask = (U256::one() << (bit_index + 1)) - 1;
        if x.bit(bit_index) {
            x | !mask
        } else {
            x & mask
        }
    } else {
        x
    };
    frame.push(result)
}

// =============================================================================
// SIGNED HELPERS
// =============================================================================

pub(crate) fn is_negative(value: U256) -> bool {
    value.bit(255)
}

pub(crate) fn negate(value: U256) -> U256 {
    (!value).overflowing_add(U256::one()).0
}

fn abs(value: U256) -> U256 {
    if is_negative(value) {
        negate(value)
    } else {
        value
    }
}

/// Signed division; `MIN / -1` wraps to `MIN`, division by zero yields zero.
fn signed_div(a: U256, b: U256) -> U256 {
    if b.is_zero() {
        return U256::zero();
    }
    let quotient = abs(a) / abs(b);
    if is_negative(a) == is_negative(b) {
        quotient
    } else {
        negate(quotient)
    }
}

/// Signed remainder; the result takes the sign of the dividend.
fn signed_mod(a: U256, b: U256) -> U256 {
    if b.is_zero() {
        return U256::zero();
    }
    let remainder = abs(a) % abs(b);
    if is_negative(a) {
        negate(remainder)
    } else {
        remainder
    }
}

fn widen(value: U256) -> U512 {
    let mut bytes = [0u8; 64];
    value.to_big_endian(&mut bytes[32..]);
    U512::from_big_endian(&bytes)
}

fn narrow(value: U512) -> U256 {
    let mut bytes = [0u8; 64];
    value.to_big_endian(&mut bytes);
    U256::from_big_endian(&bytes[32..])
}

// =============================================================================
// TESTS
// =============================================================================
