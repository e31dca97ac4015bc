//! Comparison and bitwise instructions (0x10-0x1D).
//!
//! All of these sit in the very-low fee tier.

use super::arithmetic::is_negative;
use super::bool_word;
use crate::domain::value_objects::U256;
use crate::errors::HaltReason;
use crate::evm::frame::Frame;

/// `LT`: unsigned a < b.
pub fn lt(frame: &mut Frame<'_>) -> Result<(), HaltReason> {
    let a = frame.pop()?;
    let b = frame.pop()?;
    frame.push(bool_word(a < b))
}

/// `GT`: unsigned a > b.
pub fn gt(frame: &mut Frame<'_>) -> Result<(), HaltReason> {
    let a = frame.pop()?;
    let b = frame.pop()?;
    frame.push(bool_word(a > b))
}

/// `SLT`: signed a < b.
pub fn slt(frame: &mut Frame<'_>) -> Result<(), HaltReason> {
    let a = frame.pop()?;
    let b = frame.pop()?;
    frame.push(bool_word(signed_lt(a, b)))
}

/// `SGT`: signed a > b.
pub fn sgt(frame: &mut Frame<'_>) -> Result<(), HaltReason> {
    let a = frame.pop()?;
    let b = frame.pop()?;
    frame.push(bool_word(signed_lt(b, a)))
}

/// `EQ`.
pub fn eq(frame: &mut Frame<'_>) -> Result<(), HaltReason> {
    let a = frame.pop()?;
    let b = frame.pop()?;
    frame.push(bool_word(a == b))
}

/// `ISZERO`.
pub fn iszero(frame: &mut Frame<'_>) -> Result<(), HaltReason> {
    let a = frame.pop()?;
    frame.push(bool_word(a.is_zero()))
}

/// `AND`.
pub fn and(frame: &mut Frame<'_>) -> Result<(), HaltReason> {
    let a = frame.pop()?;
    let b = frame.pop()?;
    frame.push(a & b)
}

/// `OR`.
pub fn or(frame: &mut Frame<'_>) -> Result<(), HaltReason> {
    let a = frame.pop()?;
    let b = frame.pop()?;
    frame.push(a | b)
}

/// `XOR`: pops two words, pushes their exclusive-or.
pub fn xor(frame: &mut Frame<'_>) -> Result<(), HaltReason> {
    let a = frame.pop()?;
    let b = frame.pop()?;
    frame.push(a ^ b)
}

/// `NOT`.
pub fn not(frame: &mut Frame<'_>) -> Result<(), HaltReason> {
    let a = frame.pop()?;
    frame.push(!a)
}

/// `BYTE`: the i-th byte of x, counting from the most significant.
pub fn byte(frame: &mut Frame<'_>) -> Result<(), HaltReason> {
    let i = frame.pop()?;
    let x = frame.pop()?;
    let result = if i < U256::from(32) {
        U256::from(x.byte(31 - i.as_usize()))
    } else {
        U256::zero()
    };
    frame.push(result)
}

/// `SHL`.
pub fn shl(frame: &mut Frame<'_>) -> Result<(), HaltReason> {
    let shift = frame.pop()?;
    let value = frame.pop()?;
    let result = if shift >= U256::from(256) {
        U256::zero()
    } else {
        value << shift.as_usize()
    };
    frame.push(result)
}

/// `SHR`: logical shift right.
pub fn shr(frame: &mut Frame<'_>) -> Result<(), HaltReason> {
    let shift = frame.pop()?;
    let value = frame.pop()?;
    let result = if shift >= U256::from(256) {
        U256::zero()
    } else {
        value >> shift.as_usize()
    };
    frame.push(result)
}

/// `SAR`: arithmetic shift right.
pub fn sar(frame: &mut Frame<'_>) -> Result<(), HaltReason> {
    let shift = frame.pop()?;
    let value = frame.pop()?;
    let negative = is_negative(value);
    let result = if shift >= U256::from(256) {
        if negative {
            U256::MAX
        } else {
            U256::zero()
        }
    } else {
        let shift = shift.as_usize();
        let shifted = value >> shift;
        if negative && shift > 0 {
            // Fill vacated high bits with 1s
            shifted | (U256::MAX << (256 - shift))
        } else {
            shifted
        }
    };
    frame.push(result)
}

fn signed_lt(a: U256, b: U256) -> bool {
    match (is_negative(a), is_negative(b)) {
        (true, false) => true,
        (false, true) => false,
        _ => a < b,
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evm::instructions::test_support::{binary, neg, run_on_stack};
    use proptest::prelude::*;

    fn word() -> impl Strategy<Value = U256> {
        any::<[u8; 32]>().prop_map(|bytes| U256::from_big_endian(&bytes))
    }

    #[test]
    fn test_xor_example() {
        assert_eq!(binary(xor, U256::from(0x05), U256::from(0x03)), U256::from(0x06));
    }

    #[test]
    fn test_xor_underflow() {
        assert_eq!(
            run_on_stack(xor, &[U256::one()]),
            Err(HaltReason::InsufficientStackItems)
        );
    }

    #[test]
    fn test_signed_comparisons() {
        assert_eq!(binary(slt, neg(1), U256::one()), U256::one());
        assert_eq!(binary(sgt, neg(1), U256::one()), U256::zero());
        assert_eq!(binary(lt, neg(1), U256::one()), U256::zero());
        assert_eq!(binary(slt, neg(5), neg(3)), U256::one());
    }

    #[test]
    fn test_byte() {
        let x = U256::from_big_endian(&[0xAB; 1]) << 248;
        assert_eq!(binary(byte, U256::zero(), x), U256::from(0xAB));
        assert_eq!(binary(byte, U256::from(31), U256::from(0xCD)), U256::from(0xCD));
        assert_eq!(binary(byte, U256::from(32), U256::MAX), U256::zero());
    }

    #[test]
    fn test_shifts() {
        assert_eq!(binary(shl, U256::from(4), U256::one()), U256::from(16));
        assert_eq!(binary(shl, U256::from(256), U256::one()), U256::zero());
        assert_eq!(binary(shr, U256::from(4), U256::from(16)), U256::one());
        assert_eq!(binary(sar, U256::from(4), neg(16)), neg(1));
        assert_eq!(binary(sar, U256::zero(), neg(16)), neg(16));
        assert_eq!(binary(sar, U256::from(300), neg(16)), U256::MAX);
        assert_eq!(binary(sar, U256::from(300), U256::from(16)), U256::zero());
    }

    proptest! {
        #[test]
        fn prop_xor_matches_bitwise_definition(a in word(), b in word()) {
            let stack = run_on_stack(xor, &[b, a]).unwrap();
            prop_assert_eq!(stack.len(), 1);
            prop_assert_eq!(stack[0], a ^ b);

            let mut expected = [0u8; 32];
            let (mut ab, mut bb) = ([0u8; 32], [0u8; 32]);
            a.to_big_endian(&mut ab);
            b.to_big_endian(&mut bb);
            for i in 0..32 {
                expected[i] = ab[i] ^ bb[i];
            }
            prop_assert_eq!(stack[0], U256::from_big_endian(&expected));
        }

        #[test]
        fn prop_xor_leaves_rest_of_stack(a in word(), b in word(), below in word()) {
            let stack = run_on_stack(xor, &[below, b, a]).unwrap();
            prop_assert_eq!(stack, vec![below, a ^ b]);
        }
    }
}
