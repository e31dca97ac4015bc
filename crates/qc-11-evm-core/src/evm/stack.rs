//! # EVM Stack
//!
//! Operand stack for one frame.
//! Maximum 1024 words; overflow and underflow are structural halts, never truncation.

use crate::domain::value_objects::U256;
use crate::errors::HaltReason;

/// Maximum stack size.
pub const MAX_STACK_SIZE: usize = 1024;

/// A LIFO stack holding 256-bit words.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Stack {
    data: Vec<U256>,
}

impl Stack {
    /// Creates a new empty stack.
    #[must_use]
    pub fn new() -> Self {
        Self {
            data: Vec::with_capacity(64), // Pre-allocate for common case
        }
    }

    /// Returns the number of elements on the stack.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the stack is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Checks that an instruction consuming `inputs` words and producing
    /// `outputs` words can run.
    ///
    /// # Errors
    ///
    /// `InsufficientStackItems` is reported before `TooManyStackItems`.
    pub fn require(&self, inputs: usize, outputs: usize) -> Result<(), HaltReason> {
        let len = self.data.len();
        if len < inputs {
            return Err(HaltReason::InsufficientStackItems);
        }
        if len - inputs + outputs > MAX_STACK_SIZE {
            return Err(HaltReason::TooManyStackItems);
        }
        Ok(())
    }

    /// Push a value onto the stack.
    ///
    /// # Errors
    ///
    /// Returns `TooManyStackItems` if the stack is full.
    pub fn push(&mut self, value: U256) -> Result<(), HaltReason> {
        if self.data.len() >= MAX_STACK_SIZE {
            return Err(HaltReason::TooManyStackItems);
        }
        self.data.push(value);
        Ok(())
    }

    /// Pop a value from the stack.
    ///
    /// # Errors
    ///
    /// Returns `InsufficientStackItems` if the stack is empty.
    pub fn pop(&mut self) -> Result<U256, HaltReason> {
        self.data.pop().ok_or(HaltReason::InsufficientStackItems)
    }

    /// Peek at a value at a given depth (0 = top).
    ///
    /// # Errors
    ///
    /// Returns `InsufficientStackItems` if the index is out of bounds.
    pub fn peek_at(&self, depth: usize) -> Result<U256, HaltReason> {
        self.data
            .len()
            .checked_sub(depth + 1)
            .map(|index| self.data[index])
            .ok_or(HaltReason::InsufficientStackItems)
    }

    /// Swap the top element with the element at depth n.
    /// SWAP1 swaps top with second element (n=1).
    ///
    /// # Errors
    ///
    /// Returns `InsufficientStackItems` if not enough elements.
    pub fn swap(&mut self, n: usize) -> Result<(), HaltReason> {
        let len = self.data.len();
        if n == 0 || n >= len {
            return Err(HaltReason::InsufficientStackItems);
        }
        self.data.swap(len - 1, len - 1 - n);
        Ok(())
    }

    /// Duplicate the element at depth n (0-indexed from top) and push it.
    /// DUP1 duplicates top element (n=0).
    ///
    /// # Errors
    ///
    /// Returns `InsufficientStackItems` if not enough elements,
    /// `TooManyStackItems` if full.
    pub fn dup(&mut self, n: usize) -> Result<(), HaltReason> {
        let value = self.peek_at(n)?;
        self.push(value)
    }

    /// Words from bottom to top.
    #[must_use]
    pub fn as_slice(&self) -> &[U256] {
        &self.data
    }
}

// =============================================================================
// TESTS
// =============================================================================
