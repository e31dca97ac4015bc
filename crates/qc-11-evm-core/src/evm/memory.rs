//! # EVM Memory
//!
//! Byte-addressable, zero-initialised memory that grows in 32-byte words.
//! Growth is priced by the fee schedule before the instruction touches it;
//! this module only tracks the bytes and enforces the configured ceiling.

use crate::domain::value_objects::U256;
use crate::errors::HaltReason;

/// Default memory ceiling (16 MB).
pub const MAX_MEMORY_SIZE: usize = 16 * 1024 * 1024;

/// Word size in bytes (32 bytes = 256 bits).
pub const WORD_SIZE: usize = 32;

/// A memory region addressed by an instruction, already range-checked.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Region {
    /// First byte.
    pub offset: usize,
    /// Number of bytes.
    pub len: usize,
}

impl Region {
    /// Validates an `(offset, len)` pair taken from the stack.
    ///
    /// Zero-length regions never expand memory and ignore their offset.
    ///
    /// # Errors
    ///
    /// Offsets or lengths that cannot be addressed are priced out of reach
    /// and reported as `InsufficientGas`.
    pub fn from_words(offset: U256, len: U256) -> Result<Option<Self>, HaltReason> {
        if len.is_zero() {
            return Ok(None);
        }
        let offset = to_usize(offset)?;
        let len = to_usize(len)?;
        offset
            .checked_add(len)
            .ok_or(HaltReason::InsufficientGas)?;
        Ok(Some(Self { offset, len }))
    }

    /// One past the last byte.
    #[must_use]
    pub fn end(&self) -> usize {
        self.offset + self.len
    }
}

fn to_usize(value: U256) -> Result<usize, HaltReason> {
    if value > U256::from(u64::MAX) {
        return Err(HaltReason::InsufficientGas);
    }
    usize::try_from(value.low_u64()).map_err(|_| HaltReason::InsufficientGas)
}

/// Memory of one frame.
#[derive(Clone, Debug)]
pub struct Memory {
    data: Vec<u8>,
    limit: usize,
}

impl Default for Memory {
    fn default() -> Self {
        Self::with_limit(MAX_MEMORY_SIZE)
    }
}

impl Memory {
    /// Creates empty memory with the default ceiling.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates empty memory that refuses to grow past `limit` bytes.
    #[must_use]
    pub fn with_limit(limit: usize) -> Self {
        Self {
            data: Vec::new(),
            limit,
        }
    }

    /// Configured ceiling in bytes.
    #[must_use]
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Returns the current memory size in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if memory is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns the memory size in 32-byte words.
    #[must_use]
    pub fn word_size(&self) -> u64 {
        (self.data.len() / WORD_SIZE) as u64
    }

    /// Word size memory would have after touching `[.., end)`.
    #[must_use]
    pub fn words_after(&self, end: usize) -> u64 {
        (end.div_ceil(WORD_SIZE) as u64).max(self.word_size())
    }

    /// Grows memory to cover `[.., end)`, rounded up to a whole word.
    ///
    /// # Errors
    ///
    /// Returns `MemoryLimitExceeded` if the rounded size exceeds the ceiling.
    pub fn ensure(&mut self, end: usize) -> Result<(), HaltReason> {
        if end <= self.data.len() {
            return Ok(());
        }
        let new_size = end.div_ceil(WORD_SIZE) * WORD_SIZE;
        if new_size > self.limit {
            return Err(HaltReason::MemoryLimitExceeded {
                requested: new_size as u64,
                max: self.limit as u64,
            });
        }
        self.data.resize(new_size, 0);
        Ok(())
    }

    /// Read a 32-byte word. The region must already be ensured.
    #[must_use]
    pub fn read_word(&self, offset: usize) -> U256 {
        U256::from_big_endian(&self.data[offset..offset + WORD_SIZE])
    }

    /// Write a 32-byte word. The region must already be ensured.
    pub fn write_word(&mut self, offset: usize, value: U256) {
        value.to_big_endian(&mut self.data[offset..offset + WORD_SIZE]);
    }

    /// Write a single byte. The region must already be ensured.
    pub fn write_byte(&mut self, offset: usize, value: u8) {
        self.data[offset] = value;
    }

    /// Copies a region out. The region must already be ensured.
    #[must_use]
    pub fn read_region(&self, region: Region) -> Vec<u8> {
        self.data[region.offset..region.end()].to_vec()
    }

    /// Copy bytes within memory (MCOPY). Overlapping regions behave like memmove.
    pub fn copy(&mut self, dest: usize, src: usize, len: usize) {
        self.data.copy_within(src..src + len, dest);
    }

    /// Get a reference to the underlying data.
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_rounds_to_words() {
        let mut memory = Memory::new();
        assert!(memory.is_empty());

        memory.ensure(1).unwrap();
        assert_eq!(memory.len(), 32);
        assert_eq!(memory.word_size(), 1);

        memory.ensure(33).unwrap();
        assert_eq!(memory.len(), 64);

        // Never shrinks
        memory.ensure(10).unwrap();
        assert_eq!(memory.len(), 64);
    }

    #[test]
    fn test_words_after() {
        let mut memory = Memory::new();
        assert_eq!(memory.words_after(0), 0);
        assert_eq!(memory.words_after(33), 2);
        memory.ensure(128).unwrap();
        assert_eq!(memory.words_after(33), 4);
    }

    #[test]
    fn test_word_round_trip_is_big_endian() {
        let mut memory = Memory::new();
        memory.ensure(64).unwrap();
        memory.write_word(0, U256::from(0xABCD));

        assert_eq!(memory.as_slice()[30], 0xAB);
        assert_eq!(memory.as_slice()[31], 0xCD);
        assert_eq!(memory.read_word(0), U256::from(0xABCD));
    }

    #[test]
    fn test_overlapping_copy() {
        let mut memory = Memory::new();
        memory.ensure(32).unwrap();
        for i in 0..8 {
            memory.write_byte(i, i as u8 + 1);
        }

        memory.copy(2, 0, 4);

        assert_eq!(&memory.as_slice()[..8], &[1, 2, 1, 2, 3, 4, 7, 8]);
    }

    #[test]
    fn test_limit() {
        let mut memory = Memory::with_limit(64);
        memory.ensure(64).unwrap();
        assert_eq!(
            memory.ensure(65),
            Err(HaltReason::MemoryLimitExceeded {
                requested: 96,
                max: 64
            })
        );
        assert_eq!(memory.len(), 64);
    }

    #[test]
    fn test_region_validation() {
        assert_eq!(Region::from_words(U256::MAX, U256::zero()), Ok(None));
        assert_eq!(
            Region::from_words(U256::from(4), U256::from(8)),
            Ok(Some(Region { offset: 4, len: 8 }))
        );
        assert_eq!(
            Region::from_words(U256::MAX, U256::one()),
            Err(HaltReason::InsufficientGas)
        );
        assert_eq!(
            Region::from_words(U256::from(u64::MAX), U256::from(2)),
            Err(HaltReason::InsufficientGas)
        );
    }
}
