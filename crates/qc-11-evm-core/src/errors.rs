//! # Error Types
//!
//! Exceptional halts raised by the interpreter and configuration errors.

use crate::domain::value_objects::U256;
use thiserror::Error;

// =============================================================================
// EXCEPTIONAL HALTS
// =============================================================================

/// Deterministic, non-retryable reasons for terminating a frame.
///
/// The set is closed: a protocol upgrade that introduces a new structural
/// violation adds a variant, it never repurposes an existing one. Nodes
/// compare these by value, so two different conditions must never share a
/// variant.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HaltReason {
    /// Remaining gas is below the cost of the instruction.
    #[error("insufficient gas")]
    InsufficientGas,

    /// The instruction needs more operands than the stack holds.
    #[error("insufficient stack items")]
    InsufficientStackItems,

    /// The instruction would grow the stack past its limit.
    #[error("too many stack items")]
    TooManyStackItems,

    /// The byte at the instruction pointer is not defined for this protocol version.
    #[error("invalid operation: 0x{0:02X}")]
    InvalidOperation(u8),

    /// A jump targets something other than a `JUMPDEST` outside push data.
    #[error("invalid jump destination: {0}")]
    InvalidJumpDestination(U256),

    /// A state-modifying instruction ran inside a static frame.
    #[error("illegal state change in static frame")]
    IllegalStateChange,

    /// Memory growth would exceed the configured ceiling.
    #[error("memory limit exceeded: {requested} > {max} bytes")]
    MemoryLimitExceeded {
        /// Requested size in bytes.
        requested: u64,
        /// Configured maximum.
        max: u64,
    },

    /// A nested frame would exceed the configured call depth.
    #[error("call depth exceeded: {depth} > {max}")]
    CallDepthExceeded {
        /// Depth of the frame that was refused.
        depth: usize,
        /// Configured maximum.
        max: usize,
    },
}

impl HaltReason {
    /// Short label used for log fields and metric labels.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::InsufficientGas => "insufficient_gas",
            Self::InsufficientStackItems => "insufficient_stack_items",
            Self::TooManyStackItems => "too_many_stack_items",
            Self::InvalidOperation(_) => "invalid_operation",
            Self::InvalidJumpDestination(_) => "invalid_jump_destination",
            Self::IllegalStateChange => "illegal_state_change",
            Self::MemoryLimitExceeded { .. } => "memory_limit_exceeded",
            Self::CallDepthExceeded { .. } => "call_depth_exceeded",
        }
    }
}

// =============================================================================
// CONFIGURATION ERRORS
// =============================================================================

/// Errors raised while loading [`crate::domain::entities::VmConfig`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The protocol version name is not one this crate knows.
    #[error("unknown protocol version: {0}")]
    UnknownProtocolVersion(String),

    /// A numeric setting could not be parsed.
    #[error("invalid value for {key}: {value}")]
    InvalidValue {
        /// Environment key or field name.
        key: String,
        /// Offending raw value.
        value: String,
    },

    /// A JSON document could not be decoded.
    #[error("malformed configuration: {0}")]
    Malformed(String),
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        Self::Malformed(err.to_string())
    }
}

// =============================================================================
// TESTS
// =============================================================================
