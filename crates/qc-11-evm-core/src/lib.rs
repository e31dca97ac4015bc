//! # QC-11 EVM Core - Instruction Execution Subsystem
//!
//! **Subsystem ID:** 11
//!
//! ## Purpose
//!
//! Executes EVM bytecode one instruction at a time under a versioned fee
//! schedule. The core owns the operand stack, memory, the gas counter and the
//! transaction-scoped transient storage; persistent storage is reached through
//! the [`ports::outbound::WorldState`] port.
//!
//! ## Execution Model
//!
//! | Stage | Location | Failure |
//! |-------|----------|---------|
//! | Fetch | `evm/frame.rs` - `current_opcode()` | past end of code reads as `STOP` |
//! | Resolve | `evm/opcodes.rs` - `InstructionRegistry::get()` | `InvalidOperation` |
//! | Validate stack | `evm/stack.rs` - `Stack::require()` | `InsufficientStackItems`, `TooManyStackItems` |
//! | Validate gas | `evm/interpreter.rs` / instruction body | `InsufficientGas` |
//! | Apply | `evm/instructions/` | instruction-specific halt |
//! | Advance | `evm/frame.rs` - `advance()` | - |
//!
//! Every exceptional halt ends the frame and forfeits its remaining gas.
//! `REVERT` is not a halt: it ends the frame and keeps unused gas.
//!
//! ## Protocol Versions
//!
//! Fee schedules are derived, never copied: each [`ProtocolVersion`] applies
//! its upgrade delta on top of its predecessor's schedule, starting from the
//! Frontier base table. Registries for every version are built once and
//! shared.
//!
//! ## Execution Safety Limits
//!
//! | Limit | Default | Config |
//! |-------|---------|--------|
//! | `max_stack_size` | 1024 | fixed |
//! | `max_memory_size` | 16 MiB | `QC_EVM_MAX_MEMORY_SIZE` |
//! | `max_call_depth` | 1024 | `QC_EVM_MAX_CALL_DEPTH` |
//!
//! ## Usage Example
//!
//! ```ignore
//! use qc_11_evm_core::prelude::*;
//!
//! let service = create_test_service();
//! let request = ExecutionRequest::new(contract, caller, code, 100_000);
//!
//! let outcome = service.execute_transaction(request).await;
//! if outcome.is_success() {
//!     println!("Gas used: {}", outcome.gas_used);
//! }
//! ```
//!
//! [`ProtocolVersion`]: domain::entities::ProtocolVersion

// Crate-level lints
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::similar_names)]

// =============================================================================
// MODULES
// =============================================================================

pub mod adapters;
pub mod domain;
pub mod errors;
pub mod evm;
pub mod metrics;
pub mod ports;
pub mod service;

// =============================================================================
// PRELUDE
// =============================================================================

/// Convenient re-exports for common usage.
pub mod prelude {
    // Domain entities
    pub use crate::domain::entities::{
        ExecutionOutcome, ExecutionRequest, ExecutionStatus, ProtocolVersion, VmConfig,
    };

    // Value objects
    pub use crate::domain::value_objects::{Address, Bytes, StorageKey, StorageValue, U256};

    // Ports
    pub use crate::ports::outbound::WorldState;

    // Errors
    pub use crate::errors::{ConfigError, HaltReason};

    // EVM components
    pub use crate::evm::{
        schedule::FeeParam, AccessList, AccessStatus, FeeSchedule, Frame, FrameStatus,
        InstructionRegistry, Interpreter, Memory, Operation, OperationResult, Stack,
        TransactionContext, TransientStorage,
    };

    // Adapters
    pub use crate::adapters::InMemoryWorldState;

    // Service
    pub use crate::service::{create_test_service, ExecutionService, ServiceConfig, ServiceStats};
}

// =============================================================================
// CRATE INFO
// =============================================================================

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Subsystem ID.
pub const SUBSYSTEM_ID: u8 = 11;

/// Subsystem name.
pub const SUBSYSTEM_NAME: &str = "EVM Execution Core";

// =============================================================================
// TESTS
// =============================================================================
