//! # EVM Implementation
//!
//! Instruction execution core: operand stack, memory, storage views, versioned
//! fee schedules, the instruction registry and the interpreter loop.
//!
//! ## Components
//!
//! - `interpreter.rs` - Fetch–validate–apply loop and nested frames
//! - `frame.rs` - Per-call execution context and transaction context
//! - `opcodes.rs` - Operation descriptors and per-version registries
//! - `schedule.rs` - Fee schedules derived by upgrade deltas
//! - `instructions/` - Instruction effects grouped by family
//! - `memory.rs` - Byte-addressable memory
//! - `stack.rs` - 1024-item operand stack
//! - `transient.rs` - Transient storage (EIP-1153)
//! - `access_list.rs` - Warm/cold tracking (EIP-2929)

pub mod access_list;
pub mod frame;
pub mod instructions;
pub mod interpreter;
pub mod memory;
pub mod opcodes;
pub mod schedule;
pub mod stack;
pub mod transient;

pub use access_list::{AccessList, AccessStatus};
pub use frame::{Checkpoint, Frame, FrameStatus, TransactionContext};
pub use interpreter::Interpreter;
pub use memory::Memory;
pub use opcodes::{CostStrategy, InstructionRegistry, Operation, OperationResult};
pub use schedule::{FeeParam, FeeSchedule};
pub use stack::Stack;
pub use transient::TransientStorage;
