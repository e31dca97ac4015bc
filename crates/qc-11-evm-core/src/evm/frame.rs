//! # Execution Frame
//!
//! The mutable state of one call: operand stack, memory, gas counter and the
//! views onto persistent and transient storage.
//!
//! A frame owns its stack and memory. Everything shared with the rest of the
//! transaction (world state, transient storage, access list) is borrowed, and
//! a child frame reborrows it from its parent for the length of the call.

use crate::domain::entities::ExecutionRequest;
use crate::domain::value_objects::{Address, Bytes, StorageKey, StorageValue, U256};
use crate::errors::HaltReason;
use crate::evm::access_list::{AccessList, AccessStatus};
use crate::evm::memory::Memory;
use crate::evm::schedule::FeeSchedule;
use crate::evm::stack::Stack;
use crate::evm::transient::TransientStorage;
use crate::ports::outbound::WorldState;

// =============================================================================
// TRANSACTION CONTEXT
// =============================================================================

/// State shared by every frame of one top-level transaction.
#[derive(Debug, Default)]
pub struct TransactionContext {
    /// Transient storage (EIP-1153).
    pub transient: TransientStorage,
    /// Warm accounts and slots (EIP-2929).
    pub access_list: AccessList,
}

/// Journal positions captured before a nested frame runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Checkpoint {
    transient: usize,
    access_list: usize,
    world: usize,
}

impl TransactionContext {
    /// Creates an empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Ends the transaction. Transient storage is dropped without refund.
    pub fn finish(&mut self) {
        self.transient.clear();
        self.access_list.clear();
    }
}

// =============================================================================
// FRAME STATUS
// =============================================================================

/// Lifecycle of a frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameStatus {
    /// More instructions to execute.
    Running,
    /// `STOP`, `RETURN` or end of code.
    Succeeded,
    /// `REVERT`.
    Reverted,
    /// Exceptional halt.
    Halted(HaltReason),
}

// =============================================================================
// FRAME
// =============================================================================

/// Execution context of one call.
pub struct Frame<'a> {
    address: Address,
    caller: Address,
    code: &'a [u8],
    jump_dests: Vec<bool>,
    pc: usize,
    jumped: bool,
    stack: Stack,
    memory: Memory,
    gas_limit: u64,
    gas_remaining: u64,
    gas_refund: i64,
    is_static: bool,
    depth: usize,
    output: Bytes,
    status: FrameStatus,
    schedule: &'a FeeSchedule,
    world: &'a mut dyn WorldState,
    tx: &'a mut TransactionContext,
}

impl<'a> Frame<'a> {
    /// Creates a top-level frame.
    pub fn new(
        request: &'a ExecutionRequest,
        schedule: &'a FeeSchedule,
        world: &'a mut dyn WorldState,
        tx: &'a mut TransactionContext,
    ) -> Self {
        let code = request.code.as_slice();
        Self {
            address: request.address,
            caller: request.caller,
            code,
            jump_dests: analyze_jump_dests(code),
            pc: 0,
            jumped: false,
            stack: Stack::new(),
            memory: Memory::new(),
            gas_limit: request.gas_limit,
            gas_remaining: request.gas_limit,
            gas_refund: 0,
            is_static: request.is_static,
            depth: 0,
            output: Bytes::new(),
            status: FrameStatus::Running,
            schedule,
            world,
            tx,
        }
    }

    /// Replaces the memory ceiling.
    #[must_use]
    pub fn with_memory_limit(mut self, limit: usize) -> Self {
        self.memory = Memory::with_limit(limit);
        self
    }

    /// Creates a nested frame that borrows this frame's shared state.
    ///
    /// The child inherits the schedule, the memory ceiling and static mode.
    /// Gas is not moved here; see [`crate::evm::interpreter::Interpreter::execute_child`].
    pub fn child<'b>(&'b mut self, request: &'b ExecutionRequest) -> Frame<'b> {
        let code = request.code.as_slice();
        Frame {
            address: request.address,
            caller: request.caller,
            code,
            jump_dests: analyze_jump_dests(code),
            pc: 0,
            jumped: false,
            stack: Stack::new(),
            memory: Memory::with_limit(self.memory.limit()),
            gas_limit: request.gas_limit,
            gas_remaining: request.gas_limit,
            gas_refund: 0,
            is_static: self.is_static || request.is_static,
            depth: self.depth + 1,
            output: Bytes::new(),
            status: FrameStatus::Running,
            schedule: self.schedule,
            world: &mut *self.world,
            tx: &mut *self.tx,
        }
    }

    // -------------------------------------------------------------------------
    // Identity and code
    // -------------------------------------------------------------------------

    /// Account whose code is executing.
    #[must_use]
    pub fn address(&self) -> Address {
        self.address
    }

    /// Account that made this call.
    #[must_use]
    pub fn caller(&self) -> Address {
        self.caller
    }

    /// Program bytes.
    #[must_use]
    pub fn code(&self) -> &'a [u8] {
        self.code
    }

    /// Opcode at the instruction pointer; `STOP` past the end of code.
    #[must_use]
    pub fn current_opcode(&self) -> u8 {
        self.code.get(self.pc).copied().unwrap_or(0x00)
    }

    /// Instruction pointer.
    #[must_use]
    pub fn pc(&self) -> usize {
        self.pc
    }

    /// Nesting level, 0 for the top-level call.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// True when storage writes are forbidden.
    #[must_use]
    pub fn is_static(&self) -> bool {
        self.is_static
    }

    /// Fee schedule in force.
    #[must_use]
    pub fn schedule(&self) -> &'a FeeSchedule {
        self.schedule
    }

    // -------------------------------------------------------------------------
    // Control flow
    // -------------------------------------------------------------------------

    /// Moves the instruction pointer to a `JUMPDEST`.
    ///
    /// # Errors
    ///
    /// `InvalidJumpDestination` unless `dest` is a `JUMPDEST` outside push data.
    pub fn jump(&mut self, dest: U256) -> Result<(), HaltReason> {
        let target = usize::try_from(dest.low_u64())
            .ok()
            .filter(|_| dest <= U256::from(u64::MAX))
            .filter(|&target| self.jump_dests.get(target).copied().unwrap_or(false))
            .ok_or(HaltReason::InvalidJumpDestination(dest))?;
        self.pc = target;
        self.jumped = true;
        Ok(())
    }

    /// Skips `n` immediate bytes following the current opcode.
    pub(crate) fn skip_immediates(&mut self, n: usize) {
        self.pc += n;
    }

    /// Advances past the current instruction unless it jumped.
    pub(crate) fn advance(&mut self) {
        if !std::mem::take(&mut self.jumped) {
            self.pc += 1;
        }
    }

    /// Lifecycle state.
    #[must_use]
    pub fn status(&self) -> FrameStatus {
        self.status
    }

    /// Ends the frame successfully with `output`.
    pub fn succeed(&mut self, output: Bytes) {
        self.output = output;
        self.status = FrameStatus::Succeeded;
    }

    /// Ends the frame with `REVERT` semantics.
    pub fn revert(&mut self, output: Bytes) {
        self.output = output;
        self.status = FrameStatus::Reverted;
    }

    /// Ends the frame with an exceptional halt. Remaining gas is forfeited.
    pub(crate) fn halt(&mut self, reason: HaltReason) {
        self.status = FrameStatus::Halted(reason);
        self.gas_remaining = 0;
        self.gas_refund = 0;
    }

    /// Return or revert data.
    #[must_use]
    pub fn output(&self) -> &Bytes {
        &self.output
    }

    // -------------------------------------------------------------------------
    // Stack and memory
    // -------------------------------------------------------------------------

    /// Pushes a word.
    ///
    /// # Errors
    ///
    /// `TooManyStackItems` when the stack is full.
    pub fn push(&mut self, value: U256) -> Result<(), HaltReason> {
        self.stack.push(value)
    }

    /// Pops a word.
    ///
    /// # Errors
    ///
    /// `InsufficientStackItems` when the stack is empty.
    pub fn pop(&mut self) -> Result<U256, HaltReason> {
        self.stack.pop()
    }

    /// Operand stack.
    #[must_use]
    pub fn stack(&self) -> &Stack {
        &self.stack
    }

    /// Operand stack, mutably.
    pub fn stack_mut(&mut self) -> &mut Stack {
        &mut self.stack
    }

    /// Memory.
    #[must_use]
    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    /// Memory, mutably.
    pub fn memory_mut(&mut self) -> &mut Memory {
        &mut self.memory
    }

    // -------------------------------------------------------------------------
    // Gas
    // -------------------------------------------------------------------------

    /// Gas allocated to this frame.
    #[must_use]
    pub fn gas_limit(&self) -> u64 {
        self.gas_limit
    }

    /// Gas left.
    #[must_use]
    pub fn gas_remaining(&self) -> u64 {
        self.gas_remaining
    }

    /// Deducts gas.
    ///
    /// # Errors
    ///
    /// `InsufficientGas` without deducting anything when `amount` exceeds what is left.
    pub fn decrement_gas(&mut self, amount: u64) -> Result<(), HaltReason> {
        self.gas_remaining = self
            .gas_remaining
            .checked_sub(amount)
            .ok_or(HaltReason::InsufficientGas)?;
        Ok(())
    }

    /// Credits gas returned by a child call.
    pub fn return_gas(&mut self, amount: u64) {
        self.gas_remaining += amount;
    }

    /// Signed refund counter.
    #[must_use]
    pub fn gas_refund(&self) -> i64 {
        self.gas_refund
    }

    /// Adjusts the refund counter.
    pub fn add_refund(&mut self, delta: i64) {
        self.gas_refund += delta;
    }

    // -------------------------------------------------------------------------
    // Storage
    // -------------------------------------------------------------------------

    /// Reads this account's transient slot.
    #[must_use]
    pub fn transient_get(&self, key: StorageKey) -> StorageValue {
        self.tx.transient.tload(&self.address, &key)
    }

    /// Writes this account's transient slot.
    pub fn transient_set(&mut self, key: StorageKey, value: StorageValue) {
        self.tx.transient.tstore(self.address, key, value);
    }

    /// Reads this account's persistent slot.
    #[must_use]
    pub fn storage_get(&self, key: StorageKey) -> StorageValue {
        self.world.storage(self.address, key)
    }

    /// Value of this account's slot at the start of the transaction.
    #[must_use]
    pub fn storage_original(&self, key: StorageKey) -> StorageValue {
        self.world.original_storage(self.address, key)
    }

    /// Writes this account's persistent slot.
    pub fn storage_set(&mut self, key: StorageKey, value: StorageValue) {
        self.world.set_storage(self.address, key, value);
    }

    /// Warm/cold status of a slot, without touching it.
    #[must_use]
    pub fn storage_access_status(&self, key: StorageKey) -> AccessStatus {
        if self.tx.access_list.is_storage_warm(self.address, key) {
            AccessStatus::Warm
        } else {
            AccessStatus::Cold
        }
    }

    /// Marks a slot warm.
    pub fn touch_storage(&mut self, key: StorageKey) -> AccessStatus {
        self.tx.access_list.touch_storage(self.address, key)
    }

    /// Captures journal positions of all shared state.
    pub fn checkpoint(&mut self) -> Checkpoint {
        Checkpoint {
            transient: self.tx.transient.checkpoint(),
            access_list: self.tx.access_list.checkpoint(),
            world: self.world.checkpoint(),
        }
    }

    /// Rolls shared state back to `checkpoint`.
    pub fn revert_to(&mut self, checkpoint: Checkpoint) {
        self.tx.transient.revert_to(checkpoint.transient);
        self.tx.access_list.revert_to(checkpoint.access_list);
        self.world.revert_to(checkpoint.world);
    }
}

/// Marks every `JUMPDEST` that is not inside push data.
fn analyze_jump_dests(code: &[u8]) -> Vec<bool> {
    let mut dests = vec![false; code.len()];
    let mut i = 0;

    while i < code.len() {
        let op = code[i];
        if op == 0x5B {
            dests[i] = true;
        }
        // Skip PUSH data bytes
        if (0x60..=0x7F).contains(&op) {
            i += usize::from(op - 0x5F);
        }
        i += 1;
    }

    dests
}

// =============================================================================
// TESTS
// =============================================================================
