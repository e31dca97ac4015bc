//! # EVM Interpreter
//!
//! The fetch–validate–apply loop.
//!
//! Each step:
//! 1. fetches the opcode at the instruction pointer (`STOP` past end of code)
//! 2. resolves its descriptor in the version's registry, or halts with
//!    `InvalidOperation`
//! 3. validates stack items, then stack headroom, then gas
//! 4. applies the effect and deducts the cost
//! 5. advances the instruction pointer unless the instruction jumped
//!
//! An exceptional halt ends the frame and forfeits its remaining gas.
//! Rolling back shared state is left to whoever owns the frame: nested
//! frames are rolled back by [`Interpreter::execute_child`], top-level frames
//! by the service.

use crate::domain::entities::{ExecutionOutcome, ExecutionRequest, ExecutionStatus, VmConfig};
use crate::domain::value_objects::Bytes;
use crate::errors::HaltReason;
use crate::evm::frame::{Frame, FrameStatus, TransactionContext};
use crate::evm::opcodes::{CostStrategy, InstructionRegistry, OperationResult};
use crate::evm::schedule::FeeSchedule;
use crate::metrics;
use crate::ports::outbound::WorldState;
use tracing::{debug, trace};

/// Bytecode interpreter bound to one protocol version.
#[derive(Debug, Clone)]
pub struct Interpreter {
    config: VmConfig,
    registry: &'static InstructionRegistry,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new(VmConfig::default())
    }
}

impl Interpreter {
    /// Creates an interpreter for `config.protocol_version`.
    #[must_use]
    pub fn new(config: VmConfig) -> Self {
        let registry = InstructionRegistry::for_version(config.protocol_version);
        Self { config, registry }
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &VmConfig {
        &self.config
    }

    /// Instruction registry in use.
    #[must_use]
    pub fn registry(&self) -> &'static InstructionRegistry {
        self.registry
    }

    /// Fee schedule in use.
    #[must_use]
    pub fn schedule(&self) -> &'static FeeSchedule {
        self.registry.schedule()
    }

    /// Creates a top-level frame configured for this interpreter.
    pub fn frame<'a>(
        &self,
        request: &'a ExecutionRequest,
        world: &'a mut dyn WorldState,
        tx: &'a mut TransactionContext,
    ) -> Frame<'a> {
        Frame::new(request, self.schedule(), world, tx)
            .with_memory_limit(self.config.max_memory_size)
    }

    /// Runs `request` as a top-level frame.
    pub fn execute(
        &self,
        request: &ExecutionRequest,
        world: &mut dyn WorldState,
        tx: &mut TransactionContext,
    ) -> ExecutionOutcome {
        let mut frame = self.frame(request, world, tx);
        self.run(&mut frame)
    }

    /// Executes one instruction.
    ///
    /// On a halt the frame is terminated and its gas forfeited; the returned
    /// result still carries the instruction's computed cost. A frame that has
    /// already stopped, returned, reverted or halted is left untouched.
    pub fn step(&self, frame: &mut Frame<'_>) -> OperationResult {
        if frame.status() != FrameStatus::Running {
            return OperationResult::ok(0);
        }
        let opcode = frame.current_opcode();
        let result = self.dispatch(frame, opcode);

        match result.halt {
            None => {
                metrics::record_instruction();
                frame.advance();
            }
            Some(reason) => {
                metrics::record_halt(reason.label());
                debug!(
                    pc = frame.pc(),
                    opcode = format_args!("0x{opcode:02X}"),
                    depth = frame.depth(),
                    gas_cost = result.gas_cost,
                    %reason,
                    "frame halted"
                );
                frame.halt(reason);
            }
        }
        result
    }

    fn dispatch(&self, frame: &mut Frame<'_>, opcode: u8) -> OperationResult {
        let Some(op) = self.registry.get(opcode) else {
            return OperationResult::halt(0, HaltReason::InvalidOperation(opcode));
        };

        trace!(
            pc = frame.pc(),
            op = op.name,
            gas = frame.gas_remaining(),
            stack = frame.stack().len(),
            "step"
        );

        if let Err(reason) = frame.stack().require(op.stack_inputs, op.stack_outputs) {
            return OperationResult::halt(0, reason);
        }

        match op.cost {
            CostStrategy::Fixed(fee, apply) => {
                let cost = frame.schedule().cost(fee);
                if let Err(reason) = frame.decrement_gas(cost) {
                    return OperationResult::halt(cost, reason);
                }
                match apply(frame) {
                    Ok(()) => OperationResult::ok(cost),
                    Err(reason) => OperationResult::halt(cost, reason),
                }
            }
            CostStrategy::Dynamic(apply) => {
                let result = apply(frame);
                if result.is_ok() {
                    if let Err(reason) = frame.decrement_gas(result.gas_cost) {
                        return OperationResult::halt(result.gas_cost, reason);
                    }
                }
                result
            }
        }
    }

    /// Drives a frame until it stops, returns, reverts or halts.
    pub fn run(&self, frame: &mut Frame<'_>) -> ExecutionOutcome {
        while frame.status() == FrameStatus::Running {
            self.step(frame);
        }
        let outcome = outcome_of(frame);
        trace!(
            depth = frame.depth(),
            status = ?outcome.status,
            gas_used = outcome.gas_used,
            "frame finished"
        );
        outcome
    }

    /// Runs a nested frame on behalf of `parent`.
    ///
    /// `request.gas_limit` is taken from the parent up front and whatever the
    /// child leaves unused is returned. When the child reverts or halts, its
    /// transient storage, persistent storage and access-list changes are
    /// rolled back; when it succeeds its refund counter is merged into the
    /// parent's. Calls that would exceed the configured depth, or that the
    /// parent cannot fund, are refused without running and without charging
    /// the parent; the refused outcome reports the full allocation as
    /// remaining. A parent that has already ended cannot make calls and is
    /// refused with [`HaltReason::IllegalStateChange`].
    pub fn execute_child(
        &self,
        parent: &mut Frame<'_>,
        request: &ExecutionRequest,
    ) -> ExecutionOutcome {
        if parent.status() != FrameStatus::Running {
            return refused(request, HaltReason::IllegalStateChange);
        }
        let depth = parent.depth() + 1;
        if depth > self.config.max_call_depth {
            return refused(
                request,
                HaltReason::CallDepthExceeded {
                    depth,
                    max: self.config.max_call_depth,
                },
            );
        }
        if let Err(reason) = parent.decrement_gas(request.gas_limit) {
            return refused(request, reason);
        }

        let checkpoint = parent.checkpoint();
        let outcome = {
            let mut child = parent.child(request);
            self.run(&mut child)
        };

        if outcome.is_success() {
            parent.add_refund(outcome.gas_refund);
        } else {
            parent.revert_to(checkpoint);
        }
        parent.return_gas(outcome.gas_remaining);
        outcome
    }
}

fn outcome_of(frame: &Frame<'_>) -> ExecutionOutcome {
    let status = match frame.status() {
        FrameStatus::Running | FrameStatus::Succeeded => ExecutionStatus::Success,
        FrameStatus::Reverted => ExecutionStatus::Reverted,
        FrameStatus::Halted(reason) => ExecutionStatus::Halted(reason),
    };
    ExecutionOutcome {
        status,
        gas_used: frame.gas_limit() - frame.gas_remaining(),
        gas_remaining: frame.gas_remaining(),
        gas_refund: if status.is_success() {
            frame.gas_refund()
        } else {
            0
        },
        output: frame.output().clone(),
        stack: frame.stack().as_slice().to_vec(),
    }
}

fn refused(request: &ExecutionRequest, reason: HaltReason) -> ExecutionOutcome {
    debug!(%reason, address = %request.address, "nested call refused");
    ExecutionOutcome {
        status: ExecutionStatus::Halted(reason),
        gas_used: 0,
        gas_remaining: request.gas_limit,
        gas_refund: 0,
        output: Bytes::new(),
        stack: Vec::new(),
    }
}

// =============================================================================
// TESTS
// =============================================================================
