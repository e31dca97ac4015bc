//! # Instruction Registry
//!
//! One [`Operation`] descriptor per defined opcode byte, and one registry per
//! protocol version.
//!
//! Registries are built once, on first use, for every version in the upgrade
//! chain and are read-only afterwards. A slot is populated when the opcode is
//! implemented and the version's fee schedule has activated it; every other
//! byte resolves to `None` and halts with `InvalidOperation`.

use crate::domain::entities::ProtocolVersion;
use crate::errors::HaltReason;
use crate::evm::frame::Frame;
use crate::evm::instructions::{arithmetic, bitwise, control, environment, memory, stack, storage};
use crate::evm::schedule::{FeeParam, FeeSchedule};
use std::sync::LazyLock;

// =============================================================================
// OPERATION RESULT
// =============================================================================

/// Outcome of applying one instruction.
///
/// `gas_cost` is always the amount attributable to the instruction, including
/// when it halts. No halt reason means execution continues.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OperationResult {
    /// Gas charged, or that would have been charged.
    pub gas_cost: u64,
    /// Exceptional halt, if any.
    pub halt: Option<HaltReason>,
}

impl OperationResult {
    /// Successful application.
    #[must_use]
    pub const fn ok(gas_cost: u64) -> Self {
        Self {
            gas_cost,
            halt: None,
        }
    }

    /// Exceptional halt.
    #[must_use]
    pub const fn halt(gas_cost: u64, reason: HaltReason) -> Self {
        Self {
            gas_cost,
            halt: Some(reason),
        }
    }

    /// True when execution may continue.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.halt.is_none()
    }
}

// =============================================================================
// OPERATION DESCRIPTOR
// =============================================================================

/// Effect of a fixed-cost instruction.
pub type ApplyFn = fn(&mut Frame<'_>) -> Result<(), HaltReason>;

/// Cost computation and effect of a dynamic-cost instruction.
///
/// The function prices the instruction from the frame and schedule, checks the
/// remaining gas itself and applies the effect only when it is affordable. It
/// must not deduct gas.
pub type DynamicFn = fn(&mut Frame<'_>) -> OperationResult;

/// How an instruction is priced.
#[derive(Clone, Copy)]
pub enum CostStrategy {
    /// A single schedule entry, known before the effect runs.
    Fixed(FeeParam, ApplyFn),
    /// Priced from runtime state.
    Dynamic(DynamicFn),
}

impl std::fmt::Debug for CostStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fixed(param, _) => write!(f, "Fixed({param:?})"),
            Self::Dynamic(_) => f.write_str("Dynamic"),
        }
    }
}

/// Immutable instruction descriptor.
#[derive(Clone, Copy, Debug)]
pub struct Operation {
    /// Opcode byte.
    pub opcode: u8,
    /// Mnemonic.
    pub name: &'static str,
    /// Words consumed.
    pub stack_inputs: usize,
    /// Words produced.
    pub stack_outputs: usize,
    /// Pricing and effect.
    pub cost: CostStrategy,
}

const fn fixed(
    opcode: u8,
    name: &'static str,
    stack_inputs: usize,
    stack_outputs: usize,
    fee: FeeParam,
    apply: ApplyFn,
) -> Operation {
    Operation {
        opcode,
        name,
        stack_inputs,
        stack_outputs,
        cost: CostStrategy::Fixed(fee, apply),
    }
}

const fn dynamic(
    opcode: u8,
    name: &'static str,
    stack_inputs: usize,
    stack_outputs: usize,
    apply: DynamicFn,
) -> Operation {
    Operation {
        opcode,
        name,
        stack_inputs,
        stack_outputs,
        cost: CostStrategy::Dynamic(apply),
    }
}

#[rustfmt::skip]
const PUSH_NAMES: [&str; 33] = [
    "PUSH0", "PUSH1", "PUSH2", "PUSH3", "PUSH4", "PUSH5", "PUSH6", "PUSH7", "PUSH8",
    "PUSH9", "PUSH10", "PUSH11", "PUSH12", "PUSH13", "PUSH14", "PUSH15", "PUSH16",
    "PUSH17", "PUSH18", "PUSH19", "PUSH20", "PUSH21", "PUSH22", "PUSH23", "PUSH24",
    "PUSH25", "PUSH26", "PUSH27", "PUSH28", "PUSH29", "PUSH30", "PUSH31", "PUSH32",
];

#[rustfmt::skip]
const DUP_NAMES: [&str; 16] = [
    "DUP1", "DUP2", "DUP3", "DUP4", "DUP5", "DUP6", "DUP7", "DUP8",
    "DUP9", "DUP10", "DUP11", "DUP12", "DUP13", "DUP14", "DUP15", "DUP16",
];

#[rustfmt::skip]
const SWAP_NAMES: [&str; 16] = [
    "SWAP1", "SWAP2", "SWAP3", "SWAP4", "SWAP5", "SWAP6", "SWAP7", "SWAP8",
    "SWAP9", "SWAP10", "SWAP11", "SWAP12", "SWAP13", "SWAP14", "SWAP15", "SWAP16",
];

/// Every implemented instruction, regardless of version.
fn all_operations() -> Vec<Operation> {
    use FeeParam::{Base, High, JumpDest, Low, Mid, VeryLow, Zero};

    let mut ops = vec![
        fixed(0x00, "STOP", 0, 0, Zero, control::stop),
        // Arithmetic
        fixed(0x01, "ADD", 2, 1, VeryLow, arithmetic::add),
        fixed(0x02, "MUL", 2, 1, Low, arithmetic::mul),
        fixed(0x03, "SUB", 2, 1, VeryLow, arithmetic::sub),
        fixed(0x04, "DIV", 2, 1, Low, arithmetic::div),
        fixed(0x05, "SDIV", 2, 1, Low, arithmetic::sdiv),
        fixed(0x06, "MOD", 2, 1, Low, arithmetic::modulo),
        fixed(0x07, "SMOD", 2, 1, Low, arithmetic::smod),
        fixed(0x08, "ADDMOD", 3, 1, Mid, arithmetic::addmod),
        fixed(0x09, "MULMOD", 3, 1, Mid, arithmetic::mulmod),
        dynamic(0x0A, "EXP", 2, 1, arithmetic::exp),
        fixed(0x0B, "SIGNEXTEND", 2, 1, Low, arithmetic::signextend),
        // Comparison & bitwise
        fixed(0x10, "LT", 2, 1, VeryLow, bitwise::lt),
        fixed(0x11, "GT", 2, 1, VeryLow, bitwise::gt),
        fixed(0x12, "SLT", 2, 1, VeryLow, bitwise::slt),
        fixed(0x13, "SGT", 2, 1, VeryLow, bitwise::sgt),
        fixed(0x14, "EQ", 2, 1, VeryLow, bitwise::eq),
        fixed(0x15, "ISZERO", 1, 1, VeryLow, bitwise::iszero),
        fixed(0x16, "AND", 2, 1, VeryLow, bitwise::and),
        fixed(0x17, "OR", 2, 1, VeryLow, bitwise::or),
        fixed(0x18, "XOR", 2, 1, VeryLow, bitwise::xor),
        fixed(0x19, "NOT", 1, 1, VeryLow, bitwise::not),
        fixed(0x1A, "BYTE", 2, 1, VeryLow, bitwise::byte),
        fixed(0x1B, "SHL", 2, 1, VeryLow, bitwise::shl),
        fixed(0x1C, "SHR", 2, 1, VeryLow, bitwise::shr),
        fixed(0x1D, "SAR", 2, 1, VeryLow, bitwise::sar),
        // Frame environment
        fixed(0x30, "ADDRESS", 0, 1, Base, environment::address),
        fixed(0x33, "CALLER", 0, 1, Base, environment::caller),
        fixed(0x38, "CODESIZE", 0, 1, Base, environment::codesize),
        // Stack, memory, storage, flow
        fixed(0x50, "POP", 1, 0, Base, stack::pop),
        dynamic(0x51, "MLOAD", 1, 1, memory::mload),
        dynamic(0x52, "MSTORE", 2, 0, memory::mstore),
        dynamic(0x53, "MSTORE8", 2, 0, memory::mstore8),
        dynamic(0x54, "SLOAD", 1, 1, storage::sload),
        dynamic(0x55, "SSTORE", 2, 0, storage::sstore),
        fixed(0x56, "JUMP", 1, 0, Mid, control::jump),
        fixed(0x57, "JUMPI", 2, 0, High, control::jumpi),
        fixed(0x58, "PC", 0, 1, Base, control::pc),
        fixed(0x59, "MSIZE", 0, 1, Base, memory::msize),
        fixed(0x5A, "GAS", 0, 1, Base, environment::gas),
        fixed(0x5B, "JUMPDEST", 0, 0, JumpDest, control::jumpdest),
        dynamic(0x5C, "TLOAD", 1, 1, storage::tload),
        dynamic(0x5D, "TSTORE", 2, 0, storage::tstore),
        dynamic(0x5E, "MCOPY", 3, 0, memory::mcopy),
        fixed(0x5F, "PUSH0", 0, 1, Base, stack::push),
    ];

    for n in 1..=32u8 {
        ops.push(fixed(0x5F + n, PUSH_NAMES[usize::from(n)], 0, 1, VeryLow, stack::push));
    }
    for n in 1..=16u8 {
        let depth = usize::from(n);
        ops.push(fixed(0x7F + n, DUP_NAMES[depth - 1], depth, depth + 1, VeryLow, stack::dup));
        ops.push(fixed(0x8F + n, SWAP_NAMES[depth - 1], depth + 1, depth + 1, VeryLow, stack::swap));
    }

    ops.extend([
        dynamic(0xF3, "RETURN", 2, 0, control::ret),
        dynamic(0xFD, "REVERT", 2, 0, control::revert),
        fixed(0xFE, "INVALID", 0, 0, Zero, control::invalid),
    ]);

    ops
}

// =============================================================================
// REGISTRY
// =============================================================================

/// Total mapping from opcode byte to descriptor for one protocol version.
#[derive(Debug)]
pub struct InstructionRegistry {
    schedule: FeeSchedule,
    operations: [Option<Operation>; 256],
}

static REGISTRIES: LazyLock<Vec<InstructionRegistry>> = LazyLock::new(|| {
    ProtocolVersion::ALL
        .into_iter()
        .map(InstructionRegistry::build)
        .collect()
});

impl InstructionRegistry {
    /// Builds the registry for `version`.
    #[must_use]
    pub fn build(version: ProtocolVersion) -> Self {
        let schedule = FeeSchedule::for_version(version);
        let mut operations = [None; 256];
        for op in all_operations() {
            if schedule.is_available(op.opcode) {
                operations[usize::from(op.opcode)] = Some(op);
            }
        }
        Self {
            schedule,
            operations,
        }
    }

    /// Shared registry for `version`, built on first use.
    #[must_use]
    pub fn for_version(version: ProtocolVersion) -> &'static Self {
        &REGISTRIES[version.ordinal()]
    }

    /// Descriptor for `opcode`, `None` when undefined in this version.
    #[must_use]
    pub fn get(&self, opcode: u8) -> Option<&Operation> {
        self.operations[usize::from(opcode)].as_ref()
    }

    /// Fee schedule the registry was built for.
    #[must_use]
    pub fn schedule(&self) -> &FeeSchedule {
        &self.schedule
    }

    /// Number of defined opcodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.operations.iter().flatten().count()
    }

    /// True if no opcode is defined.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptors_are_unique_and_consistent() {
        let ops = all_operations();
        let mut seen = [false; 256];
        for op in &ops {
            assert!(!seen[usize::from(op.opcode)], "duplicate {}", op.name);
            seen[usize::from(op.opcode)] = true;
        }
        assert_eq!(ops.len(), 112);
    }

    #[test]
    fn test_xor_descriptor() {
        let registry = InstructionRegistry::for_version(ProtocolVersion::Frontier);
        let xor = registry.get(0x18).unwrap();
        assert_eq!(xor.name, "XOR");
        assert_eq!((xor.stack_inputs, xor.stack_outputs), (2, 1));
        assert!(matches!(xor.cost, CostStrategy::Fixed(FeeParam::VeryLow, _)));
    }

    #[test]
    fn test_transient_opcodes_only_from_cancun() {
        let shanghai = InstructionRegistry::for_version(ProtocolVersion::Shanghai);
        let cancun = InstructionRegistry::for_version(ProtocolVersion::Cancun);

        assert!(shanghai.get(0x5C).is_none());
        assert!(shanghai.get(0x5D).is_none());
        assert_eq!(cancun.get(0x5C).unwrap().name, "TLOAD");
        assert_eq!(cancun.get(0x5D).unwrap().name, "TSTORE");
        assert_eq!(cancun.len(), shanghai.len() + 3);
    }

    #[test]
    fn test_dup_swap_shapes() {
        let registry = InstructionRegistry::for_version(ProtocolVersion::Cancun);
        let dup16 = registry.get(0x8F).unwrap();
        assert_eq!((dup16.name, dup16.stack_inputs, dup16.stack_outputs), ("DUP16", 16, 17));
        let swap1 = registry.get(0x90).unwrap();
        assert_eq!((swap1.name, swap1.stack_inputs, swap1.stack_outputs), ("SWAP1", 2, 2));
        assert_eq!(registry.get(0x7F).unwrap().name, "PUSH32");
    }

    #[test]
    fn test_undefined_families() {
        let registry = InstructionRegistry::for_version(ProtocolVersion::Cancun);
        for opcode in [0x0C, 0x20, 0x31, 0x40, 0xA0, 0xF0, 0xF1, 0xFF] {
            assert!(registry.get(opcode).is_none(), "0x{opcode:02X}");
        }
        assert_eq!(registry.schedule().version(), ProtocolVersion::Cancun);
    }
}
