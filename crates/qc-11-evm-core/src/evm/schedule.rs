//! # Fee Schedules
//!
//! Versioned gas cost tables, one per protocol upgrade.
//!
//! A schedule is never written by hand for a given version. The Frontier
//! base table is the root, and every later upgrade is a [`ScheduleDelta`]
//! that overrides a handful of entries, introduces opcodes and switches
//! rules on. [`FeeSchedule::for_version`] folds the deltas of the version
//! and all of its ancestors, in order, over the base table, so any entry an
//! upgrade does not mention is inherited unchanged.
//!
//! | Version | Delta |
//! |---------|-------|
//! | Frontier | base table |
//! | Tangerine Whistle | `SLOAD` 200 (EIP-150) |
//! | Spurious Dragon | `EXP` byte 50 (EIP-160) |
//! | Byzantium | `REVERT` (EIP-140) |
//! | Constantinople | `SHL`/`SHR`/`SAR` (EIP-145) |
//! | Istanbul | `SLOAD` 800, net gas metering (EIP-1884, EIP-2200) |
//! | Berlin | warm/cold storage access (EIP-2929) |
//! | London | reduced refunds (EIP-3529) |
//! | Shanghai | `PUSH0` (EIP-3855) |
//! | Cancun | `TLOAD`/`TSTORE` (EIP-1153), `MCOPY` (EIP-5656) |

use crate::domain::entities::ProtocolVersion;
use crate::domain::value_objects::{StorageValue, U256};
use crate::evm::access_list::AccessStatus;
use crate::evm::memory::WORD_SIZE;

// =============================================================================
// FEE PARAMETERS
// =============================================================================

/// Named entries of a fee schedule.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FeeParam {
    /// Zero tier (`STOP`, `RETURN`, `REVERT`, `INVALID`).
    Zero,
    /// Base tier (`PC`, `GAS`, `POP`, ...).
    Base,
    /// Very-low tier (`ADD`, `XOR`, `PUSH*`, ...).
    VeryLow,
    /// Low tier (`MUL`, `DIV`, ...).
    Low,
    /// Mid tier (`ADDMOD`, `JUMP`).
    Mid,
    /// High tier (`JUMPI`).
    High,
    /// `JUMPDEST`.
    JumpDest,
    /// `EXP` static part.
    Exp,
    /// `EXP` cost per significant exponent byte.
    ExpByte,
    /// Linear memory cost per word.
    MemoryWord,
    /// Divisor of the quadratic memory term.
    MemoryQuadDivisor,
    /// Cost per word copied.
    Copy,
    /// Storage read; the warm read once access lists exist.
    Sload,
    /// Surcharge for the first touch of a slot in a transaction.
    ColdSload,
    /// `SSTORE` turning a zero slot non-zero.
    SstoreSet,
    /// `SSTORE` modifying a non-zero slot.
    SstoreReset,
    /// Refund for clearing a non-zero slot.
    SstoreClearRefund,
    /// Minimum gas that must remain for `SSTORE` under net gas metering.
    SstoreSentry,
    /// `TLOAD` and `TSTORE`.
    TransientAccess,
    /// Maximum refund is `gas_used / RefundQuotient`.
    RefundQuotient,
}

impl FeeParam {
    /// Number of parameters.
    pub const COUNT: usize = 20;

    /// Every parameter, in table order.
    pub const ALL: [FeeParam; Self::COUNT] = [
        Self::Zero,
        Self::Base,
        Self::VeryLow,
        Self::Low,
        Self::Mid,
        Self::High,
        Self::JumpDest,
        Self::Exp,
        Self::ExpByte,
        Self::MemoryWord,
        Self::MemoryQuadDivisor,
        Self::Copy,
        Self::Sload,
        Self::ColdSload,
        Self::SstoreSet,
        Self::SstoreReset,
        Self::SstoreClearRefund,
        Self::SstoreSentry,
        Self::TransientAccess,
        Self::RefundQuotient,
    ];

    const fn index(self) -> usize {
        self as usize
    }
}

// =============================================================================
// DELTAS
// =============================================================================

/// A single override applied by an upgrade.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FeeOverride {
    /// Replace the entry with a literal amount.
    Set(FeeParam, u64),
    /// Replace the entry with the predecessor's value of another entry.
    Inherit {
        /// Entry being overridden.
        target: FeeParam,
        /// Entry whose inherited value is copied.
        source: FeeParam,
    },
}

/// Behavioural switches that are not plain amounts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rule {
    /// EIP-2200 `SSTORE` accounting against the original slot value.
    NetGasMetering,
}

/// Everything one upgrade changes relative to its predecessor.
#[derive(Clone, Copy, Debug)]
pub struct ScheduleDelta {
    /// Version this delta activates.
    pub version: ProtocolVersion,
    /// Fee entries overridden.
    pub fees: &'static [FeeOverride],
    /// Opcodes that become available.
    pub introduces: &'static [u8],
    /// Rules switched on.
    pub rules: &'static [Rule],
}

#[rustfmt::skip]
const FRONTIER_FEES: [u64; FeeParam::COUNT] = [
    0,      // Zero
    2,      // Base
    3,      // VeryLow
    5,      // Low
    8,      // Mid
    10,     // High
    1,      // JumpDest
    10,     // Exp
    10,     // ExpByte
    3,      // MemoryWord
    512,    // MemoryQuadDivisor
    3,      // Copy
    50,     // Sload
    0,      // ColdSload
    20_000, // SstoreSet
    5_000,  // SstoreReset
    15_000, // SstoreClearRefund
    0,      // SstoreSentry
    0,      // TransientAccess
    2,      // RefundQuotient
];

/// Upgrade deltas in activation order. Frontier is the base table.
pub const DELTAS: &[ScheduleDelta] = &[
    ScheduleDelta {
        version: ProtocolVersion::Frontier,
        fees: &[],
        introduces: &[],
        rules: &[],
    },
    ScheduleDelta {
        version: ProtocolVersion::TangerineWhistle,
        fees: &[FeeOverride::Set(FeeParam::Sload, 200)],
        introduces: &[],
        rules: &[],
    },
    ScheduleDelta {
        version: ProtocolVersion::SpuriousDragon,
        fees: &[FeeOverride::Set(FeeParam::ExpByte, 50)],
        introduces: &[],
        rules: &[],
    },
    ScheduleDelta {
        version: ProtocolVersion::Byzantium,
        fees: &[],
        introduces: &[0xFD],
        rules: &[],
    },
    ScheduleDelta {
        version: ProtocolVersion::Constantinople,
        fees: &[],
        introduces: &[0x1B, 0x1C, 0x1D],
        rules: &[],
    },
    ScheduleDelta {
        version: ProtocolVersion::Istanbul,
        fees: &[
            FeeOverride::Set(FeeParam::Sload, 800),
            FeeOverride::Set(FeeParam::SstoreSentry, 2_300),
        ],
        introduces: &[],
        rules: &[Rule::NetGasMetering],
    },
    ScheduleDelta {
        version: ProtocolVersion::Berlin,
        fees: &[
            FeeOverride::Set(FeeParam::Sload, 100),
            FeeOverride::Set(FeeParam::ColdSload, 2_100),
            FeeOverride::Set(FeeParam::SstoreReset, 2_900),
        ],
        introduces: &[],
        rules: &[],
    },
    ScheduleDelta {
        version: ProtocolVersion::London,
        fees: &[
            FeeOverride::Set(FeeParam::SstoreClearRefund, 4_800),
            FeeOverride::Set(FeeParam::RefundQuotient, 5),
        ],
        introduces: &[],
        rules: &[],
    },
    ScheduleDelta {
        version: ProtocolVersion::Shanghai,
        fees: &[],
        introduces: &[0x5F],
        rules: &[],
    },
    ScheduleDelta {
        version: ProtocolVersion::Cancun,
        fees: &[FeeOverride::Inherit {
            target: FeeParam::TransientAccess,
            source: FeeParam::Sload,
        }],
        introduces: &[0x5C, 0x5D, 0x5E],
        rules: &[],
    },
];

/// Returns the delta that activates `version`.
#[must_use]
pub fn delta(version: ProtocolVersion) -> &'static ScheduleDelta {
    &DELTAS[version.ordinal()]
}

/// Returns the version that introduced `opcode`, or `None` for Frontier opcodes.
#[must_use]
pub fn introduced_in(opcode: u8) -> Option<ProtocolVersion> {
    DELTAS
        .iter()
        .find(|delta| delta.introduces.contains(&opcode))
        .map(|delta| delta.version)
}

// =============================================================================
// FEE SCHEDULE
// =============================================================================

/// Inputs to the `SSTORE` cost rule.
#[derive(Clone, Copy, Debug)]
pub struct SstoreInputs {
    /// Slot value at the start of the transaction.
    pub original: StorageValue,
    /// Slot value before this instruction.
    pub current: StorageValue,
    /// Value being written.
    pub new: StorageValue,
    /// Warm/cold status of the slot before this instruction.
    pub access: AccessStatus,
}

/// Gas charged and refund change produced by an `SSTORE`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SstoreCharge {
    /// Gas charged.
    pub cost: u64,
    /// Signed change to the frame's refund counter.
    pub refund: i64,
}

/// Immutable cost table for one protocol version.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FeeSchedule {
    version: ProtocolVersion,
    fees: [u64; FeeParam::COUNT],
    net_gas_metering: bool,
    available: [bool; 256],
}

impl FeeSchedule {
    /// The Frontier base schedule.
    #[must_use]
    pub fn frontier() -> Self {
        let mut available = [true; 256];
        for delta in DELTAS {
            for &opcode in delta.introduces {
                available[usize::from(opcode)] = false;
            }
        }
        Self {
            version: ProtocolVersion::Frontier,
            fees: FRONTIER_FEES,
            net_gas_metering: false,
            available,
        }
    }

    /// Builds the schedule active at `version`.
    #[must_use]
    pub fn for_version(version: ProtocolVersion) -> Self {
        DELTAS[1..=version.ordinal()]
            .iter()
            .fold(Self::frontier(), |schedule, delta| schedule.derive(delta))
    }

    /// Applies one upgrade delta on top of this schedule.
    #[must_use]
    pub fn derive(&self, delta: &ScheduleDelta) -> Self {
        let mut next = self.clone();
        next.version = delta.version;
        for entry in delta.fees {
            match *entry {
                FeeOverride::Set(param, amount) => next.fees[param.index()] = amount,
                FeeOverride::Inherit { target, source } => {
                    next.fees[target.index()] = self.fees[source.index()];
                }
            }
        }
        for &opcode in delta.introduces {
            next.available[usize::from(opcode)] = true;
        }
        for rule in delta.rules {
            match rule {
                Rule::NetGasMetering => next.net_gas_metering = true,
            }
        }
        next
    }

    /// Protocol version of this schedule.
    #[must_use]
    pub fn version(&self) -> ProtocolVersion {
        self.version
    }

    /// Amount for a named entry.
    #[must_use]
    pub fn cost(&self, param: FeeParam) -> u64 {
        self.fees[param.index()]
    }

    /// True once the version has activated `opcode`.
    #[must_use]
    pub fn is_available(&self, opcode: u8) -> bool {
        self.available[usize::from(opcode)]
    }

    /// True when `SSTORE` is metered against the original slot value.
    #[must_use]
    pub fn net_gas_metering(&self) -> bool {
        self.net_gas_metering
    }

    /// Cost of `TLOAD` and `TSTORE`.
    #[must_use]
    pub fn transient_access_cost(&self) -> u64 {
        self.cost(FeeParam::TransientAccess)
    }

    /// Cost of `SLOAD` for a slot in the given access state.
    ///
    /// Before Berlin there is no cold surcharge and every read costs `Sload`.
    #[must_use]
    pub fn sload_cost(&self, access: AccessStatus) -> u64 {
        match access {
            AccessStatus::Warm => self.cost(FeeParam::Sload),
            AccessStatus::Cold => self.cost(FeeParam::ColdSload).max(self.cost(FeeParam::Sload)),
        }
    }

    /// Cost of `EXP` for the given exponent.
    #[must_use]
    pub fn exp_cost(&self, exponent: U256) -> u64 {
        let byte_size = (exponent.bits() as u64).div_ceil(8);
        self.cost(FeeParam::Exp)
            .saturating_add(self.cost(FeeParam::ExpByte).saturating_mul(byte_size))
    }

    /// Cost of copying `len` bytes.
    #[must_use]
    pub fn copy_cost(&self, len: u64) -> u64 {
        self.cost(FeeParam::Copy)
            .saturating_mul(len.div_ceil(WORD_SIZE as u64))
    }

    /// Total cost of a memory of `words` words.
    ///
    /// Cost = `MemoryWord * words + words^2 / MemoryQuadDivisor`
    #[must_use]
    pub fn memory_cost(&self, words: u64) -> u64 {
        let linear = self.cost(FeeParam::MemoryWord).saturating_mul(words);
        let quadratic = words.saturating_mul(words) / self.cost(FeeParam::MemoryQuadDivisor);
        linear.saturating_add(quadratic)
    }

    /// Incremental cost of growing memory from `old_words` to `new_words`.
    #[must_use]
    pub fn memory_expansion_cost(&self, old_words: u64, new_words: u64) -> u64 {
        if new_words <= old_words {
            return 0;
        }
        self.memory_cost(new_words) - self.memory_cost(old_words)
    }

    /// Cost and refund change of an `SSTORE`.
    #[must_use]
    pub fn sstore_charge(&self, inputs: &SstoreInputs) -> SstoreCharge {
        let set = self.cost(FeeParam::SstoreSet);
        let reset = self.cost(FeeParam::SstoreReset);
        let clear = self.cost(FeeParam::SstoreClearRefund) as i64;

        if !self.net_gas_metering {
            let cost = if inputs.current.is_zero() && !inputs.new.is_zero() {
                set
            } else {
                reset
            };
            let refund = if !inputs.current.is_zero() && inputs.new.is_zero() {
                clear
            } else {
                0
            };
            return SstoreCharge { cost, refund };
        }

        let SstoreInputs {
            original,
            current,
            new,
            ..
        } = *inputs;
        let warm_read = self.cost(FeeParam::Sload);
        let cold = match inputs.access {
            AccessStatus::Cold => self.cost(FeeParam::ColdSload),
            AccessStatus::Warm => 0,
        };

        let mut refund = 0i64;
        let cost = if current == new {
            warm_read
        } else if original == current {
            if original.is_zero() {
                set
            } else {
                if new.is_zero() {
                    refund += clear;
                }
                reset
            }
        } else {
            if !original.is_zero() {
                if current.is_zero() {
                    refund -= clear;
                } else if new.is_zero() {
                    refund += clear;
                }
            }
            if original == new {
                let restored = if original.is_zero() { set } else { reset };
                refund += restored as i64 - warm_read as i64;
            }
            warm_read
        };

        SstoreCharge {
            cost: cost + cold,
            refund,
        }
    }

    /// Gas that must remain for `SSTORE` to proceed.
    #[must_use]
    pub fn sstore_sentry(&self) -> Option<u64> {
        self.net_gas_metering
            .then(|| self.cost(FeeParam::SstoreSentry))
    }

    /// Refund actually granted for a transaction that used `gas_used`.
    #[must_use]
    pub fn capped_refund(&self, gas_used: u64, refund: i64) -> u64 {
        let refund = u64::try_from(refund).unwrap_or(0);
        refund.min(gas_used / self.cost(FeeParam::RefundQuotient))
    }
}

// =============================================================================
// TESTS
// =============================================================================
