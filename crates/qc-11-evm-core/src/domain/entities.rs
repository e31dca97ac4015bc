//! # Domain Entities
//!
//! Configuration, protocol versions and the per-transaction request/outcome
//! types exchanged with callers of the execution core.

use crate::domain::value_objects::{Address, Bytes, U256};
use crate::errors::{ConfigError, HaltReason};
use crate::evm::schedule::FeeSchedule;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// =============================================================================
// PROTOCOL VERSION
// =============================================================================

/// Protocol upgrade selecting the fee schedule and opcode set.
///
/// Variants are declared in activation order, so `Ord` follows the upgrade chain.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ProtocolVersion {
    /// Genesis rules.
    Frontier,
    /// EIP-150 repricing.
    TangerineWhistle,
    /// EIP-160 `EXP` repricing.
    SpuriousDragon,
    /// `REVERT`.
    Byzantium,
    /// Bitwise shifts.
    Constantinople,
    /// Net gas metering for `SSTORE`.
    Istanbul,
    /// Warm/cold access accounting.
    Berlin,
    /// Reduced refunds.
    London,
    /// `PUSH0`.
    Shanghai,
    /// Transient storage and `MCOPY`.
    #[default]
    Cancun,
}

impl ProtocolVersion {
    /// Every version, oldest first.
    pub const ALL: [ProtocolVersion; 10] = [
        Self::Frontier,
        Self::TangerineWhistle,
        Self::SpuriousDragon,
        Self::Byzantium,
        Self::Constantinople,
        Self::Istanbul,
        Self::Berlin,
        Self::London,
        Self::Shanghai,
        Self::Cancun,
    ];

    /// Position in the upgrade chain (Frontier is 0).
    #[must_use]
    pub const fn ordinal(self) -> usize {
        self as usize
    }

    /// The version this one extends, `None` for Frontier.
    #[must_use]
    pub fn predecessor(self) -> Option<Self> {
        self.ordinal()
            .checked_sub(1)
            .map(|index| Self::ALL[index])
    }

    /// Lower-case name used in configuration.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Frontier => "frontier",
            Self::TangerineWhistle => "tangerine_whistle",
            Self::SpuriousDragon => "spurious_dragon",
            Self::Byzantium => "byzantium",
            Self::Constantinople => "constantinople",
            Self::Istanbul => "istanbul",
            Self::Berlin => "berlin",
            Self::London => "london",
            Self::Shanghai => "shanghai",
            Self::Cancun => "cancun",
        }
    }
}

impl fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ProtocolVersion {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|version| version.name() == normalized)
            .ok_or_else(|| ConfigError::UnknownProtocolVersion(s.to_string()))
    }
}

// =============================================================================
// VM CONFIGURATION
// =============================================================================

/// Virtual Machine configuration.
///
/// Execution limits and the active protocol version. Loadable from JSON or
/// from `QC_EVM_*` environment variables.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VmConfig {
    /// Protocol version whose fee schedule and opcode set apply.
    pub protocol_version: ProtocolVersion,
    /// Maximum memory size in bytes (default: 16MB).
    pub max_memory_size: usize,
    /// Maximum call depth (default: 1024).
    pub max_call_depth: usize,
}

impl Default for VmConfig {
    fn default() -> Self {
        Self {
            protocol_version: ProtocolVersion::Cancun,
            max_memory_size: 16 * 1024 * 1024, // 16 MB
            max_call_depth: 1024,
        }
    }
}

impl VmConfig {
    /// Environment key for the protocol version.
    pub const ENV_PROTOCOL_VERSION: &'static str = "QC_EVM_PROTOCOL_VERSION";
    /// Environment key for the memory ceiling.
    pub const ENV_MAX_MEMORY_SIZE: &'static str = "QC_EVM_MAX_MEMORY_SIZE";
    /// Environment key for the call depth limit.
    pub const ENV_MAX_CALL_DEPTH: &'static str = "QC_EVM_MAX_CALL_DEPTH";

    /// Loads the configuration from the process environment.
    ///
    /// Unset variables keep their default.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a variable is set to a malformed value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads the configuration through an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for an unknown protocol version or a
    /// non-numeric limit.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup(Self::ENV_PROTOCOL_VERSION) {
            config.protocol_version = raw.parse()?;
        }
        if let Some(raw) = lookup(Self::ENV_MAX_MEMORY_SIZE) {
            config.max_memory_size = parse_number(Self::ENV_MAX_MEMORY_SIZE, &raw)?;
        }
        if let Some(raw) = lookup(Self::ENV_MAX_CALL_DEPTH) {
            config.max_call_depth = parse_number(Self::ENV_MAX_CALL_DEPTH, &raw)?;
        }

        Ok(config)
    }

    /// Decodes a JSON document; missing fields keep their default.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Malformed`] when the document does not decode.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }
}

fn parse_number(key: &str, raw: &str) -> Result<usize, ConfigError> {
    raw.trim()
        .replace('_', "")
        .parse()
        .map_err(|_| ConfigError::InvalidValue {
            key: key.to_string(),
            value: raw.to_string(),
        })
}

// =============================================================================
// EXECUTION REQUEST
// =============================================================================

/// A top-level call handed to the execution core.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExecutionRequest {
    /// Account whose code runs and whose storage is addressed.
    pub address: Address,
    /// Account that initiated the call.
    pub caller: Address,
    /// Program bytes.
    pub code: Bytes,
    /// Initial gas budget.
    pub gas_limit: u64,
    /// Forbids storage writes when set.
    pub is_static: bool,
}

impl ExecutionRequest {
    /// Creates a non-static request.
    #[must_use]
    pub fn new(address: Address, caller: Address, code: impl Into<Bytes>, gas_limit: u64) -> Self {
        Self {
            address,
            caller,
            code: code.into(),
            gas_limit,
            is_static: false,
        }
    }
}

// =============================================================================
// EXECUTION OUTCOME
// =============================================================================

/// How a frame ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExecutionStatus {
    /// `STOP`, `RETURN` or end of code.
    Success,
    /// `REVERT`; unused gas is kept.
    Reverted,
    /// Exceptional halt; all gas is consumed.
    Halted(HaltReason),
}

impl ExecutionStatus {
    /// True for [`ExecutionStatus::Success`].
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    /// Returns the halt reason, if any.
    #[must_use]
    pub fn halt_reason(&self) -> Option<HaltReason> {
        match self {
            Self::Halted(reason) => Some(*reason),
            _ => None,
        }
    }

    /// Stable name for logs and metric labels.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Reverted => "reverted",
            Self::Halted(_) => "halted",
        }
    }
}

/// Result surface of one executed frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExecutionOutcome {
    /// How the frame ended.
    pub status: ExecutionStatus,
    /// Gas consumed, before refunds.
    pub gas_used: u64,
    /// Gas left over.
    pub gas_remaining: u64,
    /// Accumulated refund counter (may be negative inside a transaction).
    pub gas_refund: i64,
    /// Return or revert data.
    pub output: Bytes,
    /// Final operand stack, bottom first.
    pub stack: Vec<U256>,
}

impl ExecutionOutcome {
    /// True when the frame completed successfully.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Gas charged to the transaction after the refund cap of `schedule`.
    #[must_use]
    pub fn effective_gas_used(&self, schedule: &FeeSchedule) -> u64 {
        if !self.is_success() {
            return self.gas_used;
        }
        self.gas_used - schedule.capped_refund(self.gas_used, self.gas_refund)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_protocol_version_chain() {
        assert_eq!(ProtocolVersion::Frontier.predecessor(), None);
        assert_eq!(
            ProtocolVersion::Cancun.predecessor(),
            Some(ProtocolVersion::Shanghai)
        );
        assert!(ProtocolVersion::Berlin < ProtocolVersion::London);
        for (i, version) in ProtocolVersion::ALL.iter().enumerate() {
            assert_eq!(version.ordinal(), i);
        }
    }

    #[test]
    fn test_protocol_version_parse_and_display() {
        assert_eq!(
            "Cancun".parse::<ProtocolVersion>(),
            Ok(ProtocolVersion::Cancun)
        );
        assert_eq!(
            "tangerine-whistle".parse::<ProtocolVersion>(),
            Ok(ProtocolVersion::TangerineWhistle)
        );
        assert!(matches!(
            "prague".parse::<ProtocolVersion>(),
            Err(ConfigError::UnknownProtocolVersion(_))
        ));
        for version in ProtocolVersion::ALL {
            assert_eq!(version.to_string().parse::<ProtocolVersion>(), Ok(version));
        }
    }

    #[test]
    fn test_vm_config_defaults() {
        let config = VmConfig::default();
        assert_eq!(config.protocol_version, ProtocolVersion::Cancun);
        assert_eq!(config.max_memory_size, 16 * 1024 * 1024);
        assert_eq!(config.max_call_depth, 1024);
    }

    #[test]
    fn test_vm_config_from_lookup() {
        let env: HashMap<&str, &str> = [
            (VmConfig::ENV_PROTOCOL_VERSION, "berlin"),
            (VmConfig::ENV_MAX_CALL_DEPTH, "64"),
        ]
        .into_iter()
        .collect();

        let config = VmConfig::from_lookup(|key| env.get(key).map(|v| v.to_string())).unwrap();
        assert_eq!(config.protocol_version, ProtocolVersion::Berlin);
        assert_eq!(config.max_call_depth, 64);
        assert_eq!(config.max_memory_size, VmConfig::default().max_memory_size);
    }

    #[test]
    fn test_vm_config_rejects_bad_number() {
        let result = VmConfig::from_lookup(|key| {
            (key == VmConfig::ENV_MAX_MEMORY_SIZE).then(|| "lots".to_string())
        });
        assert_eq!(
            result,
            Err(ConfigError::InvalidValue {
                key: VmConfig::ENV_MAX_MEMORY_SIZE.to_string(),
                value: "lots".to_string(),
            })
        );
    }

    #[test]
    fn test_vm_config_from_json() {
        let config = VmConfig::from_json(r#"{"protocol_version":"shanghai"}"#).unwrap();
        assert_eq!(config.protocol_version, ProtocolVersion::Shanghai);
        assert_eq!(config.max_call_depth, 1024);

        assert!(VmConfig::from_json("{").is_err());
    }

    #[test]
    fn test_effective_gas_used_applies_cap() {
        let outcome = ExecutionOutcome {
            status: ExecutionStatus::Success,
            gas_used: 50_000,
            gas_remaining: 0,
            gas_refund: 30_000,
            output: Bytes::new(),
            stack: Vec::new(),
        };
        let london = FeeSchedule::for_version(ProtocolVersion::London);
        assert_eq!(outcome.effective_gas_used(&london), 40_000);

        let reverted = ExecutionOutcome {
            status: ExecutionStatus::Reverted,
            ..outcome
        };
        assert_eq!(reverted.effective_gas_used(&london), 50_000);
    }
}
