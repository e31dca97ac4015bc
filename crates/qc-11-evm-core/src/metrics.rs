//! # Execution Metrics
//!
//! Prometheus metrics for the interpreter and the execution service.
//!
//! ## Usage
//!
//! Enable with the `metrics` feature:
//! ```toml
//! qc-11-evm-core = { path = "...", features = ["metrics"] }
//! ```
//!
//! ## Metrics Exported
//!
//! - `evm_instructions_executed_total` - Counter of applied instructions
//! - `evm_halts_total` - Counter of exceptional halts (by reason)
//! - `evm_gas_consumed_total` - Counter of gas consumed by top-level transactions
//! - `evm_transactions_total` - Counter of executed transactions (by status)
//! - `evm_execution_latency_seconds` - Histogram of transaction execution times

#[cfg(feature = "metrics")]
use lazy_static::lazy_static;

#[cfg(feature = "metrics")]
use prometheus::{
    register_counter_vec, register_histogram, register_int_counter, CounterVec, Histogram,
    IntCounter,
};

#[cfg(feature = "metrics")]
lazy_static! {
    /// Total instructions applied
    pub static ref INSTRUCTIONS_EXECUTED: IntCounter = register_int_counter!(
        "evm_instructions_executed_total",
        "Total number of instructions applied"
    )
    .expect("Failed to create INSTRUCTIONS_EXECUTED metric");

    /// Exceptional halts, labeled by reason
    pub static ref HALTS: CounterVec = register_counter_vec!(
        "evm_halts_total",
        "Total number of exceptional halts",
        &["reason"]
    )
    .expect("Failed to create HALTS metric");

    /// Gas consumed by top-level transactions
    pub static ref GAS_CONSUMED: IntCounter = register_int_counter!(
        "evm_gas_consumed_total",
        "Total gas consumed by executed transactions"
    )
    .expect("Failed to create GAS_CONSUMED metric");

    /// Executed transactions, labeled by final status
    pub static ref TRANSACTIONS: CounterVec = register_counter_vec!(
        "evm_transactions_total",
        "Total number of executed transactions",
        &["status"]
    )
    .expect("Failed to create TRANSACTIONS metric");

    /// Histogram of transaction execution latency
    pub static ref EXECUTION_LATENCY: Histogram = register_histogram!(
        "evm_execution_latency_seconds",
        "Time taken to execute a transaction in seconds",
        vec![0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0]
    )
    .expect("Failed to create EXECUTION_LATENCY metric");
}

/// Record one applied instruction
#[cfg(feature = "metrics")]
pub fn record_instruction() {
    INSTRUCTIONS_EXECUTED.inc();
}

/// Record an exceptional halt with reason label
#[cfg(feature = "metrics")]
pub fn record_halt(reason: &str) {
    HALTS.with_label_values(&[reason]).inc();
}

/// Record a finished transaction
#[cfg(feature = "metrics")]
pub fn record_transaction(status: &str, gas_used: u64, seconds: f64) {
    TRANSACTIONS.with_label_values(&[status]).inc();
    GAS_CONSUMED.inc_by(gas_used);
    EXECUTION_LATENCY.observe(seconds);
}

// No-op implementations when metrics feature is disabled
/// Record one applied instruction
#[cfg(not(feature = "metrics"))]
pub fn record_instruction() {}

/// Record an exceptional halt with reason label
#[cfg(not(feature = "metrics"))]
pub fn record_halt(_reason: &str) {}

/// Record a finished transaction
#[cfg(not(feature = "metrics"))]
pub fn record_transaction(_status: &str, _gas_used: u64, _seconds: f64) {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_callable() {
        record_instruction();
        record_halt("insufficient_gas");
        record_transaction("success", 21_000, 0.001);
    }
}
