//! # Execution Service
//!
//! Transaction-level facade over the interpreter.
//!
//! Each call to [`ExecutionService::execute_transaction`] runs one top-level
//! frame against the shared world state:
//!
//! 1. A fresh [`TransactionContext`] is created and the caller and executing
//!    account are pre-warmed.
//! 2. The frame runs to completion on the calling task; the interpreter loop
//!    never yields.
//! 3. Storage writes are committed on success and discarded otherwise.
//! 4. Transient storage and the access list are dropped with no refund.

use crate::adapters::state_adapter::InMemoryWorldState;
use crate::domain::entities::{ExecutionOutcome, ExecutionRequest, VmConfig};
use crate::domain::value_objects::{Address, StorageKey, StorageValue};
use crate::errors::ConfigError;
use crate::evm::frame::TransactionContext;
use crate::evm::Interpreter;
use crate::metrics;
use crate::ports::outbound::WorldState;

use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// Execution service configuration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ServiceConfig {
    /// VM configuration.
    pub vm_config: VmConfig,
}

impl ServiceConfig {
    /// Loads the VM configuration from `QC_EVM_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a variable is set to a malformed value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            vm_config: VmConfig::from_env()?,
        })
    }
}

/// Statistics for the execution service.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ServiceStats {
    /// Total transactions executed.
    pub transactions_executed: u64,
    /// Transactions that stopped or returned.
    pub successful_executions: u64,
    /// Transactions that ended in `REVERT`.
    pub reverted_executions: u64,
    /// Transactions that ended in an exceptional halt.
    pub halted_executions: u64,
    /// Total gas consumed, after refunds.
    pub total_gas_used: u64,
    /// Average execution time in microseconds.
    pub avg_execution_time_us: u64,
}

/// Runs transactions against a shared world state.
pub struct ExecutionService<W: WorldState> {
    /// Interpreter bound to the configured protocol version.
    interpreter: Interpreter,
    /// World state; transactions are serialized on this lock.
    world: Arc<RwLock<W>>,
    /// Service statistics.
    stats: Arc<RwLock<ServiceStats>>,
}

impl<W: WorldState> ExecutionService<W> {
    /// Create a new execution service.
    pub fn new(world: W, config: ServiceConfig) -> Self {
        info!(
            protocol_version = %config.vm_config.protocol_version,
            max_call_depth = config.vm_config.max_call_depth,
            "Execution service created"
        );
        Self {
            interpreter: Interpreter::new(config.vm_config),
            world: Arc::new(RwLock::new(world)),
            stats: Arc::new(RwLock::new(ServiceStats::default())),
        }
    }

    /// Interpreter in use.
    pub fn interpreter(&self) -> &Interpreter {
        &self.interpreter
    }

    /// Get current service statistics.
    pub async fn stats(&self) -> ServiceStats {
        self.stats.read().await.clone()
    }

    /// Reads a persistent slot from the shared world state.
    pub async fn storage(&self, address: Address, key: StorageKey) -> StorageValue {
        self.world.read().await.storage(address, key)
    }

    /// Executes one transaction as a top-level frame.
    ///
    /// Halts are reported in the outcome; they are never turned into errors.
    #[instrument(
        skip(self, request),
        fields(execution_id = %Uuid::new_v4(), address = %request.address)
    )]
    pub async fn execute_transaction(&self, request: ExecutionRequest) -> ExecutionOutcome {
        let start = Instant::now();

        let outcome = {
            let mut world = self.world.write().await;
            let mut tx = TransactionContext::new();
            tx.access_list.touch_account(request.caller);
            tx.access_list.touch_account(request.address);

            let outcome = self.interpreter.execute(&request, &mut *world, &mut tx);
            if outcome.is_success() {
                world.commit();
            } else {
                world.discard();
            }
            debug!(
                transient_slots = tx.transient.slot_count(),
                "Dropping transaction context"
            );
            tx.finish();
            outcome
        };

        let elapsed = start.elapsed();
        let gas_used = outcome.effective_gas_used(self.interpreter.schedule());
        metrics::record_transaction(outcome.status.label(), gas_used, elapsed.as_secs_f64());
        self.record(&outcome, gas_used, elapsed.as_micros()).await;

        match outcome.status.halt_reason() {
            None => info!(
                status = outcome.status.label(),
                gas_used,
                refund = outcome.gas_refund,
                "Transaction executed"
            ),
            Some(reason) => warn!(
                %reason,
                gas_used,
                "Transaction halted"
            ),
        }
        outcome
    }

    async fn record(&self, outcome: &ExecutionOutcome, gas_used: u64, elapsed_us: u128) {
        let mut stats = self.stats.write().await;
        stats.transactions_executed += 1;
        if outcome.is_success() {
            stats.successful_executions += 1;
        } else if outcome.status.halt_reason().is_some() {
            stats.halted_executions += 1;
        } else {
            stats.reverted_executions += 1;
        }
        stats.total_gas_used += gas_used;

        let elapsed_us = u64::try_from(elapsed_us).unwrap_or(u64::MAX);
        let total = stats.transactions_executed;
        stats.avg_execution_time_us =
            (stats.avg_execution_time_us * (total - 1)).saturating_add(elapsed_us) / total;
    }
}

/// Creates a service over an empty in-memory world state (for testing).
#[must_use]
pub fn create_test_service() -> ExecutionService<InMemoryWorldState> {
    ExecutionService::new(InMemoryWorldState::new(), ServiceConfig::default())
}

// =============================================================================
// TESTS
// =============================================================================
