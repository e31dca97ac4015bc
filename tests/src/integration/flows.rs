//! # Integration Test Flows
//!
//! Exercises the execution core end to end through its public API.
//!
//! ## Flows Tested:
//!
//! 1. **Configuration → Interpreter**: a JSON or environment config selects the
//!    protocol version, memory ceiling and depth limit
//! 2. **Nested frames → Transient storage**: one transaction context shared by
//!    a call tree, rolled back per failing frame
//! 3. **Service → World state**: commit on success, discard on failure, no
//!    transient storage across transactions
//! 4. **Version sweep**: opcode availability and pricing follow the upgrade
//!    chain

#[cfg(test)]
mod tests {
    use qc_11_evm_core::prelude::*;
    use std::sync::Arc;

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    const CONTRACT: u64 = 0xC0DE;
    const CALLER: u64 = 0xCA11;

    fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }

    fn request(code: Vec<u8>, gas: u64) -> ExecutionRequest {
        ExecutionRequest::new(
            Address::from_low_u64(CONTRACT),
            Address::from_low_u64(CALLER),
            code,
            gas,
        )
    }

    /// `PUSH1 value, PUSH1 key, TSTORE`
    fn tstore(key: u8, value: u8) -> Vec<u8> {
        vec![0x60, value, 0x60, key, 0x5D]
    }

    /// `PUSH1 key, TLOAD`
    fn tload(key: u8) -> Vec<u8> {
        vec![0x60, key, 0x5C]
    }

    fn execute(config: VmConfig, code: Vec<u8>, gas: u64) -> ExecutionOutcome {
        let interpreter = Interpreter::new(config);
        let mut world = InMemoryWorldState::new();
        let mut tx = TransactionContext::new();
        interpreter.execute(&request(code, gas), &mut world, &mut tx)
    }

    // =============================================================================
    // CONFIGURATION
    // =============================================================================

    #[test]
    fn test_json_config_selects_version() {
        init_tracing();
        let config = VmConfig::from_json(r#"{ "protocol_version": "london" }"#).unwrap();
        assert_eq!(config.protocol_version, ProtocolVersion::London);
        assert_eq!(config.max_call_depth, VmConfig::default().max_call_depth);

        // PUSH0 does not exist before Shanghai
        let outcome = execute(config, vec![0x5F], 100);
        assert_eq!(
            outcome.status,
            ExecutionStatus::Halted(HaltReason::InvalidOperation(0x5F))
        );
    }

    #[test]
    fn test_lookup_config_memory_ceiling() {
        let config = VmConfig::from_lookup(|key| match key {
            VmConfig::ENV_MAX_MEMORY_SIZE => Some("64".to_string()),
            VmConfig::ENV_PROTOCOL_VERSION => Some("Cancun".to_string()),
            _ => None,
        })
        .unwrap();

        // PUSH1 1, PUSH1 64, MSTORE
        let outcome = execute(config, vec![0x60, 0x01, 0x60, 0x40, 0x52], 10_000);
        assert_eq!(
            outcome.status,
            ExecutionStatus::Halted(HaltReason::MemoryLimitExceeded {
                requested: 96,
                max: 64
            })
        );
        assert_eq!(outcome.gas_remaining, 0);
    }

    #[test]
    fn test_bad_config_is_rejected() {
        let err = VmConfig::from_lookup(|key| {
            (key == VmConfig::ENV_PROTOCOL_VERSION).then(|| "prague".to_string())
        })
        .unwrap_err();
        assert_eq!(err, ConfigError::UnknownProtocolVersion("prague".to_string()));
    }

    // =============================================================================
    // TRANSIENT STORAGE SCENARIOS
    // =============================================================================

    #[test]
    fn test_transient_store_then_load_scenario() {
        init_tracing();
        let code = [tstore(1, 1), tload(1)].concat();
        let outcome = execute(VmConfig::default(), code, 10_000);

        assert!(outcome.is_success());
        assert_eq!(outcome.stack, vec![U256::one()]);
        assert_eq!(outcome.gas_used, 3 + 3 + 100 + 3 + 100);
        assert_eq!(outcome.gas_refund, 0);
    }

    #[test]
    fn test_transient_keys_do_not_leak() {
        let code = [tstore(1, 1), tstore(1, 2), tload(1), tload(2)].concat();
        let outcome = execute(VmConfig::default(), code, 10_000);
        assert_eq!(outcome.stack, vec![U256::from(2), U256::zero()]);
    }

    #[test]
    fn test_transient_cost_inherits_warm_read() {
        let cancun = FeeSchedule::for_version(ProtocolVersion::Cancun);
        assert_eq!(
            cancun.transient_access_cost(),
            cancun.sload_cost(AccessStatus::Warm)
        );
        assert_eq!(cancun.cost(FeeParam::TransientAccess), 100);
    }

    #[test]
    fn test_transient_store_out_of_gas() {
        // Two pushes leave exactly 99 gas for TSTORE
        let outcome = execute(VmConfig::default(), tstore(1, 1), 105);
        assert_eq!(
            outcome.status,
            ExecutionStatus::Halted(HaltReason::InsufficientGas)
        );
        assert_eq!(outcome.gas_used, 105);
    }

    // =============================================================================
    // NESTED FRAMES
    // =============================================================================

    #[test]
    fn test_call_tree_shares_transient_storage() {
        let interpreter = Interpreter::default();
        let mut world = InMemoryWorldState::new();
        let mut tx = TransactionContext::new();
        let parent_request = request(vec![], 100_000);
        let mut parent = interpreter.frame(&parent_request, &mut world, &mut tx);

        let writer = request(tstore(5, 0xAA), 10_000);
        assert!(interpreter.execute_child(&mut parent, &writer).is_success());

        let reader = request(tload(5), 10_000);
        let outcome = interpreter.execute_child(&mut parent, &reader);
        assert_eq!(outcome.stack, vec![U256::from(0xAA)]);
    }

    #[test]
    fn test_grandchild_revert_keeps_parent_writes() {
        let interpreter = Interpreter::default();
        let mut world = InMemoryWorldState::new();
        let mut tx = TransactionContext::new();
        let root_request = request(vec![], 100_000);
        let mut root = interpreter.frame(&root_request, &mut world, &mut tx);

        let child_request = request(tstore(1, 1), 50_000);
        let grandchild_request = request([tstore(1, 2), vec![0x5F, 0x5F, 0xFD]].concat(), 10_000);

        let mut child = root.child(&child_request);
        let outcome = interpreter.run(&mut child);
        assert!(outcome.is_success());
        let outcome = interpreter.execute_child(&mut child, &grandchild_request);
        assert_eq!(outcome.status, ExecutionStatus::Reverted);
        assert_eq!(child.transient_get(StorageKey::from(1u64)), StorageValue::from(1u64));
        drop(child);

        assert_eq!(root.transient_get(StorageKey::from(1u64)), StorageValue::from(1u64));
    }

    #[test]
    fn test_static_child_cannot_write() {
        let interpreter = Interpreter::default();
        let mut world = InMemoryWorldState::new();
        let mut tx = TransactionContext::new();
        let parent_request = request(vec![], 100_000);
        let mut parent = interpreter.frame(&parent_request, &mut world, &mut tx);

        let mut child_request = request(tstore(1, 1), 10_000);
        child_request.is_static = true;
        let outcome = interpreter.execute_child(&mut parent, &child_request);

        assert_eq!(
            outcome.status,
            ExecutionStatus::Halted(HaltReason::IllegalStateChange)
        );
        assert!(parent.transient_get(StorageKey::from(1u64)).is_zero());
        assert_eq!(parent.gas_remaining(), 100_000 - 10_000);
    }

    // =============================================================================
    // SERVICE FLOWS
    // =============================================================================

    #[tokio::test]
    async fn test_service_persists_only_successful_transactions() {
        init_tracing();
        let service = create_test_service();
        let contract = Address::from_low_u64(CONTRACT);

        // PUSH1 0x11, PUSH1 1, SSTORE
        let store = vec![0x60, 0x11, 0x60, 0x01, 0x55];
        assert!(service.execute_transaction(request(store.clone(), 100_000)).await.is_success());

        // Same write to slot 2, then INVALID
        let failing = vec![0x60, 0x22, 0x60, 0x02, 0x55, 0xFE];
        let outcome = service.execute_transaction(request(failing, 100_000)).await;
        assert!(outcome.status.halt_reason().is_some());

        assert_eq!(
            service.storage(contract, StorageKey::from(1u64)).await,
            StorageValue::from(0x11u64)
        );
        assert!(service.storage(contract, StorageKey::from(2u64)).await.is_zero());
    }

    #[tokio::test]
    async fn test_transient_storage_is_transaction_scoped() {
        let service = create_test_service();
        service.execute_transaction(request(tstore(9, 9), 10_000)).await;
        let outcome = service.execute_transaction(request(tload(9), 10_000)).await;
        assert_eq!(outcome.stack, vec![U256::zero()]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_transactions_are_serialized() {
        let service = Arc::new(create_test_service());
        let contract = Address::from_low_u64(CONTRACT);

        let handles: Vec<_> = (1u8..=16)
            .map(|key| {
                let service = Arc::clone(&service);
                tokio::spawn(async move {
                    // PUSH1 key, PUSH1 key, SSTORE
                    let code = vec![0x60, key, 0x60, key, 0x55];
                    service.execute_transaction(request(code, 100_000)).await
                })
            })
            .collect();

        for handle in handles {
            assert!(handle.await.unwrap().is_success());
        }

        for key in 1u64..=16 {
            assert_eq!(
                service.storage(contract, StorageKey::from(key)).await,
                StorageValue::from(key)
            );
        }
        assert_eq!(service.stats().await.transactions_executed, 16);
    }

    // =============================================================================
    // VERSION SWEEP
    // =============================================================================

    #[test]
    fn test_transient_opcodes_across_versions() {
        for version in ProtocolVersion::ALL {
            let config = VmConfig {
                protocol_version: version,
                ..VmConfig::default()
            };
            let outcome = execute(config, tstore(1, 1), 10_000);
            if version >= ProtocolVersion::Cancun {
                assert!(outcome.is_success(), "{version}");
            } else {
                assert_eq!(
                    outcome.status,
                    ExecutionStatus::Halted(HaltReason::InvalidOperation(0x5D)),
                    "{version}"
                );
            }
        }
    }

    #[test]
    fn test_xor_price_is_stable_across_versions() {
        for version in ProtocolVersion::ALL {
            let registry = InstructionRegistry::for_version(version);
            let xor = registry.get(0x18).unwrap();
            assert_eq!(xor.stack_inputs, 2);
            assert_eq!(xor.stack_outputs, 1);
            assert_eq!(registry.schedule().cost(FeeParam::VeryLow), 3, "{version}");
        }
    }
}
