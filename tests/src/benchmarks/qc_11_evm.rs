//! # QC-11 EVM Core Benchmarks
//!
//! Dispatch throughput of the interpreter loop.
//!
//! Conditions:
//! - Straight-line programs of thousands of instructions
//! - Random 256-bit operands
//! - Transient storage churn on many distinct keys

use criterion::{black_box, BenchmarkId, Criterion, Throughput};
use qc_11_evm_core::prelude::*;
use rand::Rng;
use std::time::Duration;

const GAS: u64 = 30_000_000;

/// `PUSH32 a, PUSH32 b, XOR, POP` repeated `count` times.
fn xor_program(count: usize) -> Vec<u8> {
    let mut rng = rand::thread_rng();
    let mut code = Vec::with_capacity(count * 68);
    for _ in 0..count {
        for _ in 0..2 {
            code.push(0x7F);
            let mut word = [0u8; 32];
            rng.fill(&mut word);
            code.extend_from_slice(&word);
        }
        code.extend_from_slice(&[0x18, 0x50]);
    }
    code
}

/// `PUSH2 v, PUSH2 k, TSTORE, PUSH2 k, TLOAD, POP` for `count` keys.
fn transient_program(count: u16) -> Vec<u8> {
    let mut code = Vec::new();
    for key in 0..count {
        let [hi, lo] = key.to_be_bytes();
        code.extend_from_slice(&[0x61, hi, lo, 0x61, hi, lo, 0x5D]);
        code.extend_from_slice(&[0x61, hi, lo, 0x5C, 0x50]);
    }
    code
}

fn run(interpreter: &Interpreter, request: &ExecutionRequest) -> ExecutionOutcome {
    let mut world = InMemoryWorldState::new();
    let mut tx = TransactionContext::new();
    interpreter.execute(request, &mut world, &mut tx)
}

fn request(code: Vec<u8>) -> ExecutionRequest {
    ExecutionRequest::new(
        Address::from_low_u64(0xC0DE),
        Address::from_low_u64(0xCA11),
        code,
        GAS,
    )
}

pub fn dispatch_throughput(c: &mut Criterion) {
    let mut group = c.benchmark_group("qc-11/dispatch");
    group.measurement_time(Duration::from_secs(10));
    let interpreter = Interpreter::default();

    for count in [100, 1_000, 10_000] {
        let request = request(xor_program(count));
        group.throughput(Throughput::Elements(count as u64 * 4));
        group.bench_with_input(BenchmarkId::new("xor_loop", count), &request, |b, req| {
            b.iter(|| black_box(run(&interpreter, req)))
        });
    }

    group.finish();
}

pub fn transient_storage(c: &mut Criterion) {
    let mut group = c.benchmark_group("qc-11/transient");
    let interpreter = Interpreter::default();

    for count in [100u16, 1_000] {
        let request = request(transient_program(count));
        group.throughput(Throughput::Elements(u64::from(count)));
        group.bench_with_input(
            BenchmarkId::new("tstore_tload", count),
            &request,
            |b, req| b.iter(|| black_box(run(&interpreter, req))),
        );
    }

    group.finish();
}

pub fn registry_construction(c: &mut Criterion) {
    let mut group = c.benchmark_group("qc-11/registry");

    for version in [ProtocolVersion::Frontier, ProtocolVersion::Cancun] {
        group.bench_with_input(
            BenchmarkId::new("build", version),
            &version,
            |b, &version| b.iter(|| black_box(InstructionRegistry::build(version))),
        );
    }

    group.finish();
}

pub fn register_benchmarks(c: &mut Criterion) {
    dispatch_throughput(c);
    transient_storage(c);
    registry_construction(c);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_benchmark_programs_succeed() {
        let interpreter = Interpreter::default();

        let outcome = run(&interpreter, &request(xor_program(10)));
        assert!(outcome.is_success());
        assert!(outcome.stack.is_empty());
        assert_eq!(outcome.gas_used, 10 * (3 + 3 + 3 + 2));

        let outcome = run(&interpreter, &request(transient_program(10)));
        assert!(outcome.is_success());
        assert_eq!(outcome.gas_used, 10 * (3 + 3 + 100 + 3 + 100 + 2));
    }
}
