//! # EVM Core Benchmarks
//!
//! | Area | Measured |
//! |------|----------|
//! | Dispatch | fetch-validate-apply loop over fixed-cost instructions |
//! | Transient storage | `TSTORE`/`TLOAD` round trips |
//! | Registry | per-version registry construction |

use criterion::{criterion_group, criterion_main, Criterion};

fn bench_evm_core(c: &mut Criterion) {
    qc_tests::benchmarks::qc_11_evm::register_benchmarks(c);
}

criterion_group!(benches, bench_evm_core);

criterion_main!(benches);
