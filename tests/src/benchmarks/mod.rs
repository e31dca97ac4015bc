//! # Quantum-Chain Benchmarks
//!
//! Performance benchmarks for the execution core.

pub mod qc_11_evm;
