//! # Quantum-Chain EVM Test Suite
//!
//! Unified test crate for the execution core.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── benchmarks/       # Interpreter throughput
//! │   └── qc_11_evm.rs
//! │
//! └── integration/      # Cross-module flows
//!     └── flows.rs
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p qc-tests
//!
//! # By category
//! cargo test -p qc-tests integration::
//!
//! # Benchmarks
//! cargo bench -p qc-tests
//! ```

#![allow(unused_variables)]
#![allow(unused_imports)]
#![allow(dead_code)]

pub mod benchmarks;
pub mod integration;
