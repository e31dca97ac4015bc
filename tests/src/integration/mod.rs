//! # Integration Tests
//!
//! Flows that cross module boundaries of the execution core: configuration,
//! interpreter, nested frames, world state and the service facade.

pub mod flows;
