//! # Adapters Layer (Outer Hexagon)
//!
//! Implementations of the outbound ports.

pub mod state_adapter;

pub use state_adapter::*;
