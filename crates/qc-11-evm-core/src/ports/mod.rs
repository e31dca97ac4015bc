//! # Ports Layer (Middle Hexagon)
//!
//! Interfaces between the execution core and its collaborators.
//!
//! - **Driven Ports (Outbound)**: `WorldState`
//! - No concrete implementations in this module

pub mod outbound;

pub use outbound::*;
