//! # Domain Layer (Inner Hexagon)
//!
//! Pure execution concepts: value objects, configuration and the
//! request/outcome types. No I/O, no async.

pub mod entities;
pub mod value_objects;

pub use entities::*;
pub use value_objects::*;
