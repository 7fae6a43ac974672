//! Adapter implementations of the source ports.

pub mod memory;
