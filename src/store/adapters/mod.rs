//! Adapter implementations of the state store port.

pub mod memory;
pub mod postgres;
