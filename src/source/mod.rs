//! Source-service boundary (Todoist-modeled task service).
//!
//! The engine only ever sees typed snapshots of source entities; wire
//! protocols, pagination tokens, and auth live behind the port. The module
//! follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]

pub mod adapters;
pub mod domain;
pub mod ports;
