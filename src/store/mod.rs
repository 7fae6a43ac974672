//! Durable synchronization state store.
//!
//! The store owns the `TaskSyncState`/`ProjectSyncState` collections that
//! bind source identities to destination pages. Keys are namespaced by
//! entity kind under a configurable prefix; every mutation runs through an
//! atomic per-key read-modify-write. The module follows hexagonal
//! architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]

pub mod adapters;
pub mod domain;
pub mod ports;

#[cfg(test)]
mod tests;
