//! Port contracts for the synchronization state store.

pub mod store;

pub use store::{ProjectMutator, StateStore, StateStoreError, StateStoreResult, TaskMutator};
