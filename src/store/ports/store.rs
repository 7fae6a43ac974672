//! State persistence contract.

use crate::source::domain::{ItemId, ProjectId};
use crate::store::domain::{ProjectSyncState, SyncStatus, TaskSyncState};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for state store operations.
pub type StateStoreResult<T> = Result<T, StateStoreError>;

/// Mutation applied to a task row inside the store's per-key transaction.
pub type TaskMutator = Box<dyn FnOnce(&mut TaskSyncState) + Send>;

/// Mutation applied to a project row inside the store's per-key
/// transaction.
pub type ProjectMutator = Box<dyn FnOnce(&mut ProjectSyncState) + Send>;

/// Durable key-value persistence for sync state.
///
/// Keys are namespaced by entity kind so the task and project collections
/// never interfere. `upsert_*` creates the initial row when absent, applies
/// the mutator atomically, and persists the result; a failed mutation
/// leaves the previous state unchanged. Reads of a key observe that key's
/// latest committed write.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Reads a task row.
    ///
    /// # Errors
    ///
    /// Returns [`StateStoreError`] on persistence failure.
    async fn get_task(&self, id: &ItemId) -> StateStoreResult<Option<TaskSyncState>>;

    /// Creates-or-mutates a task row atomically and returns the committed
    /// state.
    ///
    /// # Errors
    ///
    /// Returns [`StateStoreError`] on persistence failure; the row is then
    /// unchanged.
    async fn upsert_task(&self, id: &ItemId, mutate: TaskMutator)
    -> StateStoreResult<TaskSyncState>;

    /// Lists task rows, optionally filtered by status (reconciler scans).
    ///
    /// # Errors
    ///
    /// Returns [`StateStoreError`] on persistence failure.
    async fn list_tasks(&self, status: Option<SyncStatus>) -> StateStoreResult<Vec<TaskSyncState>>;

    /// Reads a project row.
    ///
    /// # Errors
    ///
    /// Returns [`StateStoreError`] on persistence failure.
    async fn get_project(&self, id: &ProjectId) -> StateStoreResult<Option<ProjectSyncState>>;

    /// Creates-or-mutates a project row atomically and returns the
    /// committed state. The initial row is supplied by `seed` when the key
    /// is absent.
    ///
    /// # Errors
    ///
    /// Returns [`StateStoreError`] on persistence failure; the row is then
    /// unchanged.
    async fn upsert_project(
        &self,
        id: &ProjectId,
        seed: ProjectSyncState,
        mutate: ProjectMutator,
    ) -> StateStoreResult<ProjectSyncState>;

    /// Lists every project row (reconciler scans).
    ///
    /// # Errors
    ///
    /// Returns [`StateStoreError`] on persistence failure.
    async fn list_projects(&self) -> StateStoreResult<Vec<ProjectSyncState>>;
}

/// Errors returned by state store implementations.
#[derive(Debug, Clone, Error)]
pub enum StateStoreError {
    /// Transient persistence failure; the engine retries with backoff.
    #[error("transient state store failure: {0}")]
    Transient(String),

    /// Persistence-layer failure.
    #[error("state store failure: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl StateStoreError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
