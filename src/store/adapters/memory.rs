//! In-memory state store for tests and single-process runs.

use async_trait::async_trait;
use std::collections::HashMap;
use std::io;
use std::sync::{Arc, RwLock};

use crate::source::domain::{ItemId, ProjectId};
use crate::store::domain::{ProjectSyncState, SyncStatus, TaskSyncState};
use crate::store::ports::{
    ProjectMutator, StateStore, StateStoreError, StateStoreResult, TaskMutator,
};

/// Thread-safe in-memory implementation of [`StateStore`].
///
/// Upserts run under the write lock, giving the same per-key atomicity the
/// durable adapters provide.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStateStore {
    state: Arc<RwLock<InMemoryStoreState>>,
}

#[derive(Debug, Default)]
struct InMemoryStoreState {
    tasks: HashMap<ItemId, TaskSyncState>,
    projects: HashMap<ProjectId, ProjectSyncState>,
}

impl InMemoryStateStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned(err: impl ToString) -> StateStoreError {
    StateStoreError::persistence(io::Error::other(err.to_string()))
}

#[async_trait]
impl StateStore for InMemoryStateStore {
    async fn get_task(&self, id: &ItemId) -> StateStoreResult<Option<TaskSyncState>> {
        let state = self.state.read().map_err(poisoned)?;
        Ok(state.tasks.get(id).cloned())
    }

    async fn upsert_task(
        &self,
        id: &ItemId,
        mutate: TaskMutator,
    ) -> StateStoreResult<TaskSyncState> {
        let mut state = self.state.write().map_err(poisoned)?;
        let row = state
            .tasks
            .entry(id.clone())
            .or_insert_with(|| TaskSyncState::new(id.clone()));
        mutate(row);
        Ok(row.clone())
    }

    async fn list_tasks(&self, status: Option<SyncStatus>) -> StateStoreResult<Vec<TaskSyncState>> {
        let state = self.state.read().map_err(poisoned)?;
        let mut rows: Vec<TaskSyncState> = state
            .tasks
            .values()
            .filter(|row| status.is_none_or(|wanted| row.sync_status == wanted))
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.external_id.cmp(&b.external_id));
        Ok(rows)
    }

    async fn get_project(&self, id: &ProjectId) -> StateStoreResult<Option<ProjectSyncState>> {
        let state = self.state.read().map_err(poisoned)?;
        Ok(state.projects.get(id).cloned())
    }

    async fn upsert_project(
        &self,
        id: &ProjectId,
        seed: ProjectSyncState,
        mutate: ProjectMutator,
    ) -> StateStoreResult<ProjectSyncState> {
        let mut state = self.state.write().map_err(poisoned)?;
        let row = state.projects.entry(id.clone()).or_insert(seed);
        mutate(row);
        Ok(row.clone())
    }

    async fn list_projects(&self) -> StateStoreResult<Vec<ProjectSyncState>> {
        let state = self.state.read().map_err(poisoned)?;
        let mut rows: Vec<ProjectSyncState> = state.projects.values().cloned().collect();
        rows.sort_by(|a, b| a.source_project_id.cmp(&b.source_project_id));
        Ok(rows)
    }
}
