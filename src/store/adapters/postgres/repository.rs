//! `PostgreSQL` implementation of the state store port.

use super::{
    models::{ProjectSyncStateRow, TaskSyncStateRow},
    schema::{project_sync_states, task_sync_states},
};
use crate::source::domain::{ItemId, ProjectId};
use crate::store::domain::{ProjectSyncState, SyncStatus, TaskSyncState};
use crate::store::ports::{
    ProjectMutator, StateStore, StateStoreError, StateStoreResult, TaskMutator,
};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::Error as DieselError;

/// `PostgreSQL` connection pool type used by the state store adapter.
pub type StatePgPool = Pool<ConnectionManager<PgConnection>>;

/// `PostgreSQL`-backed state store.
///
/// Per-key atomicity comes from row-level `FOR UPDATE` locks inside a
/// transaction; the mutator runs between the locked read and the upsert.
#[derive(Debug, Clone)]
pub struct PostgresStateStore {
    pool: StatePgPool,
    namespace: String,
}

impl From<DieselError> for StateStoreError {
    fn from(err: DieselError) -> Self {
        match err {
            DieselError::DatabaseError(
                diesel::result::DatabaseErrorKind::ClosedConnection
                | diesel::result::DatabaseErrorKind::SerializationFailure,
                _,
            ) => Self::Transient(err.to_string()),
            other => Self::persistence(other),
        }
    }
}

impl PostgresStateStore {
    /// Creates a store over a connection pool under the given namespace
    /// prefix.
    #[must_use]
    pub fn new(pool: StatePgPool, namespace: impl Into<String>) -> Self {
        Self {
            pool,
            namespace: namespace.into(),
        }
    }

    fn task_key(&self, id: &ItemId) -> String {
        format!("{}/tasks/{id}", self.namespace)
    }

    fn project_key(&self, id: &ProjectId) -> String {
        format!("{}/projects/{id}", self.namespace)
    }

    fn task_prefix(&self) -> String {
        format!("{}/tasks/%", self.namespace)
    }

    fn project_prefix(&self) -> String {
        format!("{}/projects/%", self.namespace)
    }

    async fn run_blocking<F, T>(&self, f: F) -> StateStoreResult<T>
    where
        F: FnOnce(&mut PgConnection) -> StateStoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(StateStoreError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(StateStoreError::persistence)?
    }
}

#[async_trait]
impl StateStore for PostgresStateStore {
    async fn get_task(&self, id: &ItemId) -> StateStoreResult<Option<TaskSyncState>> {
        let key = self.task_key(id);
        self.run_blocking(move |connection| {
            let row = task_sync_states::table
                .filter(task_sync_states::key.eq(&key))
                .select(TaskSyncStateRow::as_select())
                .first::<TaskSyncStateRow>(connection)
                .optional()?;
            row.map(TaskSyncStateRow::into_state).transpose()
        })
        .await
    }

    async fn upsert_task(
        &self,
        id: &ItemId,
        mutate: TaskMutator,
    ) -> StateStoreResult<TaskSyncState> {
        let key = self.task_key(id);
        let item_id = id.clone();
        self.run_blocking(move |connection| {
            connection.transaction::<TaskSyncState, StateStoreError, _>(|conn| {
                let existing = task_sync_states::table
                    .filter(task_sync_states::key.eq(&key))
                    .for_update()
                    .select(TaskSyncStateRow::as_select())
                    .first::<TaskSyncStateRow>(conn)
                    .optional()?;

                let mut state = match existing {
                    Some(row) => row.into_state()?,
                    None => TaskSyncState::new(item_id),
                };
                mutate(&mut state);

                let row = TaskSyncStateRow::from_state(key.clone(), &state);
                diesel::insert_into(task_sync_states::table)
                    .values(&row)
                    .on_conflict(task_sync_states::key)
                    .do_update()
                    .set(&row)
                    .execute(conn)?;

                Ok(state)
            })
        })
        .await
    }

    async fn list_tasks(&self, status: Option<SyncStatus>) -> StateStoreResult<Vec<TaskSyncState>> {
        let prefix = self.task_prefix();
        self.run_blocking(move |connection| {
            let mut query = task_sync_states::table
                .filter(task_sync_states::key.like(&prefix))
                .into_boxed();
            if let Some(wanted) = status {
                query = query.filter(task_sync_states::sync_status.eq(wanted.as_str()));
            }
            let rows = query
                .order(task_sync_states::key.asc())
                .select(TaskSyncStateRow::as_select())
                .load::<TaskSyncStateRow>(connection)?;
            rows.into_iter().map(TaskSyncStateRow::into_state).collect()
        })
        .await
    }

    async fn get_project(&self, id: &ProjectId) -> StateStoreResult<Option<ProjectSyncState>> {
        let key = self.project_key(id);
        self.run_blocking(move |connection| {
            let row = project_sync_states::table
                .filter(project_sync_states::key.eq(&key))
                .select(ProjectSyncStateRow::as_select())
                .first::<ProjectSyncStateRow>(connection)
                .optional()?;
            row.map(ProjectSyncStateRow::into_state).transpose()
        })
        .await
    }

    async fn upsert_project(
        &self,
        id: &ProjectId,
        seed: ProjectSyncState,
        mutate: ProjectMutator,
    ) -> StateStoreResult<ProjectSyncState> {
        let key = self.project_key(id);
        self.run_blocking(move |connection| {
            connection.transaction::<ProjectSyncState, StateStoreError, _>(|conn| {
                let existing = project_sync_states::table
                    .filter(project_sync_states::key.eq(&key))
                    .for_update()
                    .select(ProjectSyncStateRow::as_select())
                    .first::<ProjectSyncStateRow>(conn)
                    .optional()?;

                let mut state = match existing {
                    Some(row) => row.into_state()?,
                    None => seed,
                };
                mutate(&mut state);

                let row = ProjectSyncStateRow::from_state(key.clone(), &state);
                diesel::insert_into(project_sync_states::table)
                    .values(&row)
                    .on_conflict(project_sync_states::key)
                    .do_update()
                    .set(&row)
                    .execute(conn)?;

                Ok(state)
            })
        })
        .await
    }

    async fn list_projects(&self) -> StateStoreResult<Vec<ProjectSyncState>> {
        let prefix = self.project_prefix();
        self.run_blocking(move |connection| {
            let rows = project_sync_states::table
                .filter(project_sync_states::key.like(&prefix))
                .order(project_sync_states::key.asc())
                .select(ProjectSyncStateRow::as_select())
                .load::<ProjectSyncStateRow>(connection)?;
            rows.into_iter()
                .map(ProjectSyncStateRow::into_state)
                .collect()
        })
        .await
    }
}
