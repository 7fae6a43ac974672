//! Row types and domain conversions for the `PostgreSQL` state store.

use super::schema::{project_sync_states, task_sync_states};
use crate::destination::domain::PageId;
use crate::source::domain::{ItemId, ProjectId};
use crate::store::domain::{ProjectSyncState, SyncSource, SyncStatus, TaskSyncState};
use crate::store::ports::{StateStoreError, StateStoreResult};
use chrono::{DateTime, Utc};
use diesel::prelude::*;

/// Task state row as stored.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = task_sync_states)]
#[diesel(treat_none_as_null = true)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TaskSyncStateRow {
    /// Namespaced row key.
    pub key: String,
    /// Source item identifier.
    pub external_id: String,
    /// Destination page id, once created.
    pub dest_page_id: Option<String>,
    /// SHA-256 of the last forward payload written.
    pub payload_hash: Option<String>,
    /// Hash recognizing destination echoes.
    pub echo_hash: Option<String>,
    /// Canonical sync status string.
    pub sync_status: String,
    /// Canonical sync source string.
    pub sync_source: String,
    /// Last successful sync timestamp.
    pub last_synced_at: Option<DateTime<Utc>>,
    /// Failure detail for error rows.
    pub error_note: Option<String>,
}

impl TaskSyncStateRow {
    /// Builds a row from domain state under the given key.
    #[must_use]
    pub fn from_state(key: String, state: &TaskSyncState) -> Self {
        Self {
            key,
            external_id: state.external_id.as_str().to_owned(),
            dest_page_id: state.dest_page_id.as_ref().map(|id| id.as_str().to_owned()),
            payload_hash: state.payload_hash.clone(),
            echo_hash: state.echo_hash.clone(),
            sync_status: state.sync_status.as_str().to_owned(),
            sync_source: state.sync_source.as_str().to_owned(),
            last_synced_at: state.last_synced_at,
            error_note: state.error_note.clone(),
        }
    }

    /// Converts a stored row back into domain state.
    ///
    /// # Errors
    ///
    /// Returns [`StateStoreError::Persistence`] when stored strings fail
    /// domain validation.
    pub fn into_state(self) -> StateStoreResult<TaskSyncState> {
        let Self {
            key: _,
            external_id,
            dest_page_id,
            payload_hash,
            echo_hash,
            sync_status,
            sync_source,
            last_synced_at,
            error_note,
        } = self;
        Ok(TaskSyncState {
            external_id: ItemId::new(external_id).map_err(StateStoreError::persistence)?,
            dest_page_id: dest_page_id.map(PageId::new),
            payload_hash,
            echo_hash,
            sync_status: SyncStatus::try_from(sync_status.as_str())
                .map_err(StateStoreError::persistence)?,
            sync_source: SyncSource::try_from(sync_source.as_str())
                .map_err(StateStoreError::persistence)?,
            last_synced_at,
            error_note,
        })
    }
}

/// Project state row as stored.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = project_sync_states)]
#[diesel(treat_none_as_null = true)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ProjectSyncStateRow {
    /// Namespaced row key.
    pub key: String,
    /// Source project identifier.
    pub source_project_id: String,
    /// Materialized destination page id.
    pub dest_page_id: String,
    /// Project page creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last name the engine wrote back to the source.
    pub name_last_written_source: Option<String>,
    /// Areas freeze timestamp, set once at creation.
    pub areas_frozen_at: Option<DateTime<Utc>>,
    /// Hash recognizing destination echoes.
    pub echo_hash: Option<String>,
    /// Last engine write timestamp.
    pub last_synced_at: Option<DateTime<Utc>>,
}

impl ProjectSyncStateRow {
    /// Builds a row from domain state under the given key.
    #[must_use]
    pub fn from_state(key: String, state: &ProjectSyncState) -> Self {
        Self {
            key,
            source_project_id: state.source_project_id.as_str().to_owned(),
            dest_page_id: state.dest_page_id.as_str().to_owned(),
            created_at: state.created_at,
            name_last_written_source: state.name_last_written_source.clone(),
            areas_frozen_at: state.areas_frozen_at,
            echo_hash: state.echo_hash.clone(),
            last_synced_at: state.last_synced_at,
        }
    }

    /// Converts a stored row back into domain state.
    ///
    /// # Errors
    ///
    /// Returns [`StateStoreError::Persistence`] when stored strings fail
    /// domain validation.
    pub fn into_state(self) -> StateStoreResult<ProjectSyncState> {
        let Self {
            key: _,
            source_project_id,
            dest_page_id,
            created_at,
            name_last_written_source,
            areas_frozen_at,
            echo_hash,
            last_synced_at,
        } = self;
        Ok(ProjectSyncState {
            source_project_id: ProjectId::new(source_project_id)
                .map_err(StateStoreError::persistence)?,
            dest_page_id: PageId::new(dest_page_id),
            created_at,
            name_last_written_source,
            areas_frozen_at,
            echo_hash,
            last_synced_at,
        })
    }
}
