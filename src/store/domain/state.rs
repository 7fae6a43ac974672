//! Per-entity synchronization state rows.

use crate::destination::domain::PageId;
use crate::source::domain::{ItemId, ProjectId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Outcome of the most recent sync attempt for an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    /// Mirrored and up to date.
    Ok,
    /// Orphaned or source-deleted; the destination page is archived but the
    /// row is retained for audit.
    Archived,
    /// The last attempt failed; see the error note.
    Error,
}

impl SyncStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Archived => "archived",
            Self::Error => "error",
        }
    }
}

impl TryFrom<&str> for SyncStatus {
    type Error = ParseSyncStatusError;

    fn try_from(value: &str) -> Result<Self, ParseSyncStatusError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "ok" => Ok(Self::Ok),
            "archived" => Ok(Self::Archived),
            "error" => Ok(Self::Error),
            _ => Err(ParseSyncStatusError(value.to_owned())),
        }
    }
}

/// Error returned while parsing sync statuses from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown sync status: {0}")]
pub struct ParseSyncStatusError(pub String);

/// Which pathway produced the most recent sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncSource {
    /// Event delivered by the source webhook.
    Webhook,
    /// Periodic reconciliation pass.
    Reconciler,
    /// Operator-triggered sync.
    Manual,
}

impl SyncSource {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Webhook => "webhook",
            Self::Reconciler => "reconciler",
            Self::Manual => "manual",
        }
    }
}

impl TryFrom<&str> for SyncSource {
    type Error = ParseSyncSourceError;

    fn try_from(value: &str) -> Result<Self, ParseSyncSourceError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "webhook" => Ok(Self::Webhook),
            "reconciler" => Ok(Self::Reconciler),
            "manual" => Ok(Self::Manual),
            _ => Err(ParseSyncSourceError(value.to_owned())),
        }
    }
}

/// Error returned while parsing sync sources from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown sync source: {0}")]
pub struct ParseSyncSourceError(pub String);

/// Durable state row for one mirrored task.
///
/// Rows are created on first sync and never physically deleted; an archived
/// row preserves the audit trail of an orphaned or deleted item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskSyncState {
    /// Source item identifier, the row key.
    pub external_id: ItemId,
    /// Mirroring destination page, once created.
    pub dest_page_id: Option<PageId>,
    /// SHA-256 of the last forward payload written.
    pub payload_hash: Option<String>,
    /// Hash recognizing destination echoes of the last engine write.
    pub echo_hash: Option<String>,
    /// Outcome of the most recent sync attempt.
    pub sync_status: SyncStatus,
    /// Pathway that produced the most recent sync.
    pub sync_source: SyncSource,
    /// When the row was last written by a successful pass.
    pub last_synced_at: Option<DateTime<Utc>>,
    /// Failure detail for rows in [`SyncStatus::Error`].
    pub error_note: Option<String>,
}

impl TaskSyncState {
    /// Creates the initial row for an item that has never synced.
    #[must_use]
    pub const fn new(external_id: ItemId) -> Self {
        Self {
            external_id,
            dest_page_id: None,
            payload_hash: None,
            echo_hash: None,
            sync_status: SyncStatus::Ok,
            sync_source: SyncSource::Manual,
            last_synced_at: None,
            error_note: None,
        }
    }

    /// Returns `true` when a destination page exists and the row is not
    /// archived, meaning the item was previously mirrored.
    #[must_use]
    pub const fn is_mirrored(&self) -> bool {
        self.dest_page_id.is_some() && !matches!(self.sync_status, SyncStatus::Archived)
    }
}

/// Durable state row for one materialized project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectSyncState {
    /// Source project identifier, the row key.
    pub source_project_id: ProjectId,
    /// Materialized destination project page.
    pub dest_page_id: PageId,
    /// When the project page was created.
    pub created_at: DateTime<Utc>,
    /// Last project name the engine wrote to the source (reverse flow).
    pub name_last_written_source: Option<String>,
    /// Set once at creation; areas are never rewritten afterwards.
    pub areas_frozen_at: Option<DateTime<Utc>>,
    /// Hash recognizing destination echoes of the last engine write.
    pub echo_hash: Option<String>,
    /// When the engine last wrote the project page.
    pub last_synced_at: Option<DateTime<Utc>>,
}

impl ProjectSyncState {
    /// Creates the row recorded at project materialization time.
    #[must_use]
    pub const fn new(
        source_project_id: ProjectId,
        dest_page_id: PageId,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            source_project_id,
            dest_page_id,
            created_at,
            name_last_written_source: None,
            areas_frozen_at: None,
            echo_hash: None,
            last_synced_at: None,
        }
    }
}
