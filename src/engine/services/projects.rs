//! Project page flows: forward status reconciliation and the two narrow
//! reverse edges (name and archive status).
//!
//! These are the only destination fields that flow back to the source;
//! every other destination edit is overwritten by the next forward sync.

use mockable::Clock;
use std::sync::Arc;

use crate::destination::domain::properties;
use crate::destination::ports::DestinationAdapter;
use crate::mapping::{digest_value, payload_hash, project_reverse_edits, project_status_payload};
use crate::source::ports::SourceAdapter;
use crate::store::domain::ProjectSyncState;
use crate::store::ports::StateStore;

use super::worker::WorkerError;

/// Project-level synchronization flows.
pub struct ProjectFlows {
    source: Arc<dyn SourceAdapter>,
    destination: Arc<dyn DestinationAdapter>,
    store: Arc<dyn StateStore>,
    clock: Arc<dyn Clock + Send + Sync>,
}

impl ProjectFlows {
    /// Creates the flows over the given collaborators.
    #[must_use]
    pub fn new(
        source: Arc<dyn SourceAdapter>,
        destination: Arc<dyn DestinationAdapter>,
        store: Arc<dyn StateStore>,
        clock: Arc<dyn Clock + Send + Sync>,
    ) -> Self {
        Self {
            source,
            destination,
            store,
            clock,
        }
    }

    /// Forward direction: re-checks the source archive flag and aligns the
    /// destination Status select. Returns `true` when a write happened.
    ///
    /// # Errors
    ///
    /// Returns [`WorkerError`] on adapter or store failure.
    pub async fn sync_status_from_source(
        &self,
        state: &ProjectSyncState,
    ) -> Result<bool, WorkerError> {
        let project = self.source.fetch_project(&state.source_project_id).await?;
        let page = self.destination.fetch_page(&state.dest_page_id).await?;

        let page_archived = page.status() == Some(properties::STATUS_ARCHIVED);
        if page_archived == project.is_archived {
            return Ok(false);
        }

        let payload = project_status_payload(&page, project.is_archived);
        let hash = payload_hash(&payload)?;
        self.destination
            .update_page(&state.dest_page_id, &payload)
            .await?;

        let now = self.clock.utc();
        let project_id = state.source_project_id.clone();
        let seed = state.clone();
        self.store
            .upsert_project(
                &project_id,
                seed,
                Box::new(move |row| {
                    row.echo_hash = Some(hash);
                    row.last_synced_at = Some(now);
                }),
            )
            .await?;
        tracing::info!(
            project = %state.source_project_id,
            archived = project.is_archived,
            "aligned project status from source"
        );
        Ok(true)
    }

    /// Reverse direction: propagates a destination rename or status flip
    /// back to the source.
    ///
    /// Guards, in order: the page must have been edited strictly after the
    /// engine's last write; a page that still embodies the engine's own
    /// last payload is an echo and is dropped; and each individual
    /// intention is dropped when its hash matches the stored echo hash.
    /// Returns `true` when any source write happened.
    ///
    /// # Errors
    ///
    /// Returns [`WorkerError`] on adapter or store failure.
    pub async fn reverse_sync(&self, state: &ProjectSyncState) -> Result<bool, WorkerError> {
        let page = self.destination.fetch_page(&state.dest_page_id).await?;
        let project = self.source.fetch_project(&state.source_project_id).await?;

        let Some(last_engine_write) = state.last_synced_at else {
            return Ok(false);
        };
        if page.last_edited_at <= last_engine_write {
            return Ok(false);
        }

        // The page still being byte-for-byte our own write means the edit
        // timestamp moved for other reasons (e.g. relation backfill).
        let page_hash = payload_hash(&page.as_payload())?;
        if state.echo_hash.as_deref() == Some(page_hash.as_str()) {
            return Ok(false);
        }

        let edits = project_reverse_edits(&page, &project);
        if edits.is_empty() {
            return Ok(false);
        }

        let mut wrote = false;
        let mut applied_hash: Option<String> = None;
        let mut written_name: Option<String> = None;

        if let Some(name) = edits.rename {
            let intention = digest_value(&serde_json::json!({
                "project": state.source_project_id.as_str(),
                "rename": name,
            }))?;
            if state.echo_hash.as_deref() == Some(intention.as_str()) {
                tracing::debug!(project = %state.source_project_id, "rename echo suppressed");
            } else {
                self.source
                    .rename_project(&state.source_project_id, &name)
                    .await?;
                tracing::info!(project = %state.source_project_id, name = %name, "renamed source project");
                written_name = Some(name);
                applied_hash = Some(intention);
                wrote = true;
            }
        }

        if let Some(archived) = edits.set_archived {
            let intention = digest_value(&serde_json::json!({
                "project": state.source_project_id.as_str(),
                "archived": archived,
            }))?;
            if state.echo_hash.as_deref() == Some(intention.as_str()) {
                tracing::debug!(project = %state.source_project_id, "status echo suppressed");
            } else {
                self.source
                    .set_project_archived(&state.source_project_id, archived)
                    .await?;
                tracing::info!(
                    project = %state.source_project_id,
                    archived,
                    "propagated project status to source"
                );
                applied_hash = Some(intention);
                wrote = true;
            }
        }

        if wrote {
            let now = self.clock.utc();
            let project_id = state.source_project_id.clone();
            let seed = state.clone();
            self.store
                .upsert_project(
                    &project_id,
                    seed,
                    Box::new(move |row| {
                        if let Some(hash) = applied_hash {
                            row.echo_hash = Some(hash);
                        }
                        if let Some(name) = written_name {
                            row.name_last_written_source = Some(name);
                        }
                        row.last_synced_at = Some(now);
                    }),
                )
                .await?;
        }

        Ok(wrote)
    }
}
