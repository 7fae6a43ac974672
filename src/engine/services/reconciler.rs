//! Periodic reconciliation pass.
//!
//! The reconciler repairs webhook loss and destination drift. It never
//! writes task pages directly: everything task-shaped is enqueued as a
//! regular message so the worker's invariants apply uniformly. Project
//! status alignment and the reverse edges run through [`ProjectFlows`].

use mockable::Clock;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::config::SyncConfig;
use crate::engine::domain::{ReconcileSummary, SyncMessage};
use crate::engine::ports::{MessageQueue, QueueError};
use crate::remote::RemoteError;
use crate::source::domain::ItemId;
use crate::source::ports::SourceAdapter;
use crate::store::domain::{SyncSource, SyncStatus};
use crate::store::ports::{StateStore, StateStoreError};

use super::projects::ProjectFlows;

/// Queue saturation multiple of the worker pool size; enqueueing pauses
/// above it.
const SATURATION_FACTOR: usize = 4;

/// Pause between saturation checks while the queue drains.
const SATURATION_POLL: Duration = Duration::from_millis(25);

/// Errors aborting a reconciliation pass.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// Source listing failed.
    #[error(transparent)]
    Remote(#[from] RemoteError),

    /// State store scan failed.
    #[error(transparent)]
    Store(#[from] StateStoreError),

    /// Queue rejected an enqueue.
    #[error(transparent)]
    Queue(#[from] QueueError),
}

/// The periodic reconciliation service.
pub struct Reconciler {
    source: Arc<dyn SourceAdapter>,
    store: Arc<dyn StateStore>,
    queue: Arc<dyn MessageQueue>,
    projects: Arc<ProjectFlows>,
    config: Arc<SyncConfig>,
    clock: Arc<dyn Clock + Send + Sync>,
}

impl Reconciler {
    /// Creates a reconciler over the given collaborators.
    #[must_use]
    pub fn new(
        source: Arc<dyn SourceAdapter>,
        store: Arc<dyn StateStore>,
        queue: Arc<dyn MessageQueue>,
        projects: Arc<ProjectFlows>,
        config: Arc<SyncConfig>,
        clock: Arc<dyn Clock + Send + Sync>,
    ) -> Self {
        Self {
            source,
            store,
            queue,
            projects,
            config,
            clock,
        }
    }

    /// Runs one reconciliation pass and returns its summary.
    ///
    /// # Errors
    ///
    /// Returns [`ReconcileError`] when listing, scanning, or enqueueing
    /// fails outright; per-project alignment failures are counted in the
    /// summary instead.
    pub async fn run(&self) -> Result<ReconcileSummary, ReconcileError> {
        let started = self.clock.utc();
        let mut summary = ReconcileSummary::default();

        let tagged = self
            .source
            .list_tagged(&self.config.eligibility_tag)
            .await?;
        summary.active_found = tagged.len();

        let mut seen: HashSet<ItemId> = HashSet::with_capacity(tagged.len());
        for item in tagged {
            seen.insert(item.id.clone());
            let message = SyncMessage::upsert(item.id.clone(), SyncSource::Reconciler)
                .with_snapshot(item);
            self.enqueue_with_backpressure(message).await?;
            summary.upserted += 1;
        }

        // Rows still marked ok whose item no longer carries the tag have
        // lost their source; archive the mirrors.
        for row in self.store.list_tasks(Some(SyncStatus::Ok)).await? {
            if seen.contains(&row.external_id) {
                continue;
            }
            let message = SyncMessage::archive(row.external_id.clone(), SyncSource::Reconciler);
            self.enqueue_with_backpressure(message).await?;
            summary.archived += 1;
        }

        for project_state in self.store.list_projects().await? {
            if let Err(err) = self.projects.sync_status_from_source(&project_state).await {
                tracing::warn!(
                    project = %project_state.source_project_id,
                    error = %err,
                    "project status alignment failed"
                );
                summary.errors += 1;
            }
            if let Err(err) = self.projects.reverse_sync(&project_state).await {
                tracing::warn!(
                    project = %project_state.source_project_id,
                    error = %err,
                    "project reverse sync failed"
                );
                summary.errors += 1;
            }
        }

        summary.duration_s = (self.clock.utc() - started).num_seconds();
        tracing::info!(
            active_found = summary.active_found,
            upserted = summary.upserted,
            archived = summary.archived,
            errors = summary.errors,
            duration_s = summary.duration_s,
            "reconciliation pass complete"
        );
        Ok(summary)
    }

    /// Enqueues a message, pausing while the queue is saturated so the
    /// reconciler never floods the workers.
    async fn enqueue_with_backpressure(&self, message: SyncMessage) -> Result<(), ReconcileError> {
        let high_water = self
            .config
            .worker_concurrency
            .saturating_mul(SATURATION_FACTOR)
            .max(SATURATION_FACTOR);
        loop {
            let outstanding = self.queue.depth().await? + self.queue.in_flight().await?;
            if outstanding < high_water {
                break;
            }
            tokio::time::sleep(SATURATION_POLL).await;
        }
        self.queue.enqueue(message).await?;
        Ok(())
    }
}
