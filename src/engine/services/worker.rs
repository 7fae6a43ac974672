//! Worker message handler.
//!
//! One message runs the full pipeline: load state, fetch source, evaluate
//! eligibility, map, resolve relations, hash, write, persist. Every step
//! is either idempotent by construction or guarded by the per-item lock
//! plus state comparison, so redelivery after a crash or timeout is safe.

use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::watch;

use crate::config::SyncConfig;
use crate::destination::domain::{
    Block, PageId, PageKind, PagePayload, PageRecord, PropertyValue, properties,
};
use crate::destination::ports::DestinationAdapter;
use crate::engine::domain::{SyncAction, SyncMessage};
use crate::mapping::{append_backlinks, format_backlinks, forward, payload_hash};
use crate::remote::RemoteError;
use crate::resolver::{Resolver, ResolverError};
use crate::source::domain::{ItemSnapshot, SourceItem, is_eligible, qualifies_for_auto_label};
use crate::source::ports::SourceAdapter;
use crate::store::domain::{SyncSource, SyncStatus, TaskSyncState};
use crate::store::ports::{StateStore, StateStoreError};

/// Errors surfaced by the worker pipeline.
#[derive(Debug, Error)]
pub enum WorkerError {
    /// Remote adapter failure.
    #[error(transparent)]
    Remote(#[from] RemoteError),

    /// State store failure.
    #[error(transparent)]
    Store(#[from] StateStoreError),

    /// Relation resolution failure.
    #[error(transparent)]
    Resolver(#[from] ResolverError),

    /// Payload serialization failure while hashing.
    #[error("payload serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl WorkerError {
    /// Returns `true` when the failure warrants queue redelivery.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Remote(err) | Self::Resolver(ResolverError::Remote(err)) => err.is_retryable(),
            Self::Store(err) | Self::Resolver(ResolverError::Store(err)) => {
                matches!(err, StateStoreError::Transient(_))
            }
            Self::Resolver(ResolverError::Serialization(_)) | Self::Serialization(_) => false,
        }
    }

    /// Returns `true` for credential failures, which degrade health.
    #[must_use]
    pub const fn is_auth(&self) -> bool {
        matches!(
            self,
            Self::Remote(RemoteError::Auth(_)) | Self::Resolver(ResolverError::Remote(RemoteError::Auth(_)))
        )
    }
}

/// What the worker did with a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerOutcome {
    /// The destination was written and state persisted.
    Upserted,
    /// The payload hash was unchanged; only the sync timestamp moved.
    SkippedClean,
    /// The mirror was archived (orphan, deletion, or archive request).
    Archived,
    /// Nothing to do for this message.
    NoOp,
    /// Cancellation was observed; no state was changed.
    Cancelled,
}

/// The per-message pipeline with its injected collaborators.
pub struct SyncWorker {
    source: Arc<dyn SourceAdapter>,
    destination: Arc<dyn DestinationAdapter>,
    store: Arc<dyn StateStore>,
    resolver: Arc<Resolver>,
    config: Arc<SyncConfig>,
    clock: Arc<dyn Clock + Send + Sync>,
}

impl SyncWorker {
    /// Creates a worker over the given collaborators.
    #[must_use]
    pub fn new(
        source: Arc<dyn SourceAdapter>,
        destination: Arc<dyn DestinationAdapter>,
        store: Arc<dyn StateStore>,
        resolver: Arc<Resolver>,
        config: Arc<SyncConfig>,
        clock: Arc<dyn Clock + Send + Sync>,
    ) -> Self {
        Self {
            source,
            destination,
            store,
            resolver,
            config,
            clock,
        }
    }

    /// Processes one message to completion.
    ///
    /// A set cancellation signal aborts at the next checkpoint without
    /// touching the state store; the queue then redelivers the message.
    ///
    /// # Errors
    ///
    /// Returns [`WorkerError`] for failures the caller classifies into
    /// ack, redelivery, or error-state persistence.
    pub async fn handle_message(
        &self,
        message: &SyncMessage,
        cancel: &watch::Receiver<bool>,
    ) -> Result<WorkerOutcome, WorkerError> {
        if *cancel.borrow() {
            return Ok(WorkerOutcome::Cancelled);
        }

        let state = self.store.get_task(&message.source_item_id).await?;

        match message.action {
            SyncAction::Archive => self.archive_mirror(message, state.as_ref(), None).await,
            SyncAction::Upsert => self.handle_upsert(message, state, cancel).await,
        }
    }

    async fn handle_upsert(
        &self,
        message: &SyncMessage,
        state: Option<TaskSyncState>,
        cancel: &watch::Receiver<bool>,
    ) -> Result<WorkerOutcome, WorkerError> {
        let snapshot = match self.load_snapshot(message).await {
            Ok(snapshot) => snapshot,
            // A vanished source item means deletion: archive the mirror.
            Err(WorkerError::Remote(RemoteError::NotFound)) => {
                return self.archive_mirror(message, state.as_ref(), None).await;
            }
            Err(err) => return Err(err),
        };
        let ItemSnapshot {
            mut item,
            project,
            comments,
        } = snapshot;

        if !is_eligible(&item, &project, &self.config) {
            let previously_mirrored = state.as_ref().is_some_and(TaskSyncState::is_mirrored);
            let may_auto_label = self.config.auto_label
                && !previously_mirrored
                && matches!(message.source, SyncSource::Webhook | SyncSource::Reconciler);
            if may_auto_label && qualifies_for_auto_label(&item, &project, &self.config) {
                let labels = self
                    .source
                    .add_tag(&item.id, &self.config.eligibility_tag)
                    .await?;
                item.labels = labels;
                tracing::info!(item = %item.id, "auto-labeled qualifying item");
            } else {
                return self.handle_ineligible(message, state, &item, cancel).await;
            }
        }

        let mapped = forward(&item, &comments, &self.config);
        if mapped.truncated_blocks > 0 {
            tracing::warn!(
                item = %item.id,
                blocks = mapped.truncated_blocks,
                "body blocks truncated at destination size limit"
            );
        }
        if mapped.used_placeholder_title {
            tracing::warn!(item = %item.id, "empty title replaced with placeholder");
        }

        let project_page_id = self.resolver.resolve_project(&project).await?;
        let mut payload = mapped.payload;
        payload.set_property(
            properties::PROJECT,
            PropertyValue::Relation(vec![project_page_id.clone()]),
        );
        let mut area_ids = Vec::new();
        for area in &mapped.relations.areas {
            if let Some(id) = self.resolver.resolve_area(area).await? {
                area_ids.push(id);
            }
        }
        payload.set_property(properties::AREAS, PropertyValue::Relation(area_ids));
        let mut people_ids = Vec::new();
        for person in &mapped.relations.people {
            if let Some(id) = self.resolver.resolve_person(person).await? {
                people_ids.push(id);
            }
        }
        payload.set_property(properties::PEOPLE, PropertyValue::Relation(people_ids));

        let hash = payload_hash(&payload)?;

        let mut revive = state
            .as_ref()
            .is_some_and(|s| s.sync_status == SyncStatus::Archived && s.dest_page_id.is_some());

        // Skip-if-clean, unless the destination itself drifted (manual
        // archive or edit), in which case the page is repaired.
        if let Some(current) = state.as_ref()
            && current.sync_status == SyncStatus::Ok
            && current.payload_hash.as_deref() == Some(hash.as_str())
            && let Some(page_id) = current.dest_page_id.as_ref()
        {
            match self.destination.fetch_page(page_id).await {
                Ok(page) => {
                    let page_hash = payload_hash(&page.as_payload())?;
                    if !page.archived && page_hash == hash {
                        return self.refresh_clean(message).await;
                    }
                    revive = revive || page.archived;
                }
                Err(RemoteError::NotFound) => {}
                Err(err) => return Err(err.into()),
            }
        }

        if *cancel.borrow() {
            return Ok(WorkerOutcome::Cancelled);
        }

        let known_page = state.as_ref().and_then(|s| s.dest_page_id.clone());
        let (page, created) = self
            .write_task_page(&item.id.to_string(), &payload, known_page)
            .await?;
        if revive && !created {
            self.destination.unarchive_page(&page.id).await?;
        }

        if created && self.config.add_backlink {
            self.append_backlinks(&item, &page.url, &project_page_id)
                .await?;
        }

        if *cancel.borrow() {
            return Ok(WorkerOutcome::Cancelled);
        }

        let now = self.clock.utc();
        let page_id = page.id.clone();
        let persisted_hash = hash.clone();
        let source_kind = message.source;
        self.store
            .upsert_task(
                &item.id,
                Box::new(move |row| {
                    row.dest_page_id = Some(page_id);
                    row.payload_hash = Some(persisted_hash.clone());
                    row.echo_hash = Some(persisted_hash);
                    row.sync_status = SyncStatus::Ok;
                    row.sync_source = source_kind;
                    row.last_synced_at = Some(now);
                    row.error_note = None;
                }),
            )
            .await?;

        tracing::info!(item = %item.id, page = %page.id, created, "mirrored item");
        Ok(WorkerOutcome::Upserted)
    }

    /// Resolves the item snapshot: inline payloads are trusted as fresh,
    /// everything else is fetched.
    async fn load_snapshot(&self, message: &SyncMessage) -> Result<ItemSnapshot, WorkerError> {
        if let Some(item) = &message.snapshot {
            let project = self.source.fetch_project(&item.project_id).await?;
            let comments = self.source.list_comments(&item.id).await?;
            return Ok(ItemSnapshot {
                item: item.clone(),
                project,
                comments,
            });
        }
        Ok(self.source.fetch_item(&message.source_item_id).await?)
    }

    async fn handle_ineligible(
        &self,
        message: &SyncMessage,
        state: Option<TaskSyncState>,
        item: &SourceItem,
        cancel: &watch::Receiver<bool>,
    ) -> Result<WorkerOutcome, WorkerError> {
        let Some(current) = state else {
            return Ok(WorkerOutcome::NoOp);
        };
        if !current.is_mirrored() {
            return Ok(WorkerOutcome::NoOp);
        }
        if *cancel.borrow() {
            return Ok(WorkerOutcome::Cancelled);
        }

        // Recurring flips strip the tag so the item stops re-qualifying.
        // Tag removal runs first: it is idempotent, while a completed
        // archive makes a redelivered message a no-op.
        if self.config.skip_recurring
            && item.is_recurring
            && item.has_label(&self.config.eligibility_tag)
        {
            self.source
                .remove_tag(&item.id, &self.config.eligibility_tag)
                .await?;
        }

        let note = format!(
            "Sync label was removed on {}",
            self.clock.utc().format("%Y-%m-%d")
        );
        self.archive_mirror(message, Some(&current), Some(note)).await
    }

    /// Archives the destination mirror (when one exists) and records the
    /// archived state. The optional note is appended to the page body
    /// before archiving.
    async fn archive_mirror(
        &self,
        message: &SyncMessage,
        state: Option<&TaskSyncState>,
        note: Option<String>,
    ) -> Result<WorkerOutcome, WorkerError> {
        let Some(current) = state else {
            return Ok(WorkerOutcome::NoOp);
        };
        if current.sync_status == SyncStatus::Archived {
            return Ok(WorkerOutcome::NoOp);
        }
        if let Some(page_id) = current.dest_page_id.as_ref() {
            if let Some(text) = note {
                match self
                    .destination
                    .append_blocks(page_id, &[Block::Paragraph(text)])
                    .await
                {
                    Ok(()) | Err(RemoteError::NotFound) => {}
                    Err(err) => return Err(err.into()),
                }
            }
            match self.destination.archive_page(page_id).await {
                Ok(()) | Err(RemoteError::NotFound) => {}
                Err(err) => return Err(err.into()),
            }
        }

        let now = self.clock.utc();
        let source_kind = message.source;
        self.store
            .upsert_task(
                &message.source_item_id,
                Box::new(move |row| {
                    row.sync_status = SyncStatus::Archived;
                    row.sync_source = source_kind;
                    row.last_synced_at = Some(now);
                    row.error_note = None;
                }),
            )
            .await?;
        tracing::info!(item = %message.source_item_id, "archived mirror");
        Ok(WorkerOutcome::Archived)
    }

    async fn refresh_clean(&self, message: &SyncMessage) -> Result<WorkerOutcome, WorkerError> {
        let now = self.clock.utc();
        let source_kind = message.source;
        self.store
            .upsert_task(
                &message.source_item_id,
                Box::new(move |row| {
                    row.sync_source = source_kind;
                    row.last_synced_at = Some(now);
                }),
            )
            .await?;
        Ok(WorkerOutcome::SkippedClean)
    }

    /// Writes the task page, repairing duplicate pages when found: the
    /// oldest page is adopted as canonical and the rest are archived.
    async fn write_task_page(
        &self,
        external_id: &str,
        payload: &PagePayload,
        known_page: Option<PageId>,
    ) -> Result<(PageRecord, bool), WorkerError> {
        if let Some(page_id) = known_page {
            match self.destination.update_page(&page_id, payload).await {
                Ok(page) => return Ok((page, false)),
                // The page vanished underneath us; fall through to
                // create-or-adopt.
                Err(RemoteError::NotFound) => {}
                Err(err) => return Err(err.into()),
            }
        }

        let mut existing = self
            .destination
            .find_by_external_id(PageKind::Task, external_id)
            .await?;
        if existing.is_empty() {
            let page = self
                .destination
                .create_page(PageKind::Task, external_id, payload)
                .await?;
            return Ok((page, true));
        }

        let canonical = existing.remove(0);
        for duplicate in existing {
            tracing::warn!(
                item = external_id,
                canonical = %canonical.id,
                duplicate = %duplicate.id,
                "archiving duplicate destination page"
            );
            self.destination.archive_page(&duplicate.id).await?;
        }
        let page = self.destination.update_page(&canonical.id, payload).await?;
        Ok((page, false))
    }

    /// Appends the task and project page links to the source description,
    /// guarded against double-append by a containment check.
    async fn append_backlinks(
        &self,
        item: &SourceItem,
        task_url: &str,
        project_page_id: &PageId,
    ) -> Result<(), WorkerError> {
        if item.description.contains(task_url) {
            return Ok(());
        }
        let project_url = self.destination.fetch_page(project_page_id).await?.url;
        let links = format_backlinks(task_url, &project_url);
        let description = append_backlinks(&item.description, &links);
        self.source.set_description(&item.id, &description).await?;
        Ok(())
    }
}
