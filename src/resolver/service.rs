//! Relation resolution service.

use mockable::Clock;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::{Mutex as StdMutex, PoisonError};
use thiserror::Error;

use crate::config::SyncConfig;
use crate::destination::domain::{PageId, PageKind, RelationKind, RelationTarget};
use crate::destination::ports::DestinationAdapter;
use crate::mapping::{canonical_area_name, partition_labels, payload_hash, project_payload};
use crate::remote::RemoteError;
use crate::source::domain::{ProjectId, SourceProject, is_eligible};
use crate::source::ports::SourceAdapter;
use crate::store::domain::ProjectSyncState;
use crate::store::ports::{StateStore, StateStoreError};

use super::single_flight::KeyedLocks;

/// Errors surfaced while resolving relations.
#[derive(Debug, Error)]
pub enum ResolverError {
    /// Remote adapter failure.
    #[error(transparent)]
    Remote(#[from] RemoteError),

    /// State store failure.
    #[error(transparent)]
    Store(#[from] StateStoreError),

    /// Payload serialization failure while hashing.
    #[error("payload serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Resolves relation names and source identifiers into destination
/// identities with at-most-one creation per name.
pub struct Resolver {
    source: Arc<dyn SourceAdapter>,
    destination: Arc<dyn DestinationAdapter>,
    store: Arc<dyn StateStore>,
    config: Arc<SyncConfig>,
    clock: Arc<dyn Clock + Send + Sync>,
    locks: KeyedLocks,
    cache: StdMutex<HashMap<(RelationKind, String), PageId>>,
}

impl Resolver {
    /// Creates a resolver over the given collaborators.
    #[must_use]
    pub fn new(
        source: Arc<dyn SourceAdapter>,
        destination: Arc<dyn DestinationAdapter>,
        store: Arc<dyn StateStore>,
        config: Arc<SyncConfig>,
        clock: Arc<dyn Clock + Send + Sync>,
    ) -> Self {
        Self {
            source,
            destination,
            store,
            config,
            clock,
            locks: KeyedLocks::new(),
            cache: StdMutex::new(HashMap::new()),
        }
    }

    fn cached(&self, kind: RelationKind, name: &str) -> Option<PageId> {
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&(kind, name.to_owned()))
            .cloned()
    }

    fn remember(&self, kind: RelationKind, name: String, id: PageId) {
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert((kind, name), id);
    }

    /// Looks up the destination record for a canonical area name.
    ///
    /// Areas are never created: a miss is reported as `None` with a
    /// warning, and the sync proceeds without the relation.
    ///
    /// # Errors
    ///
    /// Returns [`ResolverError::Remote`] on adapter failure.
    pub async fn resolve_area(&self, name: &str) -> Result<Option<PageId>, ResolverError> {
        let canonical = canonical_area_name(name);
        if let Some(id) = self.cached(RelationKind::Area, &canonical) {
            return Ok(Some(id));
        }
        let found = self
            .destination
            .find_relation_by_name(RelationKind::Area, &canonical)
            .await?;
        match found {
            Some(target) => {
                self.remember(RelationKind::Area, canonical, target.id.clone());
                Ok(Some(target.id))
            }
            None => {
                tracing::warn!(area = %canonical, "unknown area, dropping relation");
                Ok(None)
            }
        }
    }

    /// Fuzzy-matches a person name against the destination people records.
    ///
    /// Matching is case-insensitive and word-boundary-respecting; a tie or
    /// no qualifying candidate yields `None` rather than a guess.
    ///
    /// # Errors
    ///
    /// Returns [`ResolverError::Remote`] on adapter failure.
    pub async fn resolve_person(&self, name: &str) -> Result<Option<PageId>, ResolverError> {
        let folded = name.trim().to_lowercase();
        if let Some(id) = self.cached(RelationKind::Person, &folded) {
            return Ok(Some(id));
        }
        let candidates = self
            .destination
            .list_relation_targets(RelationKind::Person)
            .await?;
        match match_person(name, &candidates) {
            Some(id) => {
                self.remember(RelationKind::Person, folded, id.clone());
                Ok(Some(id))
            }
            None => {
                tracing::warn!(person = name, "no unambiguous person match, skipping");
                Ok(None)
            }
        }
    }

    /// Resolves a source project to its destination page, materializing the
    /// page exactly once when absent.
    ///
    /// The critical section re-checks the state store and the destination
    /// before creating, so a row produced by a concurrent peer is adopted
    /// instead of duplicated. Areas are aggregated from the currently
    /// eligible children at creation time and frozen thereafter.
    ///
    /// # Errors
    ///
    /// Returns [`ResolverError`] on adapter or store failure.
    pub async fn resolve_project(&self, project: &SourceProject) -> Result<PageId, ResolverError> {
        if let Some(state) = self.store.get_project(&project.id).await? {
            return Ok(state.dest_page_id);
        }

        let lock_key = format!("project/{}", project.id);
        let _guard = self.locks.acquire(&lock_key).await;

        // A peer may have materialized while this task awaited the lock.
        if let Some(state) = self.store.get_project(&project.id).await? {
            return Ok(state.dest_page_id);
        }

        // Cross-process check: another engine instance may own the page.
        let existing = self
            .destination
            .find_by_external_id(PageKind::Project, project.id.as_str())
            .await?;
        if let Some(page) = existing.into_iter().next() {
            let adopted = self.record_project(project, page.id, page.created_at, None).await?;
            return Ok(adopted.dest_page_id);
        }

        let area_ids = self.aggregate_child_areas(&project.id).await?;
        let payload = project_payload(project, &area_ids);
        let hash = payload_hash(&payload)?;
        let page = self
            .destination
            .create_page(PageKind::Project, project.id.as_str(), &payload)
            .await?;
        tracing::info!(
            project = %project.id,
            page = %page.id,
            areas = area_ids.len(),
            "materialized project page"
        );

        let state = self
            .record_project(project, page.id, page.created_at, Some(hash))
            .await?;

        if self.config.add_backlink {
            let note = format!("Synced to Notion: {}", page.url);
            self.source.add_project_comment(&project.id, &note).await?;
        }

        Ok(state.dest_page_id)
    }

    /// Aggregates area relations from the project's currently eligible
    /// children via a light source query.
    async fn aggregate_child_areas(
        &self,
        project_id: &ProjectId,
    ) -> Result<Vec<PageId>, ResolverError> {
        let project = self.source.fetch_project(project_id).await?;
        let tagged = self.source.list_tagged(&self.config.eligibility_tag).await?;
        let mut names: Vec<String> = Vec::new();
        for item in tagged {
            if &item.project_id != project_id {
                continue;
            }
            if !is_eligible(&item, &project, &self.config) {
                continue;
            }
            names.extend(partition_labels(&item.labels, &self.config).areas);
        }
        names.sort();
        names.dedup();

        let mut ids = Vec::new();
        for name in names {
            if let Some(id) = self.resolve_area(&name).await? {
                ids.push(id);
            }
        }
        Ok(ids)
    }

    async fn record_project(
        &self,
        project: &SourceProject,
        page_id: PageId,
        created_at: chrono::DateTime<chrono::Utc>,
        forward_hash: Option<String>,
    ) -> Result<ProjectSyncState, ResolverError> {
        let now = self.clock.utc();
        let seed = ProjectSyncState::new(project.id.clone(), page_id, created_at);
        let state = self
            .store
            .upsert_project(
                &project.id,
                seed,
                Box::new(move |state| {
                    if state.areas_frozen_at.is_none() {
                        state.areas_frozen_at = Some(now);
                    }
                    if let Some(hash) = forward_hash {
                        state.echo_hash = Some(hash);
                        state.last_synced_at = Some(now);
                    }
                }),
            )
            .await?;
        Ok(state)
    }
}

/// Case-insensitive, word-boundary-respecting nearest match of a person
/// label against the people records.
///
/// Every word of the query must appear as a whole word of the candidate
/// name; among fully matching candidates, exactly one must remain or the
/// result is `None`.
#[must_use]
pub fn match_person(query: &str, candidates: &[RelationTarget]) -> Option<PageId> {
    let query_words: Vec<String> = query
        .split_whitespace()
        .map(str::to_lowercase)
        .collect();
    if query_words.is_empty() {
        return None;
    }

    let mut full_matches: Vec<&RelationTarget> = Vec::new();
    for candidate in candidates {
        let name_words: Vec<String> = candidate
            .name
            .split_whitespace()
            .map(str::to_lowercase)
            .collect();
        let all_present = query_words
            .iter()
            .all(|word| name_words.iter().any(|name_word| name_word == word));
        if all_present {
            full_matches.push(candidate);
        }
    }

    match full_matches.as_slice() {
        [single] => Some(single.id.clone()),
        _ => None,
    }
}
