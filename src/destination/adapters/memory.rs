//! In-memory destination knowledge base used by tests and local runs.

use async_trait::async_trait;
use mockable::{Clock, DefaultClock};
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

use crate::destination::domain::{
    Block, PageId, PageKind, PagePayload, PageRecord, PropertyValue, RelationKind, RelationTarget,
    properties,
};
use crate::destination::ports::DestinationAdapter;
use crate::remote::{RemoteError, RemoteResult};

/// Thread-safe in-memory implementation of [`DestinationAdapter`].
///
/// Area and person records are seeded by tests (the engine never creates
/// them); pages carry creation order and edit timestamps so duplicate
/// repair and echo detection behave as against the real service. Every
/// mutating call increments a write counter for idempotency assertions.
#[derive(Clone)]
pub struct InMemoryDestinationAdapter {
    state: Arc<RwLock<InMemoryDestinationState>>,
    clock: Arc<dyn Clock + Send + Sync>,
}

#[derive(Default)]
struct InMemoryDestinationState {
    pages: HashMap<PageId, PageRecord>,
    creation_order: HashMap<PageId, u64>,
    areas: Vec<RelationTarget>,
    people: Vec<RelationTarget>,
    next_seq: u64,
    write_count: u64,
}

impl Default for InMemoryDestinationAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryDestinationAdapter {
    /// Creates an empty destination with the system clock.
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(Arc::new(DefaultClock))
    }

    /// Creates an empty destination with an injected clock.
    #[must_use]
    pub fn with_clock(clock: Arc<dyn Clock + Send + Sync>) -> Self {
        Self {
            state: Arc::new(RwLock::new(InMemoryDestinationState::default())),
            clock,
        }
    }

    /// Seeds a pre-existing area record and returns its identifier.
    #[must_use]
    pub fn seed_area(&self, name: impl Into<String>) -> PageId {
        self.seed_target(RelationKind::Area, name.into())
    }

    /// Seeds a pre-existing person record and returns its identifier.
    #[must_use]
    pub fn seed_person(&self, name: impl Into<String>) -> PageId {
        self.seed_target(RelationKind::Person, name.into())
    }

    fn seed_target(&self, kind: RelationKind, name: String) -> PageId {
        let id = PageId::new(Uuid::new_v4().to_string());
        if let Ok(mut state) = self.state.write() {
            let target = RelationTarget {
                id: id.clone(),
                name,
            };
            match kind {
                RelationKind::Area => state.areas.push(target),
                RelationKind::Person => state.people.push(target),
                RelationKind::Project => {}
            }
        }
        id
    }

    /// Returns a stored page, if present.
    #[must_use]
    pub fn page(&self, id: &PageId) -> Option<PageRecord> {
        self.state
            .read()
            .ok()
            .and_then(|state| state.pages.get(id).cloned())
    }

    /// Returns every stored page of a kind, oldest first.
    #[must_use]
    pub fn pages_of_kind(&self, kind: PageKind) -> Vec<PageRecord> {
        self.state.read().map_or_else(
            |_| Vec::new(),
            |state| {
                let mut pages: Vec<(u64, PageRecord)> = state
                    .pages
                    .values()
                    .filter(|page| page.kind == kind)
                    .map(|page| {
                        let seq = state.creation_order.get(&page.id).copied().unwrap_or(0);
                        (seq, page.clone())
                    })
                    .collect();
                pages.sort_by_key(|(seq, _)| *seq);
                pages.into_iter().map(|(_, page)| page).collect()
            },
        )
    }

    /// Returns the total number of mutating calls performed so far.
    #[must_use]
    pub fn write_count(&self) -> u64 {
        self.state.read().map_or(0, |state| state.write_count)
    }

    /// Simulates an operator edit of a page title, bumping the edit
    /// timestamp without counting as an engine write.
    pub fn edit_title(&self, id: &PageId, title: impl Into<String>) {
        let now = self.clock.utc();
        if let Ok(mut state) = self.state.write()
            && let Some(page) = state.pages.get_mut(id)
        {
            page.properties
                .insert(properties::TITLE.to_owned(), PropertyValue::Title(title.into()));
            page.last_edited_at = now;
        }
    }

    /// Simulates an operator edit of a page status select.
    pub fn edit_status(&self, id: &PageId, status: impl Into<String>) {
        let now = self.clock.utc();
        if let Ok(mut state) = self.state.write()
            && let Some(page) = state.pages.get_mut(id)
        {
            page.properties.insert(
                properties::STATUS.to_owned(),
                PropertyValue::Select(Some(status.into())),
            );
            page.last_edited_at = now;
        }
    }

    /// Simulates an operator archiving a page outside the engine.
    pub fn edit_archived(&self, id: &PageId, archived: bool) {
        let now = self.clock.utc();
        if let Ok(mut state) = self.state.write()
            && let Some(page) = state.pages.get_mut(id)
        {
            page.archived = archived;
            page.last_edited_at = now;
        }
    }

    fn read(&self) -> RemoteResult<RwLockReadGuard<'_, InMemoryDestinationState>> {
        self.state
            .read()
            .map_err(|err| RemoteError::Permanent(err.to_string()))
    }

    fn write(&self) -> RemoteResult<RwLockWriteGuard<'_, InMemoryDestinationState>> {
        self.state
            .write()
            .map_err(|err| RemoteError::Permanent(err.to_string()))
    }
}

#[async_trait]
impl DestinationAdapter for InMemoryDestinationAdapter {
    async fn find_by_external_id(
        &self,
        kind: PageKind,
        external_id: &str,
    ) -> RemoteResult<Vec<PageRecord>> {
        let state = self.read()?;
        let mut matches: Vec<(u64, PageRecord)> = state
            .pages
            .values()
            .filter(|page| {
                page.kind == kind && page.external_id == external_id && !page.archived
            })
            .map(|page| {
                let seq = state.creation_order.get(&page.id).copied().unwrap_or(0);
                (seq, page.clone())
            })
            .collect();
        matches.sort_by_key(|(seq, _)| *seq);
        Ok(matches.into_iter().map(|(_, page)| page).collect())
    }

    async fn fetch_page(&self, id: &PageId) -> RemoteResult<PageRecord> {
        self.read()?
            .pages
            .get(id)
            .cloned()
            .ok_or(RemoteError::NotFound)
    }

    async fn create_page(
        &self,
        kind: PageKind,
        external_id: &str,
        payload: &PagePayload,
    ) -> RemoteResult<PageRecord> {
        let now = self.clock.utc();
        let mut state = self.write()?;
        let id = PageId::new(Uuid::new_v4().to_string());
        let record = PageRecord {
            id: id.clone(),
            kind,
            external_id: external_id.to_owned(),
            properties: payload.properties.clone(),
            body: payload.body.clone(),
            archived: false,
            created_at: now,
            last_edited_at: now,
            url: format!("https://www.notion.so/{id}"),
        };
        let seq = state.next_seq;
        state.next_seq += 1;
        state.creation_order.insert(id.clone(), seq);
        state.pages.insert(id, record.clone());
        state.write_count += 1;
        Ok(record)
    }

    async fn update_page(&self, id: &PageId, payload: &PagePayload) -> RemoteResult<PageRecord> {
        let now = self.clock.utc();
        let mut state = self.write()?;
        let page = state.pages.get_mut(id).ok_or(RemoteError::NotFound)?;
        page.properties = payload.properties.clone();
        page.body = payload.body.clone();
        page.last_edited_at = now;
        let updated = page.clone();
        state.write_count += 1;
        Ok(updated)
    }

    async fn archive_page(&self, id: &PageId) -> RemoteResult<()> {
        let now = self.clock.utc();
        let mut state = self.write()?;
        let page = state.pages.get_mut(id).ok_or(RemoteError::NotFound)?;
        page.archived = true;
        page.last_edited_at = now;
        state.write_count += 1;
        Ok(())
    }

    async fn unarchive_page(&self, id: &PageId) -> RemoteResult<()> {
        let now = self.clock.utc();
        let mut state = self.write()?;
        let page = state.pages.get_mut(id).ok_or(RemoteError::NotFound)?;
        page.archived = false;
        page.last_edited_at = now;
        state.write_count += 1;
        Ok(())
    }

    async fn find_relation_by_name(
        &self,
        kind: RelationKind,
        name: &str,
    ) -> RemoteResult<Option<RelationTarget>> {
        let state = self.read()?;
        let found = match kind {
            RelationKind::Area => state.areas.iter().find(|t| t.name == name).cloned(),
            RelationKind::Person => state.people.iter().find(|t| t.name == name).cloned(),
            RelationKind::Project => state
                .pages
                .values()
                .find(|page| {
                    page.kind == PageKind::Project
                        && !page.archived
                        && page.title() == Some(name)
                })
                .map(|page| RelationTarget {
                    id: page.id.clone(),
                    name: name.to_owned(),
                }),
        };
        Ok(found)
    }

    async fn list_relation_targets(&self, kind: RelationKind) -> RemoteResult<Vec<RelationTarget>> {
        let state = self.read()?;
        let targets = match kind {
            RelationKind::Area => state.areas.clone(),
            RelationKind::Person => state.people.clone(),
            RelationKind::Project => state
                .pages
                .values()
                .filter(|page| page.kind == PageKind::Project && !page.archived)
                .map(|page| RelationTarget {
                    id: page.id.clone(),
                    name: page.title().unwrap_or_default().to_owned(),
                })
                .collect(),
        };
        Ok(targets)
    }

    async fn query_relation_targets(
        &self,
        page_id: &PageId,
        property: &str,
    ) -> RemoteResult<Vec<PageId>> {
        let state = self.read()?;
        let page = state.pages.get(page_id).ok_or(RemoteError::NotFound)?;
        match page.properties.get(property) {
            Some(PropertyValue::Relation(ids)) => Ok(ids.clone()),
            _ => Ok(Vec::new()),
        }
    }

    async fn append_blocks(&self, id: &PageId, blocks: &[Block]) -> RemoteResult<()> {
        let now = self.clock.utc();
        let mut state = self.write()?;
        let page = state.pages.get_mut(id).ok_or(RemoteError::NotFound)?;
        page.body.extend(blocks.iter().cloned());
        page.last_edited_at = now;
        state.write_count += 1;
        Ok(())
    }
}
