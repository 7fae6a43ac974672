//! Shared harness for the in-memory end-to-end tests.

use mockable::DefaultClock;
use std::sync::Arc;

use capsync::config::SyncConfig;
use capsync::destination::adapters::memory::InMemoryDestinationAdapter;
use capsync::destination::domain::{PageKind, PageRecord};
use capsync::engine::adapters::memory::InMemoryMessageQueue;
use capsync::engine::domain::SyncMessage;
use capsync::engine::services::SyncEngine;
use capsync::source::adapters::memory::InMemorySourceAdapter;
use capsync::source::domain::{ItemId, ProjectId, SourceItem, SourceProject};
use capsync::store::adapters::memory::InMemoryStateStore;
use capsync::store::domain::TaskSyncState;
use capsync::store::ports::StateStore;

/// Fully wired engine over in-memory fakes, with handles kept for
/// assertions.
pub struct Harness {
    /// Source fake.
    pub source: InMemorySourceAdapter,
    /// Destination fake.
    pub destination: InMemoryDestinationAdapter,
    /// State store fake.
    pub store: InMemoryStateStore,
    /// Queue fake.
    pub queue: InMemoryMessageQueue,
    /// The engine under test.
    pub engine: Arc<SyncEngine>,
}

impl Harness {
    /// Builds a harness with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(SyncConfig::default())
    }

    /// Builds a harness with a custom configuration.
    #[must_use]
    pub fn with_config(config: SyncConfig) -> Self {
        let source = InMemorySourceAdapter::new();
        let destination = InMemoryDestinationAdapter::new();
        let store = InMemoryStateStore::new();
        let queue = InMemoryMessageQueue::new();
        let engine = Arc::new(SyncEngine::new(
            Arc::new(source.clone()),
            Arc::new(destination.clone()),
            Arc::new(store.clone()),
            Arc::new(queue.clone()),
            Arc::new(config),
            Arc::new(DefaultClock),
        ));
        Self {
            source,
            destination,
            store,
            queue,
            engine,
        }
    }

    /// Enqueues a message and drains the queue to completion.
    pub async fn sync(&self, message: SyncMessage) {
        self.engine
            .enqueue(message)
            .await
            .expect("enqueue should succeed");
        self.engine.drain().await.expect("drain should succeed");
    }

    /// Returns the single live task page mirroring `external_id`.
    pub async fn task_page(&self, external_id: &str) -> PageRecord {
        use capsync::destination::ports::DestinationAdapter;
        let mut pages = self
            .destination
            .find_by_external_id(PageKind::Task, external_id)
            .await
            .expect("lookup should succeed");
        assert_eq!(pages.len(), 1, "expected exactly one live task page");
        pages.remove(0)
    }

    /// Returns the task sync state row for `external_id`.
    pub async fn task_state(&self, external_id: &str) -> TaskSyncState {
        self.store
            .get_task(&item_id(external_id))
            .await
            .expect("get should succeed")
            .expect("state row should exist")
    }
}

impl Default for Harness {
    fn default() -> Self {
        Self::new()
    }
}

/// Builds a validated item id.
#[must_use]
pub fn item_id(raw: &str) -> ItemId {
    ItemId::new(raw).expect("valid item id")
}

/// Builds a validated project id.
#[must_use]
pub fn project_id(raw: &str) -> ProjectId {
    ProjectId::new(raw).expect("valid project id")
}

/// Seeds a non-inbox project and returns its snapshot.
pub fn seed_project(harness: &Harness, id: &str, name: &str) -> SourceProject {
    let project = SourceProject::new(project_id(id), name);
    harness.source.put_project(project.clone());
    project
}

/// Seeds a tagged item in the given project and returns its snapshot.
pub fn seed_tagged_item(harness: &Harness, id: &str, title: &str, project: &str, extra_labels: &[&str]) -> SourceItem {
    let mut labels = vec!["capsync".to_owned()];
    labels.extend(extra_labels.iter().map(|&l| l.to_owned()));
    let item = SourceItem::new(item_id(id), title, project_id(project)).with_labels(labels);
    harness.source.put_item(item.clone());
    item
}
