//! Project materialization, frozen areas, and duplicate repair.

use capsync::destination::domain::{PageKind, PropertyValue, properties};
use capsync::engine::domain::SyncMessage;
use capsync::store::domain::SyncSource;
use capsync::store::ports::StateStore;

use super::helpers::{Harness, item_id, project_id, seed_project, seed_tagged_item};

#[tokio::test(flavor = "multi_thread")]
async fn ten_items_in_a_new_project_yield_one_project_page() {
    let harness = Harness::new();
    seed_project(&harness, "P9", "Launch");
    let mut ids = Vec::new();
    for index in 0..10 {
        let id = format!("I{index}");
        seed_tagged_item(&harness, &id, &format!("Task {index}"), "P9", &[]);
        ids.push(id);
    }

    for id in &ids {
        harness
            .engine
            .enqueue(SyncMessage::upsert(item_id(id), SyncSource::Webhook))
            .await
            .expect("enqueue should succeed");
    }
    harness.engine.drain().await.expect("drain should succeed");

    let projects = harness.destination.pages_of_kind(PageKind::Project);
    assert_eq!(projects.len(), 1);
    let project_page = projects.first().expect("project page exists");
    assert_eq!(project_page.title(), Some("Launch"));

    for id in &ids {
        let page = harness.task_page(id).await;
        assert_eq!(
            page.properties.get(properties::PROJECT),
            Some(&PropertyValue::Relation(vec![project_page.id.clone()]))
        );
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn project_areas_are_frozen_at_creation() {
    let harness = Harness::new();
    let work = harness.destination.seed_area("WORK");
    let _home = harness.destination.seed_area("HOME");
    seed_project(&harness, "P9", "Launch");
    seed_tagged_item(&harness, "I1", "Kickoff", "P9", &["WORK 📁"]);

    harness
        .sync(SyncMessage::upsert(item_id("I1"), SyncSource::Webhook))
        .await;

    let project_page = harness
        .destination
        .pages_of_kind(PageKind::Project)
        .into_iter()
        .next()
        .expect("project page exists");
    assert_eq!(
        project_page.properties.get(properties::AREAS),
        Some(&PropertyValue::Relation(vec![work.clone()]))
    );

    // A later child with a different area must not widen the relation.
    seed_tagged_item(&harness, "I2", "Chores", "P9", &["HOME"]);
    harness
        .sync(SyncMessage::upsert(item_id("I2"), SyncSource::Webhook))
        .await;

    let after = harness
        .destination
        .page(&project_page.id)
        .expect("project page still exists");
    assert_eq!(
        after.properties.get(properties::AREAS),
        Some(&PropertyValue::Relation(vec![work]))
    );

    let state = harness
        .store
        .get_project(&project_id("P9"))
        .await
        .expect("get should succeed")
        .expect("project state exists");
    assert!(state.areas_frozen_at.is_some());
}

#[tokio::test(flavor = "multi_thread")]
async fn duplicate_task_pages_are_repaired_to_the_oldest() {
    use capsync::destination::ports::DestinationAdapter;

    let harness = Harness::new();
    seed_project(&harness, "P7", "Ops");
    seed_tagged_item(&harness, "A1", "Buy gloves", "P7", &[]);

    // Two stray pages for the same item, oldest first.
    let payload = capsync::destination::domain::PagePayload::new().with_property(
        properties::TITLE,
        PropertyValue::Title("stray".to_owned()),
    );
    let oldest = harness
        .destination
        .create_page(PageKind::Task, "A1", &payload)
        .await
        .expect("create should succeed");
    let newer = harness
        .destination
        .create_page(PageKind::Task, "A1", &payload)
        .await
        .expect("create should succeed");

    harness
        .sync(SyncMessage::upsert(item_id("A1"), SyncSource::Webhook))
        .await;

    let canonical = harness.task_page("A1").await;
    assert_eq!(canonical.id, oldest.id);
    assert_eq!(canonical.title(), Some("Buy gloves"));
    assert!(
        harness
            .destination
            .page(&newer.id)
            .expect("duplicate still stored")
            .archived
    );
    assert_eq!(harness.task_state("A1").await.dest_page_id, Some(oldest.id));
}

#[tokio::test(flavor = "multi_thread")]
async fn items_in_the_inbox_are_never_materialized() {
    let harness = Harness::new();
    let inbox = capsync::source::domain::SourceProject::new(project_id("INBOX"), "Inbox")
        .with_inbox(true);
    harness.source.put_project(inbox);
    seed_tagged_item(&harness, "A1", "Inbox thing", "INBOX", &[]);

    harness
        .sync(SyncMessage::upsert(item_id("A1"), SyncSource::Webhook))
        .await;

    assert!(harness.destination.pages_of_kind(PageKind::Project).is_empty());
    assert!(harness.destination.pages_of_kind(PageKind::Task).is_empty());
}
