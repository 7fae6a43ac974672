//! First-sync behavior: page creation, relations, backlinks.

use capsync::destination::domain::{PageKind, PropertyValue, properties};
use capsync::engine::domain::SyncMessage;
use capsync::store::domain::{SyncSource, SyncStatus};

use super::helpers::{Harness, item_id, seed_project, seed_tagged_item};

#[tokio::test(flavor = "multi_thread")]
async fn first_sync_creates_a_fully_related_task_page() {
    let harness = Harness::new();
    let work_area = harness.destination.seed_area("WORK");
    seed_project(&harness, "P7", "Ops");
    seed_tagged_item(&harness, "A1", "Buy gloves", "P7", &["WORK 📁"]);

    harness
        .sync(SyncMessage::upsert(item_id("A1"), SyncSource::Webhook))
        .await;

    let page = harness.task_page("A1").await;
    assert_eq!(page.title(), Some("Buy gloves"));
    assert_eq!(
        page.properties.get(properties::AREAS),
        Some(&PropertyValue::Relation(vec![work_area]))
    );
    assert_eq!(
        page.properties.get(properties::PEOPLE),
        Some(&PropertyValue::Relation(Vec::new()))
    );

    // The project was materialized and related.
    let projects = harness.destination.pages_of_kind(PageKind::Project);
    assert_eq!(projects.len(), 1);
    let project_page = projects.first().expect("project page exists");
    assert_eq!(project_page.title(), Some("Ops"));
    assert_eq!(
        page.properties.get(properties::PROJECT),
        Some(&PropertyValue::Relation(vec![project_page.id.clone()]))
    );

    let state = harness.task_state("A1").await;
    assert_eq!(state.sync_status, SyncStatus::Ok);
    assert_eq!(state.sync_source, SyncSource::Webhook);
    assert_eq!(state.dest_page_id, Some(page.id));
    assert!(state.payload_hash.is_some());
    assert!(state.last_synced_at.is_some());
}

#[tokio::test(flavor = "multi_thread")]
async fn first_sync_appends_both_backlinks_to_the_source_description() {
    let harness = Harness::new();
    seed_project(&harness, "P7", "Ops");
    seed_tagged_item(&harness, "A1", "Buy gloves", "P7", &[]);

    harness
        .sync(SyncMessage::upsert(item_id("A1"), SyncSource::Webhook))
        .await;

    let page = harness.task_page("A1").await;
    let project_page = harness
        .destination
        .pages_of_kind(PageKind::Project)
        .into_iter()
        .next()
        .expect("project page exists");

    let item = harness
        .source
        .item(&item_id("A1"))
        .expect("item still exists");
    assert!(item.description.contains(&page.url));
    assert!(item.description.contains(&project_page.url));
    assert!(item.description.contains("---"));
}

#[tokio::test(flavor = "multi_thread")]
async fn unknown_area_is_dropped_but_the_sync_succeeds() {
    let harness = Harness::new();
    seed_project(&harness, "P7", "Ops");
    seed_tagged_item(&harness, "A2", "Feed zebra", "P7", &["ZEBRA 📁"]);

    harness
        .sync(SyncMessage::upsert(item_id("A2"), SyncSource::Webhook))
        .await;

    let page = harness.task_page("A2").await;
    assert_eq!(
        page.properties.get(properties::AREAS),
        Some(&PropertyValue::Relation(Vec::new()))
    );
    // The unknown label passes through to the multi-select instead.
    assert_eq!(
        page.properties.get(properties::LABELS),
        Some(&PropertyValue::MultiSelect(vec!["ZEBRA 📁".to_owned()]))
    );
    assert_eq!(harness.task_state("A2").await.sync_status, SyncStatus::Ok);
}

#[tokio::test(flavor = "multi_thread")]
async fn person_labels_resolve_against_seeded_people() {
    let harness = Harness::new();
    let jane = harness.destination.seed_person("Jane Doe");
    let _mark = harness.destination.seed_person("Mark Twain");
    seed_project(&harness, "P7", "Ops");
    seed_tagged_item(&harness, "A3", "Pair with Jane", "P7", &["@Jane Doe"]);

    harness
        .sync(SyncMessage::upsert(item_id("A3"), SyncSource::Webhook))
        .await;

    let page = harness.task_page("A3").await;
    assert_eq!(
        page.properties.get(properties::PEOPLE),
        Some(&PropertyValue::Relation(vec![jane]))
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn inline_snapshots_skip_the_item_fetch() {
    let harness = Harness::new();
    seed_project(&harness, "P7", "Ops");
    let item = seed_tagged_item(&harness, "A4", "From snapshot", "P7", &[]);

    harness
        .sync(SyncMessage::upsert(item_id("A4"), SyncSource::Reconciler).with_snapshot(item))
        .await;

    assert_eq!(harness.task_page("A4").await.title(), Some("From snapshot"));
}
