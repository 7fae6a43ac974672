//! Reconciliation: drift repair, vanished items, summary accounting.

use capsync::engine::domain::SyncMessage;
use capsync::mapping::payload_hash;
use capsync::store::domain::{SyncSource, SyncStatus};

use super::helpers::{Harness, item_id, seed_project, seed_tagged_item};

#[tokio::test(flavor = "multi_thread")]
async fn reconciler_enqueues_every_tagged_item_with_a_snapshot() {
    let harness = Harness::new();
    seed_project(&harness, "P7", "Ops");
    seed_tagged_item(&harness, "A1", "One", "P7", &[]);
    seed_tagged_item(&harness, "A2", "Two", "P7", &[]);

    let summary = harness
        .engine
        .reconcile()
        .await
        .expect("reconcile should succeed");
    assert_eq!(summary.active_found, 2);
    assert_eq!(summary.upserted, 2);
    assert_eq!(summary.archived, 0);
    assert_eq!(summary.errors, 0);

    harness.engine.drain().await.expect("drain should succeed");
    assert_eq!(harness.task_state("A1").await.sync_status, SyncStatus::Ok);
    assert_eq!(harness.task_state("A2").await.sync_status, SyncStatus::Ok);
}

#[tokio::test(flavor = "multi_thread")]
async fn reconciler_archives_rows_whose_item_vanished() {
    let harness = Harness::new();
    seed_project(&harness, "P7", "Ops");
    seed_tagged_item(&harness, "A1", "One", "P7", &[]);

    harness
        .sync(SyncMessage::upsert(item_id("A1"), SyncSource::Webhook))
        .await;

    harness.source.remove_item(&item_id("A1"));
    let summary = harness
        .engine
        .reconcile()
        .await
        .expect("reconcile should succeed");
    assert_eq!(summary.archived, 1);

    harness.engine.drain().await.expect("drain should succeed");
    assert_eq!(harness.task_state("A1").await.sync_status, SyncStatus::Archived);
}

#[tokio::test(flavor = "multi_thread")]
async fn manual_destination_archive_is_repaired_by_the_next_pass() {
    let harness = Harness::new();
    seed_project(&harness, "P7", "Ops");
    seed_tagged_item(&harness, "A1", "One", "P7", &[]);

    harness
        .sync(SyncMessage::upsert(item_id("A1"), SyncSource::Webhook))
        .await;
    let page_id = harness.task_page("A1").await.id;

    // Operator archives the mirror by hand in the destination.
    harness.destination.edit_archived(&page_id, true);

    harness
        .engine
        .reconcile()
        .await
        .expect("reconcile should succeed");
    harness.engine.drain().await.expect("drain should succeed");

    let page = harness
        .destination
        .page(&page_id)
        .expect("page still exists");
    assert!(!page.archived);
    let state = harness.task_state("A1").await;
    assert_eq!(
        Some(payload_hash(&page.as_payload()).expect("payload hashes")),
        state.payload_hash
    );
    assert_eq!(state.sync_status, SyncStatus::Ok);
}

#[tokio::test(flavor = "multi_thread")]
async fn project_status_follows_the_source_archive_flag() {
    use capsync::destination::domain::{PageKind, properties};

    let harness = Harness::new();
    let project = seed_project(&harness, "P7", "Ops");
    seed_tagged_item(&harness, "A1", "One", "P7", &[]);
    harness
        .sync(SyncMessage::upsert(item_id("A1"), SyncSource::Webhook))
        .await;

    harness.source.put_project(project.with_archived(true));
    harness
        .engine
        .reconcile()
        .await
        .expect("reconcile should succeed");

    let project_page = harness
        .destination
        .pages_of_kind(PageKind::Project)
        .into_iter()
        .next()
        .expect("project page exists");
    assert_eq!(project_page.status(), Some(properties::STATUS_ARCHIVED));
}
