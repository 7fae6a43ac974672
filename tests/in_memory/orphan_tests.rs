//! Eligibility loss: orphaning, deletions, and recurring flips.

use capsync::engine::domain::SyncMessage;
use capsync::store::domain::{SyncSource, SyncStatus};
use capsync::store::ports::StateStore;

use super::helpers::{Harness, item_id, seed_project, seed_tagged_item};

#[tokio::test(flavor = "multi_thread")]
async fn removing_the_tag_orphans_the_mirror() {
    let harness = Harness::new();
    seed_project(&harness, "P7", "Ops");
    let item = seed_tagged_item(&harness, "A1", "Buy gloves", "P7", &["keep-me"]);

    harness
        .sync(SyncMessage::upsert(item_id("A1"), SyncSource::Webhook))
        .await;
    let page_id = harness.task_page("A1").await.id;

    // Operator removes the sync tag at the source.
    harness
        .source
        .put_item(item.with_labels(vec!["keep-me".to_owned()]));
    harness
        .sync(SyncMessage::upsert(item_id("A1"), SyncSource::Webhook))
        .await;

    let page = harness
        .destination
        .page(&page_id)
        .expect("page should still exist");
    assert!(page.archived);
    assert!(
        page.body
            .iter()
            .any(|block| block.text().contains("Sync label was removed on"))
    );

    let state = harness.task_state("A1").await;
    assert_eq!(state.sync_status, SyncStatus::Archived);
    // State is retained for audit, never deleted.
    assert!(state.dest_page_id.is_some());

    // The remaining source labels are untouched.
    let source_item = harness
        .source
        .item(&item_id("A1"))
        .expect("item still exists");
    assert_eq!(source_item.labels, vec!["keep-me".to_owned()]);
}

#[tokio::test(flavor = "multi_thread")]
async fn source_deletion_archives_the_mirror_without_an_orphan_note() {
    let harness = Harness::new();
    seed_project(&harness, "P7", "Ops");
    seed_tagged_item(&harness, "A1", "Buy gloves", "P7", &[]);

    harness
        .sync(SyncMessage::upsert(item_id("A1"), SyncSource::Webhook))
        .await;
    let page_id = harness.task_page("A1").await.id;

    harness.source.remove_item(&item_id("A1"));
    harness
        .sync(SyncMessage::upsert(item_id("A1"), SyncSource::Webhook))
        .await;

    let page = harness
        .destination
        .page(&page_id)
        .expect("page should still exist");
    assert!(page.archived);
    assert!(
        !page
            .body
            .iter()
            .any(|block| block.text().contains("Sync label was removed on"))
    );
    assert_eq!(harness.task_state("A1").await.sync_status, SyncStatus::Archived);
}

#[tokio::test(flavor = "multi_thread")]
async fn recurring_flip_orphans_and_strips_the_tag_at_the_source() {
    let harness = Harness::new();
    seed_project(&harness, "P7", "Ops");
    let item = seed_tagged_item(&harness, "A1", "Water plants", "P7", &[]);

    harness
        .sync(SyncMessage::upsert(item_id("A1"), SyncSource::Webhook))
        .await;

    harness.source.put_item(item.with_recurring(true));
    harness
        .sync(SyncMessage::upsert(item_id("A1"), SyncSource::Webhook))
        .await;

    let state = harness.task_state("A1").await;
    assert_eq!(state.sync_status, SyncStatus::Archived);
    let source_item = harness
        .source
        .item(&item_id("A1"))
        .expect("item still exists");
    assert!(!source_item.labels.iter().any(|label| label == "capsync"));
}

#[tokio::test(flavor = "multi_thread")]
async fn an_archive_message_archives_the_mirror() {
    let harness = Harness::new();
    seed_project(&harness, "P7", "Ops");
    seed_tagged_item(&harness, "A1", "Buy gloves", "P7", &[]);

    harness
        .sync(SyncMessage::upsert(item_id("A1"), SyncSource::Webhook))
        .await;
    harness
        .sync(SyncMessage::archive(item_id("A1"), SyncSource::Webhook))
        .await;

    assert_eq!(harness.task_state("A1").await.sync_status, SyncStatus::Archived);
}

#[tokio::test(flavor = "multi_thread")]
async fn a_never_mirrored_ineligible_item_is_left_alone() {
    let harness = Harness::new();
    seed_project(&harness, "P7", "Ops");
    // Tagged but recurring from the start: never mirrored.
    let item = seed_tagged_item(&harness, "A1", "Standup", "P7", &[]).with_recurring(true);
    harness.source.put_item(item);

    harness
        .sync(SyncMessage::upsert(item_id("A1"), SyncSource::Webhook))
        .await;

    assert!(
        harness
            .store
            .get_task(&item_id("A1"))
            .await
            .expect("get should succeed")
            .is_none()
    );
    assert_eq!(harness.destination.write_count(), 0);
}
