//! Replay and storm suppression: unchanged payloads never rewrite.

use capsync::engine::domain::SyncMessage;
use capsync::store::domain::SyncSource;

use super::helpers::{Harness, item_id, seed_project, seed_tagged_item};

#[tokio::test(flavor = "multi_thread")]
async fn replaying_an_unchanged_item_performs_no_destination_write() {
    let harness = Harness::new();
    seed_project(&harness, "P7", "Ops");
    seed_tagged_item(&harness, "A1", "Buy gloves", "P7", &[]);

    harness
        .sync(SyncMessage::upsert(item_id("A1"), SyncSource::Webhook))
        .await;
    let state_before = harness.task_state("A1").await;
    let writes_before = harness.destination.write_count();

    harness
        .sync(SyncMessage::upsert(item_id("A1"), SyncSource::Reconciler))
        .await;

    assert_eq!(harness.destination.write_count(), writes_before);
    let state_after = harness.task_state("A1").await;
    assert_eq!(state_after.payload_hash, state_before.payload_hash);
    assert_eq!(state_after.sync_source, SyncSource::Reconciler);
    assert!(state_after.last_synced_at >= state_before.last_synced_at);
}

#[tokio::test(flavor = "multi_thread")]
async fn a_webhook_storm_for_one_item_writes_once_per_unique_payload() {
    let harness = Harness::new();
    seed_project(&harness, "P7", "Ops");
    seed_tagged_item(&harness, "A1", "Buy gloves", "P7", &[]);

    for _ in 0..5 {
        harness
            .engine
            .enqueue(SyncMessage::upsert(item_id("A1"), SyncSource::Webhook))
            .await
            .expect("enqueue should succeed");
    }
    harness.engine.drain().await.expect("drain should succeed");
    let writes_after_storm = harness.destination.write_count();

    // One more replay adds nothing.
    harness
        .sync(SyncMessage::upsert(item_id("A1"), SyncSource::Webhook))
        .await;
    assert_eq!(harness.destination.write_count(), writes_after_storm);
}

#[tokio::test(flavor = "multi_thread")]
async fn source_changes_do_rewrite_the_page() {
    let harness = Harness::new();
    seed_project(&harness, "P7", "Ops");
    let item = seed_tagged_item(&harness, "A1", "Buy gloves", "P7", &[]);

    harness
        .sync(SyncMessage::upsert(item_id("A1"), SyncSource::Webhook))
        .await;
    let hash_before = harness.task_state("A1").await.payload_hash;

    harness
        .source
        .put_item(item.with_description("now with sizes"));
    harness
        .sync(SyncMessage::upsert(item_id("A1"), SyncSource::Webhook))
        .await;

    let state = harness.task_state("A1").await;
    assert_ne!(state.payload_hash, hash_before);
    let page = harness.task_page("A1").await;
    assert!(
        page.body
            .iter()
            .any(|block| block.text().contains("now with sizes"))
    );
}
