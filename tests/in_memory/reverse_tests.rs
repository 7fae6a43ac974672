//! The two narrow destination-to-source edges: project name and status.

use capsync::engine::domain::SyncMessage;
use capsync::store::domain::SyncSource;
use capsync::store::ports::StateStore;

use super::helpers::{Harness, item_id, project_id, seed_project, seed_tagged_item};

async fn mirrored_harness() -> Harness {
    let harness = Harness::new();
    seed_project(&harness, "P7", "Ops");
    seed_tagged_item(&harness, "A1", "One", "P7", &[]);
    harness
        .sync(SyncMessage::upsert(item_id("A1"), SyncSource::Webhook))
        .await;
    harness
}

#[tokio::test(flavor = "multi_thread")]
async fn a_destination_rename_flows_back_to_the_source() {
    let harness = mirrored_harness().await;
    let state = harness
        .store
        .get_project(&project_id("P7"))
        .await
        .expect("get should succeed")
        .expect("project state exists");

    // Operator renames the project page in the destination.
    harness.destination.edit_title(&state.dest_page_id, "Operations");

    harness
        .engine
        .reconcile()
        .await
        .expect("reconcile should succeed");

    let project = harness
        .source
        .project(&project_id("P7"))
        .expect("project still exists");
    assert_eq!(project.name, "Operations");

    let updated = harness
        .store
        .get_project(&project_id("P7"))
        .await
        .expect("get should succeed")
        .expect("project state exists");
    assert_eq!(
        updated.name_last_written_source.as_deref(),
        Some("Operations")
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn a_destination_status_flip_archives_the_source_project() {
    use capsync::destination::domain::properties;

    let harness = mirrored_harness().await;
    let state = harness
        .store
        .get_project(&project_id("P7"))
        .await
        .expect("get should succeed")
        .expect("project state exists");

    harness
        .destination
        .edit_status(&state.dest_page_id, properties::STATUS_ARCHIVED);

    harness
        .engine
        .reconcile()
        .await
        .expect("reconcile should succeed");

    let project = harness
        .source
        .project(&project_id("P7"))
        .expect("project still exists");
    assert!(project.is_archived);
}

#[tokio::test(flavor = "multi_thread")]
async fn an_untouched_project_page_triggers_no_reverse_write() {
    let harness = mirrored_harness().await;
    let name_before = harness
        .source
        .project(&project_id("P7"))
        .expect("project exists")
        .name;

    harness
        .engine
        .reconcile()
        .await
        .expect("reconcile should succeed");
    harness.engine.drain().await.expect("drain should succeed");

    let project = harness
        .source
        .project(&project_id("P7"))
        .expect("project still exists");
    assert_eq!(project.name, name_before);
    let state = harness
        .store
        .get_project(&project_id("P7"))
        .await
        .expect("get should succeed")
        .expect("project state exists");
    assert!(state.name_last_written_source.is_none());
}

#[tokio::test(flavor = "multi_thread")]
async fn a_rename_matching_the_echo_hash_is_suppressed() {
    use capsync::mapping::digest_value;

    let harness = mirrored_harness().await;
    let state = harness
        .store
        .get_project(&project_id("P7"))
        .await
        .expect("get should succeed")
        .expect("project state exists");

    // Pretend the engine itself just wrote this rename intention.
    let intention = digest_value(&serde_json::json!({
        "project": "P7",
        "rename": "Operations",
    }))
    .expect("intention hashes");
    harness
        .store
        .upsert_project(
            &project_id("P7"),
            state.clone(),
            Box::new(move |row| {
                row.echo_hash = Some(intention);
            }),
        )
        .await
        .expect("upsert should succeed");

    harness.destination.edit_title(&state.dest_page_id, "Operations");
    harness
        .engine
        .reconcile()
        .await
        .expect("reconcile should succeed");

    // The echo was recognized: the source keeps its original name.
    let project = harness
        .source
        .project(&project_id("P7"))
        .expect("project still exists");
    assert_eq!(project.name, "Ops");
}
