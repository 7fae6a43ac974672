//! Worker pool lifecycle: concurrent draining and cooperative shutdown.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

use capsync::engine::domain::SyncMessage;
use capsync::engine::ports::MessageQueue;
use capsync::store::domain::{SyncSource, SyncStatus};

use super::helpers::{Harness, item_id, seed_project, seed_tagged_item};

#[tokio::test(flavor = "multi_thread")]
async fn the_pool_drains_the_queue_and_stops_on_shutdown() {
    let harness = Harness::new();
    seed_project(&harness, "P7", "Ops");
    for index in 0..6 {
        let id = format!("A{index}");
        seed_tagged_item(&harness, &id, &format!("Task {index}"), "P7", &[]);
        harness
            .engine
            .enqueue(SyncMessage::upsert(item_id(&id), SyncSource::Webhook))
            .await
            .expect("enqueue should succeed");
    }

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let pool = tokio::spawn(Arc::clone(&harness.engine).run(shutdown_rx));

    // Wait for the pool to finish all outstanding work.
    let deadline = tokio::time::Instant::now() + Duration::from_secs(10);
    loop {
        let depth = harness.queue.depth().await.expect("depth should succeed");
        let in_flight = harness
            .queue
            .in_flight()
            .await
            .expect("in_flight should succeed");
        if depth == 0 && in_flight == 0 {
            break;
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "pool did not drain in time"
        );
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    shutdown_tx.send(true).expect("shutdown signal should send");
    pool.await.expect("pool should join cleanly");

    for index in 0..6 {
        let state = harness.task_state(&format!("A{index}")).await;
        assert_eq!(state.sync_status, SyncStatus::Ok);
    }
}
