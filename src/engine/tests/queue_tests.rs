//! In-memory queue lease semantics tests.

use crate::engine::adapters::memory::InMemoryMessageQueue;
use crate::engine::domain::SyncMessage;
use crate::engine::ports::{MessageQueue, QueueError};
use crate::source::domain::ItemId;
use crate::store::domain::SyncSource;
use rstest::{fixture, rstest};

#[fixture]
fn queue() -> InMemoryMessageQueue {
    InMemoryMessageQueue::new()
}

fn message(id: &str) -> SyncMessage {
    SyncMessage::upsert(ItemId::new(id).expect("valid id"), SyncSource::Webhook)
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn dequeue_leases_in_fifo_order(queue: InMemoryMessageQueue) {
    queue.enqueue(message("a1")).await.expect("enqueue should succeed");
    queue.enqueue(message("a2")).await.expect("enqueue should succeed");

    let first = queue
        .dequeue()
        .await
        .expect("dequeue should succeed")
        .expect("message should be available");
    assert_eq!(first.message.source_item_id.as_str(), "a1");
    assert_eq!(queue.depth().await.expect("depth should succeed"), 1);
    assert_eq!(queue.in_flight().await.expect("in_flight should succeed"), 1);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn ack_retires_the_lease(queue: InMemoryMessageQueue) {
    queue.enqueue(message("a1")).await.expect("enqueue should succeed");
    let delivery = queue
        .dequeue()
        .await
        .expect("dequeue should succeed")
        .expect("message should be available");

    queue.ack(delivery.receipt).await.expect("ack should succeed");
    assert_eq!(queue.in_flight().await.expect("in_flight should succeed"), 0);
    assert!(matches!(
        queue.ack(delivery.receipt).await,
        Err(QueueError::UnknownReceipt(_))
    ));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn nack_returns_the_message_for_redelivery(queue: InMemoryMessageQueue) {
    queue.enqueue(message("a1")).await.expect("enqueue should succeed");
    let mut delivery = queue
        .dequeue()
        .await
        .expect("dequeue should succeed")
        .expect("message should be available");

    delivery.message.attempt = 1;
    queue.nack(delivery).await.expect("nack should succeed");

    let redelivered = queue
        .dequeue()
        .await
        .expect("dequeue should succeed")
        .expect("message should be available");
    assert_eq!(redelivered.message.attempt, 1);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn empty_queue_returns_none(queue: InMemoryMessageQueue) {
    assert!(queue.dequeue().await.expect("dequeue should succeed").is_none());
}
