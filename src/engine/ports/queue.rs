//! Durable message queue contract.

use crate::engine::domain::SyncMessage;
use async_trait::async_trait;
use thiserror::Error;

/// Result type for queue operations.
pub type QueueResult<T> = Result<T, QueueError>;

/// Errors returned by queue implementations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum QueueError {
    /// The queue backend rejected or lost the operation.
    #[error("queue failure: {0}")]
    Failure(String),

    /// The delivery receipt is unknown (double ack or expired lease).
    #[error("unknown delivery receipt: {0}")]
    UnknownReceipt(u64),
}

/// One leased message awaiting acknowledgement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    /// Lease receipt used to ack or nack this delivery.
    pub receipt: u64,
    /// The leased message.
    pub message: SyncMessage,
}

/// At-least-once delivery queue for sync messages.
///
/// `dequeue` leases a message; `ack` retires it and `nack` returns it to
/// the queue for redelivery. Depth and in-flight counts feed the
/// reconciler's backpressure check.
#[async_trait]
pub trait MessageQueue: Send + Sync {
    /// Appends a message.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError`] when the backend rejects the message.
    async fn enqueue(&self, message: SyncMessage) -> QueueResult<()>;

    /// Leases the next message, or returns `None` when the queue is empty.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError`] on backend failure.
    async fn dequeue(&self) -> QueueResult<Option<Delivery>>;

    /// Retires a leased message.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::UnknownReceipt`] for stale receipts.
    async fn ack(&self, receipt: u64) -> QueueResult<()>;

    /// Returns a leased message to the queue for redelivery. The message
    /// is requeued exactly as passed; callers adjust the attempt counter
    /// before nacking when the redelivery follows a failure.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::UnknownReceipt`] for stale receipts.
    async fn nack(&self, delivery: Delivery) -> QueueResult<()>;

    /// Number of messages waiting for a lease.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError`] on backend failure.
    async fn depth(&self) -> QueueResult<usize>;

    /// Number of currently leased messages.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError`] on backend failure.
    async fn in_flight(&self) -> QueueResult<usize>;
}
