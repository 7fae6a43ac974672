//! In-memory message queue for tests and single-process runs.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, PoisonError};

use crate::engine::domain::SyncMessage;
use crate::engine::ports::{Delivery, MessageQueue, QueueError, QueueResult};

/// Thread-safe in-memory implementation of [`MessageQueue`].
///
/// Leased messages are tracked until acked so `in_flight` reflects real
/// outstanding work; nacked messages return to the front of the queue.
#[derive(Debug, Clone, Default)]
pub struct InMemoryMessageQueue {
    state: Arc<Mutex<QueueState>>,
}

#[derive(Debug, Default)]
struct QueueState {
    waiting: VecDeque<SyncMessage>,
    leased: HashMap<u64, SyncMessage>,
    next_receipt: u64,
}

impl InMemoryMessageQueue {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl MessageQueue for InMemoryMessageQueue {
    async fn enqueue(&self, message: SyncMessage) -> QueueResult<()> {
        self.lock().waiting.push_back(message);
        Ok(())
    }

    async fn dequeue(&self) -> QueueResult<Option<Delivery>> {
        let mut state = self.lock();
        let Some(message) = state.waiting.pop_front() else {
            return Ok(None);
        };
        let receipt = state.next_receipt;
        state.next_receipt += 1;
        state.leased.insert(receipt, message.clone());
        Ok(Some(Delivery { receipt, message }))
    }

    async fn ack(&self, receipt: u64) -> QueueResult<()> {
        let mut state = self.lock();
        state
            .leased
            .remove(&receipt)
            .map(|_| ())
            .ok_or(QueueError::UnknownReceipt(receipt))
    }

    async fn nack(&self, delivery: Delivery) -> QueueResult<()> {
        let mut state = self.lock();
        if state.leased.remove(&delivery.receipt).is_none() {
            return Err(QueueError::UnknownReceipt(delivery.receipt));
        }
        state.waiting.push_front(delivery.message);
        Ok(())
    }

    async fn depth(&self) -> QueueResult<usize> {
        Ok(self.lock().waiting.len())
    }

    async fn in_flight(&self) -> QueueResult<usize> {
        Ok(self.lock().leased.len())
    }
}
