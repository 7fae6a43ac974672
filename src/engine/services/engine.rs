//! Engine wiring: worker pool, intake, classification, and health.

use mockable::Clock;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinSet;

use crate::config::SyncConfig;
use crate::destination::ports::DestinationAdapter;
use crate::engine::domain::{IntakeError, ReconcileSummary, SyncMessage, WebhookEvent, translate_event};
use crate::engine::ports::{Delivery, MessageQueue, QueueError};
use crate::resolver::{KeyedLocks, Resolver};
use crate::source::ports::SourceAdapter;
use crate::store::domain::SyncStatus;
use crate::store::ports::{StateStore, StateStoreError};

use super::projects::ProjectFlows;
use super::reconciler::{ReconcileError, Reconciler};
use super::worker::{SyncWorker, WorkerError, WorkerOutcome};

/// Pause between queue polls when no message is waiting.
const IDLE_POLL: Duration = Duration::from_millis(50);

/// Errors surfaced by engine-level operations.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Queue failure.
    #[error(transparent)]
    Queue(#[from] QueueError),

    /// State store failure.
    #[error(transparent)]
    Store(#[from] StateStoreError),

    /// Webhook translation failure.
    #[error(transparent)]
    Intake(#[from] IntakeError),
}

/// The assembled synchronization engine.
///
/// All collaborators arrive through the constructor; a test harness swaps
/// in the in-memory adapters and drives the queue deterministically.
pub struct SyncEngine {
    queue: Arc<dyn MessageQueue>,
    store: Arc<dyn StateStore>,
    worker: Arc<SyncWorker>,
    reconciler: Reconciler,
    config: Arc<SyncConfig>,
    item_locks: Arc<KeyedLocks>,
    auth_degraded: AtomicBool,
}

impl SyncEngine {
    /// Assembles the engine from its external collaborators.
    #[must_use]
    pub fn new(
        source: Arc<dyn SourceAdapter>,
        destination: Arc<dyn DestinationAdapter>,
        store: Arc<dyn StateStore>,
        queue: Arc<dyn MessageQueue>,
        config: Arc<SyncConfig>,
        clock: Arc<dyn Clock + Send + Sync>,
    ) -> Self {
        let resolver = Arc::new(Resolver::new(
            Arc::clone(&source),
            Arc::clone(&destination),
            Arc::clone(&store),
            Arc::clone(&config),
            Arc::clone(&clock),
        ));
        let worker = Arc::new(SyncWorker::new(
            Arc::clone(&source),
            Arc::clone(&destination),
            Arc::clone(&store),
            resolver,
            Arc::clone(&config),
            Arc::clone(&clock),
        ));
        let projects = Arc::new(ProjectFlows::new(
            Arc::clone(&source),
            Arc::clone(&destination),
            Arc::clone(&store),
            Arc::clone(&clock),
        ));
        let reconciler = Reconciler::new(
            source,
            Arc::clone(&store),
            Arc::clone(&queue),
            projects,
            Arc::clone(&config),
            clock,
        );
        Self {
            queue,
            store,
            worker,
            reconciler,
            config,
            item_locks: Arc::new(KeyedLocks::new()),
            auth_degraded: AtomicBool::new(false),
        }
    }

    /// Returns `false` once an authentication failure has been observed;
    /// the health endpoint reports degradation from this flag.
    #[must_use]
    pub fn healthy(&self) -> bool {
        !self.auth_degraded.load(Ordering::Relaxed)
    }

    /// Translates a webhook event and enqueues the resulting message.
    ///
    /// Returns `false` when the event family is outside the sync mapping
    /// (the intake acknowledges and drops it).
    ///
    /// # Errors
    ///
    /// Returns [`EngineError`] for unusable payloads or queue failure.
    pub async fn ingest_webhook(&self, event: &WebhookEvent) -> Result<bool, EngineError> {
        match translate_event(event) {
            Ok(message) => {
                self.queue.enqueue(message).await?;
                Ok(true)
            }
            Err(IntakeError::UnsupportedEvent(name)) => {
                tracing::debug!(event = %name, "dropping unmapped webhook event");
                Ok(false)
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Enqueues a prepared message (queue push endpoint, manual triggers).
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Queue`] when the queue rejects it.
    pub async fn enqueue(&self, message: SyncMessage) -> Result<(), EngineError> {
        self.queue.enqueue(message).await?;
        Ok(())
    }

    /// Runs one synchronous reconciliation pass.
    ///
    /// # Errors
    ///
    /// Returns [`ReconcileError`] when the pass aborts.
    pub async fn reconcile(&self) -> Result<ReconcileSummary, ReconcileError> {
        self.reconciler.run().await
    }

    /// Processes queued messages until the queue is empty, returning how
    /// many deliveries were handled. Test harnesses and the synchronous
    /// reconcile trigger drive the engine through this.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError`] on queue or store failure; per-message
    /// worker failures are classified and recorded instead.
    pub async fn drain(&self) -> Result<usize, EngineError> {
        let (_tx, cancel) = watch::channel(false);
        let mut handled = 0usize;
        while let Some(delivery) = self.queue.dequeue().await? {
            self.process_delivery(delivery, &cancel).await?;
            handled += 1;
        }
        Ok(handled)
    }

    /// Runs the worker pool until the shutdown signal flips.
    ///
    /// Spawns `worker_concurrency` tasks that poll the queue, serialize
    /// per item id, and classify outcomes. Cancellation propagates into
    /// in-flight handlers through the same signal.
    pub async fn run(self: Arc<Self>, shutdown: watch::Receiver<bool>) {
        let mut tasks = JoinSet::new();
        for worker_index in 0..self.config.worker_concurrency.max(1) {
            let engine = Arc::clone(&self);
            let cancel = shutdown.clone();
            tasks.spawn(async move {
                tracing::debug!(worker = worker_index, "worker started");
                engine.worker_loop(cancel).await;
                tracing::debug!(worker = worker_index, "worker stopped");
            });
        }
        while tasks.join_next().await.is_some() {}
    }

    async fn worker_loop(&self, cancel: watch::Receiver<bool>) {
        loop {
            if *cancel.borrow() {
                return;
            }
            match self.queue.dequeue().await {
                Ok(Some(delivery)) => {
                    if let Err(err) = self.process_delivery(delivery, &cancel).await {
                        tracing::error!(error = %err, "delivery processing failed");
                    }
                }
                Ok(None) => tokio::time::sleep(IDLE_POLL).await,
                Err(err) => {
                    tracing::error!(error = %err, "queue dequeue failed");
                    tokio::time::sleep(IDLE_POLL).await;
                }
            }
        }
    }

    /// Handles one delivery end to end: per-item serialization, worker
    /// invocation, outcome classification, ack or redelivery.
    async fn process_delivery(
        &self,
        delivery: Delivery,
        cancel: &watch::Receiver<bool>,
    ) -> Result<(), EngineError> {
        let lock_key = format!("task/{}", delivery.message.source_item_id);
        let _guard = self.item_locks.acquire(&lock_key).await;

        let outcome = self.worker.handle_message(&delivery.message, cancel).await;
        match outcome {
            Ok(WorkerOutcome::Cancelled) => {
                // No state was touched; hand the message back untouched.
                self.queue.nack(delivery).await?;
                Ok(())
            }
            Ok(_) => {
                self.queue.ack(delivery.receipt).await?;
                Ok(())
            }
            Err(err) => self.handle_failure(delivery, &err).await,
        }
    }

    async fn handle_failure(
        &self,
        mut delivery: Delivery,
        err: &WorkerError,
    ) -> Result<(), EngineError> {
        if err.is_auth() {
            self.auth_degraded.store(true, Ordering::Relaxed);
            tracing::error!(
                item = %delivery.message.source_item_id,
                error = %err,
                "authentication failure, engine degraded"
            );
            self.record_error(&delivery, err).await?;
            self.queue.ack(delivery.receipt).await?;
            return Ok(());
        }

        if err.is_retryable() {
            let next_attempt = delivery.message.attempt + 1;
            if next_attempt < self.config.retry_max {
                tracing::warn!(
                    item = %delivery.message.source_item_id,
                    attempt = next_attempt,
                    error = %err,
                    "transient failure, redelivering"
                );
                let backoff = self.config.retry_policy().delay_for(delivery.message.attempt);
                delivery.message.attempt = next_attempt;
                self.queue.nack(delivery).await?;
                tokio::time::sleep(backoff).await;
                return Ok(());
            }
        }

        tracing::error!(
            item = %delivery.message.source_item_id,
            error = %err,
            "sync failed, recording error state"
        );
        self.record_error(&delivery, err).await?;
        self.queue.ack(delivery.receipt).await?;
        Ok(())
    }

    async fn record_error(&self, delivery: &Delivery, err: &WorkerError) -> Result<(), EngineError> {
        let note = err.to_string();
        let source_kind = delivery.message.source;
        self.store
            .upsert_task(
                &delivery.message.source_item_id,
                Box::new(move |row| {
                    row.sync_status = SyncStatus::Error;
                    row.sync_source = source_kind;
                    row.error_note = Some(note);
                }),
            )
            .await?;
        Ok(())
    }
}
