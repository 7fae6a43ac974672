//! Orchestration services for the synchronization engine.

mod engine;
mod projects;
mod reconciler;
mod worker;

pub use engine::{EngineError, SyncEngine};
pub use projects::ProjectFlows;
pub use reconciler::{ReconcileError, Reconciler};
pub use worker::{SyncWorker, WorkerError, WorkerOutcome};
