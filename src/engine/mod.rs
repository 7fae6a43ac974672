//! Event-driven synchronization engine.
//!
//! Webhook events are translated into [`domain::SyncMessage`]s and pushed
//! onto a durable queue; a fixed pool of workers drains the queue through
//! the classify → fetch → map → resolve → write → persist pipeline. The
//! periodic reconciler enqueues the same messages, so every invariant is
//! enforced in one place. The module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
