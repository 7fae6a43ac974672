//! Port contracts for the synchronization engine.

pub mod queue;

pub use queue::{Delivery, MessageQueue, QueueError, QueueResult};
