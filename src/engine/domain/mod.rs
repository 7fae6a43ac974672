//! Domain model for the synchronization engine.

mod intake;
mod message;
mod summary;

pub use intake::{IntakeError, WebhookEvent, translate_event};
pub use message::{SyncAction, SyncMessage};
pub use summary::ReconcileSummary;
