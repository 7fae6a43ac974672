//! Reconciliation summary record.

use serde::{Deserialize, Serialize};

/// Outcome of one reconciliation pass, returned to the trigger caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ReconcileSummary {
    /// Tagged items found at the source (active and completed).
    pub active_found: usize,
    /// Upsert messages enqueued.
    pub upserted: usize,
    /// Archive messages enqueued for vanished items.
    pub archived: usize,
    /// Errors encountered during the pass itself.
    pub errors: usize,
    /// Wall-clock duration of the pass in whole seconds.
    pub duration_s: i64,
}
