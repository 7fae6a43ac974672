//! Queue message shape.

use crate::source::domain::{ItemId, SourceItem};
use crate::store::domain::SyncSource;
use serde::{Deserialize, Serialize};

/// What the worker should do for a source item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncAction {
    /// Mirror the item's current source state.
    Upsert,
    /// Archive the item's mirror.
    Archive,
}

/// One unit of work on the durable queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncMessage {
    /// Requested action.
    pub action: SyncAction,
    /// Target source item.
    pub source_item_id: ItemId,
    /// Optional inline item snapshot to avoid a re-fetch; webhook and
    /// reconciler payloads are considered fresh.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<SourceItem>,
    /// Pathway that produced the message.
    pub source: SyncSource,
    /// Delivery attempt counter, incremented on redelivery after failure.
    pub attempt: u32,
}

impl SyncMessage {
    /// Creates an upsert message.
    #[must_use]
    pub const fn upsert(source_item_id: ItemId, source: SyncSource) -> Self {
        Self {
            action: SyncAction::Upsert,
            source_item_id,
            snapshot: None,
            source,
            attempt: 0,
        }
    }

    /// Creates an archive message.
    #[must_use]
    pub const fn archive(source_item_id: ItemId, source: SyncSource) -> Self {
        Self {
            action: SyncAction::Archive,
            source_item_id,
            snapshot: None,
            source,
            attempt: 0,
        }
    }

    /// Attaches an inline snapshot.
    #[must_use]
    pub fn with_snapshot(mut self, snapshot: SourceItem) -> Self {
        self.snapshot = Some(snapshot);
        self
    }
}
