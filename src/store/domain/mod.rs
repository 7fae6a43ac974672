//! Domain model for persisted synchronization state.

mod state;

pub use state::{
    ParseSyncSourceError, ParseSyncStatusError, ProjectSyncState, SyncSource, SyncStatus,
    TaskSyncState,
};
