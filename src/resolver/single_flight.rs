//! Keyed mutex table for single-flight sections.

use std::collections::HashMap;
use std::sync::{Mutex as StdMutex, PoisonError};
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// A table of per-key async mutexes.
///
/// Acquiring the same key serializes callers; distinct keys proceed
/// concurrently. Guards are held across suspension points, which is the
/// point: exactly one creation per logical name survives concurrent
/// worker pressure.
#[derive(Debug, Default)]
pub struct KeyedLocks {
    inner: StdMutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl KeyedLocks {
    /// Creates an empty lock table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquires the lock for `key`, creating it on first use.
    pub async fn acquire(&self, key: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut table = self
                .inner
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            Arc::clone(
                table
                    .entry(key.to_owned())
                    .or_insert_with(|| Arc::new(Mutex::new(()))),
            )
        };
        lock.lock_owned().await
    }
}
