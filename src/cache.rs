/// In-memory warning cache shared by the scheduler and the query endpoint.
///
/// The cache holds exactly one `Snapshot` behind an `Arc`. `replace` swaps
/// the `Arc` under a write lock and `read` clones it under a read lock, so
/// a reader either sees the old snapshot or the new one in full. Readers
/// keep their `Arc` for as long as they need it; a concurrent replace does
/// not affect a snapshot already handed out.

use std::sync::{Arc, PoisonError, RwLock};

use crate::model::Snapshot;

pub struct WarningCache {
    current: RwLock<Arc<Snapshot>>,
}

impl WarningCache {
    /// Creates a cache serving the empty snapshot.
    pub fn new() -> Self {
        Self {
            current: RwLock::new(Arc::new(Snapshot::empty())),
        }
    }

    /// Atomically installs `snapshot` as the current view.
    pub fn replace(&self, snapshot: Snapshot) {
        let snapshot = Arc::new(snapshot);
        // The guarded value is a plain Arc, so a poisoned lock still holds
        // a complete snapshot.
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        *current = snapshot;
    }

    /// Returns the current snapshot.
    pub fn read(&self) -> Arc<Snapshot> {
        let current = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&current)
    }
}

impl Default for WarningCache {
    fn default() -> Self {
        Self::new()
    }
}
