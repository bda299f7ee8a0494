use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Mutual-exclusion flag for the balance request.
///
/// Only one guard can exist at a time. The flag clears when the guard is
/// dropped, whether the job finished, failed or panicked.
#[derive(Clone, Default)]
pub struct BusyLock {
    inner: Arc<Mutex<()>>,
}

/// Proof that the holder owns the busy flag.
pub struct BusyGuard {
    _guard: OwnedMutexGuard<()>,
}

impl BusyLock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the flag, or `None` if another request already holds it.
    pub fn try_acquire(&self) -> Option<BusyGuard> {
        self.inner
            .clone()
            .try_lock_owned()
            .ok()
            .map(|guard| BusyGuard { _guard: guard })
    }

    pub fn is_busy(&self) -> bool {
        self.inner.try_lock().is_err()
    }
}
