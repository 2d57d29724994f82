//! Advisory intra-process locks keyed by record or section name.

use std::{collections::HashMap, sync::Arc};

use parking_lot::{lock_api::ArcMutexGuard, Mutex, RawMutex};

/// A held key lock. The lock is released when the guard is dropped.
pub type KeyLockGuard = ArcMutexGuard<RawMutex, ()>;

/// A table of mutual exclusion locks, one per key.
///
/// Locks are created lazily on first acquisition and are never removed.
/// They only serialise threads of the current process; they provide no protection against other processes
/// touching the same store directory.
///
/// Acquisition blocks without a timeout. Callers must not hold one key while acquiring another in an order
/// which another caller could reverse.
#[derive(Debug, Default)]
pub struct KeyLocks {
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl KeyLocks {
    /// Create an empty lock table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn get_key_mutex(&self, key: &str) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock();
        let lock = locks
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Mutex::default()))
            .clone();
        drop(locks);
        lock
    }

    /// Acquire the lock for `key`, blocking until it is available.
    pub fn acquire(&self, key: &str) -> KeyLockGuard {
        tracing::trace!(key, "acquiring key lock");
        self.get_key_mutex(key).lock_arc()
    }

    /// The number of keys which have ever been locked.
    #[must_use]
    pub fn len(&self) -> usize {
        self.locks.lock().len()
    }

    /// Returns true if no key has ever been locked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
