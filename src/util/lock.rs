use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::warn;

/// Read guard that survives a writer having panicked while holding the lock.
pub(crate) fn read_recovering<'a, T>(
    lock: &'a RwLock<T>,
    owner: &'static str,
    op: &'static str,
) -> RwLockReadGuard<'a, T> {
    lock.read().unwrap_or_else(|poisoned| {
        warn!(
            op,
            owner,
            lock_kind = "rwlock.read",
            "recovered poisoned lock; contents may be stale"
        );
        poisoned.into_inner()
    })
}

pub(crate) fn write_recovering<'a, T>(
    lock: &'a RwLock<T>,
    owner: &'static str,
    op: &'static str,
) -> RwLockWriteGuard<'a, T> {
    lock.write().unwrap_or_else(|poisoned| {
        warn!(
            op,
            owner,
            lock_kind = "rwlock.write",
            "recovered poisoned lock; contents may be stale"
        );
        poisoned.into_inner()
    })
}
