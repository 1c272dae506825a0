use std::sync::{LockResult, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::warn;

/// Acquire a read guard, recovering the data if a writer panicked.
pub(crate) fn read_or_recover<'a, T>(lock: &'a RwLock<T>, op: &'static str) -> RwLockReadGuard<'a, T> {
    recover(lock.read(), op, "rwlock.read")
}

/// Acquire a write guard, recovering the data if a writer panicked.
pub(crate) fn write_or_recover<'a, T>(
    lock: &'a RwLock<T>,
    op: &'static str,
) -> RwLockWriteGuard<'a, T> {
    recover(lock.write(), op, "rwlock.write")
}

fn recover<G>(result: LockResult<G>, op: &'static str, lock_kind: &'static str) -> G {
    result.unwrap_or_else(|poisoned| {
        warn!(
            op,
            lock_kind,
            result = "poisoned_recovered",
            hint = "cache contents may be stale after a panic in another thread",
            "Recovered from poisoned cache lock"
        );
        poisoned.into_inner()
    })
}

#[cfg(test)]
mod tests {
    use std::panic::{AssertUnwindSafe, catch_unwind};

    use super::*;

    #[test]
    fn poisoned_lock_is_recovered() {
        let lock = RwLock::new(1);
        let _ = catch_unwind(AssertUnwindSafe(|| {
            let _guard = lock.write().expect("first acquisition");
            panic!("poison the lock");
        }));
        assert!(lock.is_poisoned());

        *write_or_recover(&lock, "test.write") += 1;
        assert_eq!(*read_or_recover(&lock, "test.read"), 2);
    }
}
