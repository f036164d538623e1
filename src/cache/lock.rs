use std::sync::{Mutex, MutexGuard};

use tracing::warn;

/// Lock a store mutex, recovering the guard if a previous holder panicked.
///
/// Entries are whole, independently expiring values, so a panic mid-operation
/// can at worst leave one entry missing, which readers already handle.
pub(crate) fn mutex_lock<'a, T>(
    lock: &'a Mutex<T>,
    target: &'static str,
    op: &'static str,
) -> MutexGuard<'a, T> {
    match lock.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            warn!(
                op,
                target_module = target,
                lock_kind = "mutex.lock",
                result = "poisoned_recovered",
                hint = "an entry may be missing after panic in another thread",
                "Recovered from poisoned store lock"
            );
            poisoned.into_inner()
        }
    }
}
