//! Poison-tolerant access to `std::sync` locks.
//!
//! Every shared structure in the workspace guards its state with exactly one
//! short-lived `std::sync` primitive that is never held across an `.await`.
//! A poisoned lock only means a previous holder panicked mid-section; the
//! guarded data is still structurally valid, so these helpers recover the
//! guard instead of propagating the panic.

use std::sync::{Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Acquire a mutex, recovering the guard if the lock is poisoned.
pub fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Acquire a shared read section, recovering the guard if poisoned.
pub fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

/// Acquire an exclusive write section, recovering the guard if poisoned.
pub fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[test]
    fn recovers_poisoned_mutex() {
        let shared = Arc::new(Mutex::new(5_u32));
        let clone = Arc::clone(&shared);
        let _ = std::thread::spawn(move || {
            let _guard = clone.lock();
            #[allow(clippy::panic)]
            {
                panic!("poison the lock");
            }
        })
        .join();

        assert!(shared.is_poisoned());
        assert_eq!(*lock(&shared), 5);
    }

    #[test]
    fn read_and_write_sections() {
        let shared = RwLock::new(vec![1_u8]);
        write(&shared).push(2);
        assert_eq!(read(&shared).len(), 2);
    }
}
