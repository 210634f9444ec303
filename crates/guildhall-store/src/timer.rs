//! Deferred callback service.
//!
//! Trading post restocks and ability reverts are scheduled here instead of
//! on raw detached tasks. Every callback runs on the runtime captured at
//! construction, is tracked in a [`JoinSet`], and is aborted by
//! [`TimerService::shutdown`]. Callbacks are responsible for their own
//! liveness checks at fire time.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use guildhall_types::sync;
use tokio::runtime::Handle;
use tokio::task::JoinSet;
use tracing::debug;

use crate::error::StoreError;

#[derive(Debug)]
struct TimerInner {
    handle: Handle,
    closed: AtomicBool,
    tasks: Mutex<JoinSet<()>>,
}

/// Cloneable handle to a shared timer service.
#[derive(Debug, Clone)]
pub struct TimerService {
    inner: Arc<TimerInner>,
}

impl TimerService {
    /// Create a timer service bound to the current tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NoRuntime`] when called outside a runtime.
    pub fn new() -> Result<Self, StoreError> {
        let handle = Handle::try_current().map_err(|e| StoreError::NoRuntime {
            reason: e.to_string(),
        })?;
        Ok(Self::with_handle(handle))
    }

    /// Create a timer service bound to an explicit runtime handle.
    pub fn with_handle(handle: Handle) -> Self {
        Self {
            inner: Arc::new(TimerInner {
                handle,
                closed: AtomicBool::new(false),
                tasks: Mutex::new(JoinSet::new()),
            }),
        }
    }

    /// Run `callback` once after `delay`.
    ///
    /// Returns `false` (and drops the callback) if the service has been shut
    /// down.
    pub fn schedule<F>(&self, delay: Duration, callback: F) -> bool
    where
        F: FnOnce() + Send + 'static,
    {
        if self.inner.closed.load(Ordering::Acquire) {
            debug!(?delay, "timer service closed; callback dropped");
            return false;
        }
        let mut tasks = sync::lock(&self.inner.tasks);
        reap(&mut tasks);
        tasks.spawn_on(
            async move {
                tokio::time::sleep(delay).await;
                callback();
            },
            &self.inner.handle,
        );
        true
    }

    /// Number of callbacks that have not fired yet.
    pub fn pending(&self) -> usize {
        let mut tasks = sync::lock(&self.inner.tasks);
        reap(&mut tasks);
        tasks.len()
    }

    /// Whether [`shutdown`](Self::shutdown) has been called.
    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::Acquire)
    }

    /// Cancel every pending callback and refuse new ones.
    pub fn shutdown(&self) {
        self.inner.closed.store(true, Ordering::Release);
        let mut tasks = sync::lock(&self.inner.tasks);
        let cancelled = tasks.len();
        tasks.abort_all();
        debug!(cancelled, "timer service shut down");
    }
}

/// Drop bookkeeping for callbacks that already completed.
fn reap(tasks: &mut JoinSet<()>) {
    while let Some(result) = tasks.try_join_next() {
        if let Err(e) = result
            && e.is_panic()
        {
            debug!(error = %e, "timer callback panicked");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicU32;

    use super::*;

    #[tokio::test(start_paused = true)]
    async fn fires_after_delay() {
        let timers = TimerService::new().unwrap_or_else(|_| TimerService::with_handle(Handle::current()));
        let fired = Arc::new(AtomicU32::new(0));
        let f = Arc::clone(&fired);
        assert!(timers.schedule(Duration::from_secs(3), move || {
            f.fetch_add(1, Ordering::SeqCst);
        }));

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
        assert_eq!(timers.pending(), 1);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert_eq!(timers.pending(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_cancels_pending() {
        let timers = TimerService::with_handle(Handle::current());
        let fired = Arc::new(AtomicU32::new(0));
        let f = Arc::clone(&fired);
        assert!(timers.schedule(Duration::from_secs(1), move || {
            f.fetch_add(1, Ordering::SeqCst);
        }));

        timers.shutdown();
        tokio::time::sleep(Duration::from_secs(5)).await;

        assert_eq!(fired.load(Ordering::SeqCst), 0);
        assert!(timers.is_closed());
        assert!(!timers.schedule(Duration::from_secs(1), || {}));
    }

    #[test]
    fn new_outside_runtime_fails() {
        assert!(matches!(
            TimerService::new(),
            Err(StoreError::NoRuntime { .. })
        ));
    }
}
