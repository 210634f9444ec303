//! Run control state shared by the supervisor and its background tasks.
//!
//! The supervisor flips the flags; the loot generator, the world-event
//! generator and the monitor read them between iterations through
//! [`ControlState::pace`]. Heroes are not gated here: the supervisor stops
//! and relaunches them directly.
//!
//! # Architecture
//!
//! Flags are atomics so the background loops read them without locks. Each
//! wait registers its [`Notify`] interest before checking the flag it waits
//! on, so a resume or stop that lands between the check and the wait still
//! wakes it.

use std::sync::OnceLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use guildhall_types::Outcome;
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, Notify};
use tracing::info;

/// Reason why a run ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EndReason {
    /// The world reached victory or defeat.
    Decided {
        /// The recorded outcome.
        outcome: Outcome,
    },
    /// Every hero has fallen.
    AllHeroesFallen,
    /// Reached the configured `max_real_time_seconds` limit.
    TimeLimitReached,
    /// An operator issued a stop command.
    OperatorStop,
}

impl core::fmt::Display for EndReason {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Decided {
                outcome: Outcome::Victory { champion },
            } => write!(f, "victory, championed by {champion}"),
            Self::Decided {
                outcome: Outcome::Defeat { reason },
            } => write!(f, "defeat ({reason:?})"),
            Self::AllHeroesFallen => f.write_str("every hero has fallen"),
            Self::TimeLimitReached => f.write_str("time limit reached"),
            Self::OperatorStop => f.write_str("stopped by the operator"),
        }
    }
}

/// Shared run control state.
#[derive(Debug)]
pub struct ControlState {
    /// Whether background tasks should hold.
    paused: AtomicBool,

    /// Wakes tasks held by [`wait_if_paused`](Self::wait_if_paused).
    resume_notify: Notify,

    /// Whether a stop has been requested.
    stop_requested: AtomicBool,

    /// Wakes tasks sleeping in [`sleep_unless_stopped`](Self::sleep_unless_stopped).
    stop_notify: Notify,

    /// Wall-clock time when the run started.
    started_at: OnceLock<DateTime<Utc>>,

    /// Maximum wall-clock seconds (0 = unlimited).
    max_real_time_seconds: u64,

    /// Reason the run ended, if it has.
    end_reason: Mutex<Option<EndReason>>,

    /// Wakes [`wait_for_end`](Self::wait_for_end).
    end_notify: Notify,
}

impl ControlState {
    /// Create control state for a run bounded by `max_real_time_seconds`.
    pub fn new(max_real_time_seconds: u64) -> Self {
        Self {
            paused: AtomicBool::new(false),
            resume_notify: Notify::new(),
            stop_requested: AtomicBool::new(false),
            stop_notify: Notify::new(),
            started_at: OnceLock::new(),
            max_real_time_seconds,
            end_reason: Mutex::new(None),
            end_notify: Notify::new(),
        }
    }

    // -----------------------------------------------------------------------
    // Pause / Resume
    // -----------------------------------------------------------------------

    /// Check whether the run is paused.
    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::Acquire)
    }

    /// Hold background tasks at their next boundary.
    pub fn pause(&self) {
        self.paused.store(true, Ordering::Release);
    }

    /// Release every held background task.
    pub fn resume(&self) {
        self.paused.store(false, Ordering::Release);
        self.resume_notify.notify_waiters();
    }

    /// Wait until the run is no longer paused or a stop is requested.
    pub async fn wait_if_paused(&self) {
        loop {
            let notified = self.resume_notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            if !self.is_paused() || self.is_stop_requested() {
                return;
            }
            notified.await;
        }
    }

    // -----------------------------------------------------------------------
    // Stop
    // -----------------------------------------------------------------------

    /// Request a clean stop and wake every waiting task.
    pub fn request_stop(&self) {
        self.stop_requested.store(true, Ordering::Release);
        self.stop_notify.notify_waiters();
        self.resume_notify.notify_waiters();
    }

    /// Check whether a stop has been requested.
    pub fn is_stop_requested(&self) -> bool {
        self.stop_requested.load(Ordering::Acquire)
    }

    /// Sleep for `duration`. Returns `false` as soon as a stop is requested.
    pub async fn sleep_unless_stopped(&self, duration: Duration) -> bool {
        let notified = self.stop_notify.notified();
        tokio::pin!(notified);
        notified.as_mut().enable();
        if self.is_stop_requested() {
            return false;
        }
        tokio::select! {
            () = tokio::time::sleep(duration) => true,
            () = &mut notified => false,
        }
    }

    /// One background iteration gate: wait out a pause, sleep `every`,
    /// wait out a pause begun during the sleep.
    ///
    /// Returns `false` once the task should exit.
    pub async fn pace(&self, every: Duration) -> bool {
        self.wait_if_paused().await;
        if !self.sleep_unless_stopped(every).await {
            return false;
        }
        self.wait_if_paused().await;
        !self.is_stop_requested()
    }

    // -----------------------------------------------------------------------
    // End of run
    // -----------------------------------------------------------------------

    /// Record why the run ended. Only the first reason sticks.
    ///
    /// Returns whether this call recorded it.
    pub async fn finish(&self, reason: EndReason) -> bool {
        {
            let mut guard = self.end_reason.lock().await;
            if guard.is_some() {
                return false;
            }
            info!(reason = %reason, "run ended");
            *guard = Some(reason);
        }
        self.end_notify.notify_waiters();
        true
    }

    /// Get the reason the run ended, if it has.
    pub async fn end_reason(&self) -> Option<EndReason> {
        self.end_reason.lock().await.clone()
    }

    /// Wait until an end reason is recorded.
    pub async fn wait_for_end(&self) -> EndReason {
        loop {
            let notified = self.end_notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            if let Some(reason) = self.end_reason().await {
                return reason;
            }
            notified.await;
        }
    }

    // -----------------------------------------------------------------------
    // Boundaries
    // -----------------------------------------------------------------------

    /// Start the wall clock. Later calls are ignored.
    pub fn mark_started(&self) {
        let _ = self.started_at.set(Utc::now());
    }

    /// Return the wall-clock start time, once started.
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at.get().copied()
    }

    /// Return elapsed seconds since the run started (0 before).
    pub fn elapsed_seconds(&self) -> u64 {
        let Some(started_at) = self.started_at() else {
            return 0;
        };
        let elapsed = Utc::now().signed_duration_since(started_at).num_seconds();
        // `num_seconds` can be negative if clocks are weird; treat as 0.
        u64::try_from(elapsed.max(0)).unwrap_or(u64::MAX)
    }

    /// Check whether the wall-clock time limit has been reached.
    ///
    /// Returns `true` if `max_real_time_seconds > 0`, the run has started
    /// and the elapsed seconds reach the limit.
    pub fn time_limit_reached(&self) -> bool {
        self.max_real_time_seconds > 0
            && self.started_at().is_some()
            && self.elapsed_seconds() >= self.max_real_time_seconds
    }

    /// Get the configured max real-time seconds.
    pub const fn max_real_time_seconds(&self) -> u64 {
        self.max_real_time_seconds
    }
}
