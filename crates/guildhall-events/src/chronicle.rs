//! The narrative chronicle: an append-only log of world and hero events.
//!
//! The chronicle keeps the most recent entries in memory (bounded by the
//! retention limit) plus a running total. Appending takes a short mutex
//! section and emits a `tracing` event on the `guildhall::chronicle`
//! target; there is no file or network I/O on the caller's path.

use std::collections::VecDeque;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use guildhall_types::sync;
use serde::Serialize;
use tracing::info;

/// Default number of entries kept in memory.
pub const DEFAULT_RETENTION: usize = 512;

/// One line of the chronicle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChronicleEntry {
    /// Monotonic sequence number (1-based).
    pub seq: u64,
    /// When the entry was appended.
    pub at: DateTime<Utc>,
    /// Narrative text.
    pub text: String,
}

#[derive(Debug, Default)]
struct ChronicleInner {
    recent: VecDeque<ChronicleEntry>,
    total: u64,
}

/// Append-only narrative event log shared by every component of a run.
#[derive(Debug)]
pub struct Chronicle {
    retention: usize,
    inner: Mutex<ChronicleInner>,
}

impl Default for Chronicle {
    fn default() -> Self {
        Self::new(DEFAULT_RETENTION)
    }
}

impl Chronicle {
    /// Create a chronicle keeping at most `retention` recent entries.
    ///
    /// A retention of 0 keeps only the running total.
    pub fn new(retention: usize) -> Self {
        Self {
            retention,
            inner: Mutex::new(ChronicleInner::default()),
        }
    }

    /// Append a narrative line. Fire-and-forget.
    pub fn log_event(&self, text: impl Into<String>) {
        let text = text.into();
        info!(target: "guildhall::chronicle", "{text}");

        let mut inner = sync::lock(&self.inner);
        inner.total = inner.total.saturating_add(1);
        if self.retention == 0 {
            return;
        }
        let entry = ChronicleEntry {
            seq: inner.total,
            at: Utc::now(),
            text,
        };
        inner.recent.push_back(entry);
        while inner.recent.len() > self.retention {
            inner.recent.pop_front();
        }
    }

    /// Total number of entries ever appended.
    pub fn total(&self) -> u64 {
        sync::lock(&self.inner).total
    }

    /// The last `count` retained entries, oldest first.
    pub fn recent(&self, count: usize) -> Vec<ChronicleEntry> {
        let inner = sync::lock(&self.inner);
        let skip = inner.recent.len().saturating_sub(count);
        inner.recent.iter().skip(skip).cloned().collect()
    }

    /// Number of retained entries whose text contains `needle`.
    pub fn count_matching(&self, needle: &str) -> usize {
        sync::lock(&self.inner)
            .recent
            .iter()
            .filter(|entry| entry.text.contains(needle))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[test]
    fn appends_in_order() {
        let chronicle = Chronicle::new(10);
        chronicle.log_event("first");
        chronicle.log_event("second");

        let recent = chronicle.recent(10);
        assert_eq!(recent.len(), 2);
        assert_eq!(recent.first().map(|e| e.text.as_str()), Some("first"));
        assert_eq!(recent.last().map(|e| e.seq), Some(2));
    }

    #[test]
    fn retention_drops_oldest() {
        let chronicle = Chronicle::new(3);
        for i in 0..5 {
            chronicle.log_event(format!("entry {i}"));
        }
        assert_eq!(chronicle.total(), 5);
        let recent = chronicle.recent(10);
        assert_eq!(recent.len(), 3);
        assert_eq!(recent.first().map(|e| e.text.as_str()), Some("entry 2"));
    }

    #[test]
    fn entries_serialize_for_status_output() {
        let chronicle = Chronicle::default();
        chronicle.log_event("The gates open.");
        let json = serde_json::to_value(chronicle.recent(1)).unwrap_or_default();
        assert_eq!(json[0]["seq"], 1);
        assert_eq!(json[0]["text"], "The gates open.");
        assert!(json[0]["at"].is_string());
    }

    #[test]
    fn zero_retention_counts_only() {
        let chronicle = Chronicle::new(0);
        chronicle.log_event("ignored");
        assert_eq!(chronicle.total(), 1);
        assert!(chronicle.recent(5).is_empty());
    }

    #[test]
    fn recent_takes_tail() {
        let chronicle = Chronicle::default();
        for i in 0..4 {
            chronicle.log_event(format!("line {i}"));
        }
        let tail = chronicle.recent(2);
        assert_eq!(tail.len(), 2);
        assert_eq!(tail.first().map(|e| e.text.as_str()), Some("line 2"));
        assert_eq!(chronicle.count_matching("line"), 4);
    }

    #[test]
    fn concurrent_appends_are_all_counted() {
        let chronicle = Arc::new(Chronicle::new(1000));
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let c = Arc::clone(&chronicle);
                std::thread::spawn(move || {
                    for i in 0..50 {
                        c.log_event(format!("thread {t} line {i}"));
                    }
                })
            })
            .collect();
        for handle in handles {
            let _ = handle.join();
        }

        assert_eq!(chronicle.total(), 400);
        let seqs: Vec<u64> = chronicle.recent(400).iter().map(|e| e.seq).collect();
        assert!(seqs.windows(2).all(|w| matches!(w, [a, b] if a < b)));
    }
}
