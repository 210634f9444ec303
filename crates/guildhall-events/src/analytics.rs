//! Analytics sinks.
//!
//! The simulation core only relies on the [`AnalyticsSink::record`]
//! contract: hand over a structured [`AnalyticsEvent`] and move on. Sinks
//! must return quickly and must never block on I/O.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use guildhall_types::{AnalyticsEvent, EventCategory, sync};
use serde::Serialize;
use tokio::sync::mpsc;

/// Fire-and-forget receiver of analytics records.
pub trait AnalyticsSink: Send + Sync {
    /// Record one event. No response is expected.
    fn record(&self, event: AnalyticsEvent);
}

/// A sink that discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl AnalyticsSink for NullSink {
    fn record(&self, _event: AnalyticsEvent) {}
}

// ---------------------------------------------------------------------------
// ActionStats
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct StatsInner {
    total: u64,
    by_actor: BTreeMap<String, BTreeMap<EventCategory, u64>>,
}

/// Aggregated counts produced by [`ActionStats::summary`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatsSummary {
    /// Total number of events recorded.
    pub total: u64,
    /// Event count per category across all actors.
    pub by_category: BTreeMap<EventCategory, u64>,
    /// Event count per actor across all categories.
    pub by_actor: BTreeMap<String, u64>,
}

/// In-memory aggregator used for the end-of-run statistics.
#[derive(Debug, Default)]
pub struct ActionStats {
    inner: Mutex<StatsInner>,
}

impl ActionStats {
    /// Create an empty aggregator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of events recorded for `actor` in `category`.
    pub fn count(&self, actor: &str, category: EventCategory) -> u64 {
        sync::lock(&self.inner)
            .by_actor
            .get(actor)
            .and_then(|per_category| per_category.get(&category))
            .copied()
            .unwrap_or(0)
    }

    /// Summarize everything recorded so far.
    pub fn summary(&self) -> StatsSummary {
        let inner = sync::lock(&self.inner);
        let mut summary = StatsSummary {
            total: inner.total,
            ..StatsSummary::default()
        };
        for (actor, per_category) in &inner.by_actor {
            let mut actor_total: u64 = 0;
            for (category, count) in per_category {
                let slot = summary.by_category.entry(*category).or_insert(0);
                *slot = slot.saturating_add(*count);
                actor_total = actor_total.saturating_add(*count);
            }
            summary.by_actor.insert(actor.clone(), actor_total);
        }
        summary
    }
}

impl AnalyticsSink for ActionStats {
    fn record(&self, event: AnalyticsEvent) {
        let mut inner = sync::lock(&self.inner);
        inner.total = inner.total.saturating_add(1);
        let slot = inner
            .by_actor
            .entry(event.actor)
            .or_default()
            .entry(event.category)
            .or_insert(0);
        *slot = slot.saturating_add(1);
    }
}

// ---------------------------------------------------------------------------
// ChannelSink
// ---------------------------------------------------------------------------

/// Forwards records to an unbounded channel for an external consumer.
///
/// Once the receiver is dropped, records are silently discarded.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<AnalyticsEvent>,
}

impl ChannelSink {
    /// Create a sink and the receiver that consumes its records.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<AnalyticsEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl AnalyticsSink for ChannelSink {
    fn record(&self, event: AnalyticsEvent) {
        let _ = self.tx.send(event);
    }
}

// ---------------------------------------------------------------------------
// FanOut
// ---------------------------------------------------------------------------

/// Records every event to each wrapped sink in turn.
#[derive(Clone, Default)]
pub struct FanOut {
    sinks: Vec<Arc<dyn AnalyticsSink>>,
}

impl FanOut {
    /// Create a fan-out over the given sinks.
    pub fn new(sinks: Vec<Arc<dyn AnalyticsSink>>) -> Self {
        Self { sinks }
    }
}

impl AnalyticsSink for FanOut {
    fn record(&self, event: AnalyticsEvent) {
        let Some((last, rest)) = self.sinks.split_last() else {
            return;
        };
        for sink in rest {
            sink.record(event.clone());
        }
        last.record(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_count_per_actor_and_category() {
        let stats = ActionStats::new();
        stats.record(AnalyticsEvent::new("Aldric", EventCategory::Quest, "quest"));
        stats.record(AnalyticsEvent::new("Aldric", EventCategory::Quest, "quest"));
        stats.record(AnalyticsEvent::new("Vex", EventCategory::Theft, "pilfer"));

        assert_eq!(stats.count("Aldric", EventCategory::Quest), 2);
        assert_eq!(stats.count("Vex", EventCategory::Quest), 0);

        let summary = stats.summary();
        assert_eq!(summary.total, 3);
        assert_eq!(summary.by_category.get(&EventCategory::Quest), Some(&2));
        assert_eq!(summary.by_actor.get("Vex"), Some(&1));
    }

    #[test]
    fn summary_serializes_with_category_keys() {
        let stats = ActionStats::new();
        stats.record(AnalyticsEvent::new("Vex", EventCategory::Theft, "pilfer"));
        stats.record(AnalyticsEvent::new("Mira", EventCategory::Magic, "cast"));

        let json = serde_json::to_value(stats.summary()).unwrap_or_default();
        assert_eq!(json["total"], 2);
        assert_eq!(json["by_category"]["theft"], 1);
        assert_eq!(json["by_category"]["magic"], 1);
        assert_eq!(json["by_actor"]["Vex"], 1);
    }

    #[tokio::test]
    async fn channel_sink_forwards() {
        let (sink, mut rx) = ChannelSink::new();
        sink.record(AnalyticsEvent::new("Mira", EventCategory::Magic, "cast"));
        let received = rx.recv().await;
        assert!(matches!(received, Some(ref e) if e.actor == "Mira"));
    }

    #[test]
    fn channel_sink_tolerates_dropped_receiver() {
        let (sink, rx) = ChannelSink::new();
        drop(rx);
        sink.record(AnalyticsEvent::new("Mira", EventCategory::Magic, "cast"));
    }

    #[test]
    fn fan_out_reaches_every_sink() {
        let a = Arc::new(ActionStats::new());
        let b = Arc::new(ActionStats::new());
        let sinks: Vec<Arc<dyn AnalyticsSink>> = vec![a.clone(), b.clone(), Arc::new(NullSink)];
        let fan = FanOut::new(sinks);
        fan.record(AnalyticsEvent::new("Vex", EventCategory::Loot, "scavenge"));

        assert_eq!(a.summary().total, 1);
        assert_eq!(b.summary().total, 1);
    }
}
