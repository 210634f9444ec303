//! Narrative chronicle and analytics sinks for the Guildhall simulation.
//!
//! Heroes and the world report what happened through two fire-and-forget
//! channels. Neither ever blocks the caller on I/O:
//!
//! - [`chronicle`] -- [`Chronicle`], the append-only narrative event log
//!   (`log_event`), mirrored to `tracing`.
//! - [`analytics`] -- the [`AnalyticsSink`] contract (`record`) with an
//!   in-memory aggregator ([`ActionStats`]), a channel forwarder
//!   ([`ChannelSink`]) and a fan-out combinator ([`FanOut`]).

pub mod analytics;
pub mod chronicle;

pub use analytics::{ActionStats, AnalyticsSink, ChannelSink, FanOut, NullSink, StatsSummary};
pub use chronicle::{Chronicle, ChronicleEntry, DEFAULT_RETENTION};
