//! Error types for the `guildhall-world` crate.
//!
//! World operations themselves never fail: contention outcomes are returned
//! as values ([`ClaimOutcome`](crate::ClaimOutcome)). [`WorldError`] only
//! covers rejected settings.

/// Errors raised while validating world settings.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorldError {
    /// A starting level is outside `0..=100`.
    #[error("{field} must be within 0..=100, got {value}")]
    LevelOutOfRange {
        /// Offending field.
        field: &'static str,
        /// Configured value.
        value: u32,
    },

    /// Phase thresholds are not phases 2 and 3 in order.
    #[error("phase thresholds must cover phases 2 and 3 in order, got {phases:?}")]
    BadPhaseSequence {
        /// Phases as configured.
        phases: Vec<u8>,
    },

    /// A threshold does not exceed the one before it.
    #[error("phase {phase} threshold {total} must exceed the previous threshold {previous}")]
    NonIncreasingThreshold {
        /// Phase whose threshold is too low.
        phase: u8,
        /// Its configured contribution total.
        total: u64,
        /// The previous phase's total.
        previous: u64,
    },
}
