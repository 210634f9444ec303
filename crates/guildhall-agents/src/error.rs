//! Error types for the guildhall-agents crate.
//!
//! Contention outcomes of hero actions (an empty vault, a sold item) are
//! reported in the action's description, not as errors. [`AgentError`]
//! covers the calls a caller has to handle.

/// Errors that can occur during hero state operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AgentError {
    /// The private inventory has no free slot.
    #[error("inventory full ({capacity} slots): cannot carry {item}")]
    InventoryFull {
        /// The rejected item, handed back to the caller.
        item: String,
        /// Configured slot count.
        capacity: usize,
    },

    /// Two heroes in one party share a name.
    #[error("duplicate hero name: {0}")]
    DuplicateName(String),
}
