//! Error types for the strategy engine.

use thiserror::Error;

/// Result type alias using [`SimError`].
pub type Result<T> = std::result::Result<T, SimError>;

/// Top-level error type for the strategy engine.
///
/// Validation variants are always raised before any game is simulated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SimError {
    /// Counter placement does not describe a valid strategy.
    #[error("Invalid strategy: {reason}")]
    InvalidStrategy {
        /// What was wrong with the placement.
        reason: String,
    },

    /// Repetition count must be at least one.
    #[error("Invalid repetition count: {0} (must be at least 1)")]
    InvalidRepetitionCount(i64),

    /// Work was cancelled at a repetition or strategy boundary.
    #[error("Cancelled after {completed} of {total} units of work")]
    Cancelled {
        /// Units (games or strategies) finished before cancellation.
        completed: usize,
        /// Units requested.
        total: usize,
    },
}

impl SimError {
    /// Build an [`SimError::InvalidStrategy`] from any displayable reason.
    pub fn invalid_strategy(reason: impl Into<String>) -> Self {
        Self::InvalidStrategy {
            reason: reason.into(),
        }
    }
}
