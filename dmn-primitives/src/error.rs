//! Shared error definitions for decision table primitives.

use thiserror::Error;

/// Result alias used throughout the decision table crates.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while constructing decision table primitives.
#[derive(Debug, Error)]
pub enum Error {
    /// Rule numbers are 1-based ordinals.
    #[error("invalid rule number {0}: rule numbers start at 1")]
    InvalidRuleNumber(u32),

    /// Output column name failed validation.
    #[error("invalid output name `{name}`: {reason}")]
    InvalidOutputName {
        /// The offending output name.
        name: String,
        /// Human-readable reason for rejection.
        reason: String,
    },

    /// Decision table definition failed validation.
    #[error("invalid decision table: {reason}")]
    InvalidTable {
        /// Human-readable reason for rejection.
        reason: String,
    },

    /// The hit policy spelling is not one of the supported policies.
    #[error("unknown hit policy `{0}`")]
    UnknownHitPolicy(String),

    /// The aggregator spelling is not one of SUM, MIN, MAX, or COUNT.
    #[error("unknown aggregator `{0}`")]
    UnknownAggregator(String),
}

impl Error {
    pub(crate) fn invalid_table(reason: impl Into<String>) -> Self {
        Self::InvalidTable {
            reason: reason.into(),
        }
    }
}
