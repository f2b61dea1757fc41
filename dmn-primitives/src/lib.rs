//! Core shared types for DMN decision-table evaluation.

#![warn(missing_docs, clippy::pedantic)]

mod error;
mod ids;
mod policy;
mod table;
mod value;

/// Error type and result alias shared across the workspace.
pub use error::{Error, Result};
/// Identifiers for rules and evaluations.
pub use ids::{EvaluationId, RuleNumber};
/// Hit policy and aggregator selectors declared by a table.
pub use policy::{Aggregator, HitPolicy};
/// Read-only decision table metadata.
pub use table::{DecisionTable, DecisionTableBuilder, OutputColumn};
/// Typed cell values and output rows.
pub use value::{OutputRow, Value};
