//! Error types for hit policy evaluation.

use dmn_primitives::{Aggregator, HitPolicy, RuleNumber, Value};
use thiserror::Error;

use crate::audit::AuditTrail;

/// Table authoring mistakes. Always fatal, regardless of strict mode.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    /// PRIORITY and OUTPUT ORDER rank values by a declared list.
    #[error("hit policy {policy} requires a declared value list for output `{output}`")]
    MissingDeclaredValues {
        /// Policy that needed the list.
        policy: HitPolicy,
        /// Output lacking a declared list.
        output: String,
    },
    /// A composed value does not appear in its output's declared list.
    #[error("value {value} is not in the declared value list of output `{output}`")]
    UndeclaredValue {
        /// Output whose list was consulted.
        output: String,
        /// The offending value.
        value: Value,
    },
    /// Aggregators reduce exactly one output column.
    #[error("aggregator {aggregator} requires exactly one output column, table declares {outputs}")]
    AggregatorRequiresSingleOutput {
        /// Configured aggregator.
        aggregator: Aggregator,
        /// Number of declared output columns.
        outputs: usize,
    },
    /// Aggregators only reduce numbers.
    #[error(
        "aggregator {aggregator} cannot reduce {} value {value} of output `{output}`",
        .value.kind()
    )]
    NonNumericAggregate {
        /// Configured aggregator.
        aggregator: Aggregator,
        /// Aggregated output.
        output: String,
        /// The non-numeric value.
        value: Value,
    },
    /// A rule concluded an output the table does not declare.
    #[error("rule {rule} concludes undeclared output `{output}`")]
    UnknownOutput {
        /// Offending rule.
        rule: RuleNumber,
        /// Unknown output name.
        output: String,
    },
    /// OUTPUT ORDER expected an accumulated list for this output.
    #[error("output `{output}` accumulated no values to order")]
    EmptyOutputValues {
        /// Output without accumulated values.
        output: String,
    },
}

/// Errors surfaced by a decision table evaluation.
#[derive(Debug, Error)]
pub enum EvaluationError {
    /// Strict mode aborted on a hit policy violation.
    #[error("HitPolicy {policy} violated: {message}")]
    HitPolicyViolated {
        /// Violated policy.
        policy: HitPolicy,
        /// Description of the violation.
        message: String,
        /// Audit trail as it stood when evaluation aborted.
        audit: Box<AuditTrail>,
    },
    /// The decision table is mis-authored.
    #[error("decision table misconfigured: {source}")]
    Configuration {
        /// Underlying configuration error.
        #[from]
        source: ConfigurationError,
    },
    /// The candidate rules handed to the driver are malformed.
    #[error("invalid evaluation request: {reason}")]
    InvalidRequest {
        /// Human-readable explanation.
        reason: String,
    },
}

impl EvaluationError {
    /// Helper to construct request errors from string-like values.
    #[must_use]
    pub fn invalid_request(reason: impl Into<String>) -> Self {
        Self::InvalidRequest {
            reason: reason.into(),
        }
    }

    /// Returns `true` for strict-mode hit policy violations.
    #[must_use]
    pub const fn is_violation(&self) -> bool {
        matches!(self, Self::HitPolicyViolated { .. })
    }

    /// Returns the audit trail captured when a violation aborted evaluation.
    #[must_use]
    pub fn audit(&self) -> Option<&AuditTrail> {
        match self {
            Self::HitPolicyViolated { audit, .. } => Some(audit),
            Self::Configuration { .. } | Self::InvalidRequest { .. } => None,
        }
    }
}

/// Result alias for evaluation operations.
pub type EvaluationResult<T> = Result<T, EvaluationError>;
