//! Decision results returned by the evaluation driver.

use dmn_primitives::{EvaluationId, HitPolicy, OutputRow};
use serde::{Deserialize, Serialize};

use crate::audit::AuditTrail;

/// Rows composed for one evaluation, with the audit trail that produced them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationOutcome {
    rows: Vec<OutputRow>,
    audit: AuditTrail,
}

impl EvaluationOutcome {
    pub(crate) fn new(rows: Vec<OutputRow>, audit: AuditTrail) -> Self {
        Self { rows, audit }
    }

    /// Returns the evaluation identifier.
    #[must_use]
    pub fn evaluation_id(&self) -> EvaluationId {
        self.audit.evaluation_id()
    }

    /// Returns the hit policy that composed the rows.
    #[must_use]
    pub fn hit_policy(&self) -> HitPolicy {
        self.audit.hit_policy()
    }

    /// Returns the decision rows.
    #[must_use]
    pub fn rows(&self) -> &[OutputRow] {
        &self.rows
    }

    /// Returns the only row, if exactly one was composed.
    #[must_use]
    pub fn single_row(&self) -> Option<&OutputRow> {
        match self.rows.as_slice() {
            [row] => Some(row),
            _ => None,
        }
    }

    /// Returns `true` when no row was composed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns the audit trail.
    #[must_use]
    pub fn audit(&self) -> &AuditTrail {
        &self.audit
    }

    /// Consumes the outcome, returning the rows.
    #[must_use]
    pub fn into_rows(self) -> Vec<OutputRow> {
        self.rows
    }

    /// Consumes the outcome, returning rows and audit trail.
    #[must_use]
    pub fn into_parts(self) -> (Vec<OutputRow>, AuditTrail) {
        (self.rows, self.audit)
    }
}
