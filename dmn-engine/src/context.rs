//! Mutable state for a single decision table evaluation.

use std::collections::BTreeMap;

use dmn_primitives::{DecisionTable, EvaluationId, HitPolicy, OutputRow, RuleNumber, Value};
use tracing::warn;

use crate::audit::AuditTrail;
use crate::decision::EvaluationOutcome;
use crate::error::{EvaluationError, EvaluationResult};

/// Per-evaluation state threaded through the hit policy protocol.
///
/// Created once per evaluation and consumed by [`ExecutionContext::finish`];
/// never shared between evaluations. The table it borrows is read-only.
#[derive(Debug)]
pub struct ExecutionContext<'t> {
    table: &'t DecisionTable,
    strict_mode: bool,
    rule_results: BTreeMap<RuleNumber, OutputRow>,
    output_variables: BTreeMap<String, Vec<Value>>,
    result_variables: OutputRow,
    decision_results: Vec<OutputRow>,
    audit: AuditTrail,
}

impl<'t> ExecutionContext<'t> {
    /// Opens a context for evaluating `table`.
    #[must_use]
    pub fn new(table: &'t DecisionTable, strict_mode: bool, evaluation_id: EvaluationId) -> Self {
        Self {
            table,
            strict_mode,
            rule_results: BTreeMap::new(),
            output_variables: BTreeMap::new(),
            result_variables: OutputRow::new(),
            decision_results: Vec::new(),
            audit: AuditTrail::new(evaluation_id, table, strict_mode),
        }
    }

    /// Returns the table under evaluation.
    #[must_use]
    pub const fn table(&self) -> &'t DecisionTable {
        self.table
    }

    /// Returns the table's hit policy.
    #[must_use]
    pub const fn hit_policy(&self) -> HitPolicy {
        self.table.hit_policy()
    }

    /// Returns whether violations abort evaluation.
    #[must_use]
    pub const fn strict_mode(&self) -> bool {
        self.strict_mode
    }

    /// Returns the audit trail recorded so far.
    #[must_use]
    pub const fn audit(&self) -> &AuditTrail {
        &self.audit
    }

    /// Records a candidate rule in the audit trail.
    pub fn mark_rule(&mut self, rule: RuleNumber, valid: bool) {
        self.audit.record_rule(rule, valid);
    }

    /// Records one rule's value for one output, in the audit trail and in
    /// that rule's result row.
    pub fn record_conclusion(&mut self, rule: RuleNumber, output: &str, value: Value) {
        self.audit.record_conclusion(rule, output, value.clone());
        self.rule_results
            .entry(rule)
            .or_default()
            .insert(output, value);
    }

    /// Per-rule result rows in ascending rule order.
    pub fn rule_results(&self) -> impl Iterator<Item = (RuleNumber, &OutputRow)> {
        self.rule_results.iter().map(|(rule, row)| (*rule, row))
    }

    /// Current composed value of `output`.
    #[must_use]
    pub fn result_variable(&self, output: &str) -> Option<&Value> {
        self.result_variables.get(output)
    }

    /// Overwrites the composed value of `output`.
    pub fn set_result_variable(&mut self, output: &str, value: Value) {
        self.result_variables.insert(output, value);
    }

    /// Composed values of every output written so far.
    #[must_use]
    pub const fn result_variables(&self) -> &OutputRow {
        &self.result_variables
    }

    /// Values accumulated for `output` under OUTPUT ORDER.
    #[must_use]
    pub fn output_variables(&self, output: &str) -> Option<&[Value]> {
        self.output_variables.get(output).map(Vec::as_slice)
    }

    /// Appends `value` to the accumulated list of `output` and returns the list.
    pub fn push_output_variable(&mut self, output: &str, value: Value) -> &[Value] {
        let values = self.output_variables.entry(output.to_owned()).or_default();
        values.push(value);
        values
    }

    pub(crate) fn take_output_variables(&mut self) -> BTreeMap<String, Vec<Value>> {
        std::mem::take(&mut self.output_variables)
    }

    /// Final decision rows; empty until composition has run.
    #[must_use]
    pub fn decision_results(&self) -> &[OutputRow] {
        &self.decision_results
    }

    /// Replaces the final decision rows.
    pub fn set_decision_results(&mut self, rows: Vec<OutputRow>) {
        self.decision_results = rows;
    }

    pub(crate) fn set_decision_message(&mut self, message: impl Into<String>) {
        self.audit.set_decision_message(message);
    }

    /// Records a hit policy violation against `rule`.
    ///
    /// The message always lands in the audit trail. In lenient mode evaluation
    /// continues.
    ///
    /// # Errors
    ///
    /// In strict mode returns [`EvaluationError::HitPolicyViolated`] carrying
    /// a snapshot of the audit trail.
    pub fn report_violation(&mut self, rule: RuleNumber, detail: String) -> EvaluationResult<()> {
        let policy = self.hit_policy();
        warn!(
            decision = self.table.key(),
            rule = %rule,
            %policy,
            strict = self.strict_mode,
            "{detail}"
        );
        self.audit
            .append_violation(rule, format!("HitPolicy {policy} violated: {detail}"));

        if !self.strict_mode {
            return Ok(());
        }

        self.audit.mark_failed();
        self.audit.finish();
        Err(EvaluationError::HitPolicyViolated {
            policy,
            message: detail,
            audit: Box::new(self.audit.clone()),
        })
    }

    /// Closes the audit trail and hands back the decision rows.
    #[must_use]
    pub fn finish(mut self) -> EvaluationOutcome {
        self.audit.finish();
        EvaluationOutcome::new(self.decision_results, self.audit)
    }
}
