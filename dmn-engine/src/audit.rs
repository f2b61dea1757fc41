//! Per-evaluation audit trail of rule validity and violations.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use dmn_primitives::{DecisionTable, EvaluationId, HitPolicy, RuleNumber, Value};
use serde::{Deserialize, Serialize};

/// Value a rule produced for one output column.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConclusionResult {
    output: String,
    value: Value,
}

impl ConclusionResult {
    /// Returns the output name.
    #[must_use]
    pub fn output(&self) -> &str {
        &self.output
    }

    /// Returns the concluded value.
    #[must_use]
    pub fn value(&self) -> &Value {
        &self.value
    }
}

/// Audit record for a single candidate rule.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RuleExecutionRecord {
    rule: RuleNumber,
    valid: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    conclusion_results: Vec<ConclusionResult>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    violations: Vec<String>,
}

impl RuleExecutionRecord {
    fn new(rule: RuleNumber, valid: bool) -> Self {
        Self {
            rule,
            valid,
            conclusion_results: Vec::new(),
            violations: Vec::new(),
        }
    }

    /// Returns the rule number.
    #[must_use]
    pub const fn rule(&self) -> RuleNumber {
        self.rule
    }

    /// Returns `true` when the rule matched.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.valid
    }

    /// Conclusions in output declaration order.
    #[must_use]
    pub fn conclusion_results(&self) -> &[ConclusionResult] {
        &self.conclusion_results
    }

    /// Conclusion recorded at `index`, if the rule has reached that output.
    #[must_use]
    pub fn conclusion(&self, index: usize) -> Option<&Value> {
        self.conclusion_results.get(index).map(ConclusionResult::value)
    }

    /// Every violation message recorded against this rule.
    #[must_use]
    pub fn violations(&self) -> &[String] {
        &self.violations
    }

    /// Violation messages joined into one diagnostic string.
    #[must_use]
    pub fn exception_message(&self) -> Option<String> {
        (!self.violations.is_empty()).then(|| self.violations.join("; "))
    }
}

/// Diagnostics for one decision table evaluation.
///
/// Returned alongside the decision rows on success and attached to
/// [`EvaluationError::HitPolicyViolated`](crate::EvaluationError) when strict
/// mode aborts.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AuditTrail {
    evaluation_id: EvaluationId,
    decision_key: String,
    hit_policy: HitPolicy,
    strict_mode: bool,
    started_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    finished_at: Option<DateTime<Utc>>,
    rule_executions: BTreeMap<RuleNumber, RuleExecutionRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    decision_message: Option<String>,
    #[serde(default)]
    failed: bool,
}

impl AuditTrail {
    /// Opens an audit trail for an evaluation of `table`.
    #[must_use]
    pub fn new(evaluation_id: EvaluationId, table: &DecisionTable, strict_mode: bool) -> Self {
        Self {
            evaluation_id,
            decision_key: table.key().to_owned(),
            hit_policy: table.hit_policy(),
            strict_mode,
            started_at: Utc::now(),
            finished_at: None,
            rule_executions: BTreeMap::new(),
            decision_message: None,
            failed: false,
        }
    }

    /// Returns the evaluation identifier.
    #[must_use]
    pub const fn evaluation_id(&self) -> EvaluationId {
        self.evaluation_id
    }

    /// Returns the evaluated decision key.
    #[must_use]
    pub fn decision_key(&self) -> &str {
        &self.decision_key
    }

    /// Returns the hit policy in force.
    #[must_use]
    pub const fn hit_policy(&self) -> HitPolicy {
        self.hit_policy
    }

    /// Returns whether violations aborted evaluation.
    #[must_use]
    pub const fn strict_mode(&self) -> bool {
        self.strict_mode
    }

    /// Returns when evaluation started.
    #[must_use]
    pub const fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Returns when evaluation finished, if it has.
    #[must_use]
    pub const fn finished_at(&self) -> Option<DateTime<Utc>> {
        self.finished_at
    }

    /// Table-level diagnostic, set when lenient UNIQUE merges several rows.
    #[must_use]
    pub fn decision_message(&self) -> Option<&str> {
        self.decision_message.as_deref()
    }

    /// Returns `true` when a strict-mode violation aborted evaluation.
    #[must_use]
    pub const fn is_failed(&self) -> bool {
        self.failed
    }

    /// Returns the record for `rule`.
    #[must_use]
    pub fn rule(&self, rule: RuleNumber) -> Option<&RuleExecutionRecord> {
        self.rule_executions.get(&rule)
    }

    /// Iterates rule records in ascending rule order.
    pub fn rule_executions(&self) -> impl Iterator<Item = &RuleExecutionRecord> {
        self.rule_executions.values()
    }

    /// Iterates the numbers of rules marked valid.
    pub fn valid_rules(&self) -> impl Iterator<Item = RuleNumber> + '_ {
        self.rule_executions()
            .filter(|record| record.is_valid())
            .map(RuleExecutionRecord::rule)
    }

    /// Returns `true` if any rule recorded a violation.
    #[must_use]
    pub fn has_violations(&self) -> bool {
        self.rule_executions()
            .any(|record| !record.violations().is_empty())
    }

    /// Serialises the trail as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Propagates [`serde_json::Error`] from serialisation.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub(crate) fn record_rule(&mut self, rule: RuleNumber, valid: bool) {
        self.rule_executions
            .insert(rule, RuleExecutionRecord::new(rule, valid));
    }

    pub(crate) fn record_conclusion(&mut self, rule: RuleNumber, output: &str, value: Value) {
        if let Some(record) = self.rule_executions.get_mut(&rule) {
            record.conclusion_results.push(ConclusionResult {
                output: output.to_owned(),
                value,
            });
        }
    }

    pub(crate) fn append_violation(&mut self, rule: RuleNumber, message: String) {
        self.rule_executions
            .entry(rule)
            .or_insert_with(|| RuleExecutionRecord::new(rule, true))
            .violations
            .push(message);
    }

    pub(crate) fn set_decision_message(&mut self, message: impl Into<String>) {
        self.decision_message = Some(message.into());
    }

    pub(crate) fn mark_failed(&mut self) {
        self.failed = true;
    }

    pub(crate) fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }
}
