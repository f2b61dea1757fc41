//! Evaluation driver: walks candidate rules through the hit policy protocol.

use dmn_primitives::{DecisionTable, EvaluationId, HitPolicy, Value};
use tracing::{debug, debug_span};

use crate::behavior::HitPolicyBehavior;
use crate::context::ExecutionContext;
use crate::contracts::{EvaluationRequest, MatchedRule};
use crate::decision::EvaluationOutcome;
use crate::error::{ConfigurationError, EvaluationError, EvaluationResult};

/// Trait implemented by decision table evaluators.
pub trait DecisionEngine: Send + Sync {
    /// Evaluates the supplied request.
    ///
    /// # Errors
    ///
    /// See [`evaluate`].
    fn evaluate(&self, request: &EvaluationRequest) -> EvaluationResult<EvaluationOutcome>;
}

/// Stateless evaluator applying the table's declared hit policy.
#[derive(Debug, Clone, Copy, Default)]
pub struct HitPolicyEngine;

impl HitPolicyEngine {
    /// Creates the engine.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl DecisionEngine for HitPolicyEngine {
    fn evaluate(&self, request: &EvaluationRequest) -> EvaluationResult<EvaluationOutcome> {
        evaluate(request)
    }
}

/// Evaluates one decision table against its pre-matched candidate rules.
///
/// Rules are processed in the order supplied: each matched rule is marked
/// valid, checked for validity, and then each output in declaration order is
/// checked, recorded, and composed. Final composition runs once at the end.
///
/// # Errors
///
/// - [`EvaluationError::InvalidRequest`] when rule numbers are not strictly
///   ascending or a rule concludes the same output twice.
/// - [`EvaluationError::Configuration`] when the table is mis-authored for its
///   hit policy, in either mode.
/// - [`EvaluationError::HitPolicyViolated`] in strict mode on the first
///   UNIQUE or ANY violation.
pub fn evaluate(request: &EvaluationRequest) -> EvaluationResult<EvaluationOutcome> {
    let table = request.table();
    let behavior = HitPolicyBehavior::for_table(table);
    behavior.validate_table(table)?;
    validate_rule_order(request.rules())?;

    let evaluation_id = EvaluationId::random();
    let span = debug_span!(
        "decision_table",
        key = table.key(),
        evaluation = %evaluation_id,
        hit_policy = %behavior.hit_policy()
    );
    let _entered = span.enter();

    if let Some(aggregator) = table.aggregator()
        && table.hit_policy() != HitPolicy::Collect
    {
        debug!(%aggregator, "aggregator ignored outside COLLECT");
    }

    let mut ctx = ExecutionContext::new(table, request.strict_mode(), evaluation_id);
    for rule in request.rules() {
        if !rule.is_matched() {
            ctx.mark_rule(rule.number(), false);
            debug!(rule = %rule.number(), "rule did not match");
            continue;
        }

        let conclusions = resolve_conclusions(table, rule)?;
        ctx.mark_rule(rule.number(), true);
        behavior.evaluate_rule_validity(rule.number(), &mut ctx)?;

        for (index, (column, value)) in table.outputs().iter().zip(conclusions).enumerate() {
            behavior.evaluate_rule_conclusion_validity(&value, rule.number(), index, &mut ctx)?;
            ctx.record_conclusion(rule.number(), column.name(), value.clone());
            behavior.compose_output(column.name(), value, &mut ctx)?;
        }
        debug!(rule = %rule.number(), "rule conclusions composed");
    }

    behavior.compose_decision_results(&mut ctx)?;
    let outcome = ctx.finish();
    debug!(
        rows = outcome.rows().len(),
        violations = outcome.audit().has_violations(),
        "decision table evaluated"
    );
    Ok(outcome)
}

fn validate_rule_order(rules: &[MatchedRule]) -> EvaluationResult<()> {
    for pair in rules.windows(2) {
        let (previous, next) = (pair[0].number(), pair[1].number());
        if next <= previous {
            return Err(EvaluationError::invalid_request(format!(
                "rule {next} follows rule {previous}; rules must be supplied in ascending order without duplicates"
            )));
        }
    }
    Ok(())
}

fn resolve_conclusions(table: &DecisionTable, rule: &MatchedRule) -> EvaluationResult<Vec<Value>> {
    let mut values = vec![None; table.outputs().len()];
    for conclusion in rule.conclusions() {
        let index = table.output_index(conclusion.output()).ok_or_else(|| {
            ConfigurationError::UnknownOutput {
                rule: rule.number(),
                output: conclusion.output().to_owned(),
            }
        })?;
        if values[index].replace(conclusion.value().clone()).is_some() {
            return Err(EvaluationError::invalid_request(format!(
                "rule {} concludes output `{}` more than once",
                rule.number(),
                conclusion.output()
            )));
        }
    }
    Ok(values.into_iter().map(Option::unwrap_or_default).collect())
}
