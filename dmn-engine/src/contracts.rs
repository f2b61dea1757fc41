//! Evaluation request contracts consumed from the rule-matching layer.

use std::sync::Arc;

use dmn_primitives::{DecisionTable, RuleNumber, Value};
use serde::{Deserialize, Serialize};

/// Value a rule's output entry evaluated to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conclusion {
    output: String,
    #[serde(default)]
    value: Value,
}

impl Conclusion {
    /// Creates a conclusion for `output`.
    #[must_use]
    pub fn new(output: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            output: output.into(),
            value: value.into(),
        }
    }

    /// Returns the output name.
    #[must_use]
    pub fn output(&self) -> &str {
        &self.output
    }

    /// Returns the evaluated value.
    #[must_use]
    pub fn value(&self) -> &Value {
        &self.value
    }
}

/// Candidate rule whose input entries have already been matched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchedRule {
    number: RuleNumber,
    #[serde(default = "default_matched")]
    matched: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    conclusions: Vec<Conclusion>,
}

const fn default_matched() -> bool {
    true
}

impl MatchedRule {
    /// Creates a matched rule with no conclusions yet.
    #[must_use]
    pub fn new(number: RuleNumber) -> Self {
        Self {
            number,
            matched: true,
            conclusions: Vec::new(),
        }
    }

    /// Creates a rule whose input entries did not match.
    ///
    /// It is audited as invalid and contributes no output.
    #[must_use]
    pub fn unmatched(number: RuleNumber) -> Self {
        Self {
            number,
            matched: false,
            conclusions: Vec::new(),
        }
    }

    /// Adds a conclusion and returns the updated rule.
    #[must_use]
    pub fn with_conclusion(mut self, output: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conclusions.push(Conclusion::new(output, value));
        self
    }

    /// Returns the rule number.
    #[must_use]
    pub const fn number(&self) -> RuleNumber {
        self.number
    }

    /// Returns `true` when the rule's input entries matched.
    #[must_use]
    pub const fn is_matched(&self) -> bool {
        self.matched
    }

    /// Returns the conclusions in the order they were supplied.
    #[must_use]
    pub fn conclusions(&self) -> &[Conclusion] {
        &self.conclusions
    }

    /// Returns the value concluded for `output`.
    #[must_use]
    pub fn conclusion(&self, output: &str) -> Option<&Value> {
        self.conclusions
            .iter()
            .find(|conclusion| conclusion.output() == output)
            .map(Conclusion::value)
    }
}

/// Full request handed to the evaluation driver.
#[derive(Debug, Clone)]
pub struct EvaluationRequest {
    table: Arc<DecisionTable>,
    rules: Vec<MatchedRule>,
    strict_mode: bool,
}

impl EvaluationRequest {
    /// Creates a strict-mode request for `table` with the given candidate rules.
    #[must_use]
    pub fn new(table: Arc<DecisionTable>, rules: Vec<MatchedRule>) -> Self {
        Self {
            table,
            rules,
            strict_mode: true,
        }
    }

    /// Chooses whether hit policy violations abort evaluation.
    #[must_use]
    pub fn with_strict_mode(mut self, strict_mode: bool) -> Self {
        self.strict_mode = strict_mode;
        self
    }

    /// Appends a candidate rule.
    #[must_use]
    pub fn with_rule(mut self, rule: MatchedRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Returns the decision table.
    #[must_use]
    pub fn table(&self) -> &DecisionTable {
        &self.table
    }

    /// Returns the shared table handle.
    #[must_use]
    pub fn shared_table(&self) -> Arc<DecisionTable> {
        Arc::clone(&self.table)
    }

    /// Returns the candidate rules in evaluation order.
    #[must_use]
    pub fn rules(&self) -> &[MatchedRule] {
        &self.rules
    }

    /// Returns whether hit policy violations abort evaluation.
    #[must_use]
    pub const fn strict_mode(&self) -> bool {
        self.strict_mode
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dmn_primitives::{HitPolicy, OutputColumn};

    #[test]
    fn matched_rule_builder_collects_conclusions() {
        let rule = MatchedRule::new(RuleNumber::new(4).unwrap())
            .with_conclusion("x", 1)
            .with_conclusion("y", "b");

        assert!(rule.is_matched());
        assert_eq!(rule.conclusions().len(), 2);
        assert_eq!(rule.conclusion("y"), Some(&Value::from("b")));
        assert_eq!(rule.conclusion("z"), None);
    }

    #[test]
    fn rules_deserialize_as_matched_by_default() {
        let rule: MatchedRule = serde_json::from_str(
            r#"{ "number": 2, "conclusions": [{ "output": "x", "value": 3 }] }"#,
        )
        .unwrap();
        assert!(rule.is_matched());
        assert_eq!(rule.conclusion("x"), Some(&Value::from(3)));

        let rule: MatchedRule =
            serde_json::from_str(r#"{ "number": 5, "matched": false }"#).unwrap();
        assert!(!rule.is_matched());
    }

    #[test]
    fn requests_default_to_strict_mode() {
        let table = DecisionTable::builder("req", HitPolicy::Any)
            .output(OutputColumn::new("x").unwrap())
            .build()
            .unwrap();
        let request = EvaluationRequest::new(Arc::new(table), Vec::new())
            .with_rule(MatchedRule::new(RuleNumber::new(1).unwrap()));

        assert!(request.strict_mode());
        assert!(!request.with_strict_mode(false).strict_mode());
    }
}
