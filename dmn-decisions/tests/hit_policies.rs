use std::sync::Arc;

use dmn_decisions::engine::{
    ConfigurationError, EvaluationError, EvaluationOutcome, EvaluationRequest, MatchedRule,
    evaluate,
};
use dmn_decisions::primitives::{
    Aggregator, DecisionTable, HitPolicy, OutputColumn, OutputRow, RuleNumber, Value,
};

fn rule(number: u32) -> MatchedRule {
    MatchedRule::new(RuleNumber::new(number).unwrap())
}

fn single_output(policy: HitPolicy, output: OutputColumn) -> Arc<DecisionTable> {
    Arc::new(
        DecisionTable::builder("integration", policy)
            .output(output)
            .build()
            .unwrap(),
    )
}

fn plain(policy: HitPolicy) -> Arc<DecisionTable> {
    single_output(policy, OutputColumn::new("x").unwrap())
}

fn run(table: &Arc<DecisionTable>, rules: Vec<MatchedRule>, strict: bool) -> EvaluationOutcome {
    evaluate(&EvaluationRequest::new(Arc::clone(table), rules).with_strict_mode(strict)).unwrap()
}

#[test]
fn unique_strict_aborts_on_second_valid_rule() {
    let table = plain(HitPolicy::Unique);
    let request = EvaluationRequest::new(
        table,
        vec![rule(1).with_conclusion("x", 1), rule(3).with_conclusion("x", 2)],
    );

    let err = evaluate(&request).unwrap_err();
    assert!(err.is_violation());
    assert_eq!(
        err.to_string(),
        "HitPolicy UNIQUE violated: rule 3 is valid but rule 1 was already valid"
    );
    let audit = err.audit().unwrap();
    assert!(audit.is_failed());
    assert!(
        audit
            .rule(RuleNumber::new(3).unwrap())
            .unwrap()
            .exception_message()
            .is_some()
    );
}

#[test]
fn unique_lenient_keeps_last_non_null_value() {
    let table = plain(HitPolicy::Unique);
    let outcome = run(
        &table,
        vec![rule(1).with_conclusion("x", 1), rule(3).with_conclusion("x", Value::Null)],
        false,
    );

    assert_eq!(outcome.rows(), &[OutputRow::new().with("x", 1)]);
    let audit = outcome.audit();
    assert!(audit.has_violations());
    assert!(audit.decision_message().unwrap().contains("multiple matches"));
    assert_eq!(
        audit
            .rule(RuleNumber::new(3).unwrap())
            .unwrap()
            .exception_message()
            .as_deref(),
        Some("HitPolicy UNIQUE violated: rule 3 is valid but rule 1 was already valid")
    );
}

#[test]
fn unique_single_match_is_returned_as_is() {
    let table = plain(HitPolicy::Unique);
    let outcome = run(&table, vec![rule(2).with_conclusion("x", "only")], true);
    assert_eq!(outcome.rows(), &[OutputRow::new().with("x", "only")]);
    assert!(outcome.audit().decision_message().is_none());
}

#[test]
fn any_agreeing_rules_share_their_value() {
    let table = plain(HitPolicy::Any);
    let outcome = run(
        &table,
        vec![
            rule(1).with_conclusion("x", "same"),
            rule(2).with_conclusion("x", "same"),
        ],
        true,
    );
    assert_eq!(outcome.rows(), &[OutputRow::new().with("x", "same")]);
    assert!(!outcome.audit().has_violations());
}

#[test]
fn any_disagreement_fails_strict_and_overwrites_lenient() {
    let table = plain(HitPolicy::Any);
    let rules = vec![rule(1).with_conclusion("x", "a"), rule(2).with_conclusion("x", "b")];

    let err = evaluate(&EvaluationRequest::new(Arc::clone(&table), rules.clone())).unwrap_err();
    assert_eq!(
        err.to_string(),
        "HitPolicy ANY violated: conclusion 0 of rule 2 is not the same as in rule 1"
    );

    let outcome = run(&table, rules, false);
    assert_eq!(outcome.rows(), &[OutputRow::new().with("x", "b")]);
    assert!(outcome.audit().has_violations());
}

#[test]
fn any_ignores_null_conclusions() {
    let table = plain(HitPolicy::Any);
    let outcome = run(
        &table,
        vec![rule(1).with_conclusion("x", "a"), rule(2).with_conclusion("x", Value::Null)],
        true,
    );
    assert!(!outcome.audit().has_violations());
    assert_eq!(outcome.rows().len(), 1);
}

fn severity_table() -> Arc<DecisionTable> {
    single_output(
        HitPolicy::Priority,
        OutputColumn::new("sev")
            .unwrap()
            .with_declared_values(["high", "medium", "low"]),
    )
}

#[test]
fn priority_picks_highest_ranked_value_in_either_order() {
    let table = severity_table();
    for (first, second) in [("low", "high"), ("high", "low")] {
        let outcome = run(
            &table,
            vec![rule(1).with_conclusion("sev", first), rule(2).with_conclusion("sev", second)],
            true,
        );
        assert_eq!(outcome.rows(), &[OutputRow::new().with("sev", "high")]);
    }
}

#[test]
fn priority_rejects_undeclared_values() {
    let table = severity_table();
    let request = EvaluationRequest::new(
        table,
        vec![rule(1).with_conclusion("sev", "low"), rule(2).with_conclusion("sev", "urgent")],
    )
    .with_strict_mode(false);

    let err = evaluate(&request).unwrap_err();
    assert!(matches!(
        err,
        EvaluationError::Configuration {
            source: ConfigurationError::UndeclaredValue { .. }
        }
    ));
}

#[test]
fn priority_without_declared_values_is_misconfigured_in_both_modes() {
    let table = plain(HitPolicy::Priority);
    for strict in [true, false] {
        let request = EvaluationRequest::new(
            Arc::clone(&table),
            vec![rule(1).with_conclusion("x", 1)],
        )
        .with_strict_mode(strict);
        assert!(matches!(
            evaluate(&request),
            Err(EvaluationError::Configuration {
                source: ConfigurationError::MissingDeclaredValues { .. }
            })
        ));
    }
}

#[test]
fn output_order_sorts_by_declared_position() {
    let table = single_output(
        HitPolicy::OutputOrder,
        OutputColumn::new("n")
            .unwrap()
            .with_declared_values([10, 20, 30]),
    );
    let outcome = run(
        &table,
        vec![
            rule(1).with_conclusion("n", 30),
            rule(2).with_conclusion("n", 20),
            rule(3).with_conclusion("n", 10),
        ],
        true,
    );

    let sorted: Vec<&Value> = outcome.rows().iter().filter_map(|row| row.get("n")).collect();
    assert_eq!(sorted, [&Value::from(10), &Value::from(20), &Value::from(30)]);
}

#[test]
fn output_order_rejects_values_outside_the_declared_list() {
    let table = single_output(
        HitPolicy::OutputOrder,
        OutputColumn::new("n")
            .unwrap()
            .with_declared_values([10, 20, 30]),
    );
    let request = EvaluationRequest::new(
        table,
        vec![rule(1).with_conclusion("n", 10), rule(2).with_conclusion("n", 40)],
    );
    assert!(matches!(
        evaluate(&request),
        Err(EvaluationError::Configuration { .. })
    ));
}

#[test]
fn rule_order_returns_every_row_unmerged() {
    let table = Arc::new(
        DecisionTable::builder("ordered", HitPolicy::RuleOrder)
            .output(OutputColumn::new("x").unwrap())
            .output(OutputColumn::new("y").unwrap())
            .build()
            .unwrap(),
    );
    let outcome = run(
        &table,
        vec![
            rule(1).with_conclusion("x", 1).with_conclusion("y", "a"),
            MatchedRule::unmatched(RuleNumber::new(2).unwrap()),
            rule(4).with_conclusion("x", 1).with_conclusion("y", "a"),
            rule(7).with_conclusion("x", 3),
        ],
        true,
    );

    assert_eq!(
        outcome.rows(),
        &[
            OutputRow::new().with("x", 1).with("y", "a"),
            OutputRow::new().with("x", 1).with("y", "a"),
            OutputRow::new().with("x", 3).with("y", Value::Null),
        ]
    );
}

#[test]
fn collect_removes_duplicate_rows() {
    let table = single_output(HitPolicy::Collect, OutputColumn::new("out").unwrap());
    let outcome = run(
        &table,
        vec![
            rule(1).with_conclusion("out", "a"),
            rule(2).with_conclusion("out", "a"),
            rule(3).with_conclusion("out", "b"),
        ],
        true,
    );
    assert_eq!(
        outcome.rows(),
        &[OutputRow::new().with("out", "a"), OutputRow::new().with("out", "b")]
    );
}

fn aggregated(aggregator: Aggregator) -> Arc<DecisionTable> {
    Arc::new(
        DecisionTable::builder("aggregated", HitPolicy::Collect)
            .aggregator(aggregator)
            .output(OutputColumn::new("amount").unwrap())
            .build()
            .unwrap(),
    )
}

fn amounts() -> Vec<MatchedRule> {
    vec![
        rule(1).with_conclusion("amount", 2.0),
        rule(2).with_conclusion("amount", 3.0),
        rule(3).with_conclusion("amount", 3.0),
    ]
}

#[test]
fn collect_aggregates_deduplicated_values() {
    let expected = [
        (Aggregator::Sum, 5.0),
        (Aggregator::Count, 2.0),
        (Aggregator::Min, 2.0),
        (Aggregator::Max, 3.0),
    ];
    for (aggregator, total) in expected {
        let outcome = run(&aggregated(aggregator), amounts(), true);
        assert_eq!(
            outcome.rows(),
            &[OutputRow::new().with("amount", total)],
            "{aggregator}"
        );
    }
}

#[test]
fn collect_aggregate_without_rows_is_empty() {
    let outcome = run(&aggregated(Aggregator::Sum), Vec::new(), true);
    assert!(outcome.is_empty());
}

#[test]
fn collect_aggregate_rejects_text() {
    let request = EvaluationRequest::new(
        aggregated(Aggregator::Sum),
        vec![rule(1).with_conclusion("amount", "lots")],
    )
    .with_strict_mode(false);
    assert!(matches!(
        evaluate(&request),
        Err(EvaluationError::Configuration {
            source: ConfigurationError::NonNumericAggregate { .. }
        })
    ));
}

#[test]
fn repeated_evaluation_is_idempotent() {
    let table = plain(HitPolicy::Collect);
    let rules = vec![
        rule(1).with_conclusion("x", 1),
        rule(2).with_conclusion("x", 2),
        rule(3).with_conclusion("x", 1),
    ];
    let first = run(&table, rules.clone(), true);
    let second = run(&table, rules, true);

    assert_eq!(first.rows(), second.rows());
    assert_ne!(first.evaluation_id(), second.evaluation_id());
}

#[test]
fn tables_and_rules_load_from_json() {
    let table: DecisionTable = serde_json::from_str(
        r#"{
            "key": "discount",
            "hit_policy": "COLLECT",
            "aggregator": "SUM",
            "outputs": [{ "name": "discount" }]
        }"#,
    )
    .unwrap();
    let rules: Vec<MatchedRule> = serde_json::from_str(
        r#"[
            { "number": 1, "conclusions": [{ "output": "discount", "value": 5 }] },
            { "number": 2, "matched": false },
            { "number": 3, "conclusions": [{ "output": "discount", "value": 10 }] }
        ]"#,
    )
    .unwrap();

    let outcome = run(&Arc::new(table), rules, true);
    assert_eq!(outcome.rows(), &[OutputRow::new().with("discount", 15)]);
    assert!(outcome.audit().to_json().unwrap().contains("\"decision_key\": \"discount\""));
}
