//! Hit policy behaviors: validity checks and result composition.
//!
//! Every protocol entry point matches exhaustively on [`HitPolicyBehavior`],
//! so a new policy cannot be added without deciding its behavior at each one.

use dmn_primitives::{Aggregator, DecisionTable, HitPolicy, OutputRow, RuleNumber, Value};
use tracing::debug;

use crate::aggregate::{aggregate, numeric_values};
use crate::compose::{dedup_rows, merge_last_non_null, rows_from_columns, sort_by_declared_order};
use crate::context::ExecutionContext;
use crate::error::{ConfigurationError, EvaluationResult};

const UNIQUE_MERGE_MESSAGE: &str = "HitPolicy UNIQUE violated: multiple matches. \
     Decision result is composed from the last matching rules.";

/// Behavior of one hit policy across the evaluation protocol.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HitPolicyBehavior {
    /// At most one valid rule.
    Unique,
    /// Valid rules must agree on every output.
    Any,
    /// Highest-ranked declared value wins per output.
    Priority,
    /// All values, sorted by declared value lists.
    OutputOrder,
    /// One row per valid rule, in rule order.
    RuleOrder,
    /// Distinct rows, optionally aggregated.
    Collect(Option<Aggregator>),
}

impl HitPolicyBehavior {
    /// Selects the behavior declared by `table`.
    #[must_use]
    pub fn for_table(table: &DecisionTable) -> Self {
        match table.hit_policy() {
            HitPolicy::Unique => Self::Unique,
            HitPolicy::Any => Self::Any,
            HitPolicy::Priority => Self::Priority,
            HitPolicy::OutputOrder => Self::OutputOrder,
            HitPolicy::RuleOrder => Self::RuleOrder,
            HitPolicy::Collect => Self::Collect(table.aggregator()),
        }
    }

    /// Returns the policy this behavior implements.
    #[must_use]
    pub const fn hit_policy(self) -> HitPolicy {
        match self {
            Self::Unique => HitPolicy::Unique,
            Self::Any => HitPolicy::Any,
            Self::Priority => HitPolicy::Priority,
            Self::OutputOrder => HitPolicy::OutputOrder,
            Self::RuleOrder => HitPolicy::RuleOrder,
            Self::Collect(_) => HitPolicy::Collect,
        }
    }

    /// Checks the table carries the metadata this policy depends on.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::MissingDeclaredValues`] when PRIORITY or
    /// OUTPUT ORDER meets an output without a declared list, and
    /// [`ConfigurationError::AggregatorRequiresSingleOutput`] when an
    /// aggregated COLLECT table has several outputs.
    pub fn validate_table(self, table: &DecisionTable) -> Result<(), ConfigurationError> {
        match self {
            Self::Priority | Self::OutputOrder => {
                if let Some(column) = table
                    .outputs()
                    .iter()
                    .find(|column| column.declared_values().is_none())
                {
                    return Err(ConfigurationError::MissingDeclaredValues {
                        policy: self.hit_policy(),
                        output: column.name().to_owned(),
                    });
                }
                Ok(())
            }
            Self::Collect(Some(aggregator)) if table.outputs().len() != 1 => {
                Err(ConfigurationError::AggregatorRequiresSingleOutput {
                    aggregator,
                    outputs: table.outputs().len(),
                })
            }
            Self::Unique | Self::Any | Self::RuleOrder | Self::Collect(_) => Ok(()),
        }
    }

    /// Runs once per valid rule, after it is marked valid.
    ///
    /// # Errors
    ///
    /// Under UNIQUE in strict mode, fails when another rule is already valid.
    pub fn evaluate_rule_validity(
        self,
        rule: RuleNumber,
        ctx: &mut ExecutionContext<'_>,
    ) -> EvaluationResult<()> {
        match self {
            Self::Unique => {
                let already_valid: Vec<RuleNumber> = ctx
                    .audit()
                    .valid_rules()
                    .filter(|other| *other != rule)
                    .collect();
                for other in already_valid {
                    ctx.report_violation(
                        rule,
                        format!("rule {rule} is valid but rule {other} was already valid"),
                    )?;
                }
                Ok(())
            }
            Self::Any
            | Self::Priority
            | Self::OutputOrder
            | Self::RuleOrder
            | Self::Collect(_) => Ok(()),
        }
    }

    /// Runs once per (rule, output) with the freshly computed value, before it
    /// is recorded.
    ///
    /// # Errors
    ///
    /// Under ANY in strict mode, fails when an earlier valid rule concluded a
    /// different non-null value at the same output index.
    pub fn evaluate_rule_conclusion_validity(
        self,
        value: &Value,
        rule: RuleNumber,
        index: usize,
        ctx: &mut ExecutionContext<'_>,
    ) -> EvaluationResult<()> {
        match self {
            Self::Any => {
                if value.is_null() {
                    return Ok(());
                }
                let conflicting: Vec<RuleNumber> = ctx
                    .audit()
                    .rule_executions()
                    .filter(|record| record.rule() != rule && record.is_valid())
                    .filter(|record| {
                        record
                            .conclusion(index)
                            .is_some_and(|earlier| !earlier.is_null() && earlier != value)
                    })
                    .map(|record| record.rule())
                    .collect();
                for other in conflicting {
                    ctx.report_violation(
                        rule,
                        format!(
                            "conclusion {index} of rule {rule} is not the same as in rule {other}"
                        ),
                    )?;
                }
                Ok(())
            }
            Self::Unique
            | Self::Priority
            | Self::OutputOrder
            | Self::RuleOrder
            | Self::Collect(_) => Ok(()),
        }
    }

    /// Folds one (rule, output) value into the composed variables.
    ///
    /// # Errors
    ///
    /// Under PRIORITY, returns a configuration error when either compared
    /// value is missing from the output's declared list.
    pub fn compose_output(
        self,
        output: &str,
        value: Value,
        ctx: &mut ExecutionContext<'_>,
    ) -> EvaluationResult<()> {
        match self {
            Self::Priority => compose_priority(output, value, ctx),
            Self::OutputOrder => {
                let accumulated = ctx.push_output_variable(output, value).to_vec();
                ctx.set_result_variable(output, Value::List(accumulated));
                Ok(())
            }
            Self::Unique | Self::Any | Self::RuleOrder | Self::Collect(_) => {
                ctx.set_result_variable(output, value);
                Ok(())
            }
        }
    }

    /// Populates the decision rows once every rule has been processed.
    ///
    /// # Errors
    ///
    /// Returns configuration errors from OUTPUT ORDER sorting and COLLECT
    /// aggregation.
    pub fn compose_decision_results(self, ctx: &mut ExecutionContext<'_>) -> EvaluationResult<()> {
        let rows = match self {
            Self::Unique => compose_unique(ctx),
            Self::Any | Self::Priority => {
                let row = ctx.result_variables();
                if row.is_empty() {
                    Vec::new()
                } else {
                    vec![row.clone()]
                }
            }
            Self::OutputOrder => compose_output_order(ctx)?,
            Self::RuleOrder => ctx.rule_results().map(|(_, row)| row.clone()).collect(),
            Self::Collect(aggregator) => compose_collect(aggregator, ctx)?,
        };

        debug!(
            policy = %self.hit_policy(),
            rows = rows.len(),
            "decision results composed"
        );
        ctx.set_decision_results(rows);
        Ok(())
    }
}

fn compose_priority(
    output: &str,
    value: Value,
    ctx: &mut ExecutionContext<'_>,
) -> EvaluationResult<()> {
    let Some(current) = ctx.result_variable(output) else {
        ctx.set_result_variable(output, value);
        return Ok(());
    };

    let column = ctx.table().output(output).ok_or_else(|| {
        ConfigurationError::MissingDeclaredValues {
            policy: HitPolicy::Priority,
            output: output.to_owned(),
        }
    })?;
    if column.declared_values().is_none() {
        return Err(ConfigurationError::MissingDeclaredValues {
            policy: HitPolicy::Priority,
            output: output.to_owned(),
        }
        .into());
    }

    let rank = |candidate: &Value| {
        column
            .position_of(candidate)
            .ok_or_else(|| ConfigurationError::UndeclaredValue {
                output: output.to_owned(),
                value: candidate.clone(),
            })
    };
    let current_rank = rank(current)?;
    let new_rank = rank(&value)?;

    if new_rank < current_rank {
        debug!(output, %value, new_rank, current_rank, "higher priority value replaces current");
        ctx.set_result_variable(output, value);
    }
    Ok(())
}

fn compose_unique(ctx: &mut ExecutionContext<'_>) -> Vec<OutputRow> {
    let rows: Vec<OutputRow> = ctx.rule_results().map(|(_, row)| row.clone()).collect();
    if rows.len() > 1 && !ctx.strict_mode() {
        ctx.set_decision_message(UNIQUE_MERGE_MESSAGE);
        return vec![merge_last_non_null(&rows)];
    }
    rows
}

fn compose_output_order(ctx: &mut ExecutionContext<'_>) -> EvaluationResult<Vec<OutputRow>> {
    let mut accumulated = ctx.take_output_variables();
    if accumulated.is_empty() {
        return Ok(Vec::new());
    }

    let mut sorted_columns = Vec::with_capacity(ctx.table().outputs().len());
    for column in ctx.table().outputs() {
        if column.declared_values().is_none() {
            return Err(ConfigurationError::MissingDeclaredValues {
                policy: HitPolicy::OutputOrder,
                output: column.name().to_owned(),
            }
            .into());
        }
        let values = accumulated
            .remove(column.name())
            .filter(|values| !values.is_empty())
            .ok_or_else(|| ConfigurationError::EmptyOutputValues {
                output: column.name().to_owned(),
            })?;
        let sorted = sort_by_declared_order(column, values)?;
        ctx.set_result_variable(column.name(), Value::List(sorted.clone()));
        sorted_columns.push((column.name().to_owned(), sorted));
    }

    Ok(rows_from_columns(&sorted_columns))
}

fn compose_collect(
    aggregator: Option<Aggregator>,
    ctx: &ExecutionContext<'_>,
) -> EvaluationResult<Vec<OutputRow>> {
    let rows = dedup_rows(ctx.rule_results().map(|(_, row)| row.clone()));
    let Some(aggregator) = aggregator else {
        return Ok(rows);
    };

    let [column] = ctx.table().outputs() else {
        return Err(ConfigurationError::AggregatorRequiresSingleOutput {
            aggregator,
            outputs: ctx.table().outputs().len(),
        }
        .into());
    };

    let values = numeric_values(aggregator, column.name(), &rows)?;
    Ok(aggregate(aggregator, &values)
        .map(|result| vec![OutputRow::new().with(column.name(), result)])
        .unwrap_or_default())
}
