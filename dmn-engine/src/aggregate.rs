//! Numeric reducers for COLLECT tables.

use dmn_primitives::{Aggregator, OutputRow, Value};

use crate::error::ConfigurationError;

/// Reduces `values` with `aggregator`. Returns `None` for an empty input.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn aggregate(aggregator: Aggregator, values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }

    match aggregator {
        Aggregator::Sum => Some(values.iter().sum()),
        Aggregator::Min => values.iter().copied().min_by(f64::total_cmp),
        Aggregator::Max => values.iter().copied().max_by(f64::total_cmp),
        Aggregator::Count => Some(values.len() as f64),
    }
}

/// Collects the numeric cells of `output` across `rows`.
///
/// Null cells are skipped.
///
/// # Errors
///
/// Returns [`ConfigurationError::NonNumericAggregate`] for any other
/// non-numeric cell.
pub fn numeric_values<'a, I>(
    aggregator: Aggregator,
    output: &str,
    rows: I,
) -> Result<Vec<f64>, ConfigurationError>
where
    I: IntoIterator<Item = &'a OutputRow>,
{
    let mut numbers = Vec::new();
    for value in rows.into_iter().filter_map(|row| row.get(output)) {
        match value {
            Value::Null => {}
            Value::Number(number) => numbers.push(*number),
            other => {
                return Err(ConfigurationError::NonNumericAggregate {
                    aggregator,
                    output: output.to_owned(),
                    value: other.clone(),
                });
            }
        }
    }
    Ok(numbers)
}
