//! Row-level building blocks for final decision composition.

use dmn_primitives::{OutputColumn, OutputRow, Value};

use crate::error::ConfigurationError;

/// Folds rows into one, later non-null values overwriting earlier ones.
pub fn merge_last_non_null<'a, I>(rows: I) -> OutputRow
where
    I: IntoIterator<Item = &'a OutputRow>,
{
    let mut merged = OutputRow::new();
    for row in rows {
        for (output, value) in row.iter() {
            if !value.is_null() || !merged.contains(output) {
                merged.insert(output, value.clone());
            }
        }
    }
    merged
}

/// Drops rows equal to an earlier row, keeping first occurrences in order.
pub fn dedup_rows<I>(rows: I) -> Vec<OutputRow>
where
    I: IntoIterator<Item = OutputRow>,
{
    let mut distinct: Vec<OutputRow> = Vec::new();
    for row in rows {
        if !distinct.contains(&row) {
            distinct.push(row);
        }
    }
    distinct
}

/// Stable-sorts `values` by their position in the column's declared list.
///
/// # Errors
///
/// Returns [`ConfigurationError::UndeclaredValue`] when a value is missing
/// from the declared list.
pub fn sort_by_declared_order(
    column: &OutputColumn,
    values: Vec<Value>,
) -> Result<Vec<Value>, ConfigurationError> {
    let mut ranked = values
        .into_iter()
        .map(|value| match column.position_of(&value) {
            Some(rank) => Ok((rank, value)),
            None => Err(ConfigurationError::UndeclaredValue {
                output: column.name().to_owned(),
                value,
            }),
        })
        .collect::<Result<Vec<_>, _>>()?;
    ranked.sort_by_key(|(rank, _)| *rank);
    Ok(ranked.into_iter().map(|(_, value)| value).collect())
}

/// Zips per-output lists into rows: row `i` holds every output's `i`-th value.
///
/// Shorter lists pad with [`Value::Null`].
#[must_use]
pub fn rows_from_columns(columns: &[(String, Vec<Value>)]) -> Vec<OutputRow> {
    let height = columns
        .iter()
        .map(|(_, values)| values.len())
        .max()
        .unwrap_or(0);

    (0..height)
        .map(|index| {
            columns
                .iter()
                .map(|(output, values)| {
                    (
                        output.clone(),
                        values.get(index).cloned().unwrap_or_default(),
                    )
                })
                .collect()
        })
        .collect()
}
