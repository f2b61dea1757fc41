//! Typed cell values produced by decision table outputs.

use std::collections::BTreeMap;
use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

/// Value of one output cell.
///
/// Serialized untagged, so JSON scalars and arrays map directly onto the
/// variants. Objects have no counterpart and fail to deserialize.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Absent or empty cell.
    #[default]
    Null,
    /// Boolean cell.
    Bool(bool),
    /// Numeric cell. The only variant aggregators accept.
    Number(f64),
    /// Text cell.
    String(String),
    /// Ordered list of values.
    List(Vec<Value>),
}

impl Value {
    /// Returns `true` for [`Value::Null`].
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns the numeric payload, if this is a number.
    #[must_use]
    pub const fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(number) => Some(*number),
            _ => None,
        }
    }

    /// Returns the string payload, if this is a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(text) => Some(text),
            _ => None,
        }
    }

    /// Returns the list payload, if this is a list.
    #[must_use]
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Short name of the variant, used in diagnostics.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Number(_) => "number",
            Self::String(_) => "string",
            Self::List(_) => "list",
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(flag) => Display::fmt(flag, f),
            Self::Number(number) => Display::fmt(number, f),
            Self::String(text) => write!(f, "\"{text}\""),
            Self::List(items) => {
                f.write_str("[")?;
                for (index, item) in items.iter().enumerate() {
                    if index > 0 {
                        f.write_str(", ")?;
                    }
                    Display::fmt(item, f)?;
                }
                f.write_str("]")
            }
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Self::List(value)
    }
}

impl<T> From<Option<T>> for Value
where
    T: Into<Value>,
{
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// One row of a decision result: output name to value.
///
/// Keys are kept sorted so that two rows with the same contents compare,
/// serialize, and deduplicate identically regardless of insertion order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OutputRow(BTreeMap<String, Value>);

impl OutputRow {
    /// Creates an empty row.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `output` to `value`, returning the previous value.
    pub fn insert(&mut self, output: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(output.into(), value)
    }

    /// Adds an entry and returns the updated row.
    #[must_use]
    pub fn with(mut self, output: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(output, value.into());
        self
    }

    /// Returns the value recorded for `output`.
    #[must_use]
    pub fn get(&self, output: &str) -> Option<&Value> {
        self.0.get(output)
    }

    /// Returns a mutable reference to the value recorded for `output`.
    pub fn get_mut(&mut self, output: &str) -> Option<&mut Value> {
        self.0.get_mut(output)
    }

    /// Returns `true` when `output` has an entry.
    #[must_use]
    pub fn contains(&self, output: &str) -> bool {
        self.0.contains_key(output)
    }

    /// Number of outputs in the row.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` when the row has no outputs.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates the entries in output-name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(name, value)| (name.as_str(), value))
    }
}

impl<K, V> FromIterator<(K, V)> for OutputRow
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        )
    }
}

impl IntoIterator for OutputRow {
    type Item = (String, Value);
    type IntoIter = std::collections::btree_map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_renders_integral_numbers_without_fraction() {
        assert_eq!(Value::from(10).to_string(), "10");
        assert_eq!(Value::from(2.5).to_string(), "2.5");
        assert_eq!(Value::from("low").to_string(), "\"low\"");
        assert_eq!(
            Value::List(vec![Value::from(1), Value::Null]).to_string(),
            "[1, null]"
        );
    }

    #[test]
    fn json_scalars_map_onto_variants() {
        let values: Vec<Value> =
            serde_json::from_str(r#"[null, true, 3, 2.5, "x", [1, "y"]]"#).expect("parse");
        assert_eq!(
            values,
            vec![
                Value::Null,
                Value::Bool(true),
                Value::Number(3.0),
                Value::Number(2.5),
                Value::from("x"),
                Value::List(vec![Value::from(1), Value::from("y")]),
            ]
        );
    }

    #[test]
    fn json_objects_are_rejected() {
        assert!(serde_json::from_str::<Value>(r#"{"a": 1}"#).is_err());
    }

    #[test]
    fn rows_compare_independent_of_insertion_order() {
        let left = OutputRow::new().with("a", 1).with("b", "x");
        let right = OutputRow::new().with("b", "x").with("a", 1);
        assert_eq!(left, right);
        assert_eq!(left.len(), 2);
    }
}
