//! Read-only decision table metadata shared across evaluations.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::{Aggregator, HitPolicy, Value};

const MAX_NAME_LEN: usize = 128;

/// One output column of a decision table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OutputColumn {
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    declared_values: Option<Vec<Value>>,
}

impl OutputColumn {
    /// Creates an output column without a declared value list.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidOutputName`] when the name is empty or too long.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        validate_output_name(&name)?;
        Ok(Self {
            name,
            declared_values: None,
        })
    }

    /// Attaches the author-provided list of permissible values.
    ///
    /// Earlier entries rank higher under PRIORITY and sort first under
    /// OUTPUT ORDER.
    #[must_use]
    pub fn with_declared_values<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.declared_values = Some(values.into_iter().map(Into::into).collect());
        self
    }

    /// Returns the output name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the declared value list, treating an empty list as absent.
    #[must_use]
    pub fn declared_values(&self) -> Option<&[Value]> {
        self.declared_values
            .as_deref()
            .filter(|values| !values.is_empty())
    }

    /// Position of `value` in the declared list; lower means higher priority.
    #[must_use]
    pub fn position_of(&self, value: &Value) -> Option<usize> {
        self.declared_values()?
            .iter()
            .position(|declared| declared == value)
    }
}

fn validate_output_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::InvalidOutputName {
            name: name.into(),
            reason: "name cannot be empty".into(),
        });
    }
    if name.len() > MAX_NAME_LEN {
        return Err(Error::InvalidOutputName {
            name: name.into(),
            reason: format!("name length must be <= {MAX_NAME_LEN}"),
        });
    }
    Ok(())
}

/// Decision table metadata consumed by hit policy evaluation.
///
/// Immutable once built; wrap it in an `Arc` to share it between concurrent
/// evaluations of the same table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawDecisionTable")]
pub struct DecisionTable {
    key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    hit_policy: HitPolicy,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    aggregator: Option<Aggregator>,
    outputs: Vec<OutputColumn>,
}

impl DecisionTable {
    /// Starts building a table with the given key and hit policy.
    #[must_use]
    pub fn builder(key: impl Into<String>, hit_policy: HitPolicy) -> DecisionTableBuilder {
        DecisionTableBuilder {
            key: key.into(),
            name: None,
            hit_policy,
            aggregator: None,
            outputs: Vec::new(),
        }
    }

    /// Returns the decision key.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Returns the optional display name.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Returns the declared hit policy.
    #[must_use]
    pub const fn hit_policy(&self) -> HitPolicy {
        self.hit_policy
    }

    /// Returns the configured aggregator, if any.
    #[must_use]
    pub const fn aggregator(&self) -> Option<Aggregator> {
        self.aggregator
    }

    /// Returns the output columns in declaration order.
    #[must_use]
    pub fn outputs(&self) -> &[OutputColumn] {
        &self.outputs
    }

    /// Looks up an output column by name.
    #[must_use]
    pub fn output(&self, name: &str) -> Option<&OutputColumn> {
        self.outputs.iter().find(|column| column.name() == name)
    }

    /// Returns the declaration index of the named output column.
    #[must_use]
    pub fn output_index(&self, name: &str) -> Option<usize> {
        self.outputs.iter().position(|column| column.name() == name)
    }
}

/// Builder for [`DecisionTable`].
#[derive(Debug)]
pub struct DecisionTableBuilder {
    key: String,
    name: Option<String>,
    hit_policy: HitPolicy,
    aggregator: Option<Aggregator>,
    outputs: Vec<OutputColumn>,
}

impl DecisionTableBuilder {
    /// Sets the display name.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the COLLECT aggregator.
    #[must_use]
    pub fn aggregator(mut self, aggregator: Aggregator) -> Self {
        self.aggregator = Some(aggregator);
        self
    }

    /// Appends an output column.
    #[must_use]
    pub fn output(mut self, column: OutputColumn) -> Self {
        self.outputs.push(column);
        self
    }

    /// Finalises the table.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidTable`] when the key is empty, no output column
    /// is declared, or two columns share a name.
    pub fn build(self) -> Result<DecisionTable> {
        if self.key.trim().is_empty() {
            return Err(Error::invalid_table("decision key cannot be empty"));
        }
        if self.outputs.is_empty() {
            return Err(Error::invalid_table(format!(
                "decision `{}` declares no output columns",
                self.key
            )));
        }

        let mut seen = BTreeSet::new();
        for column in &self.outputs {
            validate_output_name(column.name())?;
            if !seen.insert(column.name()) {
                return Err(Error::invalid_table(format!(
                    "output `{}` is declared more than once",
                    column.name()
                )));
            }
        }

        Ok(DecisionTable {
            key: self.key,
            name: self.name,
            hit_policy: self.hit_policy,
            aggregator: self.aggregator,
            outputs: self.outputs,
        })
    }
}

#[derive(Deserialize)]
struct RawDecisionTable {
    key: String,
    #[serde(default)]
    name: Option<String>,
    hit_policy: HitPolicy,
    #[serde(default)]
    aggregator: Option<Aggregator>,
    outputs: Vec<OutputColumn>,
}

impl TryFrom<RawDecisionTable> for DecisionTable {
    type Error = Error;

    fn try_from(raw: RawDecisionTable) -> Result<Self> {
        DecisionTableBuilder {
            key: raw.key,
            name: raw.name,
            hit_policy: raw.hit_policy,
            aggregator: raw.aggregator,
            outputs: raw.outputs,
        }
        .build()
    }
}
