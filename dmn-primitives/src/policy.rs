//! Hit policies and aggregators declared on a decision table.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::Error;

/// Rule for resolving several matching rules into one decision result.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HitPolicy {
    /// At most one rule may match.
    Unique,
    /// Several rules may match as long as they agree on every output.
    Any,
    /// The output value ranked highest in its declared value list wins.
    Priority,
    /// Every matching value, sorted by its declared value list.
    #[serde(alias = "OUTPUT ORDER")]
    OutputOrder,
    /// Every matching rule's row, in rule order.
    #[serde(alias = "RULE ORDER")]
    RuleOrder,
    /// Distinct matching rows, optionally reduced by an [`Aggregator`].
    Collect,
}

impl HitPolicy {
    /// All policies in declaration order.
    pub const ALL: [Self; 6] = [
        Self::Unique,
        Self::Any,
        Self::Priority,
        Self::OutputOrder,
        Self::RuleOrder,
        Self::Collect,
    ];

    /// Canonical DMN spelling, e.g. `OUTPUT ORDER`.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Unique => "UNIQUE",
            Self::Any => "ANY",
            Self::Priority => "PRIORITY",
            Self::OutputOrder => "OUTPUT ORDER",
            Self::RuleOrder => "RULE ORDER",
            Self::Collect => "COLLECT",
        }
    }

    /// Returns `true` for policies that rank values by a declared value list.
    #[must_use]
    pub const fn requires_declared_values(self) -> bool {
        matches!(self, Self::Priority | Self::OutputOrder)
    }

    /// Returns `true` when a successful evaluation may yield more than one row.
    #[must_use]
    pub const fn is_multi_row(self) -> bool {
        matches!(self, Self::OutputOrder | Self::RuleOrder | Self::Collect)
    }
}

impl Display for HitPolicy {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for HitPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace(['_', '-'], " ");
        Self::ALL
            .into_iter()
            .find(|policy| policy.name() == normalized)
            .ok_or_else(|| Error::UnknownHitPolicy(s.to_owned()))
    }
}

/// Reducer applied to a COLLECT table's single output column.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Aggregator {
    /// Arithmetic sum.
    Sum,
    /// Smallest value.
    Min,
    /// Largest value.
    Max,
    /// Number of distinct values.
    Count,
}

impl Aggregator {
    /// Canonical upper-case name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Sum => "SUM",
            Self::Min => "MIN",
            Self::Max => "MAX",
            Self::Count => "COUNT",
        }
    }
}

impl Display for Aggregator {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Aggregator {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "SUM" | "+" => Ok(Self::Sum),
            "MIN" | "<" => Ok(Self::Min),
            "MAX" | ">" => Ok(Self::Max),
            "COUNT" | "#" => Ok(Self::Count),
            _ => Err(Error::UnknownAggregator(s.to_owned())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hit_policy_parses_spaced_and_snake_spellings() {
        assert_eq!("output order".parse::<HitPolicy>().unwrap(), HitPolicy::OutputOrder);
        assert_eq!("RULE_ORDER".parse::<HitPolicy>().unwrap(), HitPolicy::RuleOrder);
        assert_eq!(" unique ".parse::<HitPolicy>().unwrap(), HitPolicy::Unique);
        assert!(matches!(
            "FIRST".parse::<HitPolicy>(),
            Err(Error::UnknownHitPolicy(_))
        ));
    }

    #[test]
    fn hit_policy_display_uses_dmn_spelling() {
        assert_eq!(HitPolicy::OutputOrder.to_string(), "OUTPUT ORDER");
        for policy in HitPolicy::ALL {
            assert_eq!(policy.to_string().parse::<HitPolicy>().unwrap(), policy);
        }
    }

    #[test]
    fn hit_policy_deserializes_both_spellings() {
        let snake: HitPolicy = serde_json::from_str("\"OUTPUT_ORDER\"").unwrap();
        let spaced: HitPolicy = serde_json::from_str("\"OUTPUT ORDER\"").unwrap();
        assert_eq!(snake, spaced);
    }

    #[test]
    fn aggregator_accepts_dmn_symbols() {
        assert_eq!("+".parse::<Aggregator>().unwrap(), Aggregator::Sum);
        assert_eq!("#".parse::<Aggregator>().unwrap(), Aggregator::Count);
        assert_eq!("max".parse::<Aggregator>().unwrap(), Aggregator::Max);
        assert!("avg".parse::<Aggregator>().is_err());
    }
}
