//! Rule and evaluation identifier types.

use std::fmt::{self, Display, Formatter};
use std::num::NonZeroU32;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::Error;

/// 1-based position of a rule in its decision table.
///
/// Declaration order is semantically significant: RULE ORDER emits rows in
/// ascending rule number and UNIQUE/ANY diagnostics name rules by number.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct RuleNumber(NonZeroU32);

impl RuleNumber {
    /// Creates a rule number, rejecting zero.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRuleNumber`] when `number` is zero.
    pub fn new(number: u32) -> Result<Self, Error> {
        NonZeroU32::new(number)
            .map(Self)
            .ok_or(Error::InvalidRuleNumber(number))
    }

    /// Returns the rule number as a plain integer.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0.get()
    }
}

impl Display for RuleNumber {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl TryFrom<u32> for RuleNumber {
    type Error = Error;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<RuleNumber> for u32 {
    fn from(value: RuleNumber) -> Self {
        value.get()
    }
}

/// Correlates the log lines and audit trail of one table evaluation.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EvaluationId(Uuid);

impl EvaluationId {
    /// Generates a random evaluation identifier.
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates an identifier from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub const fn as_uuid(self) -> Uuid {
        self.0
    }
}

impl Default for EvaluationId {
    fn default() -> Self {
        Self::random()
    }
}

impl Display for EvaluationId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl FromStr for EvaluationId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self::from_uuid)
    }
}
