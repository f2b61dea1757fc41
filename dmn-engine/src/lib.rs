//! Hit policy evaluation for DMN decision tables.
//!
//! Rule matching and output expression evaluation happen upstream; this crate
//! takes the already-matched rules with their evaluated output values, checks
//! them against the table's hit policy, and composes the decision rows. One
//! [`ExecutionContext`] is created per evaluation and never shared.
//!
//! ```
//! use std::sync::Arc;
//!
//! use dmn_engine::{EvaluationRequest, MatchedRule, evaluate};
//! use dmn_primitives::{DecisionTable, HitPolicy, OutputColumn, RuleNumber, Value};
//!
//! let table = DecisionTable::builder("severity", HitPolicy::Priority)
//!     .output(OutputColumn::new("sev")?.with_declared_values(["high", "medium", "low"]))
//!     .build()?;
//! let rules = vec![
//!     MatchedRule::new(RuleNumber::new(1)?).with_conclusion("sev", "low"),
//!     MatchedRule::new(RuleNumber::new(2)?).with_conclusion("sev", "high"),
//! ];
//!
//! let outcome = evaluate(&EvaluationRequest::new(Arc::new(table), rules))?;
//! assert_eq!(outcome.single_row().and_then(|row| row.get("sev")), Some(&Value::from("high")));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![warn(missing_docs, clippy::pedantic)]

pub mod aggregate;
mod audit;
mod behavior;
pub mod compose;
mod context;
mod contracts;
mod decision;
mod engine;
mod error;

pub use audit::{AuditTrail, ConclusionResult, RuleExecutionRecord};
pub use behavior::HitPolicyBehavior;
pub use context::ExecutionContext;
pub use contracts::{Conclusion, EvaluationRequest, MatchedRule};
pub use decision::EvaluationOutcome;
pub use engine::{DecisionEngine, HitPolicyEngine, evaluate};
pub use error::{ConfigurationError, EvaluationError, EvaluationResult};
