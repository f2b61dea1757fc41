//! Evaluates a decision table against pre-matched rules read from JSON.
//!
//! ```text
//! cargo run -p evaluate-table -- --input demos/discounts.json --lenient --audit
//! ```

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use dmn_decisions::config::{self, EngineConfig};
use dmn_decisions::engine::{EvaluationError, EvaluationRequest, MatchedRule, evaluate};
use dmn_decisions::primitives::DecisionTable;
use dmn_decisions::telemetry;
use serde::Deserialize;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "evaluate-table", about = "Apply a DMN hit policy to matched rules")]
struct Args {
    /// JSON file holding `{ "table": .., "rules": [..] }`.
    #[arg(long, value_name = "FILE")]
    input: PathBuf,
    /// Optional engine config file.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Abort on the first hit policy violation.
    #[arg(long, conflicts_with = "lenient")]
    strict: bool,
    /// Record violations and keep evaluating.
    #[arg(long)]
    lenient: bool,
    /// Print the audit trail after the decision rows.
    #[arg(long)]
    audit: bool,
}

#[derive(Deserialize)]
struct Input {
    table: DecisionTable,
    #[serde(default)]
    rules: Vec<MatchedRule>,
}

fn resolve_config(args: &Args) -> Result<EngineConfig> {
    let config = config::load(args.config.as_deref())?;
    Ok(match (args.strict, args.lenient) {
        (true, _) => config.with_strict_mode(true),
        (_, true) => config.with_strict_mode(false),
        _ => config,
    })
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = resolve_config(&args)?;
    telemetry::init(config.log_filter())?;

    let raw = fs::read_to_string(&args.input)
        .with_context(|| format!("reading {}", args.input.display()))?;
    let input: Input = serde_json::from_str(&raw)
        .with_context(|| format!("parsing {}", args.input.display()))?;

    info!(
        decision = input.table.key(),
        hit_policy = %input.table.hit_policy(),
        rules = input.rules.len(),
        strict = config.strict_mode(),
        "evaluating decision table"
    );
    let request = EvaluationRequest::new(Arc::new(input.table), input.rules)
        .with_strict_mode(config.strict_mode());

    match evaluate(&request) {
        Ok(outcome) => {
            telemetry::log_audit_trail(outcome.audit());
            println!("{}", serde_json::to_string_pretty(outcome.rows())?);
            if args.audit {
                println!("{}", outcome.audit().to_json()?);
            }
            Ok(())
        }
        Err(err) => {
            if let (true, Some(audit)) = (args.audit, err.audit()) {
                println!("{}", audit.to_json()?);
            }
            Err(report(err))
        }
    }
}

fn report(err: EvaluationError) -> anyhow::Error {
    let hint = if err.is_violation() {
        "rerun with --lenient to compose a best-effort result"
    } else {
        "fix the decision table or the matched rules"
    };
    anyhow::Error::new(err).context(hint)
}
