//! Structured tracing helpers.

use anyhow::{Context, Result, anyhow};
use tracing_subscriber::EnvFilter;

/// Installs a global `fmt` subscriber.
///
/// `RUST_LOG` wins when set; otherwise `default_filter` (for example the
/// configured log filter) is used.
///
/// # Errors
///
/// Fails when `default_filter` is not a valid directive or a global
/// subscriber is already installed.
pub fn init(default_filter: &str) -> Result<()> {
    let filter = filter_from_env(default_filter)?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .map_err(|err| anyhow!(err).context("installing tracing subscriber"))
}

fn filter_from_env(default_filter: &str) -> Result<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(default_filter)
            .with_context(|| format!("invalid log filter `{default_filter}`")),
    }
}
