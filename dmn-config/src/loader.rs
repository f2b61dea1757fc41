//! Configuration loader implementations.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use tracing::debug;

use crate::schema::EngineConfig;

/// Overrides strict mode: `true`/`false`, `1`/`0`, `yes`/`no`, `strict`/`lenient`.
pub const STRICT_MODE_VAR: &str = "DMN_STRICT_MODE";
/// Overrides the log filter directive.
pub const LOG_FILTER_VAR: &str = "DMN_LOG";

/// Reads a JSON configuration file.
///
/// # Errors
///
/// Fails when the file cannot be read or is not a valid configuration.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<EngineConfig> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path)
        .with_context(|| format!("reading engine config {}", path.display()))?;
    let config = serde_json::from_str(&raw)
        .with_context(|| format!("parsing engine config {}", path.display()))?;
    debug!(path = %path.display(), "engine config loaded");
    Ok(config)
}

/// Applies overrides looked up through `lookup`, typically `std::env::var`.
///
/// # Errors
///
/// Fails when the strict mode override is not a recognised boolean.
pub fn apply_env<F>(mut config: EngineConfig, lookup: F) -> Result<EngineConfig>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(raw) = lookup(STRICT_MODE_VAR) {
        let strict = parse_flag(&raw)
            .with_context(|| format!("invalid {STRICT_MODE_VAR} value `{raw}`"))?;
        debug!(strict, "strict mode overridden from environment");
        config = config.with_strict_mode(strict);
    }
    if let Some(filter) = lookup(LOG_FILTER_VAR).filter(|value| !value.trim().is_empty()) {
        config = config.with_log_filter(filter);
    }
    Ok(config)
}

/// Loads the file at `path` (or defaults) and then applies process
/// environment overrides.
///
/// # Errors
///
/// Propagates file and environment parsing failures.
pub fn load(path: Option<&Path>) -> Result<EngineConfig> {
    let config = match path {
        Some(path) => load_from_path(path)?,
        None => EngineConfig::default(),
    };
    apply_env(config, |name| std::env::var(name).ok())
}

fn parse_flag(raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "strict" => Ok(true),
        "false" | "0" | "no" | "lenient" => Ok(false),
        _ => bail!("expected true/false, 1/0, yes/no, or strict/lenient"),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::io::Write;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn env_overrides_strict_mode_and_filter() {
        let config = apply_env(
            EngineConfig::default(),
            lookup(&[(STRICT_MODE_VAR, "lenient"), (LOG_FILTER_VAR, "dmn_engine=debug")]),
        )
        .unwrap();
        assert!(!config.strict_mode());
        assert_eq!(config.log_filter(), "dmn_engine=debug");
    }

    #[test]
    fn invalid_strict_flag_is_reported() {
        let err = apply_env(EngineConfig::default(), lookup(&[(STRICT_MODE_VAR, "maybe")]))
            .unwrap_err();
        assert!(err.to_string().contains("DMN_STRICT_MODE"));
    }

    #[test]
    fn absent_overrides_keep_config() {
        let config = apply_env(EngineConfig::default().with_strict_mode(false), lookup(&[])).unwrap();
        assert!(!config.strict_mode());
    }

    #[test]
    fn file_config_is_parsed() {
        let path = std::env::temp_dir().join(format!("dmn-config-{}.json", std::process::id()));
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(br#"{ "strict_mode": false, "log_filter": "warn" }"#)
            .unwrap();

        let config = load_from_path(&path).unwrap();
        fs::remove_file(&path).unwrap();
        assert!(!config.strict_mode());
        assert_eq!(config.log_filter(), "warn");
    }

    #[test]
    fn missing_file_names_the_path() {
        let err = load_from_path("/nonexistent/dmn.json").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/dmn.json"));
    }
}
