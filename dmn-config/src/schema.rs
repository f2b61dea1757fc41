//! Strongly typed configuration schema.

use serde::{Deserialize, Serialize};

const DEFAULT_LOG_FILTER: &str = "info";

/// Process-wide engine settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    strict_mode: bool,
    log_filter: String,
}

impl EngineConfig {
    /// Returns whether hit policy violations abort evaluation.
    #[must_use]
    pub const fn strict_mode(&self) -> bool {
        self.strict_mode
    }

    /// Returns the `tracing` filter directive.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }

    /// Sets strict mode and returns the updated config.
    #[must_use]
    pub fn with_strict_mode(mut self, strict_mode: bool) -> Self {
        self.strict_mode = strict_mode;
        self
    }

    /// Sets the log filter directive and returns the updated config.
    #[must_use]
    pub fn with_log_filter(mut self, filter: impl Into<String>) -> Self {
        self.log_filter = filter.into();
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            strict_mode: true,
            log_filter: DEFAULT_LOG_FILTER.to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_strict() {
        let config = EngineConfig::default();
        assert!(config.strict_mode());
        assert_eq!(config.log_filter(), "info");
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config: EngineConfig = serde_json::from_str(r#"{ "strict_mode": false }"#).unwrap();
        assert!(!config.strict_mode());
        assert_eq!(config.log_filter(), "info");
    }

    #[test]
    fn unknown_fields_are_rejected() {
        assert!(serde_json::from_str::<EngineConfig>(r#"{ "strict": false }"#).is_err());
    }
}
