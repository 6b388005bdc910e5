//! Application configuration
//!
//! Layering, lowest to highest: defaults, YAML file, `PJE_*` environment
//! variables, command-line flags.

use std::env;

use cdp_adapter::CdpConfig;
use pje_core_types::AutomationConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const ENV_INTERVAL_MS: &str = "PJE_INTERVAL_MS";
pub const ENV_CDP_ENDPOINT: &str = "PJE_CDP_ENDPOINT";
pub const ENV_TARGET_URL: &str = "PJE_TARGET_URL";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var} must be a whole number of milliseconds, got '{value}'")]
    InvalidInterval { var: &'static str, value: String },
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub automation: AutomationConfig,
    pub browser: CdpConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// Emit JSON lines instead of the human formatter
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl AppConfig {
    /// Apply `PJE_*` overrides from the process environment.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides_from(|key| env::var(key).ok())
    }

    pub fn apply_overrides_from(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(value) = non_empty(lookup(ENV_INTERVAL_MS)) {
            let interval = value.parse().map_err(|_| ConfigError::InvalidInterval {
                var: ENV_INTERVAL_MS,
                value: value.clone(),
            })?;
            self.automation.interval_ms = interval;
        }
        if let Some(endpoint) = non_empty(lookup(ENV_CDP_ENDPOINT)) {
            self.browser.endpoint = endpoint;
        }
        if let Some(fragment) = non_empty(lookup(ENV_TARGET_URL)) {
            self.browser.target_url_contains = Some(fragment);
        }
        Ok(())
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.automation.interval_ms, 1000);
        assert_eq!(config.logging.level, "info");
        assert!(!config.logging.json);
    }

    #[test]
    fn test_partial_yaml() {
        let config: AppConfig = serde_yaml::from_str(
            "automation:\n  interval_ms: 250\nlogging:\n  json: true\n",
        )
        .unwrap();
        assert_eq!(config.automation.interval_ms, 250);
        assert!(config.logging.json);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_env_overrides_win_over_file() {
        let mut config = AppConfig::default();
        config
            .apply_overrides_from(lookup(&[
                (ENV_INTERVAL_MS, "1500"),
                (ENV_CDP_ENDPOINT, "http://10.0.0.5:9222"),
                (ENV_TARGET_URL, "pjekz"),
            ]))
            .unwrap();
        assert_eq!(config.automation.interval_ms, 1500);
        assert_eq!(config.browser.endpoint, "http://10.0.0.5:9222");
        assert_eq!(config.browser.target_url_contains.as_deref(), Some("pjekz"));
    }

    #[test]
    fn test_blank_env_values_are_ignored() {
        let mut config = AppConfig::default();
        let before = config.clone();
        config
            .apply_overrides_from(lookup(&[(ENV_INTERVAL_MS, "  "), (ENV_TARGET_URL, "")]))
            .unwrap();
        assert_eq!(config, before);
    }

    #[test]
    fn test_endpoint_comes_from_file_unless_env_overrides() {
        let mut config = AppConfig::default();
        config.apply_overrides_from(lookup(&[])).unwrap();
        assert_eq!(config.browser.endpoint, cdp_adapter::DEFAULT_ENDPOINT);

        let mut config: AppConfig =
            serde_yaml::from_str("browser:\n  endpoint: http://127.0.0.1:9333\n").unwrap();
        config
            .apply_overrides_from(lookup(&[(ENV_CDP_ENDPOINT, "http://10.0.0.5:9222")]))
            .unwrap();
        assert_eq!(config.browser.endpoint, "http://10.0.0.5:9222");
    }

    #[test]
    fn test_bad_interval_is_rejected() {
        let mut config = AppConfig::default();
        let err = config
            .apply_overrides_from(lookup(&[(ENV_INTERVAL_MS, "soon")]))
            .unwrap_err();
        assert!(err.to_string().contains("soon"));
    }
}
