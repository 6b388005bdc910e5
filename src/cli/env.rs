use clap::Parser;
use std::path::PathBuf;

use super::commands::Commands;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct CliArgs {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Log level (overrides the config file)
    #[arg(short, long)]
    pub log_level: Option<String>,

    /// Enable debug mode
    #[arg(short, long)]
    pub debug: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub json_logs: bool,

    /// Output format
    #[arg(short, long, default_value = "human")]
    pub output: crate::cli::output::OutputFormat,

    /// DevTools endpoint of the running browser
    #[arg(long, value_name = "URL")]
    pub endpoint: Option<String>,

    /// Attach to the tab whose URL contains this fragment
    #[arg(long, value_name = "FRAGMENT")]
    pub target_url: Option<String>,

    /// Delay between locate attempts in milliseconds
    #[arg(long, value_name = "MS")]
    pub interval_ms: Option<u64>,

    #[command(subcommand)]
    pub command: Commands,
}

impl CliArgs {
    /// Fold command-line overrides into the loaded configuration.
    pub fn apply_overrides(&self, config: &mut crate::config::AppConfig) {
        if let Some(level) = &self.log_level {
            config.logging.level = level.clone();
        }
        if self.json_logs {
            config.logging.json = true;
        }
        if let Some(endpoint) = &self.endpoint {
            config.browser.endpoint = endpoint.clone();
        }
        if let Some(fragment) = &self.target_url {
            config.browser.target_url_contains = Some(fragment.clone());
        }
        if let Some(interval_ms) = self.interval_ms {
            config.automation.interval_ms = interval_ms;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    #[test]
    fn test_flags_override_config() {
        let cli = CliArgs::parse_from([
            "pje-automation",
            "--interval-ms",
            "300",
            "--target-url",
            "pjekz",
            "--json-logs",
            "locate",
        ]);
        let mut config = AppConfig::default();
        cli.apply_overrides(&mut config);

        assert_eq!(config.automation.interval_ms, 300);
        assert_eq!(config.browser.target_url_contains.as_deref(), Some("pjekz"));
        assert!(config.logging.json);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_absent_flags_leave_config_alone() {
        let cli = CliArgs::parse_from(["pje-automation", "click"]);
        let mut config = AppConfig::default();
        let before = config.clone();
        cli.apply_overrides(&mut config);
        assert_eq!(config, before);
    }
}
