//! Process-wide automation settings.
//!
//! The binary loads an [`AutomationConfig`] once and installs it; the locator
//! reads the inter-attempt interval from here on every top-level call.

use std::time::Duration;

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

pub const DEFAULT_INTERVAL_MS: u64 = 1000;

static SHARED: Lazy<RwLock<AutomationConfig>> =
    Lazy::new(|| RwLock::new(AutomationConfig::default()));

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutomationConfig {
    /// Delay between two full locate attempts (milliseconds)
    pub interval_ms: u64,
}

impl Default for AutomationConfig {
    fn default() -> Self {
        Self {
            interval_ms: DEFAULT_INTERVAL_MS,
        }
    }
}

impl AutomationConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

/// Snapshot of the installed configuration.
pub fn shared() -> AutomationConfig {
    SHARED.read().clone()
}

/// Replace the process-wide configuration.
pub fn install(config: AutomationConfig) {
    *SHARED.write() = config;
}
