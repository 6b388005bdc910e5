use std::time::Duration;

use serde::{Deserialize, Serialize};

pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:9222";
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 30_000;

/// How to reach the already-running browser.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CdpConfig {
    /// DevTools HTTP or websocket endpoint
    pub endpoint: String,
    /// Pick the first tab whose URL contains this fragment
    pub target_url_contains: Option<String>,
    pub request_timeout_ms: u64,
}

impl Default for CdpConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            target_url_contains: None,
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
        }
    }
}

impl CdpConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}
