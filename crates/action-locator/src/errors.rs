//! Error types for the locator

use pje_core_types::PageError;
use thiserror::Error;

/// Terminal failures of a locate call.
///
/// Everything below the retry loop (panel, overlay, individual strategies) is
/// recovered locally and never shows up here.
#[derive(Debug, Error, Clone)]
pub enum LocatorError {
    /// Every strategy missed on every attempt
    #[error("all {strategies} location strategies exhausted after {attempts} attempts")]
    NotFound { attempts: u32, strategies: usize },

    /// The page went away while an attempt was in flight
    #[error("page closed during locate: {0}")]
    PageClosed(PageError),

    /// The control was found but clicking it failed
    #[error("activation failed for strategy '{strategy}': {source}")]
    Activation { strategy: String, source: PageError },
}

impl LocatorError {
    pub fn is_exhaustion(&self) -> bool {
        matches!(self, LocatorError::NotFound { .. })
    }
}
