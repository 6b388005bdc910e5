use std::time::Duration;

use thiserror::Error;

/// Failures reported by a [`crate::PageHandle`] implementation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PageError {
    /// The awaited element did not show up in time
    #[error("timed out after {timeout_ms}ms waiting for {target}")]
    Timeout { target: String, timeout_ms: u64 },

    /// A previously returned element is no longer attached to the document
    #[error("element detached: {0}")]
    Detached(String),

    /// The page or its browser connection is gone
    #[error("page closed: {0}")]
    Closed(String),

    /// In-page script evaluation raised or returned garbage
    #[error("script evaluation failed: {0}")]
    Script(String),

    /// Keyboard or mouse dispatch was rejected
    #[error("input dispatch failed: {0}")]
    Input(String),

    /// Any other driver-level failure
    #[error("protocol error: {0}")]
    Protocol(String),
}

impl PageError {
    pub fn timeout(target: impl Into<String>, timeout: Duration) -> Self {
        PageError::Timeout {
            target: target.into(),
            timeout_ms: timeout.as_millis() as u64,
        }
    }

    /// A closed page cannot recover by retrying against it.
    pub fn is_fatal(&self) -> bool {
        matches!(self, PageError::Closed(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_closed_is_fatal() {
        assert!(PageError::Closed("ws dropped".into()).is_fatal());
        assert!(!PageError::timeout("button", Duration::from_secs(3)).is_fatal());
        assert!(!PageError::Detached("node-1".into()).is_fatal());
    }

    #[test]
    fn test_timeout_message() {
        let err = PageError::timeout("button[mat-button]", Duration::from_millis(3000));
        assert_eq!(
            err.to_string(),
            "timed out after 3000ms waiting for button[mat-button]"
        );
    }
}
