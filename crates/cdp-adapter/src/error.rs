use chromiumoxide::error::CdpError;
use pje_core_types::PageError;
use thiserror::Error;

/// Failures while attaching to the browser.
#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("failed to connect to {endpoint}: {source}")]
    Connect {
        endpoint: String,
        #[source]
        source: CdpError,
    },

    #[error("no page matched {0}")]
    NoPage(String),

    #[error("cdp error: {0}")]
    Cdp(#[from] CdpError),
}

/// Translate a driver error into the page port's vocabulary. Losing the
/// websocket or its channel means the page is gone for good.
pub fn map_cdp_error(err: CdpError, target: &str) -> PageError {
    let hint = err.to_string();
    match err {
        CdpError::Ws(_) | CdpError::ChannelSendError(_) | CdpError::NoResponse => {
            PageError::Closed(hint)
        }
        CdpError::JavascriptException(_) | CdpError::Serde(_) => PageError::Script(hint),
        CdpError::NotFound => PageError::Detached(target.to_string()),
        CdpError::Timeout => PageError::Protocol(format!("request timed out for {}: {}", target, hint)),
        _ => PageError::Protocol(hint),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lost_channel_is_fatal() {
        assert!(map_cdp_error(CdpError::NoResponse, "button").is_fatal());
    }

    #[test]
    fn test_missing_node_is_detached() {
        assert_eq!(
            map_cdp_error(CdpError::NotFound, "button[mat-button]"),
            PageError::Detached("button[mat-button]".into())
        );
    }

    #[test]
    fn test_timeout_is_recoverable() {
        assert!(!map_cdp_error(CdpError::Timeout, "button").is_fatal());
    }
}
