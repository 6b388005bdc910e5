//! Overlay clearing: Escape, then a click on a neutral corner of the page.

use std::time::Duration;

use pje_core_types::PageHandle;
use tracing::{debug, warn};

use crate::types::OverlayOutcome;

pub const DISMISS_KEY: &str = "Escape";
pub const NEUTRAL_POINT: (f64, f64) = (10.0, 10.0);
pub const OVERLAY_SETTLE: Duration = Duration::from_millis(500);

#[derive(Debug, Clone)]
pub struct OverlaySpec {
    pub key: String,
    pub point: (f64, f64),
    pub settle: Duration,
}

impl Default for OverlaySpec {
    fn default() -> Self {
        Self {
            key: DISMISS_KEY.to_string(),
            point: NEUTRAL_POINT,
            settle: OVERLAY_SETTLE,
        }
    }
}

/// Close open dropdowns and tooltips. Never fails; a rejected input is
/// reported in the outcome and the remaining steps are skipped.
pub async fn clear_overlays<P: PageHandle>(page: &P, spec: &OverlaySpec) -> OverlayOutcome {
    if let Err(err) = page.press_key(&spec.key).await {
        warn!(key = %spec.key, error = %err, "Overlay dismiss key failed");
        return OverlayOutcome::ActionFailed {
            reason: err.to_string(),
        };
    }
    page.wait_for_timeout(spec.settle).await;

    let (x, y) = spec.point;
    if let Err(err) = page.mouse_click(x, y).await {
        warn!(x, y, error = %err, "Neutral click failed");
        return OverlayOutcome::ActionFailed {
            reason: err.to_string(),
        };
    }
    page.wait_for_timeout(spec.settle).await;

    debug!("Overlays cleared");
    OverlayOutcome::Cleared
}
