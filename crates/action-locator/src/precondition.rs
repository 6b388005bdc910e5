//! Panel-expansion precondition
//!
//! Best effort: the cascade still runs when the panel state cannot be
//! confirmed, so every failure here becomes a [`PanelOutcome`] instead of an
//! error.

use std::time::Duration;

use pje_core_types::{ElementQuery, PageHandle, Scope, TextMatcher};
use tracing::{debug, info, warn};

use crate::types::PanelOutcome;

pub const PANEL_HEADER_SELECTOR: &str = "mat-expansion-panel-header";
pub const EXPANDED_PANEL_SELECTOR: &str = "mat-expansion-panel.mat-expanded";
pub const PANEL_TITLE: &str = "Órgão Julgador";
pub const EXPANDED_ATTRIBUTE: &str = "aria-expanded";
pub const HEADER_TIMEOUT: Duration = Duration::from_millis(5000);
pub const EXPAND_SETTLE: Duration = Duration::from_millis(2000);

/// Which panel to expand and how long to give it.
#[derive(Debug, Clone)]
pub struct PanelSpec {
    pub header: ElementQuery,
    /// Expanded container the header sits in
    pub container: String,
    pub header_timeout: Duration,
    pub settle: Duration,
}

impl PanelSpec {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            header: ElementQuery::new(PANEL_HEADER_SELECTOR).with_text(TextMatcher::contains(title)),
            container: EXPANDED_PANEL_SELECTOR.to_string(),
            header_timeout: HEADER_TIMEOUT,
            settle: EXPAND_SETTLE,
        }
    }

    /// The expanded panel whose header matches this spec.
    pub fn scope(&self) -> Scope {
        Scope::new(self.container.clone(), self.header.clone())
    }
}

impl Default for PanelSpec {
    fn default() -> Self {
        Self::titled(PANEL_TITLE)
    }
}

/// Make sure the panel is expanded, clicking its header at most once.
///
/// A header without an `aria-expanded` attribute is left alone: clicking it
/// blindly could collapse a panel that is already open.
pub async fn ensure_panel_expanded<P: PageHandle>(page: &P, spec: &PanelSpec) -> PanelOutcome {
    let header = match page.wait_for(&spec.header, spec.header_timeout).await {
        Ok(header) => header,
        Err(err) => {
            warn!(panel = %spec.header, error = %err, "Panel header did not appear");
            return PanelOutcome::ActionFailed {
                reason: err.to_string(),
            };
        }
    };

    match read_expanded(page, &header).await {
        Ok(true) => {
            debug!(panel = %spec.header, "Panel already expanded");
            return PanelOutcome::Confirmed { activated: false };
        }
        Ok(false) => {}
        Err(reason) => {
            warn!(panel = %spec.header, %reason, "Panel state could not be confirmed");
            return PanelOutcome::Unconfirmed { reason };
        }
    }

    info!(panel = %spec.header, "Expanding collapsed panel");
    if let Err(err) = page.click(&header).await {
        warn!(panel = %spec.header, error = %err, "Panel header click failed");
        return PanelOutcome::ActionFailed {
            reason: err.to_string(),
        };
    }
    page.wait_for_timeout(spec.settle).await;

    match read_expanded(page, &header).await {
        Ok(true) => PanelOutcome::Confirmed { activated: true },
        Ok(false) => {
            warn!(panel = %spec.header, "Panel still reports collapsed after click");
            PanelOutcome::Unconfirmed {
                reason: "panel still collapsed after activation".to_string(),
            }
        }
        Err(reason) => {
            warn!(panel = %spec.header, %reason, "Panel state unreadable after click");
            PanelOutcome::Unconfirmed { reason }
        }
    }
}

async fn read_expanded<P: PageHandle>(page: &P, header: &P::Element) -> Result<bool, String> {
    match page.attribute(header, EXPANDED_ATTRIBUTE).await {
        Ok(Some(value)) => Ok(value.trim().eq_ignore_ascii_case("true")),
        Ok(None) => Err(format!("header has no {} attribute", EXPANDED_ATTRIBUTE)),
        Err(err) => Err(err.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pje_core_types::testing::{FakeNode, FakePage, PageCall};

    fn header(expanded: Option<&str>) -> FakeNode {
        let node = FakeNode::new("header")
            .selector(PANEL_HEADER_SELECTOR)
            .text("Órgão Julgador");
        match expanded {
            Some(value) => node.attr(EXPANDED_ATTRIBUTE, value),
            None => node,
        }
    }

    #[tokio::test]
    async fn test_expanded_panel_is_not_clicked() {
        let page = FakePage::new().with_node(header(Some("true")));
        let outcome = ensure_panel_expanded(&page, &PanelSpec::default()).await;

        assert_eq!(outcome, PanelOutcome::Confirmed { activated: false });
        assert_eq!(page.clicks_on("header"), 0);
        assert_eq!(page.sleeps_of(EXPAND_SETTLE), 0);
    }

    #[tokio::test]
    async fn test_collapsed_panel_is_clicked_once_then_settles() {
        let page = FakePage::new()
            .with_node(header(Some("false")))
            .on_click("header", |dom| dom.set_attr("header", EXPANDED_ATTRIBUTE, "true"));
        let outcome = ensure_panel_expanded(&page, &PanelSpec::default()).await;

        assert_eq!(outcome, PanelOutcome::Confirmed { activated: true });
        assert_eq!(page.clicks_on("header"), 1);
        let calls = page.calls();
        let click = calls
            .iter()
            .position(|c| *c == PageCall::Click("header".into()))
            .unwrap();
        assert_eq!(calls[click + 1], PageCall::Sleep(EXPAND_SETTLE));
    }

    #[tokio::test]
    async fn test_panel_that_stays_collapsed_is_unconfirmed() {
        let page = FakePage::new().with_node(header(Some("false")));
        let outcome = ensure_panel_expanded(&page, &PanelSpec::default()).await;

        assert!(matches!(outcome, PanelOutcome::Unconfirmed { .. }));
        assert_eq!(page.clicks_on("header"), 1);
    }

    #[tokio::test]
    async fn test_missing_attribute_is_unconfirmed_without_click() {
        let page = FakePage::new().with_node(header(None));
        let outcome = ensure_panel_expanded(&page, &PanelSpec::default()).await;

        assert!(matches!(outcome, PanelOutcome::Unconfirmed { .. }));
        assert_eq!(page.clicks_on("header"), 0);
    }

    #[tokio::test]
    async fn test_absent_header_is_action_failed() {
        let page = FakePage::new();
        let outcome = ensure_panel_expanded(&page, &PanelSpec::default()).await;
        assert!(matches!(outcome, PanelOutcome::ActionFailed { .. }));
    }

    #[tokio::test]
    async fn test_rejected_click_is_action_failed() {
        let page = FakePage::new()
            .with_node(header(Some("false")))
            .fail_clicks_on("header");
        let outcome = ensure_panel_expanded(&page, &PanelSpec::default()).await;

        assert!(matches!(outcome, PanelOutcome::ActionFailed { .. }));
        assert_eq!(page.sleeps_of(EXPAND_SETTLE), 0);
    }

    #[test]
    fn test_scope_is_keyed_on_header_title() {
        let scope = PanelSpec::titled("Endereço").scope();
        assert_eq!(scope.container, EXPANDED_PANEL_SELECTOR);
        assert!(scope.marker.accepts_text("Endereço residencial"));
        assert!(!scope.marker.accepts_text("Órgão Julgador"));
    }

    #[tokio::test]
    async fn test_header_is_matched_by_title() {
        let page = FakePage::new()
            .with_node(
                FakeNode::new("other")
                    .selector(PANEL_HEADER_SELECTOR)
                    .text("Dados Pessoais")
                    .attr(EXPANDED_ATTRIBUTE, "false"),
            )
            .with_node(header(Some("true")));
        let outcome = ensure_panel_expanded(&page, &PanelSpec::default()).await;

        assert_eq!(outcome, PanelOutcome::Confirmed { activated: false });
        assert_eq!(page.clicks_on("other"), 0);
    }
}
