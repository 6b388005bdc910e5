//! Locator orchestration: precondition, overlay clearing, cascade, retry

use std::time::{Duration, Instant};

use pje_core_types::{config, ElementQuery, PageError, PageHandle};
use tracing::{debug, info, instrument, warn};

use crate::errors::LocatorError;
use crate::overlay::{clear_overlays, OverlaySpec};
use crate::precondition::{ensure_panel_expanded, PanelSpec};
use crate::strategies::{add_organ_cascade, candidate_query, Resolution};
use crate::types::{Located, LocationStrategy, RetryState};

pub const MAX_ATTEMPTS: u32 = 3;
pub const CANDIDATE_TIMEOUT: Duration = Duration::from_millis(3000);

/// Multi-strategy locator for a single UI action.
///
/// Each attempt re-runs the panel precondition and overlay clearing before
/// walking the cascade, because either can change between attempts. The
/// first strategy producing a visible element wins.
#[derive(Debug, Clone)]
pub struct ElementLocator {
    panel: PanelSpec,
    overlay: OverlaySpec,
    cascade: Vec<LocationStrategy>,
    candidate_timeout: Duration,
    max_attempts: u32,
    interval: Duration,
}

enum StrategyOutcome<E> {
    Found { element: E, query: ElementQuery },
    Miss(String),
}

impl ElementLocator {
    /// Locator for the "Adicionar Órgão Julgador" button.
    pub fn add_organ_button(interval: Duration) -> Self {
        Self {
            panel: PanelSpec::default(),
            overlay: OverlaySpec::default(),
            cascade: add_organ_cascade(),
            candidate_timeout: CANDIDATE_TIMEOUT,
            max_attempts: MAX_ATTEMPTS,
            interval,
        }
    }

    pub fn with_cascade(mut self, cascade: Vec<LocationStrategy>) -> Self {
        self.cascade = cascade;
        self
    }

    pub fn with_panel(mut self, panel: PanelSpec) -> Self {
        self.panel = panel;
        self
    }

    pub fn cascade(&self) -> &[LocationStrategy] {
        &self.cascade
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Find the control, starting at attempt 1.
    pub async fn locate<P: PageHandle>(&self, page: &P) -> Result<Located<P::Element>, LocatorError> {
        self.locate_from(page, 1).await
    }

    /// Find the control, numbering attempts from `attempt`. Starting at the
    /// last attempt runs the cascade exactly once.
    #[instrument(skip_all, fields(strategies = self.cascade.len(), first_attempt = attempt))]
    pub async fn locate_from<P: PageHandle>(
        &self,
        page: &P,
        attempt: u32,
    ) -> Result<Located<P::Element>, LocatorError> {
        let started = Instant::now();
        let mut retry = RetryState::new(self.max_attempts, self.interval).starting_at(attempt);

        loop {
            info!(
                attempt = retry.attempt,
                max_attempts = retry.max_attempts,
                "Locating control"
            );
            if let Some(found) = self.run_attempt(page, retry.attempt).await? {
                info!(
                    attempt = found.attempt,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Locate finished"
                );
                return Ok(found);
            }
            if !retry.has_remaining() {
                break;
            }
            warn!(
                attempt = retry.attempt,
                interval_ms = retry.interval.as_millis() as u64,
                "Every strategy missed; retrying after interval"
            );
            page.wait_for_timeout(retry.interval).await;
            retry.advance();
        }

        warn!(
            attempts = retry.attempt,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Location strategies exhausted"
        );
        Err(LocatorError::NotFound {
            attempts: retry.attempt,
            strategies: self.cascade.len(),
        })
    }

    /// Locate the control and click it.
    pub async fn activate<P: PageHandle>(&self, page: &P) -> Result<Located<P::Element>, LocatorError> {
        let located = self.locate(page).await?;
        page.click(&located.element).await.map_err(|source| {
            if source.is_fatal() {
                LocatorError::PageClosed(source)
            } else {
                LocatorError::Activation {
                    strategy: located.strategy.clone(),
                    source,
                }
            }
        })?;
        info!(strategy = %located.strategy, attempt = located.attempt, "Control activated");
        Ok(located)
    }

    async fn run_attempt<P: PageHandle>(
        &self,
        page: &P,
        attempt: u32,
    ) -> Result<Option<Located<P::Element>>, LocatorError> {
        let panel = ensure_panel_expanded(page, &self.panel).await;
        let overlay = clear_overlays(page, &self.overlay).await;

        for (index, strategy) in self.cascade.iter().enumerate() {
            debug!(attempt, strategy = strategy.name(), kind = strategy.kind().name(), "Trying strategy");

            match self.try_strategy(page, strategy).await {
                Ok(StrategyOutcome::Found { element, query }) => {
                    info!(
                        attempt,
                        strategy = strategy.name(),
                        selector = %query,
                        "Control located"
                    );
                    return Ok(Some(Located {
                        element,
                        strategy: strategy.name().to_string(),
                        kind: strategy.kind(),
                        strategy_index: index,
                        attempt,
                        query,
                        panel,
                        overlay,
                    }));
                }
                Ok(StrategyOutcome::Miss(reason)) => {
                    warn!(attempt, strategy = strategy.name(), %reason, "Strategy missed");
                }
                Err(err) if err.is_fatal() => {
                    warn!(attempt, strategy = strategy.name(), error = %err, "Page closed mid-cascade");
                    return Err(LocatorError::PageClosed(err));
                }
                Err(err) => {
                    warn!(attempt, strategy = strategy.name(), error = %err, "Strategy missed");
                }
            }
        }

        Ok(None)
    }

    async fn try_strategy<P: PageHandle>(
        &self,
        page: &P,
        strategy: &LocationStrategy,
    ) -> Result<StrategyOutcome<P::Element>, PageError> {
        let query = match candidate_query(strategy, &self.panel, page).await? {
            Resolution::Query(query) => query,
            Resolution::Miss(reason) => return Ok(StrategyOutcome::Miss(reason)),
        };

        let element = page.wait_for(&query, self.candidate_timeout).await?;
        if !page.is_visible(&element).await? {
            return Ok(StrategyOutcome::Miss(format!("{} is present but not visible", query)));
        }

        Ok(StrategyOutcome::Found { element, query })
    }
}

/// Locate the "Adicionar Órgão Julgador" button using the process-wide
/// retry interval.
pub async fn find_add_organ_button<P: PageHandle>(
    page: &P,
) -> Result<Located<P::Element>, LocatorError> {
    let interval = config::shared().interval();
    ElementLocator::add_organ_button(interval).locate(page).await
}

/// Locate the "Adicionar Órgão Julgador" button and click it.
pub async fn activate_add_organ_button<P: PageHandle>(
    page: &P,
) -> Result<Located<P::Element>, LocatorError> {
    let interval = config::shared().interval();
    ElementLocator::add_organ_button(interval).activate(page).await
}
