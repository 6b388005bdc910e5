//! Core types for the locator

use std::time::Duration;

use pje_core_types::{ElementQuery, TextMatcher};
use serde::{Deserialize, Serialize};

use crate::precondition::PanelSpec;
use crate::strategies::ActionTextMatcher;

/// Which family a strategy belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StrategyKind {
    /// Pure CSS selector
    Structural,

    /// CSS selector narrowed by rendered text
    TextFilter,

    /// In-page text scan followed by a pattern re-resolution
    Predicate,
}

impl StrategyKind {
    pub fn name(&self) -> &'static str {
        match self {
            StrategyKind::Structural => "structural",
            StrategyKind::TextFilter => "text-filter",
            StrategyKind::Predicate => "predicate",
        }
    }
}

/// One way of finding the target. Strategies carry no identity beyond their
/// position in the cascade.
#[derive(Debug, Clone)]
pub enum LocationStrategy {
    Structural {
        name: String,
        selector: String,
    },
    TextFilter {
        name: String,
        selector: String,
        text: TextMatcher,
        /// Only search inside the locator's expanded panel
        within_panel: bool,
    },
    Predicate {
        name: String,
        matcher: ActionTextMatcher,
    },
}

impl LocationStrategy {
    pub fn structural(name: impl Into<String>, selector: impl Into<String>) -> Self {
        LocationStrategy::Structural {
            name: name.into(),
            selector: selector.into(),
        }
    }

    pub fn text_filter(
        name: impl Into<String>,
        selector: impl Into<String>,
        text: TextMatcher,
    ) -> Self {
        LocationStrategy::TextFilter {
            name: name.into(),
            selector: selector.into(),
            text,
            within_panel: false,
        }
    }

    /// Text filter confined to the panel the locator expands.
    pub fn panel_text_filter(
        name: impl Into<String>,
        selector: impl Into<String>,
        text: TextMatcher,
    ) -> Self {
        LocationStrategy::TextFilter {
            name: name.into(),
            selector: selector.into(),
            text,
            within_panel: true,
        }
    }

    pub fn predicate(name: impl Into<String>, matcher: ActionTextMatcher) -> Self {
        LocationStrategy::Predicate {
            name: name.into(),
            matcher,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            LocationStrategy::Structural { name, .. }
            | LocationStrategy::TextFilter { name, .. }
            | LocationStrategy::Predicate { name, .. } => name,
        }
    }

    pub fn kind(&self) -> StrategyKind {
        match self {
            LocationStrategy::Structural { .. } => StrategyKind::Structural,
            LocationStrategy::TextFilter { .. } => StrategyKind::TextFilter,
            LocationStrategy::Predicate { .. } => StrategyKind::Predicate,
        }
    }

    /// The query a selector strategy resolves directly. Predicate strategies
    /// only produce a query after their in-page scan hits.
    pub fn declared_query(&self, panel: &PanelSpec) -> Option<ElementQuery> {
        match self {
            LocationStrategy::Structural { selector, .. } => Some(ElementQuery::new(selector)),
            LocationStrategy::TextFilter {
                selector,
                text,
                within_panel,
                ..
            } => {
                let query = ElementQuery::new(selector).with_text(text.clone());
                Some(if *within_panel {
                    query.within(panel.scope())
                } else {
                    query
                })
            }
            LocationStrategy::Predicate { .. } => None,
        }
    }
}

/// Outcome of the panel-expansion precondition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PanelOutcome {
    /// Panel reported expanded; `activated` is true when we had to click it
    Confirmed { activated: bool },

    /// Header found but its state could not be read
    Unconfirmed { reason: String },

    /// Header never appeared or the click was rejected
    ActionFailed { reason: String },
}

impl PanelOutcome {
    pub fn is_confirmed(&self) -> bool {
        matches!(self, PanelOutcome::Confirmed { .. })
    }
}

/// Outcome of the overlay-clearing step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum OverlayOutcome {
    Cleared,
    ActionFailed { reason: String },
}

/// Attempt bookkeeping for one top-level locate call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryState {
    pub attempt: u32,
    pub max_attempts: u32,
    pub interval: Duration,
}

impl RetryState {
    pub fn new(max_attempts: u32, interval: Duration) -> Self {
        Self {
            attempt: 1,
            max_attempts: max_attempts.max(1),
            interval,
        }
    }

    /// Resume numbering at `attempt` (values below 1 are treated as 1).
    pub fn starting_at(mut self, attempt: u32) -> Self {
        self.attempt = attempt.max(1);
        self
    }

    pub fn has_remaining(&self) -> bool {
        self.attempt < self.max_attempts
    }

    pub fn advance(&mut self) {
        self.attempt += 1;
    }
}

/// A found control plus how it was found.
#[derive(Debug, Clone)]
pub struct Located<E> {
    pub element: E,
    pub strategy: String,
    pub kind: StrategyKind,
    pub strategy_index: usize,
    pub attempt: u32,
    pub query: ElementQuery,
    pub panel: PanelOutcome,
    pub overlay: OverlayOutcome,
}
