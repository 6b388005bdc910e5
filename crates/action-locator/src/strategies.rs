//! Location strategies for the "Adicionar Órgão Julgador" control
//!
//! The cascade runs from precise to loose:
//! 1. Accessible-name selector on the button itself
//! 2. Buttons inside the expanded "Órgão Julgador" panel, narrowed by label,
//!    then by verb
//! 3. Angular Material button variants carrying the verb
//! 4. Any button carrying the full label
//! 5. In-page scan of every button-like element's text (heuristic)
//!
//! The heuristic only proves that some button mentions the action. The
//! actionable reference is then re-resolved through a label pattern and goes
//! through the same wait + visibility check as every other strategy.

use pje_core_types::{normalize_text, ElementQuery, PageError, PageHandle, TextMatcher};
use regex::Regex;
use tracing::debug;

use crate::precondition::PanelSpec;
use crate::types::LocationStrategy;

pub const ACTION_VERB: &str = "Adicionar";
pub const DOMAIN_NOUNS: [&str; 2] = ["Órgão", "Julgador"];
pub const TARGET_LABEL: &str = "Adicionar Órgão Julgador";

/// Selector the heuristic re-resolves against.
pub const BUTTON_LIKE_SELECTOR: &str = "button, [role=\"button\"]";

/// Collects the rendered text of every button-like element in the document.
pub const BUTTON_TEXTS_SCRIPT: &str = r#"Array.from(document.querySelectorAll('button, [role="button"]')).map((el) => (el.innerText || el.textContent || '').trim())"#;

/// Verb plus any-of nouns predicate over a button's text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionTextMatcher {
    verb: String,
    nouns: Vec<String>,
}

impl ActionTextMatcher {
    pub fn new(verb: impl Into<String>, nouns: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            verb: verb.into(),
            nouns: nouns.into_iter().map(Into::into).collect(),
        }
    }

    pub fn add_organ() -> Self {
        Self::new(ACTION_VERB, DOMAIN_NOUNS)
    }

    /// Verb present and at least one noun present, case-insensitive, in any order.
    pub fn matches(&self, text: &str) -> bool {
        let text = normalize_text(text).to_lowercase();
        text.contains(&self.verb.to_lowercase())
            && self
                .nouns
                .iter()
                .any(|noun| text.contains(&noun.to_lowercase()))
    }

    pub fn first_match<'a>(&self, texts: impl IntoIterator<Item = &'a str>) -> Option<&'a str> {
        texts.into_iter().find(|text| self.matches(text))
    }

    /// Pattern used to re-resolve a heuristic hit: the verb as a whole word
    /// followed later by a word starting with one of the nouns, so plurals
    /// such as "Órgãos" still match.
    pub fn label_pattern(&self) -> Result<TextMatcher, regex::Error> {
        let nouns = self
            .nouns
            .iter()
            .map(|noun| regex::escape(noun))
            .collect::<Vec<_>>()
            .join("|");
        let pattern = format!(r"(?i)\b{}\b.*\b(?:{})", regex::escape(&self.verb), nouns);
        Regex::new(&pattern).map(TextMatcher::Pattern)
    }
}

/// The ordered cascade for the add-organ control.
pub fn add_organ_cascade() -> Vec<LocationStrategy> {
    vec![
        LocationStrategy::structural(
            "aria-label",
            format!("button[aria-label=\"{}\"]", TARGET_LABEL),
        ),
        LocationStrategy::panel_text_filter(
            "expanded-panel-label",
            "button",
            TextMatcher::contains(TARGET_LABEL),
        ),
        LocationStrategy::panel_text_filter(
            "expanded-panel-verb",
            "button",
            TextMatcher::contains(ACTION_VERB),
        ),
        LocationStrategy::text_filter(
            "mat-button",
            "button[mat-button]",
            TextMatcher::contains(ACTION_VERB),
        ),
        LocationStrategy::text_filter(
            "mat-raised-button",
            "button[mat-raised-button]",
            TextMatcher::contains(ACTION_VERB),
        ),
        LocationStrategy::text_filter("button-label", "button", TextMatcher::contains(TARGET_LABEL)),
        LocationStrategy::predicate("button-text-scan", ActionTextMatcher::add_organ()),
    ]
}

/// What a strategy hands to the wait + visibility step.
#[derive(Debug, Clone)]
pub enum Resolution {
    Query(ElementQuery),
    Miss(String),
}

/// Turn a strategy into a concrete query, running the in-page scan for
/// predicate strategies. Panel-scoped strategies are confined to `panel`.
pub async fn candidate_query<P: PageHandle>(
    strategy: &LocationStrategy,
    panel: &PanelSpec,
    page: &P,
) -> Result<Resolution, PageError> {
    if let Some(query) = strategy.declared_query(panel) {
        return Ok(Resolution::Query(query));
    }

    let LocationStrategy::Predicate { matcher, .. } = strategy else {
        return Ok(Resolution::Miss("strategy declares no query".to_string()));
    };

    let texts = scan_button_texts(page).await?;
    let Some(hit) = matcher.first_match(texts.iter().map(String::as_str)) else {
        return Ok(Resolution::Miss(format!(
            "no button text among {} matched the action heuristic",
            texts.len()
        )));
    };

    match matcher.label_pattern() {
        Ok(pattern) => {
            debug!(text = %hit, "heuristic scan hit; re-resolving by label pattern");
            Ok(Resolution::Query(
                ElementQuery::new(BUTTON_LIKE_SELECTOR).with_text(pattern),
            ))
        }
        Err(err) => Ok(Resolution::Miss(format!("invalid label pattern: {}", err))),
    }
}

/// Rendered text of every button-like element, gathered in-page.
pub async fn scan_button_texts<P: PageHandle>(page: &P) -> Result<Vec<String>, PageError> {
    let value = page.evaluate(BUTTON_TEXTS_SCRIPT).await?;
    serde_json::from_value(value)
        .map_err(|err| PageError::Script(format!("unexpected button text payload: {}", err)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::StrategyKind;
    use pje_core_types::testing::{FakeNode, FakePage};

    #[test]
    fn test_heuristic_accepts_target_label() {
        let matcher = ActionTextMatcher::add_organ();
        assert!(matcher.matches("Adicionar Órgão Julgador"));
        assert!(matcher.matches("  adicionar\n órgão julgador "));
        assert!(matcher.matches("Adicionar Julgador"));
    }

    #[test]
    fn test_heuristic_rejects_wrong_verb() {
        assert!(!ActionTextMatcher::add_organ().matches("Remover Órgão"));
    }

    #[test]
    fn test_heuristic_rejects_missing_noun() {
        assert!(!ActionTextMatcher::add_organ().matches("Adicionar Servidor"));
    }

    #[test]
    fn test_first_match_keeps_document_order() {
        let matcher = ActionTextMatcher::add_organ();
        let texts = [
            "Remover Órgão",
            "Adicionar Servidor",
            "add Adicionar Órgão Julgador",
            "Adicionar Órgão",
        ];
        assert_eq!(matcher.first_match(texts), Some("add Adicionar Órgão Julgador"));
    }

    #[test]
    fn test_label_pattern_agrees_with_heuristic_on_labels() {
        let matcher = ActionTextMatcher::add_organ();
        let pattern = matcher.label_pattern().unwrap();
        for text in [
            "Adicionar Órgão Julgador",
            "add Adicionar Órgão Julgador",
            "ADICIONAR ÓRGÃO",
            "Adicionar Órgãos Julgadores",
        ] {
            assert!(matcher.matches(text), "{text}");
            assert!(pattern.matches(text), "{text}");
        }
        for text in ["Remover Órgão", "Adicionar Servidor"] {
            assert!(!pattern.matches(text), "{text}");
        }
    }

    #[test]
    fn test_cascade_is_ordered_precise_to_loose() {
        let cascade = add_organ_cascade();
        let kinds: Vec<_> = cascade.iter().map(|s| s.kind()).collect();
        assert_eq!(kinds.first(), Some(&StrategyKind::Structural));
        assert_eq!(kinds.last(), Some(&StrategyKind::Predicate));
        assert_eq!(
            kinds.iter().filter(|k| **k == StrategyKind::Predicate).count(),
            1
        );
        let names: Vec<_> = cascade.iter().map(|s| s.name()).collect();
        assert!(
            names.iter().position(|n| *n == "expanded-panel-label")
                < names.iter().position(|n| *n == "mat-button")
        );
    }

    #[test]
    fn test_label_pattern_keeps_verb_as_whole_word() {
        let pattern = ActionTextMatcher::add_organ().label_pattern().unwrap();
        assert!(!pattern.matches("Readicionar Órgão"));
        assert!(pattern.matches("Adicionar Julgadores"));
    }

    #[test]
    fn test_panel_strategies_are_scoped_to_panel_title() {
        let panel = PanelSpec::default();
        let scoped: Vec<_> = add_organ_cascade()
            .into_iter()
            .filter_map(|s| s.declared_query(&panel).map(|q| (s.name().to_string(), q)))
            .filter(|(_, q)| q.within.is_some())
            .map(|(name, _)| name)
            .collect();
        assert_eq!(scoped, vec!["expanded-panel-label", "expanded-panel-verb"]);
    }

    #[tokio::test]
    async fn test_predicate_resolves_to_label_pattern_query() {
        let page = FakePage::new()
            .with_node(FakeNode::new("b1").selector("button").text("Adicionar Servidor"))
            .with_node(FakeNode::new("b2").selector("button").text("Adicionar Órgão Julgador"));
        let strategy = LocationStrategy::predicate("scan", ActionTextMatcher::add_organ());

        let resolution = candidate_query(&strategy, &PanelSpec::default(), &page).await.unwrap();
        let Resolution::Query(query) = resolution else {
            panic!("expected a query, got {resolution:?}");
        };
        assert_eq!(query.selector, BUTTON_LIKE_SELECTOR);
        assert!(query.accepts_text("Adicionar Órgão Julgador"));
        assert!(!query.accepts_text("Adicionar Servidor"));
    }

    #[tokio::test]
    async fn test_predicate_misses_without_matching_text() {
        let page = FakePage::new()
            .with_node(FakeNode::new("b1").selector("button").text("Remover Órgão"));
        let strategy = LocationStrategy::predicate("scan", ActionTextMatcher::add_organ());

        let resolution = candidate_query(&strategy, &PanelSpec::default(), &page).await.unwrap();
        assert!(matches!(resolution, Resolution::Miss(_)));
    }

    #[test]
    fn test_scan_surfaces_evaluation_failure() {
        let page = FakePage::new().fail_evaluations();
        let err = tokio_test::block_on(scan_button_texts(&page)).unwrap_err();
        assert!(matches!(err, PageError::Script(_)));
    }
}
