use action_locator::{
    activate_add_organ_button, ElementLocator, Located, LocatorError, OverlayOutcome,
    PanelOutcome, StrategyKind,
};
use anyhow::{Context, Result};
use cdp_adapter::{ChromiumPage, ChromiumSession};
use serde::Serialize;
use tracing::info;

use super::commands::LocateArgs;
use super::output::{emit_structured, OutputFormat};
use crate::config::AppConfig;

/// What the CLI prints after a successful locate or click.
#[derive(Debug, Serialize)]
pub struct LocateReport {
    pub strategy: String,
    pub kind: StrategyKind,
    pub strategy_index: usize,
    pub attempt: u32,
    pub selector: String,
    pub panel: PanelOutcome,
    pub overlay: OverlayOutcome,
    pub clicked: bool,
}

impl LocateReport {
    pub fn from_located<E>(located: &Located<E>, clicked: bool) -> Self {
        Self {
            strategy: located.strategy.clone(),
            kind: located.kind,
            strategy_index: located.strategy_index,
            attempt: located.attempt,
            selector: located.query.to_string(),
            panel: located.panel.clone(),
            overlay: located.overlay.clone(),
            clicked,
        }
    }
}

async fn attach(config: &AppConfig) -> Result<(ChromiumSession, ChromiumPage)> {
    let mut session = ChromiumSession::connect(&config.browser)
        .await
        .context("Failed to attach to the browser")?;
    let page = session
        .page(&config.browser)
        .await
        .context("Failed to select the PJe tab")?;
    Ok((session, page))
}

pub async fn cmd_locate(args: LocateArgs, config: &AppConfig, output: &OutputFormat) -> Result<()> {
    let (_session, page) = attach(config).await?;
    let locator = ElementLocator::add_organ_button(config.automation.interval());

    let located = locator
        .locate_from(&page, args.from_attempt)
        .await
        .map_err(explain)?;
    report(&LocateReport::from_located(&located, false), output)
}

pub async fn cmd_click(config: &AppConfig, output: &OutputFormat) -> Result<()> {
    let (_session, page) = attach(config).await?;

    let located = activate_add_organ_button(&page).await.map_err(explain)?;
    info!(strategy = %located.strategy, "Button clicked");
    report(&LocateReport::from_located(&located, true), output)
}

fn explain(err: LocatorError) -> anyhow::Error {
    let hint = if err.is_exhaustion() {
        "is the process form open and the \"Órgão Julgador\" section present?"
    } else {
        "the browser tab may have been closed"
    };
    anyhow::Error::new(err).context(format!("Could not reach the add button ({hint})"))
}

fn report(report: &LocateReport, output: &OutputFormat) -> Result<()> {
    if emit_structured(report, output)? {
        return Ok(());
    }

    let action = if report.clicked { "Clicked" } else { "Found" };
    println!(
        "{} \"Adicionar Órgão Julgador\" via '{}' ({}, strategy #{}) on attempt {}",
        action,
        report.strategy,
        report.kind.name(),
        report.strategy_index + 1,
        report.attempt
    );
    println!("  selector: {}", report.selector);
    println!("  panel:    {}", describe_panel(&report.panel));
    println!("  overlays: {}", describe_overlay(&report.overlay));
    Ok(())
}

fn describe_panel(outcome: &PanelOutcome) -> String {
    match outcome {
        PanelOutcome::Confirmed { activated: true } => "expanded by click".to_string(),
        PanelOutcome::Confirmed { activated: false } => "already expanded".to_string(),
        PanelOutcome::Unconfirmed { reason } => format!("unconfirmed ({reason})"),
        PanelOutcome::ActionFailed { reason } => format!("failed ({reason})"),
    }
}

fn describe_overlay(outcome: &OverlayOutcome) -> String {
    match outcome {
        OverlayOutcome::Cleared => "cleared".to_string(),
        OverlayOutcome::ActionFailed { reason } => format!("failed ({reason})"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pje_core_types::ElementQuery;

    fn located() -> Located<()> {
        Located {
            element: (),
            strategy: "mat-button".to_string(),
            kind: StrategyKind::TextFilter,
            strategy_index: 3,
            attempt: 2,
            query: ElementQuery::new("button[mat-button]"),
            panel: PanelOutcome::Confirmed { activated: true },
            overlay: OverlayOutcome::Cleared,
        }
    }

    #[test]
    fn test_report_serializes_diagnostics() {
        let report = LocateReport::from_located(&located(), false);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["strategy"], "mat-button");
        assert_eq!(json["kind"], "text-filter");
        assert_eq!(json["attempt"], 2);
        assert_eq!(json["panel"]["status"], "confirmed");
        assert_eq!(json["clicked"], false);
    }

    #[test]
    fn test_exhaustion_hint() {
        let err = explain(LocatorError::NotFound {
            attempts: 3,
            strategies: 7,
        });
        assert!(format!("{err:#}").contains("Órgão Julgador"));
    }

    #[test]
    fn test_panel_descriptions() {
        assert_eq!(
            describe_panel(&PanelOutcome::Confirmed { activated: false }),
            "already expanded"
        );
        assert!(describe_panel(&PanelOutcome::Unconfirmed {
            reason: "no attr".into()
        })
        .contains("no attr"));
    }
}
