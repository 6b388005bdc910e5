use anyhow::Result;

use super::output::{emit_structured, OutputFormat};
use crate::cli::context::CliContext;

pub fn cmd_config(ctx: &CliContext, output: &OutputFormat) -> Result<()> {
    let config = ctx.config();
    if emit_structured(config, output)? {
        return Ok(());
    }

    let source = if ctx.config_found() {
        ctx.config_path().display().to_string()
    } else {
        format!("defaults ({} not found)", ctx.config_path().display())
    };
    println!("Configuration source: {}", source);
    println!("  interval:        {} ms", config.automation.interval_ms);
    println!("  cdp endpoint:    {}", config.browser.endpoint);
    println!(
        "  target tab:      {}",
        config
            .browser
            .target_url_contains
            .as_deref()
            .unwrap_or("first open tab")
    );
    println!("  request timeout: {} ms", config.browser.request_timeout_ms);
    println!(
        "  logging:         {}{}",
        config.logging.level,
        if config.logging.json { " (json)" } else { "" }
    );
    Ok(())
}
