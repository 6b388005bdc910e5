use anyhow::Result;
use clap::Parser;
use pje_core_types::config as automation;
use tracing::{error, info, warn};

use super::context::CliContext;
use super::dispatch::dispatch;
use super::env::CliArgs;
use super::runtime::{init_logging, load_config, LoadedConfig};

pub async fn run() -> Result<()> {
    let cli = CliArgs::parse();

    let LoadedConfig {
        mut config,
        path,
        found,
    } = load_config(cli.config.as_ref()).await?;
    cli.apply_overrides(&mut config);

    init_logging(&config.logging, cli.debug)?;
    info!(
        git = env!("PJE_GIT_HASH"),
        built = env!("PJE_BUILD_DATE"),
        "Starting pje-automation v{}",
        env!("CARGO_PKG_VERSION")
    );
    if found {
        info!("Loaded configuration from: {}", path.display());
    } else {
        warn!("Config file not found, using defaults: {}", path.display());
    }

    automation::install(config.automation.clone());
    let cli_context = CliContext::new(config, path, found);

    match dispatch(&cli, &cli_context).await {
        Ok(()) => {
            info!("Command completed successfully");
            Ok(())
        }
        Err(err) => {
            error!("Command failed: {:#}", err);
            Err(err)
        }
    }
}
