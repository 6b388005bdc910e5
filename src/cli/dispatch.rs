use super::config::cmd_config;
use super::env::CliArgs;
use super::locate::{cmd_click, cmd_locate};
use crate::cli::commands::Commands;
use crate::cli::context::CliContext;
use anyhow::Result;

pub async fn dispatch(cli: &CliArgs, ctx: &CliContext) -> Result<()> {
    match cli.command.clone() {
        Commands::Locate(args) => cmd_locate(args, ctx.config(), &cli.output).await,
        Commands::Click => cmd_click(ctx.config(), &cli.output).await,
        Commands::Config => cmd_config(ctx, &cli.output),
    }
}
