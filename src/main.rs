//! Backtester CLI application.

mod cli;
mod logging;

use std::path::Path;

use anyhow::{Context, Result};
use backtest_config::{load_config, load_env_config};
use clap::Parser;
use cli::{Cli, Commands};
use logging::setup_logging;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let settings = match &cli.config {
        Some(path) => load_config(path),
        None => load_env_config(),
    }
    .context("Failed to load configuration")?;

    let level = cli
        .log_level
        .map(|l| l.as_str())
        .unwrap_or(settings.logging.level.as_str());
    let json = cli.json_logs || settings.logging.format == "json";
    let _guard = setup_logging(level, json, settings.logging.file.as_deref().map(Path::new))?;

    match cli.command {
        Commands::Run(args) => cli::commands::run::run(args, &settings),
        Commands::Pair(args) => cli::commands::pair::run(args, &settings),
        Commands::Strategies(args) => cli::commands::strategies::run(args),
        Commands::ValidateConfig(args) => {
            cli::commands::validate::run(args, cli.config.as_deref(), &settings)
        }
    }
}
