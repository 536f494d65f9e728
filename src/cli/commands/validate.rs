//! Validate configuration command.

use anyhow::{Context, Result};
use backtest_config::AppConfig;
use backtest_strategies::{StrategyRegistry, PAIR_TRADING};
use std::path::Path;

use crate::cli::ValidateArgs;

/// `settings` has already been loaded and checked field by field; this also
/// builds the configured strategies so bad parameters surface here.
pub fn run(args: ValidateArgs, config_path: Option<&Path>, settings: &AppConfig) -> Result<()> {
    match config_path {
        Some(path) => println!("Validating configuration: {:?}", path),
        None => println!("Validating default configuration"),
    }

    let registry = StrategyRegistry::new();
    if settings.strategy.name != PAIR_TRADING {
        registry
            .create(&settings.strategy.name, settings.strategy.params.clone())
            .with_context(|| format!("Invalid strategy '{}'", settings.strategy.name))?;
    }
    registry
        .create_pair(settings.pair.params.clone())
        .context("Invalid pair parameters")?;

    println!("Configuration is valid!");
    println!();
    println!("App: {}", settings.app.name);
    println!("Environment: {}", settings.app.environment);
    println!("Log level: {}", settings.logging.level);
    println!("Initial cash: {}", settings.backtest.initial_cash);
    println!("Timeframe: {}", settings.backtest.timeframe);
    println!("Strategy: {}", settings.strategy.name);

    if args.show {
        println!();
        println!("{}", settings.to_toml()?);
    }

    Ok(())
}
