//! Single-instrument backtest command.

use anyhow::{Context, Result};
use backtest_config::AppConfig;
use backtest_data::load_csv;
use backtest_engine::{BacktestConfig, BacktestEngine, BacktestReport};
use backtest_strategies::StrategyRegistry;
use tracing::info;

use super::{emit, params, symbol_from_path};
use crate::cli::RunArgs;

pub fn run(args: RunArgs, settings: &AppConfig) -> Result<()> {
    let name = args.strategy.as_deref().unwrap_or(&settings.strategy.name);
    let params = params(args.params.as_deref(), &settings.strategy.params)?;
    let timeframe = args.timeframe.unwrap_or(settings.backtest.timeframe);
    let initial_cash = args.cash.unwrap_or(settings.backtest.initial_cash);
    let symbol = args
        .symbol
        .clone()
        .unwrap_or_else(|| symbol_from_path(&args.data));

    info!("Starting backtest for strategy: {}", name);

    let registry = StrategyRegistry::new();
    let mut strategy = registry
        .create(name, params)
        .with_context(|| format!("Failed to create strategy '{}'", name))?;

    let series = load_csv(&args.data, &symbol, timeframe)
        .with_context(|| format!("Failed to load data from {}", args.data.display()))?;
    info!("Loaded {} bars for {}", series.len(), symbol);

    let engine = BacktestEngine::new(BacktestConfig { initial_cash })?;
    let result = engine.run(&mut strategy, &series);
    let report = BacktestReport::new(symbol, timeframe, result);

    emit(
        &args.output,
        report.summary(),
        report.to_json()?,
        report.equity_to_csv(),
    )
}
