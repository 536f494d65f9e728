//! Pair backtest command.

use anyhow::{Context, Result};
use backtest_config::AppConfig;
use backtest_data::load_csv;
use backtest_engine::{BacktestConfig, PairBacktestEngine, PairBacktestReport};
use backtest_strategies::StrategyRegistry;
use tracing::info;

use super::{emit, params, symbol_from_path};
use crate::cli::PairArgs;

pub fn run(args: PairArgs, settings: &AppConfig) -> Result<()> {
    let params = params(args.params.as_deref(), &settings.pair.params)?;
    let timeframe = args.timeframe.unwrap_or(settings.backtest.timeframe);
    let initial_cash = args.cash.unwrap_or(settings.backtest.initial_cash);

    let mut strategy = StrategyRegistry::new()
        .create_pair(params)
        .context("Failed to create pair strategy")?;

    let symbol_a = symbol_from_path(&args.data_a);
    let symbol_b = symbol_from_path(&args.data_b);
    let a = load_csv(&args.data_a, &symbol_a, timeframe)
        .with_context(|| format!("Failed to load data from {}", args.data_a.display()))?;
    let b = load_csv(&args.data_b, &symbol_b, timeframe)
        .with_context(|| format!("Failed to load data from {}", args.data_b.display()))?;
    info!("Loaded {} / {} bars for {}/{}", a.len(), b.len(), symbol_a, symbol_b);

    let engine = PairBacktestEngine::new(BacktestConfig { initial_cash })?;
    let result = engine.run(&mut strategy, &a, &b);
    let report = PairBacktestReport::new(timeframe, result);

    emit(
        &args.output,
        report.summary(),
        report.to_json()?,
        report.equity_to_csv(),
    )
}
