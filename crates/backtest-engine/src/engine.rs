//! Bar-replay backtesting engine.

use backtest_core::{
    error::BacktestError,
    traits::{BarContext, SignalGenerator},
    types::{to_decimal, BacktestResult, BarSeries, EquityPoint},
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::ledger::{LedgerOutcome, PositionLedger, RejectReason};

/// Backtest configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BacktestConfig {
    /// Starting cash
    pub initial_cash: Decimal,
}

impl BacktestConfig {
    /// Reject settings no run can start from.
    pub fn validate(&self) -> Result<(), BacktestError> {
        if self.initial_cash <= Decimal::ZERO {
            return Err(BacktestError::Config(format!(
                "initial_cash must be positive, got {}",
                self.initial_cash
            )));
        }
        Ok(())
    }
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            initial_cash: dec!(100000),
        }
    }
}

/// Backtesting engine.
#[derive(Debug, Clone, Default)]
pub struct BacktestEngine {
    config: BacktestConfig,
}

impl BacktestEngine {
    /// Create a new backtest engine.
    pub fn new(config: BacktestConfig) -> Result<Self, BacktestError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &BacktestConfig {
        &self.config
    }

    /// Replay `series` through `generator`.
    ///
    /// For every bar, in order: the generator classifies the bar against the
    /// current position, the ledger applies its signals in emission order, and
    /// one equity point is recorded at the bar's close. Refused signals are
    /// counted, never fatal.
    pub fn run<G>(&self, generator: &mut G, series: &BarSeries) -> BacktestResult
    where
        G: SignalGenerator + ?Sized,
    {
        let initial_cash = self.config.initial_cash;
        generator.compute_indicators(series);

        if series.is_empty() {
            info!(strategy = generator.name(), "No bars to replay");
            return BacktestResult::empty(generator.name(), initial_cash);
        }

        info!(
            strategy = generator.name(),
            symbol = %series.symbol,
            bars = series.len(),
            initial_cash = %initial_cash,
            "Starting backtest"
        );

        let mut ledger = PositionLedger::new(initial_cash, generator.max_entries());
        let mut equity_curve = Vec::with_capacity(series.len());
        let mut rejected_signals = 0;
        let mut mark = Decimal::ZERO;

        for (index, bar) in series.iter().enumerate() {
            let ctx = BarContext {
                index,
                bar,
                position: ledger.view(),
            };

            for signal in generator.on_bar(&ctx) {
                match ledger.apply(&signal) {
                    LedgerOutcome::Executed(trade) => debug!(
                        bar = index,
                        side = ?trade.side,
                        price = %trade.price,
                        size = %trade.size,
                        cash = %ledger.cash(),
                        reason = %signal.metadata.reason,
                        "Trade executed"
                    ),
                    // Selling while flat is a no-op, not a refusal
                    LedgerOutcome::Rejected(RejectReason::NoPosition) => {}
                    LedgerOutcome::Rejected(reason) => {
                        rejected_signals += 1;
                        debug!(bar = index, kind = ?signal.kind, %reason, "Signal rejected");
                    }
                }
            }

            if let Some(close) = to_decimal(bar.close) {
                mark = close;
            }
            equity_curve.push(EquityPoint::new(
                bar.timestamp,
                ledger.cash(),
                ledger.market_value(mark),
            ));
        }

        let (final_cash, trades, total_profit, final_position) = ledger.into_parts();
        let result = BacktestResult {
            strategy: generator.name().to_string(),
            initial_cash,
            final_cash,
            num_trades: trades.len(),
            trades,
            equity_curve,
            total_profit,
            final_position,
            rejected_signals,
        };

        info!(
            strategy = %result.strategy,
            trades = result.num_trades,
            rejected = result.rejected_signals,
            total_profit = %result.total_profit,
            final_equity = %result.final_equity(),
            "Backtest complete"
        );

        result
    }
}
