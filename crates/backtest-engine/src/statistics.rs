//! Backtest statistics.

use backtest_core::types::{to_f64, BacktestResult, EquityPoint, PairBacktestResult};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

/// Summary statistics derived from a finished backtest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestStats {
    pub initial_cash: Decimal,
    pub final_equity: Decimal,
    pub total_return_pct: Decimal,
    /// Largest peak-to-trough fall in equity, in percent
    pub max_drawdown_pct: Decimal,
    /// Annualized Sharpe ratio of bar returns (risk-free rate of 0)
    pub sharpe_ratio: f64,
    /// Total number of fills
    pub total_trades: usize,
    /// Fills that realized a profit or loss
    pub closed_trades: usize,
    pub winning_trades: usize,
    pub losing_trades: usize,
    /// Win rate percentage of closed trades
    pub win_rate_pct: Decimal,
    /// Gross profit / gross loss
    pub profit_factor: Decimal,
    /// Sum of realized profits
    pub total_profit: Decimal,
    pub bars_processed: usize,
    /// Signals the ledger refused
    pub rejected_signals: usize,
}

impl BacktestStats {
    /// Statistics of a single-instrument run.
    ///
    /// `periods_per_year` annualizes the Sharpe ratio, e.g. 252 for daily bars.
    pub fn from_result(result: &BacktestResult, periods_per_year: f64) -> Self {
        let profits: Vec<Decimal> = result.trades.iter().filter_map(|t| t.profit).collect();
        Self::compute(
            result.initial_cash,
            &result.equity_curve,
            &profits,
            result.num_trades,
            result.rejected_signals,
            periods_per_year,
        )
    }

    /// Statistics of a pair run.
    pub fn from_pair_result(result: &PairBacktestResult, periods_per_year: f64) -> Self {
        let profits: Vec<Decimal> = result.trades.iter().filter_map(|t| t.profit).collect();
        Self::compute(
            result.initial_cash,
            &result.equity_curve,
            &profits,
            result.num_trades,
            result.rejected_signals,
            periods_per_year,
        )
    }

    fn compute(
        initial_cash: Decimal,
        equity_curve: &[EquityPoint],
        profits: &[Decimal],
        total_trades: usize,
        rejected_signals: usize,
        periods_per_year: f64,
    ) -> Self {
        let final_equity = equity_curve.last().map(|p| p.equity).unwrap_or(initial_cash);
        let total_return_pct = if initial_cash > Decimal::ZERO {
            (final_equity - initial_cash) / initial_cash * dec!(100)
        } else {
            Decimal::ZERO
        };

        let (wins, losses): (Vec<Decimal>, Vec<Decimal>) = profits
            .iter()
            .filter(|p| !p.is_zero())
            .partition(|p| **p > Decimal::ZERO);
        let (winning_trades, losing_trades) = (wins.len(), losses.len());
        let gross_profit: Decimal = wins.iter().sum();
        let gross_loss: Decimal = losses.iter().map(|p| p.abs()).sum();

        Self {
            initial_cash,
            final_equity,
            total_return_pct,
            max_drawdown_pct: max_drawdown_pct(initial_cash, equity_curve),
            sharpe_ratio: sharpe_ratio(&bar_returns(equity_curve), periods_per_year),
            total_trades,
            closed_trades: profits.len(),
            winning_trades,
            losing_trades,
            win_rate_pct: if profits.is_empty() {
                Decimal::ZERO
            } else {
                Decimal::from(winning_trades * 100) / Decimal::from(profits.len())
            },
            profit_factor: if gross_loss > Decimal::ZERO {
                gross_profit / gross_loss
            } else {
                Decimal::ZERO
            },
            total_profit: profits.iter().sum(),
            bars_processed: equity_curve.len(),
            rejected_signals,
        }
    }
}

fn sharpe_ratio(returns: &[f64], periods_per_year: f64) -> f64 {
    if returns.len() < 2 {
        return 0.0;
    }
    let std_dev = returns.population_std_dev();
    if std_dev > 0.0 {
        returns.mean() / std_dev * periods_per_year.sqrt()
    } else {
        0.0
    }
}

/// Fractional equity change between consecutive bars.
fn bar_returns(equity_curve: &[EquityPoint]) -> Vec<f64> {
    equity_curve
        .windows(2)
        .filter(|w| w[0].equity > Decimal::ZERO)
        .map(|w| to_f64((w[1].equity - w[0].equity) / w[0].equity))
        .collect()
}

/// Largest peak-to-trough fall in equity, in percent.
fn max_drawdown_pct(initial_cash: Decimal, equity_curve: &[EquityPoint]) -> Decimal {
    let mut peak = initial_cash;
    let mut max_drawdown = Decimal::ZERO;

    for point in equity_curve {
        if point.equity > peak {
            peak = point.equity;
        }
        if peak > Decimal::ZERO {
            let drawdown = (peak - point.equity) / peak * dec!(100);
            if drawdown > max_drawdown {
                max_drawdown = drawdown;
            }
        }
    }

    max_drawdown
}
