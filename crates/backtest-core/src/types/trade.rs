//! Executed trades, equity marks and backtest results.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{PairPosition, Position};

/// Side of an executed trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeSide {
    Buy,
    Sell,
}

/// A single executed fill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub timestamp: i64,
    pub side: TradeSide,
    pub price: Decimal,
    pub size: Decimal,
    /// Cost for a buy, revenue for a sell
    pub value: Decimal,
    /// Units held after the fill
    pub resulting_position: Decimal,
    /// Realized profit (sells only)
    pub profit: Option<Decimal>,
    /// Realized profit as a percentage of entry price (sells only)
    pub profit_percent: Option<Decimal>,
}

impl Trade {
    pub fn is_buy(&self) -> bool {
        self.side == TradeSide::Buy
    }

    pub fn is_sell(&self) -> bool {
        self.side == TradeSide::Sell
    }
}

/// Account value at the close of one bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EquityPoint {
    pub timestamp: i64,
    pub cash: Decimal,
    /// Mark-to-market value of open holdings
    pub position_value: Decimal,
    /// `cash + position_value`
    pub equity: Decimal,
}

impl EquityPoint {
    pub fn new(timestamp: i64, cash: Decimal, position_value: Decimal) -> Self {
        Self {
            timestamp,
            cash,
            position_value,
            equity: cash + position_value,
        }
    }
}

/// Outcome of a single-instrument backtest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestResult {
    /// Name of the strategy that was run
    pub strategy: String,
    pub initial_cash: Decimal,
    pub final_cash: Decimal,
    /// Executed trades in execution order
    pub trades: Vec<Trade>,
    /// One point per bar
    pub equity_curve: Vec<EquityPoint>,
    /// Sum of realized sell profits
    pub total_profit: Decimal,
    pub num_trades: usize,
    /// Position still open after the last bar
    pub final_position: Option<Position>,
    /// Signals the ledger refused to execute
    pub rejected_signals: usize,
}

impl BacktestResult {
    /// Result of a run over no bars.
    pub fn empty(strategy: impl Into<String>, initial_cash: Decimal) -> Self {
        Self {
            strategy: strategy.into(),
            initial_cash,
            final_cash: initial_cash,
            trades: Vec::new(),
            equity_curve: Vec::new(),
            total_profit: Decimal::ZERO,
            num_trades: 0,
            final_position: None,
            rejected_signals: 0,
        }
    }

    /// Equity at the last bar, or the starting cash when nothing ran.
    pub fn final_equity(&self) -> Decimal {
        self.equity_curve
            .last()
            .map(|p| p.equity)
            .unwrap_or(self.initial_cash)
    }

    /// Realized sell trades.
    pub fn closed_trades(&self) -> impl Iterator<Item = &Trade> {
        self.trades.iter().filter(|t| t.is_sell())
    }
}

/// A fill on both legs of a spread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairTrade {
    pub timestamp: i64,
    /// True when the trade opened the spread
    pub opening: bool,
    pub price_a: Decimal,
    pub price_b: Decimal,
    /// Signed units of leg A traded
    pub size_a: Decimal,
    /// Signed units of leg B traded
    pub size_b: Decimal,
    /// Spread Z-score at the trigger
    pub zscore: f64,
    /// Realized profit (closing trades only)
    pub profit: Option<Decimal>,
}

/// Outcome of a two-instrument spread backtest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairBacktestResult {
    pub strategy: String,
    pub symbol_a: String,
    pub symbol_b: String,
    pub initial_cash: Decimal,
    pub final_cash: Decimal,
    pub trades: Vec<PairTrade>,
    /// One point per shared timestamp
    pub equity_curve: Vec<EquityPoint>,
    pub total_profit: Decimal,
    pub num_trades: usize,
    pub final_position: Option<PairPosition>,
    pub rejected_signals: usize,
    /// Bars dropped because the other leg had no bar at that timestamp
    pub unmatched_bars: usize,
    /// Lowest cash balance over the run. Closing a losing spread can take it
    /// below zero.
    pub min_cash: Decimal,
}

impl PairBacktestResult {
    pub fn final_equity(&self) -> Decimal {
        self.equity_curve
            .last()
            .map(|p| p.equity)
            .unwrap_or(self.initial_cash)
    }
}
