//! Trading signal types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{Bar, IndicatorFrame};

/// Direction of a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalKind {
    Buy,
    Sell,
}

/// How many units a signal asks the ledger to trade.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderSize {
    /// A fixed number of units.
    Units(Decimal),
    /// Risk a fraction of current equity per unit of ATR, rounded down to
    /// whole lots. Resolved by the ledger at execution time.
    RiskBudget {
        risk_fraction: Decimal,
        atr: Decimal,
        lot_size: Decimal,
    },
    /// Everything currently held.
    All,
}

/// Why a signal fired.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SignalMetadata {
    /// Name of the strategy that emitted the signal
    pub strategy_name: String,
    /// Indicator values at the triggering bar
    pub indicators: BTreeMap<String, f64>,
    /// Human-readable trigger description
    pub reason: String,
}

/// A buy or sell decision taken at the close of one bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    /// Timestamp of the triggering bar (Unix milliseconds)
    pub timestamp: i64,
    /// Index of the triggering bar in its series
    pub bar_index: usize,
    pub kind: SignalKind,
    /// Execution price (the triggering bar's close)
    pub price: f64,
    pub size: OrderSize,
    pub metadata: SignalMetadata,
}

impl Signal {
    /// Buy at the close of `bar`.
    pub fn buy(bar_index: usize, bar: &Bar, size: OrderSize) -> Self {
        Self::at_close(SignalKind::Buy, bar_index, bar, size)
    }

    /// Sell at the close of `bar`.
    pub fn sell(bar_index: usize, bar: &Bar, size: OrderSize) -> Self {
        Self::at_close(SignalKind::Sell, bar_index, bar, size)
    }

    fn at_close(kind: SignalKind, bar_index: usize, bar: &Bar, size: OrderSize) -> Self {
        Self {
            timestamp: bar.timestamp,
            bar_index,
            kind,
            price: bar.close,
            size,
            metadata: SignalMetadata::default(),
        }
    }

    /// Tag the signal with the emitting strategy.
    pub fn from_strategy(mut self, name: &str) -> Self {
        self.metadata.strategy_name = name.to_string();
        self
    }

    /// Record an indicator value that contributed to the trigger.
    pub fn with_indicator(mut self, name: &str, value: f64) -> Self {
        self.metadata.indicators.insert(name.to_string(), value);
        self
    }

    /// Attach a trigger description.
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.metadata.reason = reason.into();
        self
    }

    pub fn is_buy(&self) -> bool {
        self.kind == SignalKind::Buy
    }

    pub fn is_sell(&self) -> bool {
        self.kind == SignalKind::Sell
    }
}

/// Signals produced by replaying a whole series.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SignalSet {
    /// Name of the generating strategy
    pub strategy: String,
    /// Signals in emission order (ascending timestamp)
    pub signals: Vec<Signal>,
    /// Indicator series used to derive the signals
    pub diagnostics: IndicatorFrame,
}

impl SignalSet {
    pub fn buys(&self) -> impl Iterator<Item = &Signal> {
        self.signals.iter().filter(|s| s.is_buy())
    }

    pub fn sells(&self) -> impl Iterator<Item = &Signal> {
        self.signals.iter().filter(|s| s.is_sell())
    }

    pub fn buy_timestamps(&self) -> Vec<i64> {
        self.buys().map(|s| s.timestamp).collect()
    }

    pub fn sell_timestamps(&self) -> Vec<i64> {
        self.sells().map(|s| s.timestamp).collect()
    }

    /// Bar indices of the buy signals.
    pub fn buy_indices(&self) -> Vec<usize> {
        self.buys().map(|s| s.bar_index).collect()
    }

    /// Bar indices of the sell signals.
    pub fn sell_indices(&self) -> Vec<usize> {
        self.sells().map(|s| s.bar_index).collect()
    }

    /// Total number of signals.
    pub fn len(&self) -> usize {
        self.signals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signals.is_empty()
    }
}
