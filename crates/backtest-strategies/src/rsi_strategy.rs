//! RSI-based Trading Strategy.
//!
//! Trades RSI threshold crossings: buys when RSI drops through the oversold
//! level and sells when it rises through the overbought level.

use backtest_core::{
    error::StrategyError,
    traits::{BarContext, Indicator, SignalGenerator, StrategyConfig},
    types::{BarSeries, IndicatorFrame, OrderSize, Signal},
};
use backtest_indicators::Rsi;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::common;

/// Configuration for the RSI strategy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RsiConfig {
    /// RSI calculation period
    pub period: usize,
    /// Overbought threshold (sell when RSI rises above this)
    pub overbought: f64,
    /// Oversold threshold (buy when RSI falls below this)
    pub oversold: f64,
    /// Units bought on each entry
    pub size: Decimal,
}

impl Default for RsiConfig {
    fn default() -> Self {
        Self {
            period: 14,
            overbought: 70.0,
            oversold: 30.0,
            size: Decimal::ONE_HUNDRED,
        }
    }
}

impl StrategyConfig for RsiConfig {
    fn validate(&self) -> Result<(), StrategyError> {
        if self.period < 2 {
            return Err(StrategyError::InvalidConfig(
                "RSI period must be at least 2".into(),
            ));
        }
        if self.overbought <= self.oversold {
            return Err(StrategyError::InvalidConfig(
                "Overbought must be greater than oversold".into(),
            ));
        }
        if self.overbought > 100.0 || self.oversold < 0.0 {
            return Err(StrategyError::InvalidConfig(
                "RSI thresholds must be between 0 and 100".into(),
            ));
        }
        common::require_positive_size("Size", self.size)
    }
}

/// RSI threshold strategy.
#[derive(Debug, Clone)]
pub struct RsiStrategy {
    config: RsiConfig,
    frame: IndicatorFrame,
}

impl RsiStrategy {
    /// Create a new RSI strategy.
    pub fn new(config: RsiConfig) -> Self {
        Self {
            config,
            frame: IndicatorFrame::new(),
        }
    }

    pub fn config(&self) -> &RsiConfig {
        &self.config
    }
}

impl SignalGenerator for RsiStrategy {
    fn name(&self) -> &str {
        "RSI Strategy"
    }

    fn description(&self) -> &str {
        "Trades RSI overbought/oversold threshold crossings"
    }

    fn warmup_period(&self) -> usize {
        self.config.period + 1
    }

    fn compute_indicators(&mut self, series: &BarSeries) {
        let rsi = Rsi::new(self.config.period).calculate(&series.closes());
        self.frame = IndicatorFrame::new().with("rsi", rsi);
    }

    fn on_bar(&self, ctx: &BarContext<'_>) -> Vec<Signal> {
        let Some((prev, rsi)) = common::prev_and_current(&self.frame, "rsi", ctx.index) else {
            return Vec::new();
        };
        let (oversold, overbought) = (self.config.oversold, self.config.overbought);

        let signal = if prev >= oversold && rsi < oversold {
            Signal::buy(ctx.index, ctx.bar, OrderSize::Units(self.config.size)).with_reason(
                format!("RSI ({:.1}) fell below oversold level ({:.1})", rsi, oversold),
            )
        } else if prev <= overbought && rsi > overbought {
            Signal::sell(ctx.index, ctx.bar, OrderSize::All).with_reason(format!(
                "RSI ({:.1}) rose above overbought level ({:.1})",
                rsi, overbought
            ))
        } else {
            return Vec::new();
        };

        vec![signal.from_strategy(self.name()).with_indicator("rsi", rsi)]
    }

    fn indicators(&self) -> IndicatorFrame {
        self.frame.clone()
    }

    fn reset(&mut self) {
        self.frame = IndicatorFrame::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::test_support::create_test_series;

    #[test]
    fn test_config_validation() {
        let mut config = RsiConfig::default();
        assert!(config.validate().is_ok());

        config.overbought = 20.0;
        config.oversold = 80.0;
        assert!(config.validate().is_err());

        let config = RsiConfig {
            period: 1,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_oversold_entry_then_overbought_exit() {
        let mut strategy = RsiStrategy::new(RsiConfig {
            period: 5,
            ..Default::default()
        });

        let mut prices = vec![100.0, 101.0, 100.0, 101.0, 100.0, 101.0, 100.0];
        // Sharp decline drives RSI down through 30
        prices.extend([96.0, 92.0, 88.0, 84.0]);
        // Sharp rally drives it up through 70
        prices.extend([90.0, 96.0, 102.0, 108.0, 114.0]);

        let set = strategy.signals(&create_test_series(&prices));

        assert_eq!(set.buys().count(), 1);
        assert_eq!(set.sells().count(), 1);
        assert!(set.buy_indices()[0] > 6);
        assert!(set.sell_indices()[0] > set.buy_indices()[0]);
        assert!(set.signals[0].metadata.indicators["rsi"] < 30.0);
    }

    #[test]
    fn test_flat_series_never_triggers() {
        let mut strategy = RsiStrategy::new(RsiConfig::default());
        let set = strategy.signals(&create_test_series(&[100.0; 40]));

        assert!(set.is_empty());
        let rsi = set.diagnostics.get("rsi").unwrap();
        assert!(rsi[14..].iter().all(|&v| v == 50.0));
    }
}
