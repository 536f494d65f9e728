//! MACD Crossover Strategy.
//!
//! Buys when the MACD line crosses above its signal line and sells when it
//! crosses back below.

use backtest_core::{
    error::StrategyError,
    traits::{BarContext, MultiOutputIndicator, SignalGenerator, StrategyConfig},
    types::{BarSeries, IndicatorFrame, OrderSize, Signal},
};
use backtest_indicators::Macd;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::common::{self, Cross};

/// Configuration for the MACD Crossover strategy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MacdCrossoverConfig {
    /// Fast EMA period
    pub fast_period: usize,
    /// Slow EMA period
    pub slow_period: usize,
    /// Signal line EMA period
    pub signal_period: usize,
    /// Units bought on each entry
    pub size: Decimal,
}

impl Default for MacdCrossoverConfig {
    fn default() -> Self {
        Self {
            fast_period: 12,
            slow_period: 26,
            signal_period: 9,
            size: Decimal::ONE_HUNDRED,
        }
    }
}

impl StrategyConfig for MacdCrossoverConfig {
    fn validate(&self) -> Result<(), StrategyError> {
        validate_macd_periods(self.fast_period, self.slow_period, self.signal_period)?;
        common::require_positive_size("Size", self.size)
    }
}

pub(crate) fn validate_macd_periods(
    fast: usize,
    slow: usize,
    signal: usize,
) -> Result<(), StrategyError> {
    common::require_period("MACD fast period", fast)?;
    common::require_period("MACD signal period", signal)?;
    if fast >= slow {
        return Err(StrategyError::InvalidConfig(
            "MACD fast period must be less than slow period".into(),
        ));
    }
    Ok(())
}

/// MACD, signal and histogram series of `closes`.
pub(crate) fn macd_frame(closes: &[f64], fast: usize, slow: usize, signal: usize) -> IndicatorFrame {
    let output = Macd::with_periods(fast, slow, signal).calculate(closes);
    IndicatorFrame::new()
        .with("macd", output.macd)
        .with("macd_signal", output.signal)
        .with("macd_histogram", output.histogram)
}

/// MACD Crossover Strategy.
#[derive(Debug, Clone)]
pub struct MacdCrossoverStrategy {
    config: MacdCrossoverConfig,
    frame: IndicatorFrame,
}

impl MacdCrossoverStrategy {
    pub fn new(config: MacdCrossoverConfig) -> Self {
        Self {
            config,
            frame: IndicatorFrame::new(),
        }
    }

    pub fn config(&self) -> &MacdCrossoverConfig {
        &self.config
    }
}

impl SignalGenerator for MacdCrossoverStrategy {
    fn name(&self) -> &str {
        "MACD Crossover"
    }

    fn description(&self) -> &str {
        "Trades MACD line crossings of its signal line"
    }

    fn warmup_period(&self) -> usize {
        // First bar with a defined signal line on both sides of the comparison
        self.config.slow_period + self.config.signal_period - 1
    }

    fn compute_indicators(&mut self, series: &BarSeries) {
        self.frame = macd_frame(
            &series.closes(),
            self.config.fast_period,
            self.config.slow_period,
            self.config.signal_period,
        );
    }

    fn on_bar(&self, ctx: &BarContext<'_>) -> Vec<Signal> {
        if ctx.index < self.warmup_period() {
            return Vec::new();
        }
        let Some(direction) = common::cross(&self.frame, "macd", "macd_signal", ctx.index) else {
            return Vec::new();
        };

        let macd = self.frame.value("macd", ctx.index).unwrap_or(f64::NAN);
        let signal_line = self.frame.value("macd_signal", ctx.index).unwrap_or(f64::NAN);

        let signal = match direction {
            Cross::Above => Signal::buy(ctx.index, ctx.bar, OrderSize::Units(self.config.size))
                .with_reason(format!(
                    "MACD ({:.4}) crossed above signal ({:.4})",
                    macd, signal_line
                )),
            Cross::Below => Signal::sell(ctx.index, ctx.bar, OrderSize::All).with_reason(format!(
                "MACD ({:.4}) crossed below signal ({:.4})",
                macd, signal_line
            )),
        };

        vec![signal
            .from_strategy(self.name())
            .with_indicator("macd", macd)
            .with_indicator("macd_signal", signal_line)]
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
    use rust_decimal_macros::dec;

    fn strategy() -> MacdCrossoverStrategy {
        MacdCrossoverStrategy::new(MacdCrossoverConfig {
            fast_period: 3,
            slow_period: 6,
            signal_period: 3,
            size: dec!(10),
        })
    }

    #[test]
    fn test_config_validation() {
        assert!(MacdCrossoverConfig::default().validate().is_ok());

        let config = MacdCrossoverConfig {
            fast_period: 26,
            slow_period: 12,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = MacdCrossoverConfig {
            signal_period: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_crossovers_alternate() {
        let closes: Vec<f64> = (0..80)
            .map(|i| 100.0 + (i as f64 * 0.25).sin() * 8.0)
            .collect();
        let mut strategy = strategy();
        let set = strategy.signals(&create_test_series(&closes));

        assert!(set.buys().count() > 0);
        assert!(set.sells().count() > 0);
        for pair in set.signals.windows(2) {
            assert_ne!(pair[0].kind, pair[1].kind);
        }
        assert!(set.signals.iter().all(|s| s.bar_index >= 8));
    }

    #[test]
    fn test_flat_prices_never_cross() {
        let mut strategy = strategy();
        let set = strategy.signals(&create_test_series(&[50.0; 40]));
        assert!(set.is_empty());
    }
}
