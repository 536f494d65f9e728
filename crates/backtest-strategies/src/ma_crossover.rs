//! Moving Average Crossover Strategy.
//!
//! Generates buy signals when the fast MA crosses above the slow MA,
//! and sell signals when the fast MA crosses below the slow MA.

use backtest_core::{
    error::StrategyError,
    traits::{BarContext, Indicator, SignalGenerator, StrategyConfig},
    types::{BarSeries, IndicatorFrame, OrderSize, Signal},
};
use backtest_indicators::{Ema, Sma};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::common::{self, Cross};

/// Configuration for the MA Crossover strategy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MaCrossoverConfig {
    /// Fast moving average period
    pub fast_period: usize,
    /// Slow moving average period
    pub slow_period: usize,
    /// Use EMA instead of SMA
    pub use_ema: bool,
    /// Units bought on each entry
    pub size: Decimal,
}

impl Default for MaCrossoverConfig {
    fn default() -> Self {
        Self {
            fast_period: 5,
            slow_period: 20,
            use_ema: false,
            size: Decimal::ONE_HUNDRED,
        }
    }
}

impl StrategyConfig for MaCrossoverConfig {
    fn validate(&self) -> Result<(), StrategyError> {
        common::require_period("Fast period", self.fast_period)?;
        if self.fast_period >= self.slow_period {
            return Err(StrategyError::InvalidConfig(
                "Fast period must be less than slow period".into(),
            ));
        }
        common::require_positive_size("Size", self.size)
    }
}

/// Moving Average Crossover Strategy.
#[derive(Debug, Clone)]
pub struct MaCrossoverStrategy {
    config: MaCrossoverConfig,
    frame: IndicatorFrame,
}

impl MaCrossoverStrategy {
    /// Create a new MA Crossover strategy.
    pub fn new(config: MaCrossoverConfig) -> Self {
        Self {
            config,
            frame: IndicatorFrame::new(),
        }
    }

    pub fn config(&self) -> &MaCrossoverConfig {
        &self.config
    }

    fn calculate_ma(&self, closes: &[f64], period: usize) -> Vec<f64> {
        if self.config.use_ema {
            Ema::new(period).calculate(closes)
        } else {
            Sma::new(period).calculate(closes)
        }
    }
}

impl SignalGenerator for MaCrossoverStrategy {
    fn name(&self) -> &str {
        "MA Crossover"
    }

    fn description(&self) -> &str {
        "Generates signals based on fast/slow moving average crossovers"
    }

    fn warmup_period(&self) -> usize {
        self.config.slow_period
    }

    fn compute_indicators(&mut self, series: &BarSeries) {
        let closes = series.closes();
        let fast = self.calculate_ma(&closes, self.config.fast_period);
        let slow = self.calculate_ma(&closes, self.config.slow_period);
        self.frame = IndicatorFrame::new()
            .with("fast_ma", fast)
            .with("slow_ma", slow);
    }

    fn on_bar(&self, ctx: &BarContext<'_>) -> Vec<Signal> {
        if ctx.index < self.warmup_period() {
            return Vec::new();
        }
        let Some(direction) = common::cross(&self.frame, "fast_ma", "slow_ma", ctx.index) else {
            return Vec::new();
        };

        let fast = self.frame.value("fast_ma", ctx.index).unwrap_or(f64::NAN);
        let slow = self.frame.value("slow_ma", ctx.index).unwrap_or(f64::NAN);

        let signal = match direction {
            Cross::Above => Signal::buy(ctx.index, ctx.bar, OrderSize::Units(self.config.size))
                .with_reason(format!(
                    "Bullish crossover: fast MA ({:.2}) crossed above slow MA ({:.2})",
                    fast, slow
                )),
            Cross::Below => Signal::sell(ctx.index, ctx.bar, OrderSize::All).with_reason(format!(
                "Bearish crossover: fast MA ({:.2}) crossed below slow MA ({:.2})",
                fast, slow
            )),
        };

        vec![signal
            .from_strategy(self.name())
            .with_indicator("fast_ma", fast)
            .with_indicator("slow_ma", slow)]
    }

    fn indicators(&self) -> IndicatorFrame {
        self.frame.clone()
    }

    fn reset(&mut self) {
        self.frame = IndicatorFrame::new();
    }
}
