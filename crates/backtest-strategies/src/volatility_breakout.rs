//! Volatility breakout strategy.
//!
//! Buys when the close clears the previous close by `k` ATRs of the previous
//! bar, and exits like the Turtle system on a channel low or ATR stop.

use backtest_core::{
    error::StrategyError,
    traits::{BarContext, SignalGenerator, StrategyConfig},
    types::{BarSeries, IndicatorFrame, OrderSize, Signal},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::common;
use crate::turtle::{channel_frame, exit_reason};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VolatilityBreakoutConfig {
    pub atr_period: usize,
    /// Required move above the previous close, in ATRs
    pub k: f64,
    /// Channel length for exits
    pub exit_period: usize,
    /// Stop distance below the entry, in ATRs
    pub stop_atr_multiple: f64,
    /// Units bought on each entry
    pub size: Decimal,
}

impl Default for VolatilityBreakoutConfig {
    fn default() -> Self {
        Self {
            atr_period: 14,
            k: 1.5,
            exit_period: 10,
            stop_atr_multiple: 2.0,
            size: Decimal::ONE_HUNDRED,
        }
    }
}

impl StrategyConfig for VolatilityBreakoutConfig {
    fn validate(&self) -> Result<(), StrategyError> {
        common::require_period("ATR period", self.atr_period)?;
        common::require_period("Exit period", self.exit_period)?;
        common::require_positive("K", self.k)?;
        common::require_positive("Stop ATR multiple", self.stop_atr_multiple)?;
        common::require_positive_size("Size", self.size)
    }
}

/// Volatility breakout strategy.
#[derive(Debug, Clone)]
pub struct VolatilityBreakoutStrategy {
    config: VolatilityBreakoutConfig,
    frame: IndicatorFrame,
}

impl VolatilityBreakoutStrategy {
    pub fn new(config: VolatilityBreakoutConfig) -> Self {
        Self {
            config,
            frame: IndicatorFrame::new(),
        }
    }

    pub fn config(&self) -> &VolatilityBreakoutConfig {
        &self.config
    }
}

impl SignalGenerator for VolatilityBreakoutStrategy {
    fn name(&self) -> &str {
        "Volatility Breakout"
    }

    fn description(&self) -> &str {
        "Buys closes more than k ATRs above the previous close"
    }

    fn warmup_period(&self) -> usize {
        self.config.atr_period.max(self.config.exit_period)
    }

    fn compute_indicators(&mut self, series: &BarSeries) {
        self.frame = channel_frame(series, None, self.config.exit_period, self.config.atr_period)
            .with("close", series.closes());
    }

    fn on_bar(&self, ctx: &BarContext<'_>) -> Vec<Signal> {
        if ctx.index < self.warmup_period() {
            return Vec::new();
        }
        let Some(atr) = self.frame.value("atr", ctx.index) else {
            return Vec::new();
        };

        let signal = if ctx.position.is_long() {
            match exit_reason(&self.frame, ctx, atr, self.config.stop_atr_multiple) {
                Some(reason) => Signal::sell(ctx.index, ctx.bar, OrderSize::All).with_reason(reason),
                None => return Vec::new(),
            }
        } else {
            let Some(prev) = ctx.index.checked_sub(1) else {
                return Vec::new();
            };
            let (Some(prev_close), Some(prev_atr)) =
                (self.frame.value("close", prev), self.frame.value("atr", prev))
            else {
                return Vec::new();
            };
            let trigger = prev_close + self.config.k * prev_atr;
            if ctx.bar.close <= trigger {
                return Vec::new();
            }
            Signal::buy(ctx.index, ctx.bar, OrderSize::Units(self.config.size)).with_reason(
                format!("Close ({:.2}) cleared breakout level ({:.2})", ctx.bar.close, trigger),
            )
        };

        vec![signal.from_strategy(self.name()).with_indicator("atr", atr)]
    }

    fn indicators(&self) -> IndicatorFrame {
        self.frame.clone()
    }

    fn reset(&mut self) {
        self.frame = IndicatorFrame::new();
    }
}
