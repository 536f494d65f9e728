//! KDJ stochastic crossover strategy.
//!
//! Buys when K crosses above D and sells when K crosses below D.

use backtest_core::{
    error::StrategyError,
    traits::{BarContext, OhlcvIndicator, SignalGenerator, StrategyConfig},
    types::{BarSeries, IndicatorFrame, OrderSize, Signal},
};
use backtest_indicators::Kdj;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::common::{self, Cross};

/// Configuration for the KDJ strategy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KdjConfig {
    /// RSV lookback period
    pub period: usize,
    /// K and D smoothing factor
    pub smoothing: usize,
    /// Units bought on each entry
    pub size: Decimal,
}

impl Default for KdjConfig {
    fn default() -> Self {
        Self {
            period: 9,
            smoothing: 3,
            size: Decimal::ONE_HUNDRED,
        }
    }
}

impl StrategyConfig for KdjConfig {
    fn validate(&self) -> Result<(), StrategyError> {
        common::require_period("KDJ period", self.period)?;
        common::require_period("KDJ smoothing", self.smoothing)?;
        common::require_positive_size("Size", self.size)
    }
}

/// K, D and J series of `series`.
pub(crate) fn kdj_frame(series: &BarSeries, period: usize, smoothing: usize) -> IndicatorFrame {
    let output = Kdj::with_periods(period, smoothing).calculate(
        &series.highs(),
        &series.lows(),
        &series.closes(),
    );
    IndicatorFrame::new()
        .with("kdj_k", output.k)
        .with("kdj_d", output.d)
        .with("kdj_j", output.j)
}

/// KDJ crossover strategy.
#[derive(Debug, Clone)]
pub struct KdjStrategy {
    config: KdjConfig,
    frame: IndicatorFrame,
}

impl KdjStrategy {
    pub fn new(config: KdjConfig) -> Self {
        Self {
            config,
            frame: IndicatorFrame::new(),
        }
    }

    pub fn config(&self) -> &KdjConfig {
        &self.config
    }
}

impl SignalGenerator for KdjStrategy {
    fn name(&self) -> &str {
        "KDJ"
    }

    fn description(&self) -> &str {
        "Trades stochastic K/D line crossovers"
    }

    fn warmup_period(&self) -> usize {
        self.config.period
    }

    fn compute_indicators(&mut self, series: &BarSeries) {
        self.frame = kdj_frame(series, self.config.period, self.config.smoothing);
    }

    fn on_bar(&self, ctx: &BarContext<'_>) -> Vec<Signal> {
        let Some(direction) = common::cross(&self.frame, "kdj_k", "kdj_d", ctx.index) else {
            return Vec::new();
        };

        let k = self.frame.value("kdj_k", ctx.index).unwrap_or(f64::NAN);
        let d = self.frame.value("kdj_d", ctx.index).unwrap_or(f64::NAN);

        let signal = match direction {
            Cross::Above => Signal::buy(ctx.index, ctx.bar, OrderSize::Units(self.config.size))
                .with_reason(format!("K ({:.1}) crossed above D ({:.1})", k, d)),
            Cross::Below => Signal::sell(ctx.index, ctx.bar, OrderSize::All)
                .with_reason(format!("K ({:.1}) crossed below D ({:.1})", k, d)),
        };

        vec![signal
            .from_strategy(self.name())
            .with_indicator("kdj_k", k)
            .with_indicator("kdj_d", d)]
    }

    fn indicators(&self) -> IndicatorFrame {
        self.frame.clone()
    }

    fn reset(&mut self) {
        self.frame = IndicatorFrame::new();
    }
}
