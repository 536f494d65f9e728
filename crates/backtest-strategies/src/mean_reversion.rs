//! Z-score mean reversion strategy.
//!
//! Buys when the close is stretched far below its rolling mean and sells the
//! position once the close is stretched just as far above it.

use backtest_core::{
    error::StrategyError,
    traits::{BarContext, Indicator, SignalGenerator, StrategyConfig},
    types::{BarSeries, IndicatorFrame, OrderSize, Signal},
};
use backtest_indicators::ZScore;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::common;

/// Configuration for the Mean Reversion strategy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MeanReversionConfig {
    /// Rolling window for mean and standard deviation
    pub lookback: usize,
    /// Z-score magnitude that triggers entries and exits
    pub entry_z: f64,
    /// Units bought on each entry
    pub size: Decimal,
}

impl Default for MeanReversionConfig {
    fn default() -> Self {
        Self {
            lookback: 20,
            entry_z: 2.0,
            size: Decimal::ONE_HUNDRED,
        }
    }
}

impl StrategyConfig for MeanReversionConfig {
    fn validate(&self) -> Result<(), StrategyError> {
        if self.lookback < 2 {
            return Err(StrategyError::InvalidConfig(
                "Lookback must be at least 2".into(),
            ));
        }
        common::require_positive("Entry z-score", self.entry_z)?;
        common::require_positive_size("Size", self.size)
    }
}

/// Z-score mean reversion strategy.
#[derive(Debug, Clone)]
pub struct MeanReversionStrategy {
    config: MeanReversionConfig,
    frame: IndicatorFrame,
}

impl MeanReversionStrategy {
    pub fn new(config: MeanReversionConfig) -> Self {
        Self {
            config,
            frame: IndicatorFrame::new(),
        }
    }

    pub fn config(&self) -> &MeanReversionConfig {
        &self.config
    }
}

impl SignalGenerator for MeanReversionStrategy {
    fn name(&self) -> &str {
        "Mean Reversion"
    }

    fn description(&self) -> &str {
        "Buys deep negative z-scores, sells deep positive z-scores"
    }

    fn warmup_period(&self) -> usize {
        self.config.lookback.saturating_sub(1)
    }

    fn compute_indicators(&mut self, series: &BarSeries) {
        let zscore = ZScore::new(self.config.lookback).calculate(&series.closes());
        self.frame = IndicatorFrame::new().with("zscore", zscore);
    }

    fn on_bar(&self, ctx: &BarContext<'_>) -> Vec<Signal> {
        let Some(z) = self.frame.value("zscore", ctx.index) else {
            return Vec::new();
        };
        let threshold = self.config.entry_z;

        let signal = if ctx.position.is_flat() && z < -threshold {
            Signal::buy(ctx.index, ctx.bar, OrderSize::Units(self.config.size))
                .with_reason(format!("Z-score ({:.2}) below -{:.2}", z, threshold))
        } else if ctx.position.is_long() && z > threshold {
            Signal::sell(ctx.index, ctx.bar, OrderSize::All)
                .with_reason(format!("Z-score ({:.2}) above {:.2}", z, threshold))
        } else {
            return Vec::new();
        };

        vec![signal.from_strategy(self.name()).with_indicator("zscore", z)]
    }

    fn indicators(&self) -> IndicatorFrame {
        self.frame.clone()
    }

    fn reset(&mut self) {
        self.frame = IndicatorFrame::new();
    }
}
