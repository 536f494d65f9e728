//! Bollinger Band breakout strategy.
//!
//! Buys when the close drops through the lower band and sells when it rises
//! through the upper band.

use backtest_core::{
    error::StrategyError,
    traits::{BarContext, MultiOutputIndicator, SignalGenerator, StrategyConfig},
    types::{BarSeries, IndicatorFrame, OrderSize, Signal},
};
use backtest_indicators::BollingerBands;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::common;

/// Configuration for the Bollinger strategy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BollingerConfig {
    /// Bollinger Bands period
    pub period: usize,
    /// Band width in standard deviations
    pub std_dev: f64,
    /// Units bought on each entry
    pub size: Decimal,
}

impl Default for BollingerConfig {
    fn default() -> Self {
        Self {
            period: 20,
            std_dev: 2.0,
            size: Decimal::ONE_HUNDRED,
        }
    }
}

impl StrategyConfig for BollingerConfig {
    fn validate(&self) -> Result<(), StrategyError> {
        if self.period < 2 {
            return Err(StrategyError::InvalidConfig(
                "BB period must be at least 2".into(),
            ));
        }
        common::require_positive("BB std dev", self.std_dev)?;
        common::require_positive_size("Size", self.size)
    }
}

/// Bollinger Band strategy.
#[derive(Debug, Clone)]
pub struct BollingerStrategy {
    config: BollingerConfig,
    frame: IndicatorFrame,
}

impl BollingerStrategy {
    pub fn new(config: BollingerConfig) -> Self {
        Self {
            config,
            frame: IndicatorFrame::new(),
        }
    }

    pub fn config(&self) -> &BollingerConfig {
        &self.config
    }
}

impl SignalGenerator for BollingerStrategy {
    fn name(&self) -> &str {
        "Bollinger Bands"
    }

    fn description(&self) -> &str {
        "Buys closes below the lower band, sells closes above the upper band"
    }

    fn warmup_period(&self) -> usize {
        self.config.period
    }

    fn compute_indicators(&mut self, series: &BarSeries) {
        let closes = series.closes();
        let bands = BollingerBands::with_params(self.config.period, self.config.std_dev)
            .calculate(&closes);
        self.frame = IndicatorFrame::new()
            .with("close", closes)
            .with("bb_upper", bands.upper)
            .with("bb_middle", bands.middle)
            .with("bb_lower", bands.lower)
            .with("bb_percent_b", bands.percent_b);
    }

    fn on_bar(&self, ctx: &BarContext<'_>) -> Vec<Signal> {
        let (Some((prev_close, close_now)), Some((prev_lower, lower)), Some((prev_upper, upper))) = (
            common::prev_and_current(&self.frame, "close", ctx.index),
            common::prev_and_current(&self.frame, "bb_lower", ctx.index),
            common::prev_and_current(&self.frame, "bb_upper", ctx.index),
        ) else {
            return Vec::new();
        };

        let signal = if prev_close >= prev_lower && close_now < lower {
            Signal::buy(ctx.index, ctx.bar, OrderSize::Units(self.config.size)).with_reason(
                format!("Close ({:.2}) fell below lower band ({:.2})", close_now, lower),
            )
        } else if prev_close <= prev_upper && close_now > upper {
            Signal::sell(ctx.index, ctx.bar, OrderSize::All).with_reason(format!(
                "Close ({:.2}) rose above upper band ({:.2})",
                close_now, upper
            ))
        } else {
            return Vec::new();
        };

        vec![signal
            .from_strategy(self.name())
            .with_indicator("bb_lower", lower)
            .with_indicator("bb_upper", upper)]
    }

    fn indicators(&self) -> IndicatorFrame {
        self.frame.clone()
    }

    fn reset(&mut self) {
        self.frame = IndicatorFrame::new();
    }
}
