//! Composite MACD + KDJ strategy.
//!
//! A MACD crossover only becomes a signal when the stochastic agrees on the
//! same bar: either K is already at an extreme or K crosses D the same way.

use backtest_core::{
    error::StrategyError,
    traits::{BarContext, SignalGenerator, StrategyConfig},
    types::{BarSeries, IndicatorFrame, OrderSize, Signal},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::common::{self, Cross};
use crate::kdj::kdj_frame;
use crate::macd_crossover::{macd_frame, validate_macd_periods};

/// Configuration for the MACD + KDJ strategy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MacdKdjConfig {
    pub fast_period: usize,
    pub slow_period: usize,
    pub signal_period: usize,
    pub kdj_period: usize,
    pub kdj_smoothing: usize,
    /// K at or below this level confirms a buy
    pub oversold: f64,
    /// K at or above this level confirms a sell
    pub overbought: f64,
    /// Units bought on each entry
    pub size: Decimal,
}

impl Default for MacdKdjConfig {
    fn default() -> Self {
        Self {
            fast_period: 12,
            slow_period: 26,
            signal_period: 9,
            kdj_period: 9,
            kdj_smoothing: 3,
            oversold: 20.0,
            overbought: 80.0,
            size: Decimal::ONE_HUNDRED,
        }
    }
}

impl StrategyConfig for MacdKdjConfig {
    fn validate(&self) -> Result<(), StrategyError> {
        validate_macd_periods(self.fast_period, self.slow_period, self.signal_period)?;
        common::require_period("KDJ period", self.kdj_period)?;
        common::require_period("KDJ smoothing", self.kdj_smoothing)?;
        if self.overbought <= self.oversold {
            return Err(StrategyError::InvalidConfig(
                "Overbought must be greater than oversold".into(),
            ));
        }
        common::require_positive_size("Size", self.size)
    }
}

/// MACD crossover confirmed by KDJ.
#[derive(Debug, Clone)]
pub struct MacdKdjStrategy {
    config: MacdKdjConfig,
    frame: IndicatorFrame,
}

impl MacdKdjStrategy {
    pub fn new(config: MacdKdjConfig) -> Self {
        Self {
            config,
            frame: IndicatorFrame::new(),
        }
    }

    pub fn config(&self) -> &MacdKdjConfig {
        &self.config
    }
}

impl SignalGenerator for MacdKdjStrategy {
    fn name(&self) -> &str {
        "MACD+KDJ"
    }

    fn description(&self) -> &str {
        "MACD crossovers confirmed by KDJ extremes or K/D crossovers"
    }

    fn warmup_period(&self) -> usize {
        (self.config.slow_period + self.config.signal_period - 1).max(self.config.kdj_period)
    }

    fn compute_indicators(&mut self, series: &BarSeries) {
        let mut frame = macd_frame(
            &series.closes(),
            self.config.fast_period,
            self.config.slow_period,
            self.config.signal_period,
        );
        let kdj = kdj_frame(series, self.config.kdj_period, self.config.kdj_smoothing);
        for name in ["kdj_k", "kdj_d", "kdj_j"] {
            if let Some(values) = kdj.get(name) {
                frame.insert(name, values.to_vec());
            }
        }
        self.frame = frame;
    }

    fn on_bar(&self, ctx: &BarContext<'_>) -> Vec<Signal> {
        if ctx.index < self.warmup_period() {
            return Vec::new();
        }
        let Some(macd_cross) = common::cross(&self.frame, "macd", "macd_signal", ctx.index) else {
            return Vec::new();
        };
        let Some(k) = self.frame.value("kdj_k", ctx.index) else {
            return Vec::new();
        };
        let kd_cross = common::cross(&self.frame, "kdj_k", "kdj_d", ctx.index);

        let signal = match macd_cross {
            Cross::Above if k <= self.config.oversold || kd_cross == Some(Cross::Above) => {
                Signal::buy(ctx.index, ctx.bar, OrderSize::Units(self.config.size))
                    .with_reason(format!("MACD golden cross confirmed by KDJ (K = {:.1})", k))
            }
            Cross::Below if k >= self.config.overbought || kd_cross == Some(Cross::Below) => {
                Signal::sell(ctx.index, ctx.bar, OrderSize::All)
                    .with_reason(format!("MACD death cross confirmed by KDJ (K = {:.1})", k))
            }
            _ => return Vec::new(),
        };

        let macd = self.frame.value("macd", ctx.index).unwrap_or(f64::NAN);
        vec![signal
            .from_strategy(self.name())
            .with_indicator("macd", macd)
            .with_indicator("kdj_k", k)]
    }

    fn indicators(&self) -> IndicatorFrame {
        self.frame.clone()
    }

    fn reset(&mut self) {
        self.frame = IndicatorFrame::new();
    }
}
