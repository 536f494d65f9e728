//! Turtle channel breakout with ATR risk sizing and pyramiding.
//!
//! Entry on a close above the highest high of the previous `entry_period`
//! bars. Each unit risks `risk_fraction` of equity per ATR; further units are
//! added every `pyramid_atr_step` ATRs of progress up to `max_units`. The
//! whole stack is closed on a break of the `exit_period` low or when the close
//! falls `stop_atr_multiple` ATRs below the last entry.

use backtest_core::{
    error::StrategyError,
    traits::{BarContext, OhlcvIndicator, SignalGenerator, StrategyConfig},
    types::{to_decimal, BarSeries, IndicatorFrame, OrderSize, Signal},
};
use backtest_indicators::{rolling_high, rolling_low, Atr};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::common;

/// Configuration for the Turtle strategy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TurtleConfig {
    /// Breakout channel length for entries
    pub entry_period: usize,
    /// Channel length for exits
    pub exit_period: usize,
    pub atr_period: usize,
    /// Fraction of equity risked per unit
    pub risk_fraction: Decimal,
    /// Stop distance below the last entry, in ATRs
    pub stop_atr_multiple: f64,
    /// Progress in ATRs required before adding a unit
    pub pyramid_atr_step: f64,
    /// Maximum stacked units
    pub max_units: u32,
    /// Position sizes are rounded down to a multiple of this
    pub lot_size: Decimal,
}

impl Default for TurtleConfig {
    fn default() -> Self {
        Self {
            entry_period: 20,
            exit_period: 10,
            atr_period: 20,
            risk_fraction: Decimal::new(1, 2),
            stop_atr_multiple: 2.0,
            pyramid_atr_step: 0.5,
            max_units: 4,
            lot_size: Decimal::ONE,
        }
    }
}

impl StrategyConfig for TurtleConfig {
    fn validate(&self) -> Result<(), StrategyError> {
        common::require_period("Entry period", self.entry_period)?;
        common::require_period("Exit period", self.exit_period)?;
        common::require_period("ATR period", self.atr_period)?;
        if self.risk_fraction <= Decimal::ZERO || self.risk_fraction > Decimal::ONE {
            return Err(StrategyError::InvalidConfig(
                "Risk fraction must be in (0, 1]".into(),
            ));
        }
        common::require_positive("Stop ATR multiple", self.stop_atr_multiple)?;
        common::require_positive("Pyramid ATR step", self.pyramid_atr_step)?;
        if self.max_units == 0 {
            return Err(StrategyError::InvalidConfig(
                "Max units must be at least 1".into(),
            ));
        }
        common::require_positive_size("Lot size", self.lot_size)
    }
}

/// Highest high and lowest low of the bars strictly before each index, plus ATR.
pub(crate) fn channel_frame(
    series: &BarSeries,
    entry_period: Option<usize>,
    exit_period: usize,
    atr_period: usize,
) -> IndicatorFrame {
    let (highs, lows, closes) = (series.highs(), series.lows(), series.closes());
    let mut frame = IndicatorFrame::new()
        .with("exit_low", common::shift_forward(rolling_low(&lows, exit_period)))
        .with("atr", Atr::new(atr_period).calculate(&highs, &lows, &closes));
    if let Some(period) = entry_period {
        frame.insert("entry_high", common::shift_forward(rolling_high(&highs, period)));
    }
    frame
}

/// Reason to close a long breakout position, if any.
pub(crate) fn exit_reason(
    frame: &IndicatorFrame,
    ctx: &BarContext<'_>,
    atr: f64,
    stop_atr_multiple: f64,
) -> Option<String> {
    let close = ctx.bar.close;
    if let Some(low) = frame.value("exit_low", ctx.index) {
        if close < low {
            return Some(format!("Close ({:.2}) broke exit channel low ({:.2})", close, low));
        }
    }
    let last_entry = ctx.position.last_entry_price?;
    let stop = last_entry - stop_atr_multiple * atr;
    (close < stop).then(|| format!("Close ({:.2}) hit ATR stop ({:.2})", close, stop))
}

/// Turtle breakout strategy.
#[derive(Debug, Clone)]
pub struct TurtleStrategy {
    config: TurtleConfig,
    frame: IndicatorFrame,
}

impl TurtleStrategy {
    pub fn new(config: TurtleConfig) -> Self {
        Self {
            config,
            frame: IndicatorFrame::new(),
        }
    }

    pub fn config(&self) -> &TurtleConfig {
        &self.config
    }

    fn unit_size(&self, atr: f64) -> Option<OrderSize> {
        let atr = to_decimal(atr).filter(|a| *a > Decimal::ZERO)?;
        Some(OrderSize::RiskBudget {
            risk_fraction: self.config.risk_fraction,
            atr,
            lot_size: self.config.lot_size,
        })
    }
}

impl SignalGenerator for TurtleStrategy {
    fn name(&self) -> &str {
        "Turtle"
    }

    fn description(&self) -> &str {
        "Channel breakout with ATR position sizing and pyramiding"
    }

    fn warmup_period(&self) -> usize {
        self.config
            .entry_period
            .max(self.config.exit_period)
            .max(self.config.atr_period.saturating_sub(1))
    }

    fn max_entries(&self) -> u32 {
        self.config.max_units
    }

    fn compute_indicators(&mut self, series: &BarSeries) {
        self.frame = channel_frame(
            series,
            Some(self.config.entry_period),
            self.config.exit_period,
            self.config.atr_period,
        );
    }

    fn on_bar(&self, ctx: &BarContext<'_>) -> Vec<Signal> {
        if ctx.index < self.warmup_period() {
            return Vec::new();
        }
        let Some(atr) = self.frame.value("atr", ctx.index) else {
            return Vec::new();
        };
        let close = ctx.bar.close;

        let signal = if ctx.position.is_long() {
            if let Some(reason) = exit_reason(&self.frame, ctx, atr, self.config.stop_atr_multiple) {
                Signal::sell(ctx.index, ctx.bar, OrderSize::All).with_reason(reason)
            } else {
                let Some(last_entry) = ctx.position.last_entry_price else {
                    return Vec::new();
                };
                let next_add = last_entry + self.config.pyramid_atr_step * atr;
                if ctx.position.entries >= self.config.max_units || close < next_add {
                    return Vec::new();
                }
                let Some(size) = self.unit_size(atr) else {
                    return Vec::new();
                };
                Signal::buy(ctx.index, ctx.bar, size).with_reason(format!(
                    "Adding unit {} at {:.2} (target {:.2})",
                    ctx.position.entries + 1,
                    close,
                    next_add
                ))
            }
        } else {
            let (Some(entry_high), Some(size)) =
                (self.frame.value("entry_high", ctx.index), self.unit_size(atr))
            else {
                return Vec::new();
            };
            if close <= entry_high {
                return Vec::new();
            }
            Signal::buy(ctx.index, ctx.bar, size).with_reason(format!(
                "Close ({:.2}) broke {}-bar high ({:.2})",
                close, self.config.entry_period, entry_high
            ))
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::test_support::create_test_series;
    use rust_decimal_macros::dec;

    fn strategy(max_units: u32) -> TurtleStrategy {
        TurtleStrategy::new(TurtleConfig {
            entry_period: 5,
            exit_period: 3,
            atr_period: 3,
            max_units,
            ..Default::default()
        })
    }

    fn breakout_prices() -> Vec<f64> {
        let mut prices = vec![100.0; 6];
        prices.extend([103.0, 104.0, 105.0, 106.0, 107.0, 95.0]);
        prices
    }

    #[test]
    fn test_config_validation() {
        assert!(TurtleConfig::default().validate().is_ok());

        let config = TurtleConfig {
            risk_fraction: dec!(1.5),
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = TurtleConfig {
            max_units: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_breakout_pyramid_and_exit() {
        let set = strategy(3).signals(&create_test_series(&breakout_prices()));

        // entry at 6, adds at 8 and 9, channel exit at 11
        assert_eq!(set.buy_indices(), vec![6, 8, 9]);
        assert_eq!(set.sell_indices(), vec![11]);

        match set.signals[0].size {
            OrderSize::RiskBudget {
                risk_fraction,
                lot_size,
                atr,
            } => {
                assert_eq!(risk_fraction, dec!(0.01));
                assert_eq!(lot_size, dec!(1));
                assert!(atr > dec!(2.6) && atr < dec!(2.7));
            }
            other => panic!("unexpected size {other:?}"),
        }
    }

    #[test]
    fn test_units_capped() {
        let set = strategy(2).signals(&create_test_series(&breakout_prices()));
        assert_eq!(set.buy_indices(), vec![6, 8]);
        assert_eq!(set.sell_indices(), vec![11]);
    }

    #[test]
    fn test_entry_channel_excludes_current_bar() {
        let mut strategy = strategy(1);
        strategy.compute_indicators(&create_test_series(&breakout_prices()));
        let frame = strategy.indicators();

        assert_eq!(frame.value("entry_high", 5), Some(101.0));
        assert_eq!(frame.value("entry_high", 7), Some(104.0));
        assert_eq!(frame.value("entry_high", 4), None);
    }

    #[test]
    fn test_flat_series_never_triggers() {
        let set = strategy(4).signals(&create_test_series(&[100.0; 30]));
        assert!(set.is_empty());
    }
}
