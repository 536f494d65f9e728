//! Z-score pair trading on the spread between two instruments.
//!
//! The spread is either `a - hedge_ratio * b` or `a / b`. A spread that is
//! unusually low relative to its recent history is bought (long A, short B),
//! an unusually high one is sold, and the position is closed once the
//! Z-score returns inside `exit_z`.

use backtest_core::{
    error::StrategyError, traits::StrategyConfig, types::SpreadDirection, IndicatorFrame,
};
use backtest_indicators::zscore;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::common;

/// How the two legs are combined into a spread.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpreadMode {
    /// `a - hedge_ratio * b`
    #[default]
    Difference,
    /// `a / b`
    Ratio,
}

/// Configuration for pair trading.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PairTradingConfig {
    /// Z-score window
    pub lookback: usize,
    /// |Z| required to open a position
    pub entry_z: f64,
    /// |Z| below which an open position is closed
    pub exit_z: f64,
    pub hedge_ratio: f64,
    pub spread_mode: SpreadMode,
    /// Cash committed to each leg
    pub notional: Decimal,
    /// Leg sizes are rounded down to a multiple of this
    pub lot_size: Decimal,
}

impl Default for PairTradingConfig {
    fn default() -> Self {
        Self {
            lookback: 20,
            entry_z: 2.0,
            exit_z: 0.5,
            hedge_ratio: 1.0,
            spread_mode: SpreadMode::Difference,
            notional: Decimal::new(10_000, 0),
            lot_size: Decimal::ONE,
        }
    }
}

impl StrategyConfig for PairTradingConfig {
    fn validate(&self) -> Result<(), StrategyError> {
        if self.lookback < 2 {
            return Err(StrategyError::InvalidConfig(
                "Lookback must be at least 2".into(),
            ));
        }
        common::require_positive("Entry Z", self.entry_z)?;
        if !(self.exit_z >= 0.0 && self.exit_z < self.entry_z) {
            return Err(StrategyError::InvalidConfig(
                "Exit Z must be non-negative and below entry Z".into(),
            ));
        }
        common::require_positive("Hedge ratio", self.hedge_ratio)?;
        common::require_positive_size("Notional", self.notional)?;
        common::require_positive_size("Lot size", self.lot_size)
    }
}

impl PairTradingConfig {
    /// Units of one leg worth `notional` at `price`, rounded down to whole lots.
    pub fn leg_size(&self, price: Decimal) -> Decimal {
        if price <= Decimal::ZERO || self.lot_size <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        (self.notional / price / self.lot_size).floor() * self.lot_size
    }
}

/// What the pair strategy wants done on a bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PairAction {
    Enter(SpreadDirection),
    Exit,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PairSignal {
    pub bar_index: usize,
    pub action: PairAction,
    pub zscore: f64,
}

/// Spread Z-score pair strategy.
#[derive(Debug, Clone)]
pub struct PairTradingStrategy {
    config: PairTradingConfig,
    frame: IndicatorFrame,
}

impl PairTradingStrategy {
    pub fn new(config: PairTradingConfig) -> Self {
        Self {
            config,
            frame: IndicatorFrame::new(),
        }
    }

    pub fn name(&self) -> &str {
        "Pair Trading"
    }

    pub fn config(&self) -> &PairTradingConfig {
        &self.config
    }

    pub fn warmup_period(&self) -> usize {
        self.config.lookback.saturating_sub(1)
    }

    /// Spread of two aligned close series; undefined where the ratio is.
    pub fn spread(&self, a: &[f64], b: &[f64]) -> Vec<f64> {
        a.iter()
            .zip(b)
            .map(|(&a, &b)| match self.config.spread_mode {
                SpreadMode::Difference => a - self.config.hedge_ratio * b,
                SpreadMode::Ratio if b > 0.0 => a / b,
                SpreadMode::Ratio => f64::NAN,
            })
            .collect()
    }

    /// Bind two aligned close series.
    pub fn compute(&mut self, a: &[f64], b: &[f64]) {
        let spread = self.spread(a, b);
        let z = zscore(&spread, self.config.lookback);
        self.frame = IndicatorFrame::new().with("spread", spread).with("zscore", z);
    }

    /// Decision for bar `index` given the currently held spread, if any.
    pub fn on_bar(&self, index: usize, held: Option<SpreadDirection>) -> Option<PairSignal> {
        let z = self.frame.value("zscore", index)?;
        let action = match held {
            None if z < -self.config.entry_z => PairAction::Enter(SpreadDirection::Long),
            None if z > self.config.entry_z => PairAction::Enter(SpreadDirection::Short),
            Some(_) if z.abs() < self.config.exit_z => PairAction::Exit,
            _ => return None,
        };
        Some(PairSignal {
            bar_index: index,
            action,
            zscore: z,
        })
    }

    /// Replay both series assuming every signal is filled.
    pub fn signals(&mut self, a: &[f64], b: &[f64]) -> Vec<PairSignal> {
        self.compute(a, b);
        let mut held = None;
        let mut signals = Vec::new();
        for index in 0..a.len().min(b.len()) {
            if let Some(signal) = self.on_bar(index, held) {
                held = match signal.action {
                    PairAction::Enter(direction) => Some(direction),
                    PairAction::Exit => None,
                };
                signals.push(signal);
            }
        }
        signals
    }

    pub fn indicators(&self) -> IndicatorFrame {
        self.frame.clone()
    }

    pub fn reset(&mut self) {
        self.frame = IndicatorFrame::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn strategy() -> PairTradingStrategy {
        PairTradingStrategy::new(PairTradingConfig {
            lookback: 5,
            entry_z: 1.5,
            exit_z: 0.5,
            ..Default::default()
        })
    }

    fn actions(signals: &[PairSignal]) -> Vec<(usize, PairAction)> {
        signals.iter().map(|s| (s.bar_index, s.action)).collect()
    }

    #[test]
    fn test_config_validation() {
        assert!(PairTradingConfig::default().validate().is_ok());

        let config = PairTradingConfig {
            exit_z: 3.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = PairTradingConfig {
            lookback: 1,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_from_params() {
        let config: PairTradingConfig = common::parse_config(serde_json::json!({
            "spread_mode": "ratio",
            "lookback": 30,
        }))
        .unwrap();
        assert_eq!(config.spread_mode, SpreadMode::Ratio);
        assert_eq!(config.lookback, 30);
        assert_eq!(config.entry_z, 2.0);
    }

    #[test]
    fn test_leg_size_rounds_down_to_lots() {
        let config = PairTradingConfig {
            notional: dec!(1000),
            lot_size: dec!(10),
            ..Default::default()
        };
        assert_eq!(config.leg_size(dec!(30)), dec!(30));
        assert_eq!(config.leg_size(dec!(0)), dec!(0));
    }

    #[test]
    fn test_identical_legs_never_trade() {
        let a: Vec<f64> = (0..40).map(|i| 100.0 + (i as f64 * 0.3).sin() * 5.0).collect();
        let mut strategy = strategy();
        let signals = strategy.signals(&a, &a);

        assert!(signals.is_empty());
        let frame = strategy.indicators();
        assert!(frame.get("spread").unwrap().iter().all(|&s| s == 0.0));
        assert!(frame.get("zscore").unwrap()[4..].iter().all(|&z| z == 0.0));
    }

    #[test]
    fn test_long_spread_round_trip() {
        let a = [100.0, 101.0, 100.0, 101.0, 100.0, 101.0, 90.0, 95.0, 97.0];
        let b = [100.0; 9];
        let signals = strategy().signals(&a, &b);

        assert_eq!(
            actions(&signals),
            vec![
                (6, PairAction::Enter(SpreadDirection::Long)),
                (8, PairAction::Exit)
            ]
        );
        assert!(signals[0].zscore < -1.5);
    }

    #[test]
    fn test_short_spread_round_trip() {
        let a = [100.0, 99.0, 100.0, 99.0, 100.0, 99.0, 110.0, 105.0, 103.0];
        let b = [100.0; 9];
        let signals = strategy().signals(&a, &b);

        assert_eq!(
            actions(&signals),
            vec![
                (6, PairAction::Enter(SpreadDirection::Short)),
                (8, PairAction::Exit)
            ]
        );
    }

    #[test]
    fn test_ratio_of_proportional_legs_is_constant() {
        let a: Vec<f64> = (0..20).map(|i| 50.0 + i as f64).collect();
        let b: Vec<f64> = a.iter().map(|p| p * 2.0).collect();
        let mut strategy = PairTradingStrategy::new(PairTradingConfig {
            lookback: 5,
            spread_mode: SpreadMode::Ratio,
            ..Default::default()
        });

        assert!(strategy.signals(&a, &b).is_empty());
        assert_eq!(strategy.indicators().value("spread", 3), Some(0.5));
    }

    #[test]
    fn test_ratio_with_rounding_noise_never_trades() {
        let a: Vec<f64> = (0..30).map(|i| 10.1 + 0.7 * i as f64).collect();
        let b: Vec<f64> = a.iter().map(|p| p * 3.0).collect();
        let mut strategy = PairTradingStrategy::new(PairTradingConfig {
            lookback: 5,
            spread_mode: SpreadMode::Ratio,
            ..Default::default()
        });

        assert!(strategy.signals(&a, &b).is_empty());
        let frame = strategy.indicators();
        assert!(frame.get("zscore").unwrap()[4..].iter().all(|&z| z == 0.0));
    }
}
