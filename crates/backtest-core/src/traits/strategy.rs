//! Signal generator trait definitions.

use crate::error::StrategyError;
use crate::types::{Bar, BarSeries, IndicatorFrame, PositionView, Signal, SignalSet};

/// Configuration trait for strategies.
pub trait StrategyConfig: Send + Sync + Clone + 'static {
    /// Validate the configuration.
    fn validate(&self) -> Result<(), StrategyError>;
}

/// Everything a generator sees when classifying one bar.
#[derive(Debug, Clone, Copy)]
pub struct BarContext<'a> {
    /// Index of the bar in the bound series
    pub index: usize,
    pub bar: &'a Bar,
    /// Current position as the ledger sees it
    pub position: PositionView,
}

/// Converts indicator state into buy and sell signals.
///
/// A generator is bound to one bar series by [`SignalGenerator::compute_indicators`]
/// and then asked for the signals of each bar in order. Indicator values at bar
/// `i` depend only on bars `0..=i`.
pub trait SignalGenerator: Send + Sync {
    /// Get the unique name of this strategy.
    fn name(&self) -> &str;

    /// Get a description of the strategy.
    fn description(&self) -> &str {
        ""
    }

    /// Number of leading bars that can never produce a signal.
    fn warmup_period(&self) -> usize;

    /// Maximum number of stacked entries in one position.
    fn max_entries(&self) -> u32 {
        1
    }

    /// Bind `series` and compute every indicator the strategy needs.
    fn compute_indicators(&mut self, series: &BarSeries);

    /// Signals for the bar at `ctx.index`, in emission order.
    ///
    /// Returns nothing for bars whose indicators are still undefined or that
    /// lie outside the bound series.
    fn on_bar(&self, ctx: &BarContext<'_>) -> Vec<Signal>;

    /// Indicator series of the bound series, for diagnostics.
    fn indicators(&self) -> IndicatorFrame;

    /// Drop the bound series and all computed indicators.
    fn reset(&mut self);

    /// Check if the strategy is warmed up (has enough data).
    fn is_warmed_up(&self, bars_available: usize) -> bool {
        bars_available > self.warmup_period()
    }

    /// Replay `series` and collect every signal.
    ///
    /// Position-dependent rules see a shadow position in which every signal
    /// was filled in full.
    fn signals(&mut self, series: &BarSeries) -> SignalSet {
        self.compute_indicators(series);

        let max_entries = self.max_entries();
        let mut position = PositionView::flat();
        let mut signals = Vec::new();

        for (index, bar) in series.iter().enumerate() {
            let ctx = BarContext {
                index,
                bar,
                position,
            };
            for signal in self.on_bar(&ctx) {
                position.apply(&signal, max_entries);
                signals.push(signal);
            }
        }

        SignalSet {
            strategy: self.name().to_string(),
            signals,
            diagnostics: self.indicators(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{OrderSize, Timeframe};
    use rust_decimal_macros::dec;

    /// Buys on every up close, sells on every down close.
    struct UpDown {
        closes: Vec<f64>,
    }

    impl SignalGenerator for UpDown {
        fn name(&self) -> &str {
            "up-down"
        }

        fn warmup_period(&self) -> usize {
            1
        }

        fn compute_indicators(&mut self, series: &BarSeries) {
            self.closes = series.closes();
        }

        fn on_bar(&self, ctx: &BarContext<'_>) -> Vec<Signal> {
            if ctx.index == 0 || ctx.index >= self.closes.len() {
                return Vec::new();
            }
            let prev = self.closes[ctx.index - 1];
            if ctx.bar.close > prev && ctx.position.is_flat() {
                vec![Signal::buy(ctx.index, ctx.bar, OrderSize::Units(dec!(1)))]
            } else if ctx.bar.close < prev && ctx.position.is_long() {
                vec![Signal::sell(ctx.index, ctx.bar, OrderSize::All)]
            } else {
                Vec::new()
            }
        }

        fn indicators(&self) -> IndicatorFrame {
            IndicatorFrame::new().with("close", self.closes.clone())
        }

        fn reset(&mut self) {
            self.closes.clear();
        }
    }

    fn series(closes: &[f64]) -> BarSeries {
        let bars = closes
            .iter()
            .enumerate()
            .map(|(i, &c)| Bar::flat(i as i64, c))
            .collect();
        BarSeries::from_bars("TEST", Timeframe::Daily, bars).unwrap()
    }

    #[test]
    fn test_signals_use_shadow_position() {
        let mut generator = UpDown { closes: Vec::new() };
        // up, up (held, ignored), down, down (flat, ignored), up
        let set = generator.signals(&series(&[1.0, 2.0, 3.0, 2.0, 1.0, 2.0]));

        assert_eq!(set.strategy, "up-down");
        assert_eq!(set.buy_indices(), vec![1, 5]);
        assert_eq!(set.sell_indices(), vec![3]);
        assert_eq!(set.diagnostics.get("close").map(<[f64]>::len), Some(6));
    }

    #[test]
    fn test_warmup_check() {
        let generator = UpDown { closes: Vec::new() };
        assert!(!generator.is_warmed_up(1));
        assert!(generator.is_warmed_up(2));
    }
}
