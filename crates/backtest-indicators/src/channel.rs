//! Price channel indicators.

use backtest_core::traits::OhlcvIndicator;
use serde::{Deserialize, Serialize};

use crate::simd;

/// Donchian channel output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DonchianOutput {
    /// Highest high of the window
    pub upper: Vec<f64>,
    /// Lowest low of the window
    pub lower: Vec<f64>,
}

/// Donchian channel: highest high and lowest low over the last `period` bars,
/// the current bar included.
#[derive(Debug, Clone)]
pub struct Donchian {
    period: usize,
}

impl Donchian {
    pub fn new(period: usize) -> Self {
        Self { period }
    }
}

impl OhlcvIndicator for Donchian {
    type Output = DonchianOutput;

    fn calculate(&self, high: &[f64], low: &[f64], _close: &[f64]) -> DonchianOutput {
        DonchianOutput {
            upper: rolling_high(high, self.period),
            lower: rolling_low(low, self.period),
        }
    }

    fn warmup(&self) -> usize {
        self.period.saturating_sub(1)
    }

    fn name(&self) -> &str {
        "Donchian"
    }
}

/// Highest value of each trailing window of `period` values.
pub fn rolling_high(series: &[f64], period: usize) -> Vec<f64> {
    simd::rolling(series, period, |w| {
        simd::min_max(w).map_or(f64::NAN, |(_, max)| max)
    })
}

/// Lowest value of each trailing window of `period` values.
pub fn rolling_low(series: &[f64], period: usize) -> Vec<f64> {
    simd::rolling(series, period, |w| {
        simd::min_max(w).map_or(f64::NAN, |(min, _)| min)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rolling_high_low() {
        let data = [3.0, 1.0, 4.0, 1.0, 5.0, 9.0, 2.0];

        let high = rolling_high(&data, 3);
        let low = rolling_low(&data, 3);

        assert!(high[1].is_nan());
        assert_eq!(&high[2..], &[4.0, 4.0, 5.0, 9.0, 9.0]);
        assert_eq!(&low[2..], &[1.0, 1.0, 1.0, 1.0, 2.0]);
    }

    #[test]
    fn test_donchian_channel() {
        let high = [10.0, 12.0, 11.0, 13.0];
        let low = [9.0, 8.0, 10.0, 11.0];

        let channel = Donchian::new(2).calculate(&high, &low, &[]);
        assert_eq!(&channel.upper[1..], &[12.0, 12.0, 13.0]);
        assert_eq!(&channel.lower[1..], &[8.0, 8.0, 10.0]);
    }
}
