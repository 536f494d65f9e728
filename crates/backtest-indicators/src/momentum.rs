//! Momentum indicators.

use backtest_core::traits::{Indicator, MultiOutputIndicator, OhlcvIndicator};
use serde::{Deserialize, Serialize};

use crate::moving_average::Ema;
use crate::simd;

/// Relative Strength Index (RSI).
///
/// Measures the speed and magnitude of recent price changes
/// to evaluate overbought or oversold conditions. The first value sits at
/// index `period`; a window with no price movement at all reads 50.
#[derive(Debug, Clone)]
pub struct Rsi {
    period: usize,
}

impl Rsi {
    /// Create a new RSI indicator.
    ///
    /// Common periods are 14 (default) or 9.
    pub fn new(period: usize) -> Self {
        Self { period }
    }

    fn ratio(avg_gain: f64, avg_loss: f64) -> f64 {
        if avg_gain == 0.0 && avg_loss == 0.0 {
            50.0
        } else if avg_loss == 0.0 {
            100.0
        } else {
            100.0 - (100.0 / (1.0 + avg_gain / avg_loss))
        }
    }
}

impl Default for Rsi {
    fn default() -> Self {
        Self::new(14)
    }
}

impl Indicator for Rsi {
    type Output = f64;

    fn calculate(&self, data: &[f64]) -> Vec<f64> {
        let mut result = vec![f64::NAN; data.len()];
        if self.period == 0 || data.len() <= self.period {
            return result;
        }

        let period_f64 = self.period as f64;
        let change = |i: usize| data[i] - data[i - 1];

        // Initial averages over the first `period` changes
        let (mut avg_gain, mut avg_loss) = (1..=self.period).fold((0.0, 0.0), |(g, l), i| {
            let c = change(i);
            (g + c.max(0.0), l + (-c).max(0.0))
        });
        avg_gain /= period_f64;
        avg_loss /= period_f64;
        result[self.period] = Self::ratio(avg_gain, avg_loss);

        // Wilder's smoothing: avg = (prev_avg * (period-1) + value) / period
        for i in (self.period + 1)..data.len() {
            let c = change(i);
            avg_gain = (avg_gain * (period_f64 - 1.0) + c.max(0.0)) / period_f64;
            avg_loss = (avg_loss * (period_f64 - 1.0) + (-c).max(0.0)) / period_f64;
            result[i] = Self::ratio(avg_gain, avg_loss);
        }

        result
    }

    fn period(&self) -> usize {
        self.period + 1 // Need period+1 data points
    }

    fn name(&self) -> &str {
        "RSI"
    }
}

/// MACD (Moving Average Convergence Divergence) output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MacdOutput {
    /// MACD line (fast EMA - slow EMA)
    pub macd: Vec<f64>,
    /// Signal line (EMA of MACD)
    pub signal: Vec<f64>,
    /// Histogram (MACD - Signal)
    pub histogram: Vec<f64>,
}

/// MACD indicator.
///
/// Uses two EMAs to identify trend direction and momentum. The MACD line is
/// undefined before index `slow - 1`, the signal line and histogram before
/// `slow + signal - 2`.
#[derive(Debug, Clone)]
pub struct Macd {
    fast_period: usize,
    slow_period: usize,
    signal_period: usize,
}

impl Macd {
    /// Create a new MACD with default parameters (12, 26, 9).
    pub fn new() -> Self {
        Self::with_periods(12, 26, 9)
    }

    /// Create a MACD with custom periods.
    pub fn with_periods(fast: usize, slow: usize, signal: usize) -> Self {
        Self {
            fast_period: fast,
            slow_period: slow,
            signal_period: signal,
        }
    }
}

impl Default for Macd {
    fn default() -> Self {
        Self::new()
    }
}

impl MultiOutputIndicator for Macd {
    type Outputs = MacdOutput;

    fn calculate(&self, data: &[f64]) -> MacdOutput {
        let len = data.len();
        let nan = vec![f64::NAN; len];
        if self.fast_period == 0 || self.slow_period == 0 || self.signal_period == 0 {
            return MacdOutput {
                macd: nan.clone(),
                signal: nan.clone(),
                histogram: nan,
            };
        }

        let fast_ema = Ema::new(self.fast_period).calculate(data);
        let slow_ema = Ema::new(self.slow_period).calculate(data);

        let macd_start = self.slow_period - 1;
        let macd: Vec<f64> = fast_ema
            .iter()
            .zip(slow_ema.iter())
            .enumerate()
            .map(|(i, (f, s))| if i < macd_start { f64::NAN } else { f - s })
            .collect();

        // Signal EMA is seeded from the first defined MACD value
        let signal_start = self.warmup();
        let signal: Vec<f64> = Ema::new(self.signal_period)
            .calculate(&macd)
            .into_iter()
            .enumerate()
            .map(|(i, v)| if i < signal_start { f64::NAN } else { v })
            .collect();

        let histogram = macd.iter().zip(signal.iter()).map(|(m, s)| m - s).collect();

        MacdOutput {
            macd,
            signal,
            histogram,
        }
    }

    fn warmup(&self) -> usize {
        (self.slow_period + self.signal_period).saturating_sub(2)
    }

    fn name(&self) -> &str {
        "MACD"
    }
}

/// KDJ stochastic output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KdjOutput {
    pub k: Vec<f64>,
    pub d: Vec<f64>,
    /// `3K - 2D`
    pub j: Vec<f64>,
}

/// Stochastic KDJ oscillator.
///
/// RSV compares the close to the high/low range of the last `period` bars
/// (a zero range reads 50). K smooths RSV and D smooths K, each with weight
/// `1 / smoothing` and seeded at 50.
#[derive(Debug, Clone)]
pub struct Kdj {
    period: usize,
    smoothing: usize,
}

impl Kdj {
    /// Create a new KDJ with default parameters (9, 3).
    pub fn new() -> Self {
        Self::with_periods(9, 3)
    }

    /// Create with custom periods.
    pub fn with_periods(period: usize, smoothing: usize) -> Self {
        Self { period, smoothing }
    }
}

impl Default for Kdj {
    fn default() -> Self {
        Self::new()
    }
}

impl OhlcvIndicator for Kdj {
    type Output = KdjOutput;

    fn calculate(&self, high: &[f64], low: &[f64], close: &[f64]) -> KdjOutput {
        let len = high.len().min(low.len()).min(close.len());
        let mut output = KdjOutput {
            k: vec![f64::NAN; len],
            d: vec![f64::NAN; len],
            j: vec![f64::NAN; len],
        };
        if self.period == 0 || self.smoothing == 0 || len < self.period {
            return output;
        }

        let weight = 1.0 / self.smoothing as f64;
        let mut k = 50.0;
        let mut d = 50.0;

        for i in (self.period - 1)..len {
            let start = i + 1 - self.period;
            let (highest, lowest) = match (
                simd::min_max(&high[start..=i]),
                simd::min_max(&low[start..=i]),
            ) {
                (Some((_, hh)), Some((ll, _))) => (hh, ll),
                _ => continue,
            };

            let range = highest - lowest;
            let rsv = if range == 0.0 {
                50.0 // Undefined, use midpoint
            } else {
                (close[i] - lowest) / range * 100.0
            };

            k += weight * (rsv - k);
            d += weight * (k - d);
            output.k[i] = k;
            output.d[i] = d;
            output.j[i] = 3.0 * k - 2.0 * d;
        }

        output
    }

    fn warmup(&self) -> usize {
        self.period.saturating_sub(1)
    }

    fn name(&self) -> &str {
        "KDJ"
    }
}

/// Wilder RSI in `[0, 100]`; the first `period` entries are `NaN`.
pub fn rsi(series: &[f64], period: usize) -> Vec<f64> {
    Rsi::new(period).calculate(series)
}

/// MACD line, signal line and histogram.
pub fn macd(series: &[f64], fast: usize, slow: usize, signal: usize) -> MacdOutput {
    Macd::with_periods(fast, slow, signal).calculate(series)
}

/// K, D and J lines of the stochastic oscillator.
pub fn stochastic_kdj(
    high: &[f64],
    low: &[f64],
    close: &[f64],
    period: usize,
    smoothing: usize,
) -> KdjOutput {
    Kdj::with_periods(period, smoothing).calculate(high, low, close)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nan_prefix(values: &[f64]) -> usize {
        values.iter().take_while(|v| v.is_nan()).count()
    }

    #[test]
    fn test_rsi_basic() {
        let rsi = Rsi::new(14);
        // Generate test data with alternating up/down moves
        let data: Vec<f64> = (0..30)
            .map(|i| 100.0 + (i as f64 * 0.5).sin() * 5.0)
            .collect();

        let result = rsi.calculate(&data);
        assert_eq!(result.len(), 30);
        assert_eq!(nan_prefix(&result), 14);

        // All RSI values should be between 0 and 100
        for value in &result[14..] {
            assert!(*value >= 0.0 && *value <= 100.0);
        }
    }

    #[test]
    fn test_rsi_all_gains() {
        let result = rsi(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0], 5);
        // All gains = RSI should be 100
        assert!((result[5] - 100.0).abs() < 1e-10);
    }

    #[test]
    fn test_rsi_all_losses() {
        let result = rsi(&[7.0, 6.0, 5.0, 4.0, 3.0, 2.0, 1.0], 5);
        // All losses = RSI should be 0
        assert!(result[5].abs() < 1e-10);
    }

    #[test]
    fn test_rsi_flat_series_is_neutral() {
        let data = vec![100.0; 30];
        let result = rsi(&data, 14);

        assert_eq!(nan_prefix(&result), 14);
        assert!(result[14..].iter().all(|&v| v == 50.0));
    }

    #[test]
    fn test_rsi_short_input() {
        assert!(rsi(&[1.0, 2.0, 3.0], 3).iter().all(|v| v.is_nan()));
        assert!(rsi(&[1.0, 2.0, 3.0], 0).iter().all(|v| v.is_nan()));
    }

    #[test]
    fn test_macd_basic() {
        let data: Vec<f64> = (0..50).map(|i| 100.0 + i as f64).collect();
        let result = Macd::new().calculate(&data);

        assert_eq!(result.macd.len(), 50);
        // In an uptrend, MACD should be positive
        assert!(*result.macd.last().unwrap() > 0.0);
    }

    #[test]
    fn test_macd_warmup_boundaries() {
        let data: Vec<f64> = (0..40).map(|i| 100.0 + (i as f64 * 0.3).sin()).collect();
        let result = macd(&data, 5, 10, 3);

        assert_eq!(nan_prefix(&result.macd), 9);
        assert_eq!(nan_prefix(&result.signal), 11);
        assert_eq!(nan_prefix(&result.histogram), 11);
        assert!(result.signal[11..].iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_macd_short_input() {
        let result = macd(&[1.0, 2.0, 3.0], 12, 26, 9);
        assert_eq!(result.macd.len(), 3);
        assert!(result.macd.iter().all(|v| v.is_nan()));
        assert!(result.signal.iter().all(|v| v.is_nan()));
    }

    #[test]
    fn test_kdj_bounds() {
        let high: Vec<f64> = (0..30).map(|i| 105.0 + (i as f64 * 0.4).sin() * 3.0).collect();
        let low: Vec<f64> = high.iter().map(|h| h - 10.0).collect();
        let close: Vec<f64> = high.iter().map(|h| h - 4.0).collect();

        let result = stochastic_kdj(&high, &low, &close, 9, 3);
        assert_eq!(nan_prefix(&result.k), 8);
        for i in 8..30 {
            assert!(result.k[i] >= 0.0 && result.k[i] <= 100.0);
            assert!(result.d[i] >= 0.0 && result.d[i] <= 100.0);
            assert!((result.j[i] - (3.0 * result.k[i] - 2.0 * result.d[i])).abs() < 1e-10);
        }
    }

    #[test]
    fn test_kdj_zero_range_is_neutral() {
        let flat = vec![10.0; 12];
        let result = stochastic_kdj(&flat, &flat, &flat, 5, 3);

        assert!(result.k[4..].iter().all(|&v| (v - 50.0).abs() < 1e-10));
        assert!(result.d[4..].iter().all(|&v| (v - 50.0).abs() < 1e-10));
        assert!(result.j[4..].iter().all(|&v| (v - 50.0).abs() < 1e-10));
    }

    #[test]
    fn test_kdj_close_at_high() {
        let high = vec![10.0, 11.0, 12.0, 13.0, 14.0, 15.0, 16.0, 17.0];
        let low = vec![5.0, 6.0, 7.0, 8.0, 9.0, 10.0, 11.0, 12.0];
        let close = high.clone();

        let result = stochastic_kdj(&high, &low, &close, 5, 3);
        // RSV is 100 at every defined bar: K = 50 + 50 * (1 - (2/3)^n)
        let expected_first = 50.0 + 50.0 / 3.0;
        assert!((result.k[4] - expected_first).abs() < 1e-10);
        assert!(result.k[7] > result.k[6]);
        assert!(result.k[7] > result.d[7]);
    }
}
