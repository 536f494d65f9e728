//! Volatility indicators.

use backtest_core::traits::{Indicator, MultiOutputIndicator, OhlcvIndicator};
use serde::{Deserialize, Serialize};

use crate::moving_average::Sma;
use crate::simd;

/// Rolling population standard deviation.
#[derive(Debug, Clone)]
pub struct StdDev {
    period: usize,
}

impl StdDev {
    /// Create a new standard deviation indicator.
    pub fn new(period: usize) -> Self {
        Self { period }
    }
}

impl Indicator for StdDev {
    type Output = f64;

    fn calculate(&self, data: &[f64]) -> Vec<f64> {
        simd::rolling(data, self.period, simd::population_std)
    }

    fn period(&self) -> usize {
        self.period
    }

    fn name(&self) -> &str {
        "StdDev"
    }
}

/// Deviation, relative to the magnitude of the values, below which a window
/// counts as flat. Rounding noise on a constant series stays a few ULPs wide.
const FLAT_TOLERANCE: f64 = 64.0 * f64::EPSILON;

/// Whether `std` is indistinguishable from rounding noise on values of
/// magnitude `scale`.
fn is_flat(std: f64, scale: f64) -> bool {
    std <= FLAT_TOLERANCE * scale.abs().max(1.0)
}

/// Rolling z-score: distance of the latest value from the window mean, in
/// standard deviations. A flat window scores 0.
#[derive(Debug, Clone)]
pub struct ZScore {
    period: usize,
}

impl ZScore {
    pub fn new(period: usize) -> Self {
        Self { period }
    }

    fn score(window: &[f64]) -> f64 {
        let mean = simd::window_mean(window);
        let std = (simd::sum_sq_dev(window, mean) / window.len() as f64).sqrt();
        let scale = window.iter().fold(0.0_f64, |m, v| m.max(v.abs()));
        match window.last() {
            Some(&last) if !is_flat(std, scale) => (last - mean) / std,
            _ => 0.0,
        }
    }
}

impl Indicator for ZScore {
    type Output = f64;

    fn calculate(&self, data: &[f64]) -> Vec<f64> {
        simd::rolling(data, self.period, Self::score)
    }

    fn period(&self) -> usize {
        self.period
    }

    fn name(&self) -> &str {
        "ZScore"
    }
}

/// Average True Range (ATR).
///
/// Rolling mean of the true range over `period` bars. The first bar has no
/// previous close, so its true range is simply `high - low`.
#[derive(Debug, Clone)]
pub struct Atr {
    period: usize,
}

impl Atr {
    /// Create a new ATR indicator.
    pub fn new(period: usize) -> Self {
        Self { period }
    }

    /// True range of every bar.
    pub fn true_range(high: &[f64], low: &[f64], close: &[f64]) -> Vec<f64> {
        let len = high.len().min(low.len()).min(close.len());
        (0..len)
            .map(|i| {
                let hl = high[i] - low[i];
                if i == 0 {
                    return hl;
                }
                let prev_close = close[i - 1];
                let hc = (high[i] - prev_close).abs();
                let lc = (low[i] - prev_close).abs();
                hl.max(hc).max(lc)
            })
            .collect()
    }
}

impl Default for Atr {
    fn default() -> Self {
        Self::new(14)
    }
}

impl OhlcvIndicator for Atr {
    type Output = Vec<f64>;

    fn calculate(&self, high: &[f64], low: &[f64], close: &[f64]) -> Vec<f64> {
        Sma::new(self.period).calculate(&Self::true_range(high, low, close))
    }

    fn warmup(&self) -> usize {
        self.period.saturating_sub(1)
    }

    fn name(&self) -> &str {
        "ATR"
    }
}

/// Bollinger Bands output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BollingerOutput {
    /// Upper band (middle + k * std)
    pub upper: Vec<f64>,
    /// Middle band (SMA)
    pub middle: Vec<f64>,
    /// Lower band (middle - k * std)
    pub lower: Vec<f64>,
    /// Position of the price within the bands (0 = lower, 1 = upper)
    pub percent_b: Vec<f64>,
}

/// Bollinger Bands indicator.
///
/// A simple moving average wrapped in bands `k` population standard
/// deviations wide. When the bands collapse to a line `percent_b` reads 0.5.
#[derive(Debug, Clone)]
pub struct BollingerBands {
    period: usize,
    std_dev_multiplier: f64,
}

impl BollingerBands {
    /// Create Bollinger Bands with default parameters (20, 2.0).
    pub fn new() -> Self {
        Self::with_params(20, 2.0)
    }

    /// Create with custom parameters.
    pub fn with_params(period: usize, std_dev_multiplier: f64) -> Self {
        Self {
            period,
            std_dev_multiplier,
        }
    }
}

impl Default for BollingerBands {
    fn default() -> Self {
        Self::new()
    }
}

impl MultiOutputIndicator for BollingerBands {
    type Outputs = BollingerOutput;

    fn calculate(&self, data: &[f64]) -> BollingerOutput {
        let middle = Sma::new(self.period).calculate(data);
        let std = StdDev::new(self.period).calculate(data);

        let mut output = BollingerOutput {
            upper: vec![f64::NAN; data.len()],
            middle,
            lower: vec![f64::NAN; data.len()],
            percent_b: vec![f64::NAN; data.len()],
        };

        for i in 0..data.len() {
            let (mid, sd) = (output.middle[i], std[i]);
            if !mid.is_finite() || !sd.is_finite() {
                continue;
            }
            let upper = mid + self.std_dev_multiplier * sd;
            let lower = mid - self.std_dev_multiplier * sd;
            output.upper[i] = upper;
            output.lower[i] = lower;
            output.percent_b[i] = if is_flat(sd, mid) {
                0.5
            } else {
                (data[i] - lower) / (upper - lower)
            };
        }

        output
    }

    fn warmup(&self) -> usize {
        self.period.saturating_sub(1)
    }

    fn name(&self) -> &str {
        "Bollinger"
    }
}

/// Rolling population standard deviation over `period` values.
pub fn rolling_std(series: &[f64], period: usize) -> Vec<f64> {
    StdDev::new(period).calculate(series)
}

/// Rolling z-score of each value against its trailing window.
pub fn zscore(series: &[f64], period: usize) -> Vec<f64> {
    ZScore::new(period).calculate(series)
}

/// Upper, middle and lower Bollinger bands.
pub fn bollinger_bands(series: &[f64], period: usize, k: f64) -> BollingerOutput {
    BollingerBands::with_params(period, k).calculate(series)
}

/// Rolling mean of the true range.
pub fn average_true_range(high: &[f64], low: &[f64], close: &[f64], period: usize) -> Vec<f64> {
    Atr::new(period).calculate(high, low, close)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_std_dev() {
        let data = vec![2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let result = rolling_std(&data, 8);

        assert_eq!(result.len(), 8);
        assert!(result[..7].iter().all(|v| v.is_nan()));
        // Population std dev of [2,4,4,4,5,5,7,9] = 2.0
        assert!((result[7] - 2.0).abs() < 1e-10);
    }

    #[test]
    fn test_zscore() {
        let data = vec![1.0, 2.0, 3.0, 4.0, 10.0];
        let result = zscore(&data, 5);
        // mean 4, population std sqrt(10)
        let expected = 6.0 / 10.0_f64.sqrt();
        assert!((result[4] - expected).abs() < 1e-10);
    }

    #[test]
    fn test_zscore_flat_window_is_zero() {
        let result = zscore(&[5.0; 6], 3);
        assert!(result[..2].iter().all(|v| v.is_nan()));
        assert!(result[2..].iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_zscore_ignores_rounding_noise() {
        // a / 3a is 1/3 on paper but not bit-identical from bar to bar
        let ratio: Vec<f64> = (0..20)
            .map(|i| {
                let a = 10.1 + 0.7 * i as f64;
                a / (3.0 * a)
            })
            .collect();
        let result = zscore(&ratio, 5);
        assert!(result[4..].iter().all(|&v| v == 0.0));

        let bands = bollinger_bands(&ratio, 5, 2.0);
        assert!(bands.percent_b[4..].iter().all(|&v| v == 0.5));
    }

    #[test]
    fn test_zscore_keeps_small_real_moves() {
        let data = [1000.0, 1000.0, 1000.0, 1000.0, 1000.001];
        assert!(zscore(&data, 5)[4] > 1.9);
    }

    #[test]
    fn test_atr() {
        let high = vec![10.0, 11.0, 12.0, 11.0];
        let low = vec![8.0, 9.0, 10.0, 9.0];
        let close = vec![9.0, 10.0, 11.0, 10.0];

        let result = average_true_range(&high, &low, &close, 2);
        // TR = [2, 2, 2, 2]
        assert!(result[0].is_nan());
        assert!(result[1..].iter().all(|&v| (v - 2.0).abs() < 1e-10));
    }

    #[test]
    fn test_atr_uses_gaps() {
        let high = vec![10.0, 20.0];
        let low = vec![9.0, 19.0];
        let close = vec![9.5, 19.5];

        let tr = Atr::true_range(&high, &low, &close);
        assert_eq!(tr, vec![1.0, 10.5]);
        assert!((average_true_range(&high, &low, &close, 2)[1] - 5.75).abs() < 1e-10);
    }

    #[test]
    fn test_bollinger_bands() {
        let data: Vec<f64> = (0..30)
            .map(|i| 100.0 + (i as f64 * 0.3).sin() * 5.0)
            .collect();

        let result = bollinger_bands(&data, 20, 2.0);
        assert_eq!(result.middle.len(), 30);
        assert!(result.upper[18].is_nan());

        for i in 19..30 {
            assert!(result.upper[i] > result.middle[i]);
            assert!(result.middle[i] > result.lower[i]);
        }
    }

    #[test]
    fn test_bollinger_collapsed_bands() {
        let result = bollinger_bands(&[50.0; 5], 3, 2.0);
        assert_eq!(result.upper[4], 50.0);
        assert_eq!(result.lower[4], 50.0);
        assert_eq!(result.percent_b[4], 0.5);
    }

    #[test]
    fn test_short_input_all_nan() {
        assert!(rolling_std(&[1.0], 3).iter().all(|v| v.is_nan()));
        assert!(average_true_range(&[1.0], &[0.5], &[0.8], 3)
            .iter()
            .all(|v| v.is_nan()));
        assert!(bollinger_bands(&[1.0, 2.0], 3, 2.0)
            .upper
            .iter()
            .all(|v| v.is_nan()));
    }
}
