//! Moving average indicators.

use backtest_core::traits::Indicator;

/// Simple Moving Average (SMA).
///
/// Calculates the arithmetic mean of the last N values.
#[derive(Debug, Clone)]
pub struct Sma {
    period: usize,
}

impl Sma {
    /// Create a new SMA with the specified period.
    pub fn new(period: usize) -> Self {
        Self { period }
    }
}

impl Indicator for Sma {
    type Output = f64;

    fn calculate(&self, data: &[f64]) -> Vec<f64> {
        let mut result = vec![f64::NAN; data.len()];
        if self.period == 0 || data.len() < self.period {
            return result;
        }

        let period_f64 = self.period as f64;
        let mut sum = 0.0;
        // Non-finite values currently inside the window
        let mut gaps = 0usize;

        for (i, &value) in data.iter().enumerate() {
            if value.is_finite() {
                sum += value;
            } else {
                gaps += 1;
            }

            if i >= self.period {
                let old = data[i - self.period];
                if old.is_finite() {
                    sum -= old;
                } else {
                    gaps -= 1;
                }
            }

            if i + 1 >= self.period && gaps == 0 {
                result[i] = sum / period_f64;
            }
        }

        result
    }

    fn period(&self) -> usize {
        self.period
    }

    fn name(&self) -> &str {
        "SMA"
    }
}

/// Exponential Moving Average (EMA).
///
/// Gives more weight to recent prices using an exponential decay with
/// multiplier `2 / (period + 1)`. The average is seeded with the first finite
/// input, so leading `NaN` input stays `NaN` and everything after is defined.
#[derive(Debug, Clone)]
pub struct Ema {
    period: usize,
    multiplier: f64,
}

impl Ema {
    /// Create a new EMA with the specified period.
    pub fn new(period: usize) -> Self {
        let multiplier = 2.0 / (period as f64 + 1.0);
        Self { period, multiplier }
    }

    pub fn multiplier(&self) -> f64 {
        self.multiplier
    }
}

impl Indicator for Ema {
    type Output = f64;

    fn calculate(&self, data: &[f64]) -> Vec<f64> {
        let mut result = vec![f64::NAN; data.len()];
        if self.period == 0 {
            return result;
        }

        let mut ema: Option<f64> = None;

        for (i, &price) in data.iter().enumerate() {
            if !price.is_finite() {
                continue;
            }
            let next = match ema {
                Some(prev) => prev + self.multiplier * (price - prev),
                None => price,
            };
            ema = Some(next);
            result[i] = next;
        }

        result
    }

    fn period(&self) -> usize {
        self.period
    }

    fn warmup(&self) -> usize {
        0
    }

    fn name(&self) -> &str {
        "EMA"
    }
}

/// Windowed mean over `period` values; the first `period - 1` entries are `NaN`.
pub fn moving_average(series: &[f64], period: usize) -> Vec<f64> {
    Sma::new(period).calculate(series)
}

/// Exponential moving average seeded from the first finite value.
pub fn exponential_moving_average(series: &[f64], period: usize) -> Vec<f64> {
    Ema::new(period).calculate(series)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defined(values: &[f64]) -> Vec<f64> {
        values.iter().copied().filter(|v| v.is_finite()).collect()
    }

    #[test]
    fn test_sma() {
        let sma = Sma::new(3);
        let data = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let result = sma.calculate(&data);

        assert_eq!(result.len(), 5);
        assert!(result[0].is_nan() && result[1].is_nan());
        assert!((result[2] - 2.0).abs() < 1e-10); // (1+2+3)/3
        assert!((result[3] - 3.0).abs() < 1e-10); // (2+3+4)/3
        assert!((result[4] - 4.0).abs() < 1e-10); // (3+4+5)/3
    }

    #[test]
    fn test_sma_warmup_prefix() {
        let data: Vec<f64> = (0..10).map(|i| i as f64).collect();
        for period in 1..=10 {
            let result = moving_average(&data, period);
            let nan_prefix = result.iter().take_while(|v| v.is_nan()).count();
            assert_eq!(nan_prefix, period - 1);
            assert_eq!(defined(&result).len(), data.len() - period + 1);
        }
    }

    #[test]
    fn test_sma_scenario_closes() {
        let closes = [10.0, 10.0, 10.0, 10.0, 12.0, 14.0, 16.0, 10.0, 8.0, 6.0];
        assert_eq!(
            defined(&moving_average(&closes, 2)),
            vec![10.0, 10.0, 10.0, 11.0, 13.0, 15.0, 13.0, 9.0, 7.0]
        );
        assert_eq!(
            defined(&moving_average(&closes, 4)),
            vec![10.0, 10.5, 11.5, 13.0, 13.0, 12.0, 10.0]
        );
    }

    #[test]
    fn test_sma_skips_windows_with_nan() {
        let result = moving_average(&[f64::NAN, 2.0, 4.0, 6.0], 2);
        assert!(result[1].is_nan());
        assert_eq!(result[2], 3.0);
        assert_eq!(result[3], 5.0);
    }

    #[test]
    fn test_sma_short_input_all_nan() {
        assert!(moving_average(&[1.0, 2.0], 5).iter().all(|v| v.is_nan()));
        assert!(moving_average(&[1.0, 2.0], 0).iter().all(|v| v.is_nan()));
        assert!(moving_average(&[], 3).is_empty());
    }

    #[test]
    fn test_ema_seeded_from_first_value() {
        let ema = Ema::new(3);
        let result = ema.calculate(&[1.0, 2.0, 3.0, 4.0, 5.0]);

        assert_eq!(result.len(), 5);
        assert_eq!(result[0], 1.0);
        // multiplier = 0.5
        assert!((result[1] - 1.5).abs() < 1e-10);
        assert!((result[2] - 2.25).abs() < 1e-10);
        assert!((result[4] - 4.0625).abs() < 1e-10);
    }

    #[test]
    fn test_ema_leading_nan_stays_nan() {
        let result = exponential_moving_average(&[f64::NAN, f64::NAN, 4.0, 6.0], 3);
        assert!(result[0].is_nan() && result[1].is_nan());
        assert_eq!(result[2], 4.0);
        assert_eq!(result[3], 5.0);
    }

    #[test]
    fn test_ema_zero_period_all_nan() {
        assert!(exponential_moving_average(&[1.0, 2.0], 0)
            .iter()
            .all(|v| v.is_nan()));
    }
}
