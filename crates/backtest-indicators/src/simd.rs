//! SIMD window reductions.
//!
//! These helpers use the `wide` crate for portable SIMD and back the rolling
//! indicators (standard deviation, Bollinger Bands, z-score, Donchian channel).

use wide::f64x4;

/// Sum of a slice.
pub fn window_sum(data: &[f64]) -> f64 {
    let chunks = data.chunks_exact(4);
    let tail = chunks.remainder();
    let mut simd_sum = f64x4::splat(0.0);

    for chunk in chunks {
        simd_sum += f64x4::new([chunk[0], chunk[1], chunk[2], chunk[3]]);
    }

    let mut result = simd_sum.reduce_add();
    for &value in tail {
        result += value;
    }
    result
}

/// Mean of a slice, `NaN` when empty.
pub fn window_mean(data: &[f64]) -> f64 {
    if data.is_empty() {
        return f64::NAN;
    }
    window_sum(data) / data.len() as f64
}

/// Sum of squared deviations from `mean`.
pub fn sum_sq_dev(data: &[f64], mean: f64) -> f64 {
    let chunks = data.chunks_exact(4);
    let tail = chunks.remainder();
    let mean_vec = f64x4::splat(mean);
    let mut simd_sum = f64x4::splat(0.0);

    for chunk in chunks {
        let diff = f64x4::new([chunk[0], chunk[1], chunk[2], chunk[3]]) - mean_vec;
        simd_sum += diff * diff;
    }

    let mut result = simd_sum.reduce_add();
    for &value in tail {
        let diff = value - mean;
        result += diff * diff;
    }
    result
}

/// Population standard deviation of a slice.
pub fn population_std(data: &[f64]) -> f64 {
    if data.is_empty() {
        return f64::NAN;
    }
    let mean = window_mean(data);
    (sum_sq_dev(data, mean) / data.len() as f64).sqrt()
}

/// Minimum and maximum of a slice.
pub fn min_max(data: &[f64]) -> Option<(f64, f64)> {
    if data.is_empty() {
        return None;
    }

    let chunks = data.chunks_exact(4);
    let tail = chunks.remainder();
    let mut min_vec = f64x4::splat(f64::INFINITY);
    let mut max_vec = f64x4::splat(f64::NEG_INFINITY);

    for chunk in chunks {
        let values = f64x4::new([chunk[0], chunk[1], chunk[2], chunk[3]]);
        min_vec = min_vec.min(values);
        max_vec = max_vec.max(values);
    }

    let min_arr = min_vec.to_array();
    let max_arr = max_vec.to_array();

    let mut min = min_arr[0].min(min_arr[1]).min(min_arr[2]).min(min_arr[3]);
    let mut max = max_arr[0].max(max_arr[1]).max(max_arr[2]).max(max_arr[3]);

    for &value in tail {
        min = min.min(value);
        max = max.max(value);
    }

    Some((min, max))
}

/// Apply `reduce` to every full window of `period` values.
///
/// Output is aligned with `data`: the first `period - 1` entries, and any
/// window containing a non-finite value, are `NaN`. A zero period or input
/// shorter than `period` yields an all-`NaN` series.
pub fn rolling<F>(data: &[f64], period: usize, reduce: F) -> Vec<f64>
where
    F: Fn(&[f64]) -> f64,
{
    let mut result = vec![f64::NAN; data.len()];
    if period == 0 || data.len() < period {
        return result;
    }

    for (i, window) in data.windows(period).enumerate() {
        if window.iter().all(|v| v.is_finite()) {
            result[i + period - 1] = reduce(window);
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_sum() {
        let data: Vec<f64> = (1..=100).map(|x| x as f64).collect();
        // Sum of 1 to 100 = 5050
        assert!((window_sum(&data) - 5050.0).abs() < 1e-10);
        assert_eq!(window_sum(&[]), 0.0);
    }

    #[test]
    fn test_population_std() {
        let data = vec![2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        // Population std dev of [2,4,4,4,5,5,7,9] = 2.0
        assert!((population_std(&data) - 2.0).abs() < 1e-10);
        assert!((sum_sq_dev(&data, 5.0) - 32.0).abs() < 1e-10);
    }

    #[test]
    fn test_min_max() {
        let data = vec![5.0, 2.0, 8.0, 1.0, 9.0, 3.0, 7.0];
        let (min, max) = min_max(&data).unwrap();

        assert!((min - 1.0).abs() < 1e-10);
        assert!((max - 9.0).abs() < 1e-10);
        assert!(min_max(&[]).is_none());
    }

    #[test]
    fn test_rolling_alignment() {
        let result = rolling(&[1.0, 2.0, 3.0, 4.0], 2, window_sum);
        assert!(result[0].is_nan());
        assert_eq!(&result[1..], &[3.0, 5.0, 7.0]);
    }

    #[test]
    fn test_rolling_skips_non_finite_windows() {
        let result = rolling(&[1.0, f64::NAN, 3.0, 4.0], 2, window_sum);
        assert!(result[1].is_nan());
        assert!(result[2].is_nan());
        assert_eq!(result[3], 7.0);
    }

    #[test]
    fn test_rolling_short_input() {
        assert!(rolling(&[1.0, 2.0], 3, window_sum).iter().all(|v| v.is_nan()));
        assert!(rolling(&[1.0, 2.0], 0, window_sum).iter().all(|v| v.is_nan()));
    }
}
