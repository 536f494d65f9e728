//! Indicator trait definitions.

use crate::error::IndicatorError;

/// Trait for single-input technical indicators.
///
/// Output is index-aligned with the input: entries inside the warm-up window
/// are `NaN`, and input shorter than [`Indicator::period`] yields an all-`NaN`
/// series rather than an error.
pub trait Indicator: Send + Sync {
    /// The output type of the indicator.
    type Output;

    /// Calculate indicator values for the given data.
    ///
    /// # Arguments
    /// * `data` - Input data (typically prices)
    ///
    /// # Returns
    /// One value per input element
    fn calculate(&self, data: &[f64]) -> Vec<Self::Output>;

    /// Get the minimum data points required.
    fn period(&self) -> usize;

    /// Number of leading outputs that are undefined.
    fn warmup(&self) -> usize {
        self.period().saturating_sub(1)
    }

    /// Get the name of the indicator.
    fn name(&self) -> &str;

    /// Validate that there's enough data for at least one defined value.
    fn validate_data(&self, data: &[f64]) -> Result<(), IndicatorError> {
        if data.len() < self.period() {
            return Err(IndicatorError::InsufficientData {
                required: self.period(),
                available: data.len(),
            });
        }
        Ok(())
    }
}

/// Multi-output indicator (e.g., Bollinger Bands, MACD).
///
/// The outputs are a struct of aligned series.
pub trait MultiOutputIndicator: Send + Sync {
    /// The output type containing multiple series.
    type Outputs;

    /// Calculate indicator series for the given data.
    fn calculate(&self, data: &[f64]) -> Self::Outputs;

    /// Number of leading outputs that are undefined.
    fn warmup(&self) -> usize;

    /// Get the name of the indicator.
    fn name(&self) -> &str;
}

/// Indicator computed from high, low and close prices.
pub trait OhlcvIndicator: Send + Sync {
    /// The output type of the indicator.
    type Output;

    /// Calculate indicator values from bar data.
    ///
    /// All three slices are expected to have the same length; only the common
    /// prefix is used otherwise.
    fn calculate(&self, high: &[f64], low: &[f64], close: &[f64]) -> Self::Output;

    /// Number of leading outputs that are undefined.
    fn warmup(&self) -> usize;

    /// Get the name of the indicator.
    fn name(&self) -> &str;
}
