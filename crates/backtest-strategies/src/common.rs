//! Helpers shared by the signal generators.

use backtest_core::{error::StrategyError, traits::StrategyConfig, IndicatorFrame};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;

/// Direction in which one line crossed another between two bars.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cross {
    /// Moved from at-or-below to strictly above
    Above,
    /// Moved from at-or-above to strictly below
    Below,
}

/// Detect a cross of `line` over `reference` between `index - 1` and `index`.
///
/// Any undefined value on either bar means no cross.
pub fn cross(frame: &IndicatorFrame, line: &str, reference: &str, index: usize) -> Option<Cross> {
    let prev = index.checked_sub(1)?;
    let prev_a = frame.value(line, prev)?;
    let prev_b = frame.value(reference, prev)?;
    let a = frame.value(line, index)?;
    let b = frame.value(reference, index)?;

    if prev_a <= prev_b && a > b {
        Some(Cross::Above)
    } else if prev_a >= prev_b && a < b {
        Some(Cross::Below)
    } else {
        None
    }
}

/// Previous and current value of `name`, both defined.
pub fn prev_and_current(frame: &IndicatorFrame, name: &str, index: usize) -> Option<(f64, f64)> {
    let prev = index.checked_sub(1)?;
    Some((frame.value(name, prev)?, frame.value(name, index)?))
}

/// Move every value one bar later so that index `i` only sees bars before `i`.
pub fn shift_forward(mut values: Vec<f64>) -> Vec<f64> {
    if values.is_empty() {
        return values;
    }
    values.pop();
    values.insert(0, f64::NAN);
    values
}

/// Parse a parameter map into a validated config.
///
/// Missing keys take their defaults, unknown keys are ignored and `null`
/// means "all defaults".
pub fn parse_config<C>(params: serde_json::Value) -> Result<C, StrategyError>
where
    C: StrategyConfig + DeserializeOwned,
{
    let params = if params.is_null() {
        serde_json::Value::Object(Default::default())
    } else {
        params
    };
    let config: C =
        serde_json::from_value(params).map_err(|e| StrategyError::InvalidConfig(e.to_string()))?;
    config.validate()?;
    Ok(config)
}

pub fn require_period(name: &str, period: usize) -> Result<(), StrategyError> {
    if period == 0 {
        return Err(StrategyError::InvalidConfig(format!(
            "{name} must be greater than 0"
        )));
    }
    Ok(())
}

pub fn require_positive(name: &str, value: f64) -> Result<(), StrategyError> {
    if !(value.is_finite() && value > 0.0) {
        return Err(StrategyError::InvalidConfig(format!("{name} must be positive")));
    }
    Ok(())
}

pub fn require_positive_size(name: &str, size: Decimal) -> Result<(), StrategyError> {
    if size <= Decimal::ZERO {
        return Err(StrategyError::InvalidConfig(format!("{name} must be positive")));
    }
    Ok(())
}
