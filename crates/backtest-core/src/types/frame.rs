//! Named indicator series aligned with a bar series.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Indicator series keyed by name.
///
/// Every series has one entry per bar. Entries inside an indicator's warm-up
/// window are `NaN`; [`IndicatorFrame::value`] reports them as `None` so that
/// callers treat them as "no decision".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndicatorFrame {
    series: BTreeMap<String, Vec<f64>>,
}

impl IndicatorFrame {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a series.
    pub fn insert(&mut self, name: impl Into<String>, values: Vec<f64>) {
        self.series.insert(name.into(), values);
    }

    /// Builder form of [`IndicatorFrame::insert`].
    pub fn with(mut self, name: impl Into<String>, values: Vec<f64>) -> Self {
        self.insert(name, values);
        self
    }

    /// Full series by name.
    pub fn get(&self, name: &str) -> Option<&[f64]> {
        self.series.get(name).map(Vec::as_slice)
    }

    /// Defined value of `name` at `index`.
    pub fn value(&self, name: &str, index: usize) -> Option<f64> {
        self.series
            .get(name)
            .and_then(|values| values.get(index))
            .copied()
            .filter(|v| v.is_finite())
    }

    /// Names of all series, in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.series.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}
