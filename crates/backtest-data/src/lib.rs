//! Historical bar loading.
//!
//! The backtest crates never touch the filesystem; this crate turns OHLCV
//! CSV files into validated [`BarSeries`](backtest_core::BarSeries).

mod csv_source;

pub use csv_source::CsvDataSource;

use std::path::Path;

use backtest_core::error::DataError;
use backtest_core::types::{BarSeries, Timeframe};

/// Load bars from a CSV file.
pub fn load_csv(
    path: impl AsRef<Path>,
    symbol: &str,
    timeframe: Timeframe,
) -> Result<BarSeries, DataError> {
    CsvDataSource::new(path)?.load(symbol, timeframe)
}
