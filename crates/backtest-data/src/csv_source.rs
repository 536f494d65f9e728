//! CSV data source.

use std::io::Read;
use std::path::{Path, PathBuf};

use backtest_core::error::DataError;
use backtest_core::types::{Bar, BarSeries, Timeframe};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use csv::ReaderBuilder;
use serde::Deserialize;
use tracing::{debug, warn};

/// CSV record format.
#[derive(Debug, Deserialize)]
struct CsvRecord {
    #[serde(
        alias = "Date",
        alias = "date",
        alias = "Datetime",
        alias = "datetime",
        alias = "timestamp",
        alias = "Timestamp",
        alias = "time"
    )]
    date: String,
    #[serde(alias = "Open", alias = "open")]
    open: f64,
    #[serde(alias = "High", alias = "high")]
    high: f64,
    #[serde(alias = "Low", alias = "low")]
    low: f64,
    #[serde(alias = "Close", alias = "close", alias = "Adj Close")]
    close: f64,
    #[serde(alias = "Volume", alias = "volume", default)]
    volume: f64,
}

/// CSV data source for historical data.
#[derive(Debug, Clone)]
pub struct CsvDataSource {
    path: PathBuf,
}

impl CsvDataSource {
    /// Create a new CSV data source.
    pub fn new(path: impl AsRef<Path>) -> Result<Self, DataError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(DataError::NoDataAvailable);
        }
        Ok(Self {
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load every bar of the file into a series.
    pub fn load(&self, symbol: &str, timeframe: Timeframe) -> Result<BarSeries, DataError> {
        let file = std::fs::File::open(&self.path)
            .map_err(|e| DataError::ParseError(format!("{}: {}", self.path.display(), e)))?;
        let series = Self::from_reader(file, symbol, timeframe)?;
        debug!(
            path = %self.path.display(),
            symbol,
            bars = series.len(),
            "Loaded CSV bars"
        );
        Ok(series)
    }

    /// Parse CSV from any reader.
    ///
    /// Rows are sorted by time, later duplicates of a timestamp are dropped and
    /// rows with non-finite or inconsistent prices are skipped.
    pub fn from_reader<R: Read>(
        reader: R,
        symbol: &str,
        timeframe: Timeframe,
    ) -> Result<BarSeries, DataError> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut bars = Vec::new();
        let mut skipped = 0usize;

        for (line, result) in reader.deserialize().enumerate() {
            let record: CsvRecord = result.map_err(|e| DataError::ParseError(e.to_string()))?;
            let timestamp = parse_timestamp(&record.date)?;
            let bar = Bar::new(
                timestamp,
                record.open,
                record.high,
                record.low,
                record.close,
                record.volume,
            );
            if is_valid(&bar) {
                bars.push(bar);
            } else {
                skipped += 1;
                debug!(row = line + 1, "Skipping invalid bar");
            }
        }

        if bars.is_empty() {
            return Err(DataError::NoDataAvailable);
        }

        bars.sort_by_key(|b| b.timestamp);
        let before = bars.len();
        bars.dedup_by_key(|b| b.timestamp);
        let duplicates = before - bars.len();

        if skipped + duplicates > 0 {
            warn!(symbol, skipped, duplicates, "Dropped unusable CSV rows");
        }

        BarSeries::from_bars(symbol, timeframe, bars)
    }
}

fn is_valid(bar: &Bar) -> bool {
    let prices = [bar.open, bar.high, bar.low, bar.close];
    prices.iter().all(|p| p.is_finite() && *p > 0.0)
        && bar.volume.is_finite()
        && bar.high >= bar.low
}

/// Parse various timestamp formats into Unix milliseconds.
fn parse_timestamp(date_str: &str) -> Result<i64, DataError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(date_str) {
        return Ok(dt.timestamp_millis());
    }

    let datetime_formats = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];
    for format in datetime_formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(date_str, format) {
            return Ok(dt.and_utc().timestamp_millis());
        }
    }

    let date_formats = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d-%m-%Y", "%Y%m%d"];
    for format in date_formats {
        if let Some(dt) = NaiveDate::parse_from_str(date_str, format)
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
        {
            return Ok(dt.and_utc().timestamp_millis());
        }
    }

    // Unix timestamp; more than 10 digits means milliseconds
    if let Ok(ts) = date_str.parse::<i64>() {
        return Ok(if ts > 10_000_000_000 { ts } else { ts * 1000 });
    }

    Err(DataError::ParseError(format!(
        "Could not parse date: {}",
        date_str
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_timestamp() {
        assert_eq!(parse_timestamp("2024-01-15").unwrap(), 1_705_276_800_000);
        assert_eq!(
            parse_timestamp("2024-01-15 10:30:00").unwrap(),
            1_705_276_800_000 + 37_800_000
        );
        assert_eq!(
            parse_timestamp("2024-01-15T00:00:00Z").unwrap(),
            1_705_276_800_000
        );
        assert_eq!(parse_timestamp("1705312800000").unwrap(), 1_705_312_800_000); // Unix ms
        assert_eq!(parse_timestamp("1705312800").unwrap(), 1_705_312_800_000); // Unix sec
        assert!(parse_timestamp("yesterday").is_err());
    }

    #[test]
    fn test_load_sorts_and_dedups() {
        let data = "\
Date,Open,High,Low,Close,Volume
2024-01-03,11,12,10,11.5,300
2024-01-01,10,11,9,10.5,100
2024-01-02,10.5,11.5,10,11,200
2024-01-02,99,99,99,99,1
";
        let series =
            CsvDataSource::from_reader(data.as_bytes(), "TEST", Timeframe::Daily).unwrap();

        assert_eq!(series.len(), 3);
        assert_eq!(series.closes(), vec![10.5, 11.0, 11.5]);
        assert_eq!(series.symbol, "TEST");
    }

    #[test]
    fn test_lowercase_headers_without_volume() {
        let data = "timestamp,open,high,low,close\n1705312800,1,2,0.5,1.5\n";
        let series =
            CsvDataSource::from_reader(data.as_bytes(), "X", Timeframe::Hour1).unwrap();

        assert_eq!(series.len(), 1);
        assert_eq!(series.volumes(), vec![0.0]);
    }

    #[test]
    fn test_invalid_rows_skipped() {
        let data = "\
date,open,high,low,close,volume
2024-01-01,10,11,9,10,1
2024-01-02,10,9,11,10,1
2024-01-03,0,1,0,0,1
";
        let series =
            CsvDataSource::from_reader(data.as_bytes(), "X", Timeframe::Daily).unwrap();
        assert_eq!(series.len(), 1);
    }

    #[test]
    fn test_empty_file() {
        let data = "date,open,high,low,close,volume\n";
        assert!(matches!(
            CsvDataSource::from_reader(data.as_bytes(), "X", Timeframe::Daily),
            Err(DataError::NoDataAvailable)
        ));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            CsvDataSource::new("/definitely/not/here.csv"),
            Err(DataError::NoDataAvailable)
        ));
    }
}
