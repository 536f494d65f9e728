//! Core types and traits for the backtester.
//!
//! This crate provides the foundational building blocks including:
//! - Market data types (Bar, BarSeries)
//! - Signals, trades, positions and the finished backtest result
//! - The indicator and signal-generator traits shared by the other crates

pub mod types;
pub mod traits;
pub mod error;

pub use error::{BacktestError, CoreResult};
pub use types::*;
pub use traits::*;
