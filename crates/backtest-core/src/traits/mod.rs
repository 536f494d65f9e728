//! Core traits for the backtester.

mod indicator;
mod strategy;

pub use indicator::{Indicator, MultiOutputIndicator, OhlcvIndicator};
pub use strategy::{BarContext, SignalGenerator, StrategyConfig};
