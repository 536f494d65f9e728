//! Core data types for the backtester.

mod frame;
mod ohlcv;
mod position;
mod signal;
mod timeframe;
mod trade;

pub use frame::IndicatorFrame;
pub use ohlcv::{Bar, BarSeries};
pub use position::{
    to_decimal, to_f64, PairPosition, Position, PositionView, SpreadDirection,
};
pub use signal::{OrderSize, Signal, SignalKind, SignalMetadata, SignalSet};
pub use timeframe::Timeframe;
pub use trade::{BacktestResult, EquityPoint, PairBacktestResult, PairTrade, Trade, TradeSide};
