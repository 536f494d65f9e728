//! Signal generators for the backtester.
//!
//! Single-instrument strategies:
//! - Moving Average, MACD and KDJ crossovers
//! - RSI and Bollinger Band thresholds
//! - MACD+KDJ composite
//! - Z-score mean reversion
//! - Turtle and volatility breakouts
//!
//! plus Z-score pair trading on two instruments. [`StrategyRegistry`] builds
//! any of them by name from a JSON parameter map.

mod bollinger;
mod common;
mod kdj;
mod ma_crossover;
mod macd_crossover;
mod macd_kdj;
mod mean_reversion;
mod pair_trading;
mod registry;
mod rsi_strategy;
mod strategy;
mod turtle;
mod volatility_breakout;

pub use bollinger::{BollingerConfig, BollingerStrategy};
pub use kdj::{KdjConfig, KdjStrategy};
pub use ma_crossover::{MaCrossoverConfig, MaCrossoverStrategy};
pub use macd_crossover::{MacdCrossoverConfig, MacdCrossoverStrategy};
pub use macd_kdj::{MacdKdjConfig, MacdKdjStrategy};
pub use mean_reversion::{MeanReversionConfig, MeanReversionStrategy};
pub use pair_trading::{PairAction, PairSignal, PairTradingConfig, PairTradingStrategy, SpreadMode};
pub use registry::{StrategyInfo, StrategyRegistry, PAIR_TRADING};
pub use rsi_strategy::{RsiConfig, RsiStrategy};
pub use strategy::Strategy;
pub use turtle::{TurtleConfig, TurtleStrategy};
pub use volatility_breakout::{VolatilityBreakoutConfig, VolatilityBreakoutStrategy};
