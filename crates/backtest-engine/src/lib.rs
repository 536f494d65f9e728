//! Backtesting engine.
//!
//! [`BacktestEngine`] replays one bar series through any
//! [`SignalGenerator`](backtest_core::traits::SignalGenerator) against a
//! [`PositionLedger`]; [`PairBacktestEngine`] does the same for two
//! instruments traded as a spread.

mod engine;
mod ledger;
mod pair;
mod report;
mod statistics;

pub use engine::{BacktestConfig, BacktestEngine};
pub use ledger::{LedgerOutcome, PositionLedger, RejectReason};
pub use pair::{align, AlignedPair, PairBacktestEngine};
pub use report::{BacktestReport, PairBacktestReport};
pub use statistics::BacktestStats;
