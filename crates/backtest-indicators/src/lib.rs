//! Technical indicators for the backtester.
//!
//! Every indicator returns a series aligned with its input: entries inside the
//! warm-up window are `NaN`, and input that is too short for even one value
//! yields an all-`NaN` series instead of an error.
//!
//! - Moving averages (SMA, EMA)
//! - Momentum indicators (RSI, MACD, KDJ)
//! - Volatility indicators (ATR, Bollinger Bands, standard deviation, z-score)
//! - Price channels (rolling high / low)
//!
//! Window reductions go through the SIMD helpers in [`simd`].

pub mod channel;
pub mod momentum;
pub mod moving_average;
pub mod simd;
pub mod volatility;

pub use channel::{rolling_high, rolling_low, Donchian, DonchianOutput};
pub use momentum::{macd, rsi, stochastic_kdj, Kdj, KdjOutput, Macd, MacdOutput, Rsi};
pub use moving_average::{exponential_moving_average, moving_average, Ema, Sma};
pub use volatility::{
    average_true_range, bollinger_bands, rolling_std, zscore, Atr, BollingerBands,
    BollingerOutput, StdDev, ZScore,
};
