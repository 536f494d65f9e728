//! Strategy registry for building strategies by name.

use std::collections::BTreeMap;

use backtest_core::{error::StrategyError, traits::SignalGenerator};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::common::parse_config;
use crate::{
    BollingerConfig, BollingerStrategy, KdjConfig, KdjStrategy, MaCrossoverConfig,
    MaCrossoverStrategy, MacdCrossoverConfig, MacdCrossoverStrategy, MacdKdjConfig,
    MacdKdjStrategy, MeanReversionConfig, MeanReversionStrategy, PairTradingConfig,
    PairTradingStrategy, RsiConfig, RsiStrategy, Strategy, TurtleConfig, TurtleStrategy,
    VolatilityBreakoutConfig, VolatilityBreakoutStrategy,
};

/// Registry key of the pair strategy.
pub const PAIR_TRADING: &str = "pair_trading";

/// Information about a registered strategy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyInfo {
    /// Strategy name
    pub name: String,
    /// Strategy description
    pub description: String,
    /// Whether the strategy trades two instruments
    pub pair: bool,
    /// Default configuration as JSON
    pub default_config: serde_json::Value,
}

/// Registry for available trading strategies.
pub struct StrategyRegistry {
    strategies: BTreeMap<&'static str, StrategyInfo>,
}

impl StrategyRegistry {
    /// Create a new strategy registry with all built-in strategies.
    pub fn new() -> Self {
        let mut registry = Self {
            strategies: BTreeMap::new(),
        };

        registry.register(
            "ma_crossover",
            "MA Crossover",
            "Fast/slow moving average crossovers (SMA or EMA)",
            MaCrossoverConfig::default(),
        );
        registry.register(
            "macd_crossover",
            "MACD Crossover",
            "MACD line crossings of its signal line",
            MacdCrossoverConfig::default(),
        );
        registry.register("kdj", "KDJ", "Stochastic K crossing D", KdjConfig::default());
        registry.register(
            "rsi",
            "RSI Strategy",
            "RSI overbought/oversold threshold crossings",
            RsiConfig::default(),
        );
        registry.register(
            "bollinger",
            "Bollinger Bands",
            "Close breaking the lower/upper Bollinger band",
            BollingerConfig::default(),
        );
        registry.register(
            "macd_kdj",
            "MACD+KDJ",
            "MACD crossover confirmed by KDJ level or crossover",
            MacdKdjConfig::default(),
        );
        registry.register(
            "mean_reversion",
            "Mean Reversion",
            "Z-score of the close against its rolling mean",
            MeanReversionConfig::default(),
        );
        registry.register(
            "turtle",
            "Turtle",
            "Channel breakout with ATR sizing and pyramiding",
            TurtleConfig::default(),
        );
        registry.register(
            "volatility_breakout",
            "Volatility Breakout",
            "Close clearing the previous close by k ATRs",
            VolatilityBreakoutConfig::default(),
        );
        registry.register(
            PAIR_TRADING,
            "Pair Trading",
            "Z-score of the spread between two instruments",
            PairTradingConfig::default(),
        );

        registry
    }

    fn register<C: Serialize>(
        &mut self,
        key: &'static str,
        name: &str,
        description: &str,
        default_config: C,
    ) {
        self.strategies.insert(
            key,
            StrategyInfo {
                name: name.to_string(),
                description: description.to_string(),
                pair: key == PAIR_TRADING,
                default_config: serde_json::to_value(default_config).unwrap_or_default(),
            },
        );
    }

    /// List all available strategies, ordered by key.
    pub fn list(&self) -> Vec<(&str, &StrategyInfo)> {
        self.strategies.iter().map(|(k, v)| (*k, v)).collect()
    }

    /// Get strategy info by name.
    pub fn get(&self, name: &str) -> Option<&StrategyInfo> {
        self.strategies.get(name)
    }

    /// Check if a strategy exists.
    pub fn exists(&self, name: &str) -> bool {
        self.strategies.contains_key(name)
    }

    /// Get all strategy names.
    pub fn names(&self) -> Vec<&str> {
        self.strategies.keys().copied().collect()
    }

    /// Build a single-instrument strategy from a parameter map.
    ///
    /// Missing parameters take their defaults and unknown ones are ignored.
    pub fn create(&self, name: &str, params: serde_json::Value) -> Result<Strategy, StrategyError> {
        let strategy = match name {
            "ma_crossover" => Strategy::MaCrossover(MaCrossoverStrategy::new(parse_config(params)?)),
            "macd_crossover" => {
                Strategy::MacdCrossover(MacdCrossoverStrategy::new(parse_config(params)?))
            }
            "kdj" => Strategy::Kdj(KdjStrategy::new(parse_config(params)?)),
            "rsi" => Strategy::Rsi(RsiStrategy::new(parse_config(params)?)),
            "bollinger" => Strategy::Bollinger(BollingerStrategy::new(parse_config(params)?)),
            "macd_kdj" => Strategy::MacdKdj(MacdKdjStrategy::new(parse_config(params)?)),
            "mean_reversion" => {
                Strategy::MeanReversion(MeanReversionStrategy::new(parse_config(params)?))
            }
            "turtle" => Strategy::Turtle(TurtleStrategy::new(parse_config(params)?)),
            "volatility_breakout" => {
                Strategy::VolatilityBreakout(VolatilityBreakoutStrategy::new(parse_config(params)?))
            }
            PAIR_TRADING => {
                return Err(StrategyError::InvalidConfig(
                    "pair_trading needs two instruments; use create_pair".into(),
                ))
            }
            _ => return Err(StrategyError::NotFound(name.to_string())),
        };
        debug!(strategy = name, warmup = strategy.warmup_period(), "Strategy created");
        Ok(strategy)
    }

    /// Build the pair strategy from a parameter map.
    pub fn create_pair(&self, params: serde_json::Value) -> Result<PairTradingStrategy, StrategyError> {
        Ok(PairTradingStrategy::new(parse_config(params)?))
    }

    /// Create a strategy with default configuration.
    pub fn create_default(&self, name: &str) -> Result<Strategy, StrategyError> {
        self.create(name, serde_json::Value::Null)
    }
}

impl Default for StrategyRegistry {
    fn default() -> Self {
        Self::new()
    }
}
