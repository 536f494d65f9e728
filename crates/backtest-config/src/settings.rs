//! Configuration structures.

use backtest_core::types::Timeframe;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::SettingsError;

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub app: AppSettings,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub backtest: BacktestSettings,
    #[serde(default)]
    pub strategy: StrategySettings,
    #[serde(default)]
    pub pair: PairSettings,
}

impl AppConfig {
    /// Check values that deserialize fine but cannot be used.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.backtest.initial_cash <= Decimal::ZERO {
            return Err(SettingsError::InvalidValue(
                "backtest.initial_cash must be positive".into(),
            ));
        }
        if !["trace", "debug", "info", "warn", "error"].contains(&self.logging.level.as_str()) {
            return Err(SettingsError::InvalidValue(format!(
                "unknown log level '{}'",
                self.logging.level
            )));
        }
        if !["pretty", "json"].contains(&self.logging.format.as_str()) {
            return Err(SettingsError::InvalidValue(format!(
                "unknown log format '{}'",
                self.logging.format
            )));
        }
        if self.strategy.name.trim().is_empty() {
            return Err(SettingsError::InvalidValue(
                "strategy.name must not be empty".into(),
            ));
        }
        if !self.strategy.params.is_object() || !self.pair.params.is_object() {
            return Err(SettingsError::InvalidValue(
                "strategy parameters must be a table".into(),
            ));
        }
        Ok(())
    }

    /// Render as TOML.
    pub fn to_toml(&self) -> Result<String, SettingsError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

/// General app settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    pub name: String,
    pub environment: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            name: "backtest".to_string(),
            environment: "development".to_string(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// `pretty` or `json`
    pub format: String,
    /// Optional log file; logs go to stderr when unset
    pub file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            file: None,
        }
    }
}

/// Backtest settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BacktestSettings {
    pub initial_cash: Decimal,
    /// Bar interval of the input data, used to annualize statistics
    pub timeframe: Timeframe,
}

impl Default for BacktestSettings {
    fn default() -> Self {
        use rust_decimal_macros::dec;
        Self {
            initial_cash: dec!(100000),
            timeframe: Timeframe::Daily,
        }
    }
}

/// Which strategy to run and with what parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategySettings {
    /// Registry key, e.g. `ma_crossover`
    pub name: String,
    /// Parameter table; missing keys take the strategy defaults
    pub params: serde_json::Value,
}

impl Default for StrategySettings {
    fn default() -> Self {
        Self {
            name: "ma_crossover".to_string(),
            params: serde_json::Value::Object(Default::default()),
        }
    }
}

/// Pair trading parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PairSettings {
    pub params: serde_json::Value,
}

impl Default for PairSettings {
    fn default() -> Self {
        Self {
            params: serde_json::Value::Object(Default::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_default_is_valid() {
        assert!(AppConfig::default().validate().is_ok());
    }

    #[test]
    fn test_toml_roundtrip() {
        let mut config = AppConfig::default();
        config.strategy.name = "rsi".into();
        config.strategy.params = serde_json::json!({ "period": 7 });

        let rendered = config.to_toml().unwrap();
        let parsed: AppConfig = toml::from_str(&rendered).unwrap();

        assert_eq!(parsed.strategy.name, "rsi");
        assert_eq!(parsed.strategy.params["period"], 7);
        assert_eq!(parsed.backtest.initial_cash, dec!(100000));
        assert_eq!(parsed.backtest.timeframe, Timeframe::Daily);
    }

    #[test]
    fn test_partial_sections_take_defaults() {
        let parsed: AppConfig = toml::from_str(
            r#"
            [backtest]
            initial_cash = 2500

            [strategy]
            name = "turtle"
            "#,
        )
        .unwrap();

        assert_eq!(parsed.backtest.initial_cash, dec!(2500));
        assert_eq!(parsed.logging.level, "info");
        assert!(parsed.strategy.params.as_object().unwrap().is_empty());
    }

    #[test]
    fn test_invalid_values() {
        let mut config = AppConfig::default();
        config.backtest.initial_cash = Decimal::ZERO;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.logging.format = "xml".into();
        assert!(config.validate().is_err());
    }
}
