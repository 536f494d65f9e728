//! Configuration management.
//!
//! Settings come from a TOML file, then `BACKTEST__`-prefixed environment
//! variables (`BACKTEST__BACKTEST__INITIAL_CASH=5000` sets
//! `backtest.initial_cash`).

mod settings;

pub use settings::{
    AppConfig, AppSettings, BacktestSettings, LoggingConfig, PairSettings, StrategySettings,
};

use config::{Config, ConfigError, Environment, File};
use std::path::Path;
use thiserror::Error;

/// Errors raised while loading or rendering settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] ConfigError),

    #[error("Failed to render configuration: {0}")]
    Render(#[from] toml::ser::Error),

    #[error("Invalid configuration: {0}")]
    InvalidValue(String),
}

/// Load configuration from file and environment.
pub fn load_config(path: &Path) -> Result<AppConfig, SettingsError> {
    build(Some(path))
}

/// Load configuration from the environment alone, on top of the defaults.
pub fn load_env_config() -> Result<AppConfig, SettingsError> {
    build(None)
}

fn build(path: Option<&Path>) -> Result<AppConfig, SettingsError> {
    let mut builder = Config::builder();
    if let Some(path) = path {
        builder = builder.add_source(File::from(path).required(true));
    }
    let config = builder
        .add_source(
            Environment::with_prefix("BACKTEST")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    let app: AppConfig = config.try_deserialize()?;
    app.validate()?;
    Ok(app)
}
