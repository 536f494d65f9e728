//! CLI definitions.

pub mod commands;

use backtest_core::types::Timeframe;
use clap::{Parser, Subcommand, ValueEnum};
use rust_decimal::Decimal;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "backtest")]
#[command(author, version, about = "Bar-replay backtester for indicator-driven strategies")]
pub struct Cli {
    /// Configuration file path (defaults plus BACKTEST__* environment when unset)
    #[arg(short, long, env = "BACKTEST_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log level, overriding the configuration file
    #[arg(short, long)]
    pub log_level: Option<LogLevel>,

    /// Enable JSON log format
    #[arg(long)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

#[derive(Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Backtest a single-instrument strategy on a CSV file
    Run(RunArgs),
    /// Backtest the pair strategy on two CSV files
    Pair(PairArgs),
    /// List available strategies
    Strategies(StrategiesArgs),
    /// Validate configuration
    ValidateConfig(ValidateArgs),
}

#[derive(clap::Args)]
pub struct RunArgs {
    /// Data file (CSV)
    #[arg(short, long)]
    pub data: PathBuf,

    /// Strategy to backtest (defaults to strategy.name)
    #[arg(short, long)]
    pub strategy: Option<String>,

    /// Strategy parameters as JSON (defaults to strategy.params)
    #[arg(short, long)]
    pub params: Option<String>,

    /// Symbol name (defaults to the file stem)
    #[arg(long)]
    pub symbol: Option<String>,

    /// Bar interval, e.g. 1d or 1h
    #[arg(short, long)]
    pub timeframe: Option<Timeframe>,

    /// Initial cash
    #[arg(long)]
    pub cash: Option<Decimal>,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(clap::Args)]
pub struct PairArgs {
    /// Data file for leg A
    #[arg(long)]
    pub data_a: PathBuf,

    /// Data file for leg B
    #[arg(long)]
    pub data_b: PathBuf,

    /// Pair parameters as JSON (defaults to pair.params)
    #[arg(short, long)]
    pub params: Option<String>,

    /// Bar interval, e.g. 1d or 1h
    #[arg(short, long)]
    pub timeframe: Option<Timeframe>,

    /// Initial cash
    #[arg(long)]
    pub cash: Option<Decimal>,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(clap::Args)]
pub struct OutputArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub output: OutputFormat,

    /// Save the JSON report to file
    #[arg(long)]
    pub save: Option<PathBuf>,

    /// Save the equity curve as CSV
    #[arg(long)]
    pub equity_csv: Option<PathBuf>,
}

#[derive(clap::Args)]
pub struct StrategiesArgs {
    /// Print the registry as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(clap::Args)]
pub struct ValidateArgs {
    /// Print the effective configuration as TOML
    #[arg(long)]
    pub show: bool,
}
