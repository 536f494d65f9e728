//! CLI command implementations.

pub mod pair;
pub mod run;
pub mod strategies;
pub mod validate;

use anyhow::{Context, Result};
use std::path::Path;
use tracing::info;

use crate::cli::{OutputArgs, OutputFormat};

/// Print a report and write the requested files.
fn emit(output: &OutputArgs, summary: String, json: String, equity_csv: String) -> Result<()> {
    match output.output {
        OutputFormat::Json => println!("{}", json),
        OutputFormat::Text => println!("{}", summary),
    }

    if let Some(path) = &output.save {
        write(path, &json)?;
        info!("Results saved to {:?}", path);
    }
    if let Some(path) = &output.equity_csv {
        write(path, &equity_csv)?;
        info!("Equity curve saved to {:?}", path);
    }
    Ok(())
}

fn write(path: &Path, contents: &str) -> Result<()> {
    std::fs::write(path, contents).with_context(|| format!("Failed to write {}", path.display()))
}

/// Parse `--params`, falling back to the configured table.
fn params(raw: Option<&str>, configured: &serde_json::Value) -> Result<serde_json::Value> {
    match raw {
        Some(raw) => serde_json::from_str(raw).context("--params is not valid JSON"),
        None => Ok(configured.clone()),
    }
}

/// Symbol name from a data file path.
fn symbol_from_path(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_uppercase())
        .unwrap_or_else(|| "DATA".to_string())
}
