//! List strategies command.

use anyhow::Result;
use backtest_strategies::StrategyRegistry;

use crate::cli::StrategiesArgs;

pub fn run(args: StrategiesArgs) -> Result<()> {
    let registry = StrategyRegistry::new();

    if args.json {
        let map: serde_json::Map<String, serde_json::Value> = registry
            .list()
            .into_iter()
            .map(|(key, info)| Ok((key.to_string(), serde_json::to_value(info)?)))
            .collect::<Result<_>>()?;
        println!("{}", serde_json::to_string_pretty(&map)?);
        return Ok(());
    }

    println!("Available Strategies");
    println!("═══════════════════════════════════════════════════════════");
    println!();

    for (key, info) in registry.list() {
        let mode = if info.pair { " (pair)" } else { "" };
        println!("  {} [{}]{}", info.name, key, mode);
        println!("  ───────────────────────────────────────────────────────");
        println!("  {}", info.description);
        println!("  defaults: {}", info.default_config);
        println!();
    }

    println!("Use `run --strategy <key>` or `pair` to select a strategy.");

    Ok(())
}
