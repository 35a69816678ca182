//! Config command

use anyhow::Result;
use lumen_perf::{performance_config, Tier};

pub fn run(tier: Tier, format: &str) -> Result<()> {
    println!("{}", render(tier, format)?);
    Ok(())
}

fn render(tier: Tier, format: &str) -> Result<String> {
    let config = performance_config(tier);
    let output = match format {
        "toml" => toml::to_string_pretty(&config)?,
        "json" => serde_json::to_string_pretty(&config)?,
        _ => anyhow::bail!("Unknown format: {}", format),
    };
    Ok(output)
}
