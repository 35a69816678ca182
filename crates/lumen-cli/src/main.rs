//! Lumen CLI - headless access to the performance subsystem

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{config, probe, simulate};
use lumen_perf::Tier;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "lumen")]
#[command(about = "Adaptive rendering performance subsystem, headless", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Query the GPU and show the detected tier and its config
    Probe {
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Print the performance config for a tier
    Config {
        /// low, medium or high
        #[arg(value_parser = parse_tier)]
        tier: Tier,

        /// Output format (toml or json)
        #[arg(long, default_value = "toml")]
        format: String,
    },

    /// Drive the subsystem with synthetic frame times and print final stats
    Simulate {
        /// Number of frames to run
        #[arg(long, default_value = "600")]
        frames: u32,

        /// Simulated frame rate
        #[arg(long, default_value = "60")]
        fps: f64,

        /// Start at this tier instead of the detected one
        #[arg(long, value_parser = parse_tier)]
        tier: Option<Tier>,

        /// Viewport width in pixels
        #[arg(long, default_value = "1920")]
        width: u32,

        /// Viewport height in pixels
        #[arg(long, default_value = "1080")]
        height: u32,

        /// Shape weights (comma-separated header,slider,dao,lattice,ambient)
        #[arg(long, value_parser = parse_weights, default_value = "1,0,0,0,0")]
        weights: [f32; 5],

        /// Path to a TOML settings file
        #[arg(long)]
        settings: Option<PathBuf>,

        /// Probe the real GPU instead of running without a graphics context
        #[arg(long)]
        gpu: bool,
    },
}

fn parse_tier(s: &str) -> Result<Tier, String> {
    s.parse().map_err(|e| format!("{e}; valid values: low, medium, high"))
}

fn parse_weights(s: &str) -> Result<[f32; 5], String> {
    let parts: Vec<&str> = s.split(',').collect();
    if parts.len() != 5 {
        return Err(format!("expected 5 comma-separated values, got {}", parts.len()));
    }
    let mut weights = [0.0; 5];
    for (slot, part) in weights.iter_mut().zip(&parts) {
        *slot = part
            .trim()
            .parse()
            .map_err(|e| format!("invalid weight '{}': {}", part.trim(), e))?;
    }
    Ok(weights)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Probe { json } => probe::run(json),
        Commands::Config { tier, format } => config::run(tier, &format),
        Commands::Simulate {
            frames,
            fps,
            tier,
            width,
            height,
            weights,
            settings,
            gpu,
        } => simulate::run(simulate::SimulateArgs {
            frames,
            fps,
            tier,
            width,
            height,
            weights,
            settings,
            gpu,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn weights_parse() {
        assert_eq!(parse_weights("1, 0,0.5,0,0").unwrap(), [1.0, 0.0, 0.5, 0.0, 0.0]);
        assert!(parse_weights("1,0").is_err());
        assert!(parse_weights("1,0,x,0,0").is_err());
    }

    #[test]
    fn tier_parse() {
        assert_eq!(parse_tier("High").unwrap(), Tier::High);
        assert!(parse_tier("ultra").unwrap_err().contains("valid values"));
    }

    #[test]
    fn simulate_args_parse() {
        let cli = Cli::try_parse_from([
            "lumen", "simulate", "--frames", "10", "--fps", "20", "--tier", "medium",
        ])
        .unwrap();
        match cli.command {
            Commands::Simulate {
                frames, fps, tier, weights, ..
            } => {
                assert_eq!(frames, 10);
                assert!((fps - 20.0).abs() < 1e-9);
                assert_eq!(tier, Some(Tier::Medium));
                assert_eq!(weights, [1.0, 0.0, 0.0, 0.0, 0.0]);
            }
            _ => panic!("expected simulate"),
        }
    }
}
