//! Simulate command

use anyhow::{Context, Result};
use lumen_core::Viewport;
use lumen_particles::ShapeWeights;
use lumen_perf::{CapabilityProbe, StaticProbe, Tier, WgpuProbe};
use lumen_runtime::{FrameInputs, LumenSettings, Stats, Subsystem, SubsystemEvent};
use lumen_scene::SceneGraph;
use std::path::PathBuf;

pub struct SimulateArgs {
    pub frames: u32,
    pub fps: f64,
    pub tier: Option<Tier>,
    pub width: u32,
    pub height: u32,
    pub weights: [f32; 5],
    pub settings: Option<PathBuf>,
    pub gpu: bool,
}

pub fn run(args: SimulateArgs) -> Result<()> {
    let stats = simulate(&args)?;
    println!("{}", serde_json::to_string_pretty(&stats)?);
    Ok(())
}

fn simulate(args: &SimulateArgs) -> Result<Stats> {
    if args.fps <= 0.0 {
        anyhow::bail!("--fps must be positive, got {}", args.fps);
    }

    let mut settings = match &args.settings {
        Some(path) => LumenSettings::load(path)
            .with_context(|| format!("Failed to load settings from {}", path.display()))?,
        None => LumenSettings::default(),
    };
    if args.tier.is_some() {
        settings.host.forced_tier = args.tier;
    }

    let viewport = Viewport::new(args.width, args.height, settings.host.device_pixel_ratio);
    let mut probe: Box<dyn CapabilityProbe> = if args.gpu {
        Box::new(WgpuProbe::default())
    } else {
        Box::new(StaticProbe(None))
    };
    let mut subsystem = Subsystem::new(probe.as_mut(), settings, viewport);

    let inputs = FrameInputs {
        weights: ShapeWeights(args.weights),
        ..Default::default()
    };
    let mut scene = SceneGraph::new();
    let dt = 1.0 / args.fps;
    for _ in 0..args.frames {
        subsystem.update(dt, &inputs, &mut scene);
        for event in subsystem.drain_events() {
            if let SubsystemEvent::TierChanged { from, to, average_fps } = event {
                log::info!(
                    "Frame {}: {from} -> {to} at {average_fps:.1} fps",
                    subsystem.stats().frames
                );
            }
        }
    }

    let stats = subsystem.stats();
    subsystem.shutdown();
    Ok(stats)
}
