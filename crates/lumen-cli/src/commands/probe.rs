//! Probe command

use anyhow::Result;
use lumen_perf::{
    classify_tier, detect_capabilities, performance_config, CapabilityRecord, PerformanceConfig,
    Tier, WgpuProbe,
};
use serde::Serialize;

#[derive(Serialize)]
struct ProbeReport {
    capabilities: CapabilityRecord,
    tier: Tier,
    config: PerformanceConfig,
}

pub fn run(json: bool) -> Result<()> {
    let capabilities = detect_capabilities(&mut WgpuProbe::default());
    let tier = classify_tier(&capabilities);
    let report = ProbeReport {
        config: performance_config(tier),
        capabilities,
        tier,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let caps = &report.capabilities;
    if !caps.is_available() {
        println!("No graphics adapter available");
    }
    println!("Vendor:          {}", caps.vendor);
    println!("Renderer:        {}", caps.renderer);
    if !caps.driver.is_empty() {
        println!("Driver:          {}", caps.driver);
    }
    println!("Max texture:     {}", caps.max_texture_size);
    println!("Uniform vectors: {}", caps.max_vertex_uniform_vectors);
    println!("Float textures:  {}", caps.float_textures);
    println!();
    println!("Tier:            {}", report.tier);
    println!(
        "Particles:       {} temporal / {} network / {} background",
        report.config.particle_counts.temporal,
        report.config.particle_counts.network,
        report.config.particle_counts.background
    );
    println!("Pixel ratio cap: {}", report.config.pixel_density_cap);
    println!("Target FPS:      {}", report.config.target_frame_rate);
    Ok(())
}
