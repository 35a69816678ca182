//! Point-in-time snapshot for hosts and the CLI

use lumen_particles::EffectStats;
use lumen_perf::{PerformanceConfig, Tier};
use lumen_scene::{CullStats, MemoryUsage};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct Stats {
    pub fps: f32,
    pub average_fps: f32,
    pub quality_level: Tier,
    pub memory_usage: MemoryUsage,
    pub current_config: PerformanceConfig,
    pub particle_count: usize,
    pub effects: EffectStats,
    pub frames: u64,
    pub transitions: u64,
    pub suppressed_demotions: u64,
    pub suppressed_promotions: u64,
    pub culling: CullStats,
}
