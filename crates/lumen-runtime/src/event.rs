//! Events published by the subsystem

use lumen_perf::Tier;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SubsystemEvent {
    /// The adaptive manager (or a host override) changed tier
    TierChanged {
        from: Tier,
        to: Tier,
        average_fps: f32,
    },
    /// Particle buffers were rebuilt
    ParticlesReallocated { count: usize, tier: Tier },
    /// No graphics context could be queried; running at `Low`
    CapabilityFallback,
}
