//! Lumen Perf - hardware tiering and the frame-rate feedback loop
//!
//! Provides the static and dynamic halves of quality selection:
//! - `detect_capabilities` / `CapabilityProbe` - one-shot GPU capability query
//! - `classify_tier` - renderer heuristics and limit thresholds to `Tier`
//! - `performance_config` - the tier to tunables table
//! - `FrameRateMonitor` - rolling FPS history with hysteresis predicates
//! - `AdaptiveQualityManager` - one-step tier demotion/promotion with subscribers

mod adaptive;
mod capability;
mod config;
mod monitor;
mod tier;

pub use adaptive::{AdaptiveQualityManager, SubscriptionId, TierChange};
pub use capability::{
    detect_capabilities, CapabilityProbe, CapabilityRecord, CapabilitySource, StaticProbe,
    WgpuProbe,
};
pub use config::{performance_config, GeometryDetail, ParticleCounts, PerformanceConfig};
pub use monitor::{FrameRateMonitor, MonitorSettings};
pub use tier::{classify_tier, Tier};
