//! Tier to tunables table

use crate::tier::Tier;
use serde::{Deserialize, Serialize};

/// Particle budgets for the three particle layers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticleCounts {
    pub temporal: u32,
    pub network: u32,
    pub background: u32,
}

/// Tessellation settings for procedural geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeometryDetail {
    pub orb_subdivision: u32,
    pub globe_segments: u32,
    pub arc_segments: u32,
}

/// Quality tunables for one tier.
///
/// This is a plain value: it is regenerated on every tier change and handed
/// out by copy, so consumers never observe a partially updated config.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PerformanceConfig {
    pub tier: Tier,
    pub pixel_density_cap: f32,
    pub target_frame_rate: u32,
    pub particle_counts: ParticleCounts,
    pub geometry_detail: GeometryDetail,
    pub shadows_enabled: bool,
    pub post_processing_enabled: bool,
}

impl PerformanceConfig {
    pub fn for_tier(tier: Tier) -> Self {
        performance_config(tier)
    }

    /// Device pixel ratio to render at, capped by the tier
    pub fn effective_pixel_ratio(&self, device_pixel_ratio: f32) -> f32 {
        device_pixel_ratio.min(self.pixel_density_cap)
    }

    /// Per-frame time budget in milliseconds
    pub fn frame_budget_ms(&self) -> f32 {
        1000.0 / self.target_frame_rate.max(1) as f32
    }
}

/// Pure tier to config table
pub fn performance_config(tier: Tier) -> PerformanceConfig {
    match tier {
        Tier::Low => PerformanceConfig {
            tier,
            pixel_density_cap: 1.0,
            target_frame_rate: 30,
            particle_counts: ParticleCounts {
                temporal: 800,
                network: 300,
                background: 150,
            },
            geometry_detail: GeometryDetail {
                orb_subdivision: 1,
                globe_segments: 24,
                arc_segments: 16,
            },
            shadows_enabled: false,
            post_processing_enabled: false,
        },
        Tier::Medium => PerformanceConfig {
            tier,
            pixel_density_cap: 1.5,
            target_frame_rate: 60,
            particle_counts: ParticleCounts {
                temporal: 2000,
                network: 800,
                background: 400,
            },
            geometry_detail: GeometryDetail {
                orb_subdivision: 2,
                globe_segments: 48,
                arc_segments: 32,
            },
            shadows_enabled: false,
            post_processing_enabled: true,
        },
        Tier::High => PerformanceConfig {
            tier,
            pixel_density_cap: 2.0,
            target_frame_rate: 60,
            particle_counts: ParticleCounts {
                temporal: 4000,
                network: 1500,
                background: 800,
            },
            geometry_detail: GeometryDetail {
                orb_subdivision: 3,
                globe_segments: 64,
                arc_segments: 64,
            },
            shadows_enabled: true,
            post_processing_enabled: true,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn budgets_grow_with_tier() {
        let low = performance_config(Tier::Low);
        let medium = performance_config(Tier::Medium);
        let high = performance_config(Tier::High);

        assert!(low.particle_counts.temporal < medium.particle_counts.temporal);
        assert!(medium.particle_counts.temporal < high.particle_counts.temporal);
        assert!(low.pixel_density_cap <= medium.pixel_density_cap);
        assert!(low.geometry_detail.globe_segments < high.geometry_detail.globe_segments);
        assert!(!low.shadows_enabled && !low.post_processing_enabled);
        assert!(high.shadows_enabled);
    }

    #[test]
    fn config_carries_its_tier() {
        for tier in Tier::ALL {
            assert_eq!(performance_config(tier).tier, tier);
        }
    }

    #[test]
    fn pixel_ratio_is_capped() {
        let low = performance_config(Tier::Low);
        assert_eq!(low.effective_pixel_ratio(3.0), 1.0);
        assert_eq!(low.effective_pixel_ratio(0.75), 0.75);
        let high = performance_config(Tier::High);
        assert_eq!(high.effective_pixel_ratio(1.5), 1.5);
    }

    #[test]
    fn frame_budget_matches_target() {
        assert!((performance_config(Tier::Low).frame_budget_ms() - 33.333).abs() < 0.01);
    }
}
