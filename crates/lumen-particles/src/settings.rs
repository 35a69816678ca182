//! Simulation constants, loadable from the `[simulation]` settings table

use lumen_core::{LumenError, Result};
use serde::{Deserialize, Serialize};

/// A travelling plane wave contributing to particle acceleration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WaveSettings {
    /// Propagation direction (normalized on use)
    pub direction: [f32; 3],
    /// Angular frequency in radians per second
    pub frequency: f32,
    pub amplitude: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationSettings {
    // ── Integration ──
    /// Spring constant pulling particles toward their blended target
    pub k_form: f32,
    /// Per-step velocity multiplier
    pub damping: f32,
    /// Largest `dt` a single step will integrate
    pub max_step: f32,
    /// Rotation of the blended target about +Y, radians per second
    pub target_spin: f32,

    // ── Forces ──
    pub pointer_radius: f32,
    pub pointer_attraction: f32,
    pub pointer_swirl: f32,
    pub waves: Vec<WaveSettings>,
    /// Spring constant toward the paired partner particle
    pub pair_strength: f32,
    pub jitter: f32,

    // ── Sizing ──
    pub area_min_factor: f32,
    pub area_max_factor: f32,
    pub seed: u32,

    // ── Spatial hash ──
    pub cell_size: f32,
    /// Frames between grid rebuilds
    pub rebuild_interval: u32,

    // ── Effects ──
    /// Master switch for spark and chord spawning
    pub effects_enabled: bool,

    pub spark_capacity: usize,
    pub spark_threshold: f32,
    pub spark_attempts: u32,
    pub spark_max_distance: f32,
    pub spark_life: f32,
    pub spark_chain_probability: f32,
    pub spark_max_depth: u32,
    pub spark_segments: usize,
    pub spark_offset: f32,

    pub chord_capacity: usize,
    pub chord_threshold: f32,
    pub chord_attempts: u32,
    pub chord_min_rest: f32,
    pub chord_max_rest: f32,
    pub chord_life: f32,
    pub snap_stretch: f32,
    /// Distance beyond `snap_stretch * rest` tolerated before a chord snaps
    pub snap_slack: f32,
    pub chord_segments: usize,
    pub chord_bulge: f32,
    pub chord_bulge_gain: f32,
    pub chord_brightness: f32,
    pub chord_brightness_gain: f32,
    pub snap_flash: f32,

    pub link_count: usize,
    pub link_segments: usize,
    pub link_life: f32,
    pub link_wiggle: f32,
    pub link_wiggle_frequency: f32,
    pub anchor_radius: f32,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            k_form: 2.2,
            damping: 0.92,
            max_step: 0.1,
            target_spin: 0.05,

            pointer_radius: 4.0,
            pointer_attraction: 6.0,
            pointer_swirl: 4.0,
            waves: vec![
                WaveSettings {
                    direction: [1.0, 0.0, 0.0],
                    frequency: 0.7,
                    amplitude: 0.35,
                },
                WaveSettings {
                    direction: [0.0, 1.0, 0.0],
                    frequency: 1.1,
                    amplitude: 0.25,
                },
                WaveSettings {
                    direction: [0.577, 0.577, 0.577],
                    frequency: 0.45,
                    amplitude: 0.2,
                },
            ],
            pair_strength: 0.15,
            jitter: 0.25,

            area_min_factor: 0.35,
            area_max_factor: 1.0,
            seed: 0x1F2E_3D4C,

            cell_size: 2.0,
            rebuild_interval: 3,

            effects_enabled: true,

            spark_capacity: 64,
            spark_threshold: 0.3,
            spark_attempts: 2,
            spark_max_distance: 3.0,
            spark_life: 0.4,
            spark_chain_probability: 0.35,
            spark_max_depth: 3,
            spark_segments: 8,
            spark_offset: 0.6,

            chord_capacity: 48,
            chord_threshold: 0.3,
            chord_attempts: 1,
            chord_min_rest: 2.0,
            chord_max_rest: 12.0,
            chord_life: 6.0,
            snap_stretch: 1.75,
            snap_slack: 0.1,
            chord_segments: 16,
            chord_bulge: 0.15,
            chord_bulge_gain: 0.6,
            chord_brightness: 0.35,
            chord_brightness_gain: 0.9,
            snap_flash: 2.5,

            link_count: 12,
            link_segments: 12,
            link_life: 5.0,
            link_wiggle: 0.4,
            link_wiggle_frequency: 2.0,
            anchor_radius: 3.0,
        }
    }
}

fn in_range(field: &str, value: f32, min: f32, max: f32) -> Result<()> {
    if value.is_finite() && (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(LumenError::ValueOutOfRange {
            field: field.to_string(),
            min: f64::from(min),
            max: f64::from(max),
            value: f64::from(value),
        })
    }
}

fn positive(field: &str, value: f32) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(LumenError::ConfigError(format!("{field} must be positive, got {value}")))
    }
}

impl SimulationSettings {
    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<()> {
        positive("max_step", self.max_step)?;
        in_range("damping", self.damping, 0.0, 1.0)?;
        positive("cell_size", self.cell_size)?;
        if self.rebuild_interval == 0 {
            return Err(LumenError::ConfigError("rebuild_interval must be at least 1".into()));
        }

        positive("area_min_factor", self.area_min_factor)?;
        in_range("area_max_factor", self.area_max_factor, self.area_min_factor, f32::MAX)?;

        for (field, value) in [
            ("k_form", self.k_form),
            ("target_spin", self.target_spin),
            ("pointer_attraction", self.pointer_attraction),
            ("pointer_swirl", self.pointer_swirl),
            ("pair_strength", self.pair_strength),
            ("jitter", self.jitter),
        ] {
            if !value.is_finite() {
                return Err(LumenError::ConfigError(format!("{field} must be finite, got {value}")));
            }
        }
        in_range("pointer_radius", self.pointer_radius, 0.0, f32::MAX)?;
        for wave in &self.waves {
            if !wave.direction.iter().all(|c| c.is_finite())
                || !wave.frequency.is_finite()
                || !wave.amplitude.is_finite()
            {
                return Err(LumenError::ConfigError("wave parameters must be finite".into()));
            }
        }

        positive("spark_life", self.spark_life)?;
        in_range("spark_max_distance", self.spark_max_distance, 0.0, f32::MAX)?;
        in_range("spark_chain_probability", self.spark_chain_probability, 0.0, 1.0)?;

        positive("chord_min_rest", self.chord_min_rest)?;
        in_range("chord_max_rest", self.chord_max_rest, self.chord_min_rest, f32::MAX)?;
        positive("chord_life", self.chord_life)?;
        in_range("snap_stretch", self.snap_stretch, 1.0, f32::MAX)?;
        in_range("snap_slack", self.snap_slack, 0.0, f32::MAX)?;

        positive("link_life", self.link_life)?;
        positive("anchor_radius", self.anchor_radius)?;

        for (field, value) in [
            ("spark_segments", self.spark_segments),
            ("chord_segments", self.chord_segments),
            ("link_segments", self.link_segments),
        ] {
            if value == 0 {
                return Err(LumenError::ConfigError(format!("{field} must be at least 1")));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings_are_sane() {
        let s = SimulationSettings::default();
        assert!(s.damping > 0.0 && s.damping < 1.0);
        assert!(s.chord_min_rest < s.chord_max_rest);
        assert!(s.snap_stretch > 1.0);
        assert!(s.rebuild_interval >= 1);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let toml_str = r#"
damping = 0.8
snap_stretch = 2.0
effects_enabled = false
"#;
        let s: SimulationSettings = toml::from_str(toml_str).unwrap();
        assert!((s.damping - 0.8).abs() < 1e-6);
        assert!((s.snap_stretch - 2.0).abs() < 1e-6);
        assert!(!s.effects_enabled);
        assert_eq!(s.spark_capacity, SimulationSettings::default().spark_capacity);
        assert_eq!(s.waves.len(), 3);
    }

    #[test]
    fn defaults_validate() {
        assert!(SimulationSettings::default().validate().is_ok());
    }

    #[test]
    fn inverted_rest_bounds_are_rejected() {
        let s: SimulationSettings =
            toml::from_str("chord_min_rest = 12.0\nchord_max_rest = 2.0").unwrap();
        let err = s.validate().unwrap_err();
        assert!(err.to_string().contains("chord_max_rest"));
    }

    #[test]
    fn bad_step_and_probability_are_rejected() {
        for bad in [
            "max_step = -0.1",
            "max_step = nan",
            "max_step = 0.0",
            "spark_chain_probability = 1.5",
            "damping = 2.0",
            "area_min_factor = 1.0\narea_max_factor = 0.5",
            "rebuild_interval = 0",
            "snap_slack = -1.0",
        ] {
            let s: SimulationSettings = toml::from_str(bad).unwrap();
            assert!(s.validate().is_err(), "accepted: {bad}");
        }
    }

    #[test]
    fn waves_parse_from_array_of_tables() {
        let toml_str = r#"
[[waves]]
direction = [0, 0, 1]
frequency = 2
amplitude = 0.5
"#;
        let s: SimulationSettings = toml::from_str(toml_str).unwrap();
        assert_eq!(s.waves.len(), 1);
        assert_eq!(s.waves[0].direction, [0.0, 0.0, 1.0]);
        assert!((s.waves[0].frequency - 2.0).abs() < 1e-6);
    }
}
