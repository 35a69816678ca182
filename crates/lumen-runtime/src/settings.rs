//! TOML settings for the whole subsystem

use lumen_core::{LumenError, Result};
use lumen_particles::SimulationSettings;
use lumen_perf::{MonitorSettings, Tier};
use lumen_scene::MemorySettings;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Preferences supplied by the host environment
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostSettings {
    /// Start at `Low`, never adapt, and disable sparks and chords
    pub reduced_motion: bool,
    /// Start at this tier instead of the detected one
    pub forced_tier: Option<Tier>,
    pub device_pixel_ratio: f32,
}

impl Default for HostSettings {
    fn default() -> Self {
        Self {
            reduced_motion: false,
            forced_tier: None,
            device_pixel_ratio: 1.0,
        }
    }
}

/// Every tunable, one table per component. Missing keys keep their defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LumenSettings {
    pub monitor: MonitorSettings,
    pub simulation: SimulationSettings,
    pub memory: MemorySettings,
    pub host: HostSettings,
}

impl LumenSettings {
    /// Load settings from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parse and validate. Missing keys keep their defaults.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let settings: Self = toml::from_str(s)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reject values that would stall or break the frame loop
    pub fn validate(&self) -> Result<()> {
        self.simulation.validate()?;
        let monitor = &self.monitor;
        if !(monitor.window_ms.is_finite() && monitor.window_ms > 0.0) {
            return Err(LumenError::ConfigError(format!(
                "monitor.window_ms must be positive, got {}",
                monitor.window_ms
            )));
        }
        if !(self.host.device_pixel_ratio.is_finite() && self.host.device_pixel_ratio > 0.0) {
            return Err(LumenError::ConfigError(format!(
                "host.device_pixel_ratio must be positive, got {}",
                self.host.device_pixel_ratio
            )));
        }
        Ok(())
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// The tier to start at, given what the probe detected
    pub fn initial_tier(&self, detected: Tier) -> Tier {
        if self.host.reduced_motion {
            Tier::Low
        } else {
            self.host.forced_tier.unwrap_or(detected)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_is_all_defaults() {
        let settings = LumenSettings::from_toml_str("").unwrap();
        assert_eq!(settings, LumenSettings::default());
        assert!(settings.monitor.reset_history_on_transition);
        assert_eq!(settings.memory.max_geometries, 100);
    }

    #[test]
    fn tables_override_individual_fields() {
        let toml_str = r#"
[monitor]
reduce_below_fps = 25.0
history_capacity = 120

[simulation]
snap_stretch = 2.0
spark_capacity = 16

[memory]
max_textures = 8

[host]
reduced_motion = true
forced_tier = "medium"
device_pixel_ratio = 2.0
"#;
        let settings = LumenSettings::from_toml_str(toml_str).unwrap();
        assert!((settings.monitor.reduce_below_fps - 25.0).abs() < 1e-6);
        assert_eq!(settings.monitor.history_capacity, 120);
        assert_eq!(settings.monitor.reduce_min_samples, 10);
        assert!((settings.simulation.snap_stretch - 2.0).abs() < 1e-6);
        assert_eq!(settings.simulation.spark_capacity, 16);
        assert_eq!(settings.memory.max_textures, 8);
        assert_eq!(settings.memory.max_materials, 50);
        assert!(settings.host.reduced_motion);
        assert_eq!(settings.host.forced_tier, Some(Tier::Medium));
    }

    #[test]
    fn reduced_motion_wins_over_forced_tier() {
        let mut settings = LumenSettings::default();
        settings.host.forced_tier = Some(Tier::High);
        assert_eq!(settings.initial_tier(Tier::Medium), Tier::High);
        settings.host.reduced_motion = true;
        assert_eq!(settings.initial_tier(Tier::Medium), Tier::Low);
    }

    #[test]
    fn unknown_tier_is_a_parse_error() {
        let err = LumenSettings::from_toml_str("[host]\nforced_tier = \"ultra\"\n").unwrap_err();
        assert!(matches!(err, LumenError::TomlParseError(_)));
    }

    #[test]
    fn invalid_simulation_values_are_rejected() {
        let err = LumenSettings::from_toml_str(
            "[simulation]\nchord_min_rest = 12.0\nchord_max_rest = 2.0\n",
        )
        .unwrap_err();
        assert!(matches!(err, LumenError::ValueOutOfRange { .. }));

        let err = LumenSettings::from_toml_str("[simulation]\nmax_step = -0.5\n").unwrap_err();
        assert!(matches!(err, LumenError::ConfigError(_)));
    }

    #[test]
    fn invalid_monitor_and_host_values_are_rejected() {
        assert!(LumenSettings::from_toml_str("[monitor]\nwindow_ms = 0.0\n").is_err());
        assert!(LumenSettings::from_toml_str("[host]\ndevice_pixel_ratio = -1.0\n").is_err());
    }

    #[test]
    fn settings_round_trip_through_a_file() {
        let mut settings = LumenSettings::default();
        settings.simulation.damping = 0.85;
        settings.host.forced_tier = Some(Tier::Low);

        let path = std::env::temp_dir().join(format!("lumen-settings-{}.toml", std::process::id()));
        std::fs::write(&path, settings.to_toml_string().unwrap()).unwrap();
        let loaded = LumenSettings::load(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded, settings);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = LumenSettings::load("/nonexistent/lumen.toml").unwrap_err();
        assert!(matches!(err, LumenError::IoError(_)));
    }
}
