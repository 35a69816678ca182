//! Capability record to performance tier classification

use crate::capability::CapabilityRecord;
use lumen_core::LumenError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Discrete performance tier, ordered from cheapest to richest
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Low,
    Medium,
    High,
}

impl Tier {
    pub const ALL: [Tier; 3] = [Tier::Low, Tier::Medium, Tier::High];

    /// One step down, or `None` at `Low`
    pub fn demoted(self) -> Option<Tier> {
        match self {
            Tier::High => Some(Tier::Medium),
            Tier::Medium => Some(Tier::Low),
            Tier::Low => None,
        }
    }

    /// One step up, or `None` at `High`
    pub fn promoted(self) -> Option<Tier> {
        match self {
            Tier::Low => Some(Tier::Medium),
            Tier::Medium => Some(Tier::High),
            Tier::High => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Tier::Low => "low",
            Tier::Medium => "medium",
            Tier::High => "high",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tier {
    type Err = LumenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Tier::Low),
            "medium" => Ok(Tier::Medium),
            "high" => Ok(Tier::High),
            other => Err(LumenError::UnknownTier(other.to_string())),
        }
    }
}

/// Software rasterizers are always low tier regardless of reported limits
const SOFTWARE_RENDERERS: &[&str] = &[
    "swiftshader",
    "llvmpipe",
    "softpipe",
    "software",
    "microsoft basic render",
];

const HIGH_END_RENDERERS: &[&str] = &[
    "rtx",
    "radeon rx 6",
    "radeon rx 7",
    "radeon rx 9",
    "apple m1",
    "apple m2",
    "apple m3",
    "apple m4",
    "gtx 1080",
    "quadro",
    "radeon pro",
];

const MEDIUM_END_RENDERERS: &[&str] = &[
    "gtx",
    "radeon",
    "iris",
    "intel arc",
    "arc(tm)",
    "adreno 6",
    "adreno 7",
    "mali-g7",
    "apple gpu",
    "apple a1",
];

/// Classify a capability record. Pure and deterministic.
pub fn classify_tier(record: &CapabilityRecord) -> Tier {
    if !record.is_available() {
        return Tier::Low;
    }

    let renderer = record.renderer.to_ascii_lowercase();
    let matches = |list: &[&str]| list.iter().any(|needle| renderer.contains(needle));

    if matches(SOFTWARE_RENDERERS) {
        return Tier::Low;
    }
    if matches(HIGH_END_RENDERERS) {
        return Tier::High;
    }
    if matches(MEDIUM_END_RENDERERS) {
        return Tier::Medium;
    }

    match (record.max_texture_size, record.max_vertex_uniform_vectors) {
        (tex, uniforms) if tex >= 16384 && uniforms >= 1024 => Tier::High,
        (tex, uniforms) if tex >= 8192 && uniforms >= 512 => Tier::Medium,
        _ => Tier::Low,
    }
}
