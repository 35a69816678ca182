//! One-shot graphics capability probing

use lumen_core::{LumenError, Result};
use serde::{Deserialize, Serialize};

/// Where a capability record came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapabilitySource {
    /// Queried from a live graphics adapter
    #[default]
    Probed,
    /// No context could be obtained; the record is a placeholder
    Unavailable,
}

/// Device/driver identification and hard limits, captured once at startup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapabilityRecord {
    pub vendor: String,
    pub renderer: String,
    pub driver: String,
    pub max_texture_size: u32,
    pub max_vertex_uniform_vectors: u32,
    pub max_fragment_uniform_vectors: u32,
    pub float_textures: bool,
    pub instancing: bool,
    #[serde(default)]
    pub source: CapabilitySource,
}

impl CapabilityRecord {
    /// Placeholder used when no graphics context exists. Always classifies as `Low`.
    pub fn unavailable() -> Self {
        Self {
            vendor: String::from("unknown"),
            renderer: String::from("unavailable"),
            driver: String::new(),
            max_texture_size: 0,
            max_vertex_uniform_vectors: 0,
            max_fragment_uniform_vectors: 0,
            float_textures: false,
            instancing: false,
            source: CapabilitySource::Unavailable,
        }
    }

    pub fn is_available(&self) -> bool {
        self.source == CapabilitySource::Probed
    }
}

/// Something that can answer a capability query against the active backend
pub trait CapabilityProbe {
    /// Query the graphics context. `Err` means no usable context exists.
    fn query(&mut self) -> Result<CapabilityRecord>;
}

/// Run `probe` once. Failure is logged and mapped to `CapabilityRecord::unavailable`.
pub fn detect_capabilities(probe: &mut dyn CapabilityProbe) -> CapabilityRecord {
    match probe.query() {
        Ok(record) => {
            log::info!(
                "GPU: {} / {} (max texture {}, vertex uniforms {})",
                record.vendor,
                record.renderer,
                record.max_texture_size,
                record.max_vertex_uniform_vectors
            );
            record
        }
        Err(err) => {
            log::warn!("Capability detection failed, falling back to low tier: {err}");
            CapabilityRecord::unavailable()
        }
    }
}

/// A probe that returns a fixed record
pub struct StaticProbe(pub Option<CapabilityRecord>);

impl CapabilityProbe for StaticProbe {
    fn query(&mut self) -> Result<CapabilityRecord> {
        self.0
            .clone()
            .ok_or_else(|| LumenError::ContextUnavailable("no record supplied".into()))
    }
}

/// Queries a real adapter through wgpu
pub struct WgpuProbe {
    pub backends: wgpu::Backends,
    pub power_preference: wgpu::PowerPreference,
}

impl Default for WgpuProbe {
    fn default() -> Self {
        Self {
            backends: wgpu::Backends::all(),
            power_preference: wgpu::PowerPreference::HighPerformance,
        }
    }
}

impl CapabilityProbe for WgpuProbe {
    fn query(&mut self) -> Result<CapabilityRecord> {
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: self.backends,
            ..Default::default()
        });

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: self.power_preference,
            compatible_surface: None,
            force_fallback_adapter: false,
        }))
        .ok_or_else(|| LumenError::ContextUnavailable("no compatible adapter".into()))?;

        Ok(record_from_adapter(
            &adapter.get_info(),
            &adapter.limits(),
            adapter.features(),
        ))
    }
}

/// Map wgpu adapter data onto the backend-neutral record
fn record_from_adapter(
    info: &wgpu::AdapterInfo,
    limits: &wgpu::Limits,
    features: wgpu::Features,
) -> CapabilityRecord {
    // A vec4 uniform slot is 16 bytes
    let uniform_vectors = (limits.max_uniform_buffer_binding_size / 16).min(u16::MAX as u32);

    let renderer = if info.device_type == wgpu::DeviceType::Cpu {
        format!("{} (software)", info.name)
    } else {
        info.name.clone()
    };

    CapabilityRecord {
        vendor: vendor_name(info.vendor),
        renderer,
        driver: format!("{} {}", info.driver, info.driver_info)
            .trim()
            .to_string(),
        max_texture_size: limits.max_texture_dimension_2d,
        max_vertex_uniform_vectors: uniform_vectors,
        max_fragment_uniform_vectors: uniform_vectors,
        float_textures: features.contains(wgpu::Features::FLOAT32_FILTERABLE),
        instancing: true,
        source: CapabilitySource::Probed,
    }
}

/// PCI vendor id to a readable name
fn vendor_name(id: u32) -> String {
    match id {
        0x10DE => "NVIDIA".into(),
        0x1002 | 0x1022 => "AMD".into(),
        0x8086 => "Intel".into(),
        0x106B => "Apple".into(),
        0x5143 => "Qualcomm".into(),
        0x13B5 => "ARM".into(),
        0x1010 => "Imagination".into(),
        _ => format!("0x{id:04x}"),
    }
}
