//! The per-frame orchestrator

use crate::clock::FrameClock;
use crate::event::SubsystemEvent;
use crate::event_bus::EventBus;
use crate::settings::LumenSettings;
use crate::stats::Stats;
use lumen_core::mesh::MeshData;
use lumen_core::{Vec3, Viewport};
use lumen_particles::{ParticleSimulation, ShapeWeights};
use lumen_perf::{
    classify_tier, detect_capabilities, AdaptiveQualityManager, CapabilityProbe,
    CapabilityRecord, FrameRateMonitor, PerformanceConfig, SubscriptionId, Tier, TierChange,
};
use lumen_scene::{
    Camera, CullStats, FrustumCuller, LodEntry, LodManager, MemoryManager, NodeId,
    NoopDisposer, ResourceDisposer, SceneGraph,
};

/// Everything the host supplies each frame
#[derive(Debug, Clone, Default)]
pub struct FrameInputs {
    /// Shape blend weights from page/scroll state
    pub weights: ShapeWeights,
    /// Pointer position projected into world space, if any
    pub pointer: Option<Vec3>,
    pub camera: Camera,
}

/// What happened during one `update`
#[derive(Debug, Clone, Default)]
pub struct FrameReport {
    pub tier_change: Option<TierChange>,
    pub reallocated: bool,
    pub lod_changes: Vec<(NodeId, usize)>,
    pub culling: CullStats,
}

/// Owns every component and runs them in a fixed order each frame:
/// monitor, quality decision, simulation, LOD, culling.
pub struct Subsystem {
    settings: LumenSettings,
    capabilities: CapabilityRecord,
    detected_tier: Tier,
    quality: AdaptiveQualityManager,
    simulation: ParticleSimulation,
    lod: LodManager,
    culler: FrustumCuller,
    memory: MemoryManager,
    clock: FrameClock,
    events: EventBus<SubsystemEvent>,
    shut_down: bool,
}

impl Subsystem {
    pub fn new(probe: &mut dyn CapabilityProbe, settings: LumenSettings, viewport: Viewport) -> Self {
        Self::with_disposer(probe, settings, viewport, Box::new(NoopDisposer))
    }

    /// Probe once, pick the starting tier, and size every buffer for it
    pub fn with_disposer(
        probe: &mut dyn CapabilityProbe,
        settings: LumenSettings,
        viewport: Viewport,
        disposer: Box<dyn ResourceDisposer>,
    ) -> Self {
        let mut events = EventBus::new();

        let capabilities = detect_capabilities(probe);
        if !capabilities.is_available() {
            events.push(SubsystemEvent::CapabilityFallback);
        }
        let detected_tier = classify_tier(&capabilities);
        let initial = settings.initial_tier(detected_tier);
        log::info!("Detected {detected_tier} tier, starting at {initial}");

        let mut quality =
            AdaptiveQualityManager::new(initial, FrameRateMonitor::new(settings.monitor));
        let mut sim_settings = settings.simulation.clone();
        if settings.host.reduced_motion {
            quality.set_pinned(true);
            sim_settings.effects_enabled = false;
            log::info!("Reduced motion: quality pinned, sparks and chords disabled");
        }

        let config = quality.config();
        let simulation = ParticleSimulation::new(sim_settings, &config, viewport);
        events.push(SubsystemEvent::ParticlesReallocated {
            count: simulation.particle_count(),
            tier: config.tier,
        });

        let mut camera = Camera::default();
        camera.set_viewport(&viewport);

        Self {
            memory: MemoryManager::new(settings.memory, disposer),
            settings,
            capabilities,
            detected_tier,
            quality,
            simulation,
            lod: LodManager::new(),
            culler: FrustumCuller::new(&camera),
            clock: FrameClock::new(),
            events,
            shut_down: false,
        }
    }

    /// Run one frame. `dt` is the host-measured frame time in seconds.
    pub fn update(&mut self, dt: f64, inputs: &FrameInputs, scene: &mut SceneGraph) -> FrameReport {
        let mut report = FrameReport::default();
        if self.shut_down {
            return report;
        }

        let sim_dt = self.clock.advance(dt);

        report.tier_change = self.quality.update(self.clock.now_ms());
        if let Some(change) = report.tier_change {
            self.events.push(SubsystemEvent::TierChanged {
                from: change.from,
                to: change.to,
                average_fps: change.average_fps,
            });
        }

        // Same frame: the simulation sees the config chosen above
        report.reallocated = self.apply_current_config();
        self.simulation
            .step(sim_dt as f32, &inputs.weights, inputs.pointer);

        scene.update_world_transforms();
        report.lod_changes = self.lod.update(&inputs.camera, scene);
        self.culler.update(&inputs.camera);
        report.culling = self.culler.cull_scene(scene);

        log::trace!(
            "Frame {}: {:.1} fps, {} culled of {}",
            self.clock.frame(),
            self.quality.monitor().current_fps(),
            report.culling.culled,
            report.culling.tested
        );
        report
    }

    fn apply_current_config(&mut self) -> bool {
        let config = self.quality.config();
        if !self.simulation.apply_config(&config) {
            return false;
        }
        self.events.push(SubsystemEvent::ParticlesReallocated {
            count: self.simulation.particle_count(),
            tier: config.tier,
        });
        true
    }

    /// Adopt a new surface size
    pub fn resize(&mut self, viewport: Viewport) -> bool {
        if !self.simulation.resize(viewport) {
            return false;
        }
        self.events.push(SubsystemEvent::ParticlesReallocated {
            count: self.simulation.particle_count(),
            tier: self.quality.tier(),
        });
        true
    }

    /// Host override. Takes effect immediately, including reallocation.
    pub fn force_tier(&mut self, tier: Tier) -> Option<TierChange> {
        let change = self.quality.force_tier(tier)?;
        self.events.push(SubsystemEvent::TierChanged {
            from: change.from,
            to: change.to,
            average_fps: change.average_fps,
        });
        self.apply_current_config();
        Some(change)
    }

    /// Stop or resume automatic tier changes
    pub fn set_pinned(&mut self, pinned: bool) {
        self.quality.set_pinned(pinned);
    }

    pub fn on_config_change(&mut self, callback: Box<dyn FnMut(&PerformanceConfig)>) -> SubscriptionId {
        self.quality.on_config_change(callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.quality.unsubscribe(id)
    }

    /// Register a scene node for LOD selection
    pub fn register_lod(&mut self, id: NodeId, base: &MeshData, entry: LodEntry) {
        self.lod.register(id, base, entry);
    }

    pub fn drain_events(&mut self) -> Vec<SubsystemEvent> {
        self.events.drain()
    }

    pub fn performance_config(&self) -> PerformanceConfig {
        self.quality.config()
    }

    pub fn tier(&self) -> Tier {
        self.quality.tier()
    }

    pub fn detected_tier(&self) -> Tier {
        self.detected_tier
    }

    pub fn capabilities(&self) -> &CapabilityRecord {
        &self.capabilities
    }

    pub fn settings(&self) -> &LumenSettings {
        &self.settings
    }

    /// Pixel ratio the backend should render at
    pub fn pixel_ratio(&self) -> f32 {
        self.quality
            .config()
            .effective_pixel_ratio(self.simulation.viewport().device_pixel_ratio)
    }

    pub fn quality(&self) -> &AdaptiveQualityManager {
        &self.quality
    }

    pub fn simulation(&self) -> &ParticleSimulation {
        &self.simulation
    }

    pub fn lod(&self) -> &LodManager {
        &self.lod
    }

    pub fn memory(&self) -> &MemoryManager {
        &self.memory
    }

    pub fn memory_mut(&mut self) -> &mut MemoryManager {
        &mut self.memory
    }

    pub fn stats(&self) -> Stats {
        let monitor = self.quality.monitor();
        Stats {
            fps: monitor.current_fps(),
            average_fps: monitor.average_fps(),
            quality_level: self.quality.tier(),
            memory_usage: self.memory.memory_usage(),
            current_config: self.quality.config(),
            particle_count: self.simulation.particle_count(),
            effects: self.simulation.effect_stats(),
            frames: self.clock.frame(),
            transitions: self.quality.transitions(),
            suppressed_demotions: self.quality.suppressed_demotions(),
            suppressed_promotions: self.quality.suppressed_promotions(),
            culling: self.culler.last_stats(),
        }
    }

    /// Dispose cached resources and release particle buffers. Later
    /// `update` calls do nothing.
    pub fn shutdown(&mut self) {
        if self.shut_down {
            return;
        }
        let freed = self.memory.cleanup();
        self.simulation.release();
        self.shut_down = true;
        log::info!("Subsystem shut down ({freed} resources released)");
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down
    }
}
