//! The per-frame particle simulation

use crate::effects::{ChordEffects, EffectStats, LinkEffects, SparkEffects};
use crate::field::ParticleField;
use crate::instance::{pack_instances, ParticleInstance};
use crate::rand::ParticleRng;
use crate::settings::SimulationSettings;
use crate::shapes::{Shape, ShapeWeights, TargetShapes};
use crate::spatial_hash::SpatialHashGrid;
use lumen_core::{Quat, Vec3, Viewport};
use lumen_perf::PerformanceConfig;

/// 1/φ, spreads partner indices evenly over the field
const GOLDEN_CONJUGATE: f64 = 0.618_033_988_749_894_9;

const BASE_SIZE: f32 = 0.08;
const COOL: [f32; 3] = [0.35, 0.55, 1.0];
const WARM: [f32; 3] = [1.0, 0.75, 0.45];
/// Speed at which a particle is drawn fully warm
const HOT_SPEED: f32 = 4.0;

/// Most integration sub-steps a single `step` will run
pub const MAX_SUBSTEPS: u32 = 16;

/// Particle count for a tier and viewport: the tier's temporal budget scaled
/// by the viewport's area relative to 1080p, at least one.
pub fn particle_count_for(
    config: &PerformanceConfig,
    viewport: &Viewport,
    settings: &SimulationSettings,
) -> usize {
    let factor = viewport.area_factor(settings.area_min_factor, settings.area_max_factor);
    ((config.particle_counts.temporal as f32 * factor).round() as usize).max(1)
}

/// Coupling partner of particle `i`. Stable for a given count and never `i`
/// itself when `count > 1`.
pub fn partner_index(i: usize, count: usize) -> usize {
    if count < 2 {
        return 0;
    }
    let frac = (i as f64 * GOLDEN_CONJUGATE).fract();
    let j = ((frac * count as f64) as usize).min(count - 1);
    if j == i {
        (i + 1) % count
    } else {
        j
    }
}

pub struct ParticleSimulation {
    settings: SimulationSettings,
    config: PerformanceConfig,
    viewport: Viewport,
    field: ParticleField,
    targets: TargetShapes,
    /// Scratch accelerations, `xyz` per particle
    accel: Vec<f32>,
    grid: SpatialHashGrid,
    rng: ParticleRng,
    sparks: SparkEffects,
    chords: ChordEffects,
    links: LinkEffects,
    time: f32,
    frame: u64,
    reallocations: u64,
}

impl ParticleSimulation {
    pub fn new(settings: SimulationSettings, config: &PerformanceConfig, viewport: Viewport) -> Self {
        let mut sim = Self {
            grid: SpatialHashGrid::new(settings.cell_size),
            rng: ParticleRng::new(settings.seed),
            sparks: SparkEffects::new(&settings),
            chords: ChordEffects::new(&settings),
            links: LinkEffects::new(&settings, config.geometry_detail.orb_subdivision),
            field: ParticleField::new(0),
            targets: TargetShapes::generate(0, &mut ParticleRng::new(1)),
            accel: Vec::new(),
            config: *config,
            viewport,
            settings,
            time: 0.0,
            frame: 0,
            reallocations: 0,
        };
        sim.allocate();
        sim
    }

    /// Build fresh buffers for the current config and viewport
    fn allocate(&mut self) {
        let count = particle_count_for(&self.config, &self.viewport, &self.settings);
        let mut field = ParticleField::new(count);
        let targets = TargetShapes::generate(count, &mut self.rng);
        targets.seed_field(&mut field, Shape::Header, &mut self.rng);
        for i in 0..count {
            field.set_render_size(i, BASE_SIZE);
            field.set_color(i, [COOL[0], COOL[1], COOL[2], 1.0]);
        }

        self.field = field;
        self.targets = targets;
        self.accel = vec![0.0; count * 3];
        self.grid.rebuild(self.field.positions());
        self.sparks.reset();
        self.chords.reset();
        self.links
            .set_orb_subdivision(&self.settings, self.config.geometry_detail.orb_subdivision);
        self.reallocations += 1;

        log::info!(
            "Allocated {count} particles ({} tier, {}x{})",
            self.config.tier,
            self.viewport.width,
            self.viewport.height
        );
    }

    /// Adopt a new viewport. Reallocates only when the particle count changes.
    pub fn resize(&mut self, viewport: Viewport) -> bool {
        let count = particle_count_for(&self.config, &viewport, &self.settings);
        self.viewport = viewport;
        if count == self.field.len() {
            return false;
        }
        self.allocate();
        true
    }

    /// Adopt a new config. Reallocates when the tier or particle count changes.
    pub fn apply_config(&mut self, config: &PerformanceConfig) -> bool {
        let count = particle_count_for(config, &self.viewport, &self.settings);
        let tier_changed = config.tier != self.config.tier;
        self.config = *config;
        if !tier_changed && count == self.field.len() {
            return false;
        }
        self.allocate();
        true
    }

    /// Drop every buffer. The next `resize` or `apply_config` that changes
    /// the count allocates again.
    pub fn release(&mut self) {
        self.field = ParticleField::new(0);
        self.targets = TargetShapes::generate(0, &mut self.rng);
        self.accel = Vec::new();
        self.grid.rebuild(&[]);
        self.sparks.reset();
        self.chords.reset();
        self.links.reset();
    }

    /// Toggle spark and chord spawning. Live effects run out naturally.
    pub fn set_effects_enabled(&mut self, enabled: bool) {
        self.settings.effects_enabled = enabled;
    }

    /// Rotation applied to blended targets at the current time
    fn spin(&self) -> Quat {
        Quat::from_rotation_y(self.time * self.settings.target_spin)
    }

    /// Rendered target of particle `i`: the normalized blend, spun about +Y
    pub fn blended_target(&self, i: usize, weights: &ShapeWeights) -> Vec3 {
        self.spin() * self.targets.blend(i, weights)
    }

    /// Advance one frame.
    ///
    /// `dt` is integrated in sub-steps of at most `max_step`, up to
    /// `MAX_SUBSTEPS` of them; anything beyond that is dropped. Effects and
    /// the grid update once per call.
    pub fn step(&mut self, dt: f32, weights: &ShapeWeights, pointer: Option<Vec3>) {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        let max_step = self.settings.max_step;
        let chunk = if max_step > 0.0 && max_step.is_finite() { max_step } else { dt };
        let mut remaining = dt.min(chunk * MAX_SUBSTEPS as f32);
        if remaining < dt {
            log::trace!("Dropping {:.3}s of a {dt:.3}s step", dt - remaining);
        }
        let advanced = remaining;
        self.frame += 1;

        if self.field.is_empty() {
            self.time += advanced;
            return;
        }

        let interval = u64::from(self.settings.rebuild_interval.max(1));
        if (self.frame - 1) % interval == 0 {
            self.grid.rebuild(self.field.positions());
        }

        while remaining > 0.0 {
            let h = remaining.min(chunk);
            self.time += h;
            self.accumulate_forces(weights, pointer);
            self.integrate(h);
            remaining -= h;
        }
        self.shade();
        self.run_effects(advanced, weights);
    }

    /// First pass: accelerations from frame-start positions only
    fn accumulate_forces(&mut self, weights: &ShapeWeights, pointer: Option<Vec3>) {
        let s = &self.settings;
        let count = self.field.len();
        let t = self.time;
        let spin = self.spin();
        let springs = weights.sum() > 1e-6;
        let header = weights.get(Shape::Header);
        let pointer = pointer.filter(|_| header != 0.0);
        let waves: Vec<(Vec3, f32, f32)> = s
            .waves
            .iter()
            .map(|w| (Vec3::from_array(w.direction).normalize_or_zero(), w.frequency, w.amplitude))
            .collect();

        for i in 0..count {
            let p = self.field.position(i);
            let mut a = Vec3::ZERO;

            if springs {
                let target = spin * self.targets.blend(i, weights);
                a += (target - p) * s.k_form;
            }

            if let Some(ptr) = pointer {
                let to = ptr - p;
                let dist = to.length();
                if dist < s.pointer_radius && dist > 1e-6 {
                    let dir = to / dist;
                    let falloff = (1.0 - dist / s.pointer_radius) * header;
                    a += dir * s.pointer_attraction * falloff;
                    a += Vec3::Z.cross(dir) * s.pointer_swirl * falloff;
                }
            }

            for &(dir, frequency, amplitude) in &waves {
                a += dir * amplitude * (dir.dot(p) + frequency * t).cos();
            }

            if count > 1 && s.pair_strength != 0.0 {
                let j = partner_index(i, count);
                a += (self.field.position(j) - p) * s.pair_strength;
            }

            let ph = self.field.phase(i);
            a += Vec3::new(
                (ph + 1.3 * t).sin(),
                (1.7 * ph + 1.1 * t).cos(),
                (2.3 * ph + 0.9 * t).sin(),
            ) * s.jitter;

            a.write_to_slice(&mut self.accel[i * 3..i * 3 + 3]);
        }
    }

    /// Second pass: damped semi-implicit Euler
    fn integrate(&mut self, dt: f32) {
        let damping = self.settings.damping;
        for i in 0..self.field.len() {
            let a = Vec3::from_slice(&self.accel[i * 3..i * 3 + 3]);
            let v = (self.field.velocity(i) + a * dt) * damping;
            self.field.set_velocity(i, v);
            self.field.set_position(i, self.field.position(i) + v * dt);
        }
    }

    /// Recompute color and render size from phase, speed and time
    fn shade(&mut self) {
        let t = self.time;
        for i in 0..self.field.len() {
            let phase = self.field.phase(i);
            let speed = self.field.velocity(i).length();
            let heat = (speed / HOT_SPEED).min(1.0);
            let pulse = 0.5 * (1.0 + (phase + 1.5 * t).sin());

            self.field.set_color(
                i,
                [
                    COOL[0] + (WARM[0] - COOL[0]) * heat,
                    COOL[1] + (WARM[1] - COOL[1]) * heat,
                    COOL[2] + (WARM[2] - COOL[2]) * heat,
                    0.55 + 0.45 * pulse,
                ],
            );
            let size = BASE_SIZE * (0.6 + 0.4 * (phase + 2.0 * t).sin().abs()) * (1.0 + heat * 0.5);
            self.field.set_render_size(i, size);
        }
    }

    fn run_effects(&mut self, dt: f32, weights: &ShapeWeights) {
        let s = &self.settings;
        if s.effects_enabled && self.field.len() >= 2 {
            if weights.get(Shape::Slider) > s.spark_threshold {
                for _ in 0..s.spark_attempts {
                    self.sparks.try_spawn(&self.field, &self.grid, &mut self.rng, s);
                }
            }
            if weights.get(Shape::Dao) > s.chord_threshold {
                for _ in 0..s.chord_attempts {
                    self.chords.spawn(&self.field, &mut self.rng, s);
                }
            }
        }

        self.sparks.update(dt, s);
        self.chords.update(dt, &self.field, s);
        self.links.update(
            dt,
            self.time,
            weights.get(Shape::Header),
            &self.field,
            &mut self.rng,
            s,
        );
    }

    /// Pack the current field for instanced drawing
    pub fn pack_instances(&self, out: &mut Vec<ParticleInstance>) {
        pack_instances(&self.field, out);
    }

    pub fn effect_stats(&self) -> EffectStats {
        EffectStats {
            live_sparks: self.sparks.live_count(),
            live_chords: self.chords.live_count(),
            live_links: self.links.live_count(),
            sparks_spawned: self.sparks.spawned(),
            sparks_skipped: self.sparks.skipped(),
            chords_spawned: self.chords.spawned(),
            chords_skipped: self.chords.skipped(),
            chords_snapped: self.chords.snaps(),
            links_rebound: self.links.rebound(),
        }
    }

    pub fn particle_count(&self) -> usize {
        self.field.len()
    }

    pub fn field(&self) -> &ParticleField {
        &self.field
    }

    pub fn targets(&self) -> &TargetShapes {
        &self.targets
    }

    pub fn grid(&self) -> &SpatialHashGrid {
        &self.grid
    }

    pub fn sparks(&self) -> &SparkEffects {
        &self.sparks
    }

    pub fn chords(&self) -> &ChordEffects {
        &self.chords
    }

    pub fn links(&self) -> &LinkEffects {
        &self.links
    }

    pub fn config(&self) -> &PerformanceConfig {
        &self.config
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn settings(&self) -> &SimulationSettings {
        &self.settings
    }

    /// Simulated seconds since creation
    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Number of buffer allocations, including the initial one
    pub fn reallocations(&self) -> u64 {
        self.reallocations
    }
}
