use crate::curve_buffer::CurveBuffer;
use crate::field::ParticleField;
use crate::pool::EffectPool;
use crate::rand::ParticleRng;
use crate::settings::SimulationSettings;
use crate::spatial_hash::SpatialHashGrid;
use lumen_core::Vec3;

const SPARK_COLOR: [f32; 3] = [0.7, 0.85, 1.0];

/// A short arc between two nearby particles, frozen at spawn time
#[derive(Debug, Clone, Copy, Default)]
pub struct Spark {
    pub from: usize,
    pub to: usize,
    pub start: Vec3,
    pub control: Vec3,
    pub end: Vec3,
    pub remaining_life: f32,
}

pub struct SparkEffects {
    pool: EffectPool<Spark>,
    curves: CurveBuffer,
    scratch: Vec<usize>,
    spawned: u64,
    skipped: u64,
}

impl SparkEffects {
    pub fn new(settings: &SimulationSettings) -> Self {
        Self {
            pool: EffectPool::new(settings.spark_capacity),
            curves: CurveBuffer::new(settings.spark_capacity, settings.spark_segments),
            scratch: Vec::new(),
            spawned: 0,
            skipped: 0,
        }
    }

    /// One spawn attempt from a random particle. Returns how many sparks
    /// were created, counting chained ones.
    pub fn try_spawn(
        &mut self,
        field: &ParticleField,
        grid: &SpatialHashGrid,
        rng: &mut ParticleRng,
        settings: &SimulationSettings,
    ) -> usize {
        if field.len() < 2 {
            self.skipped += 1;
            return 0;
        }
        let origin = rng.index(field.len());
        self.spawn_from(origin, None, 0, field, grid, rng, settings)
    }

    /// Spawn a spark from `origin` to its nearest neighbor, then maybe chain
    /// onward from that neighbor. `exclude` stops a chain from bouncing back.
    #[allow(clippy::too_many_arguments)]
    pub fn spawn_from(
        &mut self,
        origin: usize,
        exclude: Option<usize>,
        depth: u32,
        field: &ParticleField,
        grid: &SpatialHashGrid,
        rng: &mut ParticleRng,
        settings: &SimulationSettings,
    ) -> usize {
        if depth >= settings.spark_max_depth {
            return 0;
        }

        let Some(target) = nearest_neighbor(
            grid,
            field,
            origin,
            exclude,
            settings.spark_max_distance,
            &mut self.scratch,
        ) else {
            self.skipped += 1;
            return 0;
        };

        let start = field.position(origin);
        let end = field.position(target);
        let offset = rng.in_sphere(settings.spark_offset);
        let Some((_, spark)) = self.pool.claim() else {
            self.skipped += 1;
            return 0;
        };
        *spark = Spark {
            from: origin,
            to: target,
            start,
            control: (start + end) * 0.5 + offset,
            end,
            remaining_life: settings.spark_life,
        };
        self.spawned += 1;

        let mut created = 1;
        if rng.chance(settings.spark_chain_probability) {
            created += self.spawn_from(target, Some(origin), depth + 1, field, grid, rng, settings);
        }
        created
    }

    /// Age live sparks, release expired ones, and rewrite the curve buffer
    pub fn update(&mut self, dt: f32, settings: &SimulationSettings) {
        let life = settings.spark_life.max(1e-3);
        for slot in 0..self.pool.capacity() {
            let Some(spark) = self.pool.get_mut(slot) else {
                if self.curves.is_drawn(slot) {
                    self.curves.clear_slot(slot);
                }
                continue;
            };

            spark.remaining_life -= dt;
            if spark.remaining_life <= 0.0 {
                self.pool.release(slot);
                self.curves.clear_slot(slot);
                continue;
            }

            let spark = *spark;
            let fade = (spark.remaining_life / life).clamp(0.0, 1.0);
            self.curves.write(slot, spark.start, spark.control, spark.end, |t| {
                // Brightest in the middle of the arc
                let alpha = fade * (1.0 - (2.0 * t - 1.0).abs() * 0.5);
                [SPARK_COLOR[0], SPARK_COLOR[1], SPARK_COLOR[2], alpha]
            });
        }
    }

    /// Drop every spark, e.g. after the particle field is reallocated
    pub fn reset(&mut self) {
        self.pool.clear();
        for slot in 0..self.curves.capacity() {
            self.curves.clear_slot(slot);
        }
    }

    pub fn live_count(&self) -> usize {
        self.pool.live_count()
    }

    pub fn capacity(&self) -> usize {
        self.pool.capacity()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &Spark)> {
        self.pool.iter_active()
    }

    pub fn curves(&self) -> &CurveBuffer {
        &self.curves
    }

    pub fn spawned(&self) -> u64 {
        self.spawned
    }

    pub fn skipped(&self) -> u64 {
        self.skipped
    }
}

/// Closest particle to `origin` among grid candidates, within `max_distance`
fn nearest_neighbor(
    grid: &SpatialHashGrid,
    field: &ParticleField,
    origin: usize,
    exclude: Option<usize>,
    max_distance: f32,
    scratch: &mut Vec<usize>,
) -> Option<usize> {
    grid.neighbors_into(origin, scratch);
    let p = field.position(origin);
    let mut best: Option<(usize, f32)> = None;
    for &j in scratch.iter() {
        if j == origin || Some(j) == exclude || j >= field.len() {
            continue;
        }
        let d = p.distance(field.position(j));
        if d < max_distance && best.map_or(true, |(_, bd)| d < bd) {
            best = Some((j, d));
        }
    }
    best.map(|(j, _)| j)
}
