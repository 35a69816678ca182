//! Target shape buffers and the scroll-driven blend weights

use crate::field::ParticleField;
use crate::rand::ParticleRng;
use lumen_core::Vec3;
use std::f32::consts::TAU;

/// Golden angle in radians, spreads points evenly around a circle
const GOLDEN_ANGLE: f32 = 2.399_963_1;

/// The five visual states particles blend between
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// Header ring around the orb
    Header = 0,
    /// Tunnel behind the slider section
    Slider = 1,
    /// Concentric rings of the DAO section
    Dao = 2,
    Lattice = 3,
    /// Loose cloud used as a backdrop
    Ambient = 4,
}

impl Shape {
    pub const ALL: [Shape; 5] = [
        Shape::Header,
        Shape::Slider,
        Shape::Dao,
        Shape::Lattice,
        Shape::Ambient,
    ];
}

/// Blend weights, one per `Shape`, supplied by page/scroll state
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ShapeWeights(pub [f32; 5]);

impl ShapeWeights {
    /// All weight on a single shape
    pub fn only(shape: Shape) -> Self {
        let mut w = [0.0; 5];
        w[shape as usize] = 1.0;
        Self(w)
    }

    pub fn get(&self, shape: Shape) -> f32 {
        self.0[shape as usize]
    }

    pub fn sum(&self) -> f32 {
        self.0.iter().sum()
    }

    /// Divisor used to normalize the blend. Floored to 1 for a zero sum.
    pub fn denominator(&self) -> f32 {
        let sum = self.sum();
        if sum > 1e-6 {
            sum
        } else {
            1.0
        }
    }
}

/// Precomputed target position per particle for each shape
pub struct TargetShapes {
    buffers: [Vec<f32>; 5],
}

impl TargetShapes {
    pub fn generate(count: usize, rng: &mut ParticleRng) -> Self {
        Self {
            buffers: [
                header_ring(count, rng),
                slider_tunnel(count, rng),
                dao_rings(count, rng),
                lattice(count),
                ambient_cloud(count, rng),
            ],
        }
    }

    pub fn len(&self) -> usize {
        self.buffers[0].len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.buffers[0].is_empty()
    }

    #[inline]
    pub fn target(&self, shape: Shape, i: usize) -> Vec3 {
        Vec3::from_slice(&self.buffers[shape as usize][i * 3..i * 3 + 3])
    }

    /// Weighted combination of the five targets for particle `i`
    pub fn blend(&self, i: usize, weights: &ShapeWeights) -> Vec3 {
        let denom = weights.denominator();
        let mut sum = Vec3::ZERO;
        for shape in Shape::ALL {
            let w = weights.get(shape);
            if w != 0.0 {
                sum += self.target(shape, i) * w;
            }
        }
        sum / denom
    }

    /// Place every particle on the target of `shape` with a fresh phase
    pub fn seed_field(&self, field: &mut ParticleField, shape: Shape, rng: &mut ParticleRng) {
        for i in 0..field.len() {
            field.set_position(i, self.target(shape, i));
            field.set_phase(i, rng.range(0.0, TAU));
        }
    }
}

fn push(buf: &mut Vec<f32>, p: Vec3) {
    buf.extend_from_slice(&p.to_array());
}

fn header_ring(count: usize, rng: &mut ParticleRng) -> Vec<f32> {
    const MAJOR: f32 = 6.0;
    const MINOR: f32 = 0.6;
    let mut buf = Vec::with_capacity(count * 3);
    for i in 0..count {
        let theta = i as f32 / count as f32 * TAU;
        let phi = rng.range(0.0, TAU);
        let r = MINOR * rng.next_f32().sqrt();
        let ring = MAJOR + r * phi.cos();
        push(&mut buf, Vec3::new(ring * theta.cos(), ring * theta.sin(), r * phi.sin()));
    }
    buf
}

fn slider_tunnel(count: usize, rng: &mut ParticleRng) -> Vec<f32> {
    let mut buf = Vec::with_capacity(count * 3);
    for i in 0..count {
        let theta = i as f32 * GOLDEN_ANGLE;
        let depth = -30.0 + 35.0 * (i as f32 / count.max(1) as f32);
        let radius = 5.0 + rng.range(-0.25, 0.25);
        push(&mut buf, Vec3::new(radius * theta.cos(), radius * theta.sin(), depth));
    }
    buf
}

fn dao_rings(count: usize, rng: &mut ParticleRng) -> Vec<f32> {
    const RADII: [f32; 3] = [4.0, 7.0, 10.0];
    let mut buf = Vec::with_capacity(count * 3);
    for i in 0..count {
        let radius = RADII[i % RADII.len()] + rng.range(-0.15, 0.15);
        let theta = (i / RADII.len()) as f32 * GOLDEN_ANGLE;
        push(
            &mut buf,
            Vec3::new(radius * theta.cos(), radius * theta.sin(), rng.range(-0.3, 0.3)),
        );
    }
    buf
}

fn lattice(count: usize) -> Vec<f32> {
    const SPACING: f32 = 1.5;
    let side = (count as f32).cbrt().ceil().max(1.0) as usize;
    let offset = (side - 1) as f32 * SPACING * 0.5;
    let mut buf = Vec::with_capacity(count * 3);
    for i in 0..count {
        let x = (i % side) as f32;
        let y = ((i / side) % side) as f32;
        let z = (i / (side * side)) as f32;
        push(
            &mut buf,
            Vec3::new(x * SPACING - offset, y * SPACING - offset, z * SPACING - offset),
        );
    }
    buf
}

fn ambient_cloud(count: usize, rng: &mut ParticleRng) -> Vec<f32> {
    let mut buf = Vec::with_capacity(count * 3);
    for _ in 0..count {
        push(&mut buf, rng.in_sphere(16.0));
    }
    buf
}
