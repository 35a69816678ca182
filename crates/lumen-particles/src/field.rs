//! Structure-of-arrays particle storage

use lumen_core::Vec3;

/// Per-particle state in parallel flat arrays.
///
/// Vectors are stored as consecutive `xyz` triples and colors as `rgba`
/// quads so the slices can be uploaded to the GPU as-is. The particle count
/// is fixed for the lifetime of a field; resizing means building a new one.
pub struct ParticleField {
    count: usize,
    positions: Vec<f32>,
    velocities: Vec<f32>,
    phases: Vec<f32>,
    sizes: Vec<f32>,
    colors: Vec<f32>,
}

impl ParticleField {
    pub fn new(count: usize) -> Self {
        Self {
            count,
            positions: vec![0.0; count * 3],
            velocities: vec![0.0; count * 3],
            phases: vec![0.0; count],
            sizes: vec![1.0; count],
            colors: vec![1.0; count * 4],
        }
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    #[inline]
    pub fn position(&self, i: usize) -> Vec3 {
        Vec3::from_slice(&self.positions[i * 3..i * 3 + 3])
    }

    #[inline]
    pub fn set_position(&mut self, i: usize, p: Vec3) {
        p.write_to_slice(&mut self.positions[i * 3..i * 3 + 3]);
    }

    #[inline]
    pub fn velocity(&self, i: usize) -> Vec3 {
        Vec3::from_slice(&self.velocities[i * 3..i * 3 + 3])
    }

    #[inline]
    pub fn set_velocity(&mut self, i: usize, v: Vec3) {
        v.write_to_slice(&mut self.velocities[i * 3..i * 3 + 3]);
    }

    #[inline]
    pub fn phase(&self, i: usize) -> f32 {
        self.phases[i]
    }

    pub fn set_phase(&mut self, i: usize, phase: f32) {
        self.phases[i] = phase;
    }

    #[inline]
    pub fn render_size(&self, i: usize) -> f32 {
        self.sizes[i]
    }

    pub fn set_render_size(&mut self, i: usize, size: f32) {
        self.sizes[i] = size;
    }

    pub fn color(&self, i: usize) -> [f32; 4] {
        let c = &self.colors[i * 4..i * 4 + 4];
        [c[0], c[1], c[2], c[3]]
    }

    pub fn set_color(&mut self, i: usize, color: [f32; 4]) {
        self.colors[i * 4..i * 4 + 4].copy_from_slice(&color);
    }

    /// Flat `xyz` positions
    pub fn positions(&self) -> &[f32] {
        &self.positions
    }

    pub fn velocities(&self) -> &[f32] {
        &self.velocities
    }

    /// Flat `rgba` colors
    pub fn colors(&self) -> &[f32] {
        &self.colors
    }

    pub fn sizes(&self) -> &[f32] {
        &self.sizes
    }

    pub fn phases(&self) -> &[f32] {
        &self.phases
    }

    /// Read-only view of one particle
    pub fn view(&self, index: usize) -> ParticleView<'_> {
        ParticleView { field: self, index }
    }

    pub fn iter(&self) -> impl Iterator<Item = ParticleView<'_>> {
        (0..self.count).map(move |index| self.view(index))
    }
}

/// Borrowed accessor for a single particle in a `ParticleField`
#[derive(Clone, Copy)]
pub struct ParticleView<'a> {
    field: &'a ParticleField,
    index: usize,
}

impl ParticleView<'_> {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn position(&self) -> Vec3 {
        self.field.position(self.index)
    }

    pub fn velocity(&self) -> Vec3 {
        self.field.velocity(self.index)
    }

    pub fn phase(&self) -> f32 {
        self.field.phase(self.index)
    }

    pub fn render_size(&self) -> f32 {
        self.field.render_size(self.index)
    }
}
