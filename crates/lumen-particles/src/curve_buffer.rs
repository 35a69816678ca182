//! Per-slot quadratic Bézier polylines with per-vertex color

use lumen_core::curve::quadratic_bezier;
use lumen_core::Vec3;

/// Vertex storage for `capacity` curves of `segments + 1` vertices each.
///
/// Slot `k` owns vertices `k * vertices_per_curve ..`. Unused slots are
/// collapsed to the origin with zero alpha so a single draw call can cover
/// the whole buffer.
pub struct CurveBuffer {
    segments: usize,
    capacity: usize,
    positions: Vec<f32>,
    colors: Vec<f32>,
    drawn: Vec<bool>,
}

impl CurveBuffer {
    pub fn new(capacity: usize, segments: usize) -> Self {
        let segments = segments.max(1);
        let vertices = capacity * (segments + 1);
        Self {
            segments,
            capacity,
            positions: vec![0.0; vertices * 3],
            colors: vec![0.0; vertices * 4],
            drawn: vec![false; capacity],
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn segments(&self) -> usize {
        self.segments
    }

    pub fn vertices_per_curve(&self) -> usize {
        self.segments + 1
    }

    /// Write a curve whose color at parameter `t` is `color_at(t)`
    pub fn write(
        &mut self,
        slot: usize,
        start: Vec3,
        control: Vec3,
        end: Vec3,
        color_at: impl Fn(f32) -> [f32; 4],
    ) {
        let per = self.vertices_per_curve();
        let base = slot * per;
        for k in 0..per {
            let t = k as f32 / self.segments as f32;
            let v = base + k;
            quadratic_bezier(start, control, end, t).write_to_slice(&mut self.positions[v * 3..v * 3 + 3]);
            self.colors[v * 4..v * 4 + 4].copy_from_slice(&color_at(t));
        }
        self.drawn[slot] = true;
    }

    /// Collapse a slot's vertices
    pub fn clear_slot(&mut self, slot: usize) {
        let per = self.vertices_per_curve();
        let range = slot * per..(slot + 1) * per;
        self.positions[range.start * 3..range.end * 3].fill(0.0);
        self.colors[range.start * 4..range.end * 4].fill(0.0);
        self.drawn[slot] = false;
    }

    pub fn is_drawn(&self, slot: usize) -> bool {
        self.drawn[slot]
    }

    pub fn positions(&self) -> &[f32] {
        &self.positions
    }

    pub fn colors(&self) -> &[f32] {
        &self.colors
    }

    /// Colors belonging to one slot
    pub fn slot_colors(&self, slot: usize) -> &[f32] {
        let per = self.vertices_per_curve();
        &self.colors[slot * per * 4..(slot + 1) * per * 4]
    }

    /// Positions belonging to one slot
    pub fn slot_positions(&self, slot: usize) -> &[f32] {
        let per = self.vertices_per_curve();
        &self.positions[slot * per * 3..(slot + 1) * per * 3]
    }
}
