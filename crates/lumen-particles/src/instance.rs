//! GPU instance packing

use crate::field::ParticleField;
use bytemuck::{Pod, Zeroable};

/// GPU instance data, matches the WGSL `ParticleInstance` struct.
/// 48 bytes, 16-byte aligned (3 rows of vec4).
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct ParticleInstance {
    pub pos_size: [f32; 4],    // xyz = position, w = render size
    pub color: [f32; 4],       // rgba
    pub motion: [f32; 4],      // xyz = velocity, w = phase
}

impl ParticleInstance {
    pub fn from_field(field: &ParticleField, i: usize) -> Self {
        let p = field.position(i);
        let v = field.velocity(i);
        Self {
            pos_size: [p.x, p.y, p.z, field.render_size(i)],
            color: field.color(i),
            motion: [v.x, v.y, v.z, field.phase(i)],
        }
    }
}

/// Repack every particle into `out`, reusing its allocation
pub fn pack_instances(field: &ParticleField, out: &mut Vec<ParticleInstance>) {
    out.clear();
    out.extend((0..field.len()).map(|i| ParticleInstance::from_field(field, i)));
}
