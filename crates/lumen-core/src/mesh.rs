//! Procedural mesh primitives (orb, globe)

use glam::Vec3;
use std::collections::HashMap;

/// Indexed triangle mesh data, backend-agnostic
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    pub positions: Vec<[f32; 3]>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Sphere centered on the vertex centroid enclosing every vertex.
    /// `None` for an empty mesh.
    pub fn bounding_sphere(&self) -> Option<(Vec3, f32)> {
        if self.positions.is_empty() {
            return None;
        }
        let sum: Vec3 = self.positions.iter().map(|p| Vec3::from_array(*p)).sum();
        let center = sum / self.positions.len() as f32;
        let radius = self
            .positions
            .iter()
            .map(|p| Vec3::from_array(*p).distance(center))
            .fold(0.0_f32, f32::max);
        Some((center, radius))
    }
}

/// Icosahedron subdivided `subdivisions` times, projected onto a sphere
pub fn icosphere(radius: f32, subdivisions: u32) -> MeshData {
    let t = (1.0 + 5.0_f32.sqrt()) / 2.0;
    let mut vertices: Vec<Vec3> = [
        [-1.0, t, 0.0],
        [1.0, t, 0.0],
        [-1.0, -t, 0.0],
        [1.0, -t, 0.0],
        [0.0, -1.0, t],
        [0.0, 1.0, t],
        [0.0, -1.0, -t],
        [0.0, 1.0, -t],
        [t, 0.0, -1.0],
        [t, 0.0, 1.0],
        [-t, 0.0, -1.0],
        [-t, 0.0, 1.0],
    ]
    .iter()
    .map(|p| Vec3::from_array(*p).normalize())
    .collect();

    let mut faces: Vec<[u32; 3]> = vec![
        [0, 11, 5],
        [0, 5, 1],
        [0, 1, 7],
        [0, 7, 10],
        [0, 10, 11],
        [1, 5, 9],
        [5, 11, 4],
        [11, 10, 2],
        [10, 7, 6],
        [7, 1, 8],
        [3, 9, 4],
        [3, 4, 2],
        [3, 2, 6],
        [3, 6, 8],
        [3, 8, 9],
        [4, 9, 5],
        [2, 4, 11],
        [6, 2, 10],
        [8, 6, 7],
        [9, 8, 1],
    ];

    for _ in 0..subdivisions {
        // Shared edges must reuse one midpoint vertex
        let mut midpoints: HashMap<(u32, u32), u32> = HashMap::new();
        let mut midpoint = |a: u32, b: u32, vertices: &mut Vec<Vec3>| -> u32 {
            let key = if a < b { (a, b) } else { (b, a) };
            *midpoints.entry(key).or_insert_with(|| {
                let mid = ((vertices[a as usize] + vertices[b as usize]) * 0.5).normalize();
                vertices.push(mid);
                (vertices.len() - 1) as u32
            })
        };

        let mut next = Vec::with_capacity(faces.len() * 4);
        for [a, b, c] in faces {
            let ab = midpoint(a, b, &mut vertices);
            let bc = midpoint(b, c, &mut vertices);
            let ca = midpoint(c, a, &mut vertices);
            next.push([a, ab, ca]);
            next.push([b, bc, ab]);
            next.push([c, ca, bc]);
            next.push([ab, bc, ca]);
        }
        faces = next;
    }

    MeshData {
        positions: vertices.iter().map(|v| (*v * radius).to_array()).collect(),
        indices: faces.into_iter().flatten().collect(),
    }
}

/// Latitude/longitude sphere with `segments` columns and `segments / 2` rows
pub fn uv_sphere(radius: f32, segments: u32) -> MeshData {
    let columns = segments.max(3);
    let rows = (segments / 2).max(2);

    let mut positions = Vec::with_capacity(((rows + 1) * (columns + 1)) as usize);
    for row in 0..=rows {
        let theta = row as f32 / rows as f32 * std::f32::consts::PI;
        let (sin_t, cos_t) = theta.sin_cos();
        for col in 0..=columns {
            let phi = col as f32 / columns as f32 * std::f32::consts::TAU;
            let (sin_p, cos_p) = phi.sin_cos();
            positions.push([radius * sin_t * cos_p, radius * cos_t, radius * sin_t * sin_p]);
        }
    }

    let stride = columns + 1;
    let mut indices = Vec::with_capacity((rows * columns * 6) as usize);
    for row in 0..rows {
        for col in 0..columns {
            let tl = row * stride + col;
            let tr = tl + 1;
            let bl = tl + stride;
            let br = bl + 1;
            indices.extend_from_slice(&[tl, bl, br, tl, br, tr]);
        }
    }

    MeshData { positions, indices }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn icosphere_vertex_counts() {
        assert_eq!(icosphere(1.0, 0).vertex_count(), 12);
        assert_eq!(icosphere(1.0, 0).triangle_count(), 20);
        assert_eq!(icosphere(1.0, 1).vertex_count(), 42);
        assert_eq!(icosphere(1.0, 2).vertex_count(), 162);
        assert_eq!(icosphere(1.0, 2).triangle_count(), 320);
    }

    #[test]
    fn icosphere_vertices_lie_on_sphere() {
        let mesh = icosphere(3.0, 1);
        for p in &mesh.positions {
            assert!((Vec3::from_array(*p).length() - 3.0).abs() < 1e-4);
        }
        for &i in &mesh.indices {
            assert!((i as usize) < mesh.vertex_count());
        }
    }

    #[test]
    fn uv_sphere_indices_in_range() {
        let mesh = uv_sphere(2.0, 16);
        assert_eq!(mesh.triangle_count(), 16 * 8 * 2);
        for &i in &mesh.indices {
            assert!((i as usize) < mesh.vertex_count());
        }
    }

    #[test]
    fn bounding_sphere_contains_vertices() {
        let mesh = uv_sphere(5.0, 12);
        let (center, radius) = mesh.bounding_sphere().unwrap();
        assert!(center.length() < 0.5);
        assert!(radius >= 4.99);
        assert!(MeshData::default().bounding_sphere().is_none());
    }
}
