//! Distance-based level-of-detail selection

use crate::camera::Camera;
use crate::graph::{NodeId, SceneGraph};
use lumen_core::mesh::MeshData;
use lumen_core::{LumenError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaterialQuality {
    Low,
    Medium,
    High,
}

/// One rung of an LOD ladder
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LodLevel {
    /// Camera distance from which this level applies
    pub distance: f32,
    /// Fraction of the base geometry kept, in (0, 1]
    pub complexity: f32,
    pub texture_resolution: u32,
    pub material_quality: MaterialQuality,
}

impl LodLevel {
    pub fn new(
        distance: f32,
        complexity: f32,
        texture_resolution: u32,
        material_quality: MaterialQuality,
    ) -> Self {
        Self {
            distance,
            complexity,
            texture_resolution,
            material_quality,
        }
    }
}

/// A validated LOD ladder, highest detail first
#[derive(Debug, Clone, PartialEq)]
pub struct LodEntry {
    levels: Vec<LodLevel>,
}

impl LodEntry {
    /// Thresholds must be strictly increasing and complexities in (0, 1]
    pub fn new(levels: Vec<LodLevel>) -> Result<Self> {
        if levels.is_empty() {
            return Err(LumenError::InvalidLod("at least one level is required".into()));
        }
        for pair in levels.windows(2) {
            if pair[1].distance <= pair[0].distance {
                return Err(LumenError::InvalidLod(format!(
                    "thresholds must increase ({} then {})",
                    pair[0].distance, pair[1].distance
                )));
            }
        }
        if let Some(bad) = levels
            .iter()
            .find(|l| !(l.complexity > 0.0 && l.complexity <= 1.0))
        {
            return Err(LumenError::InvalidLod(format!(
                "complexity {} outside (0, 1]",
                bad.complexity
            )));
        }
        Ok(Self { levels })
    }

    /// Three-level ladder used for the orb and globe
    pub fn standard() -> Self {
        Self {
            levels: vec![
                LodLevel::new(0.0, 1.0, 2048, MaterialQuality::High),
                LodLevel::new(25.0, 0.5, 1024, MaterialQuality::Medium),
                LodLevel::new(60.0, 0.25, 512, MaterialQuality::Low),
            ],
        }
    }

    pub fn levels(&self) -> &[LodLevel] {
        &self.levels
    }

    /// Last level whose threshold is at or below `distance`, 0 if none
    pub fn select_level(&self, distance: f32) -> usize {
        self.levels
            .iter()
            .rposition(|l| l.distance <= distance)
            .unwrap_or(0)
    }
}

/// Reduce `base` by keeping every Nth index, `N = round(1 / complexity)`.
///
/// This is index-stride decimation, not a quality-preserving simplifier:
/// it keeps the vertex buffer and drops triangles unevenly. The result is
/// truncated to whole triangles.
pub fn create_variant(base: &MeshData, complexity: f32) -> MeshData {
    let stride = if complexity > 0.0 {
        (1.0 / complexity).round().max(1.0) as usize
    } else {
        1
    };
    let mut indices: Vec<u32> = base.indices.iter().step_by(stride).copied().collect();
    indices.truncate(indices.len() - indices.len() % 3);
    MeshData {
        positions: base.positions.clone(),
        indices,
    }
}

/// Geometry and material parameters for one level of a registered object
#[derive(Debug, Clone)]
pub struct LodVariant {
    pub level: usize,
    pub mesh: MeshData,
    pub texture_resolution: u32,
    pub material_quality: MaterialQuality,
}

struct LodObject {
    entry: LodEntry,
    variants: Vec<LodVariant>,
    current: usize,
}

/// Tracks the active level of every registered scene node
#[derive(Default)]
pub struct LodManager {
    objects: BTreeMap<NodeId, LodObject>,
}

impl LodManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build one variant per level of `entry`. Starts at the highest detail.
    pub fn register(&mut self, id: NodeId, base: &MeshData, entry: LodEntry) {
        let variants = entry
            .levels()
            .iter()
            .enumerate()
            .map(|(level, l)| LodVariant {
                level,
                mesh: create_variant(base, l.complexity),
                texture_resolution: l.texture_resolution,
                material_quality: l.material_quality,
            })
            .collect();
        self.objects.insert(
            id,
            LodObject {
                entry,
                variants,
                current: 0,
            },
        );
    }

    pub fn unregister(&mut self, id: NodeId) -> bool {
        self.objects.remove(&id).is_some()
    }

    /// Re-select every object's level from its camera distance. Returns the
    /// objects whose level changed, with their new level.
    pub fn update(&mut self, camera: &Camera, scene: &SceneGraph) -> Vec<(NodeId, usize)> {
        let mut changed = Vec::new();
        for (id, object) in self.objects.iter_mut() {
            let Some(node) = scene.get(*id) else {
                continue;
            };
            let level = object
                .entry
                .select_level(camera.distance_to(node.world_position()));
            if level != object.current {
                log::trace!("LOD {id}: {} -> {level}", object.current);
                object.current = level;
                changed.push((*id, level));
            }
        }
        changed
    }

    pub fn current(&self, id: NodeId) -> Option<&LodVariant> {
        self.objects.get(&id).map(|o| &o.variants[o.current])
    }

    pub fn current_level(&self, id: NodeId) -> Option<usize> {
        self.objects.get(&id).map(|o| o.current)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumen_core::mesh::icosphere;
    use lumen_core::{Mat4, Vec3};

    #[test]
    fn select_level_boundaries() {
        let entry = LodEntry::standard();
        assert_eq!(entry.select_level(0.0), 0);
        assert_eq!(entry.select_level(24.9), 0);
        assert_eq!(entry.select_level(25.0), 1);
        assert_eq!(entry.select_level(59.0), 1);
        assert_eq!(entry.select_level(60.0), 2);
        assert_eq!(entry.select_level(10_000.0), 2);
    }

    #[test]
    fn below_first_threshold_is_level_zero() {
        let entry = LodEntry::new(vec![
            LodLevel::new(10.0, 1.0, 1024, MaterialQuality::High),
            LodLevel::new(20.0, 0.5, 512, MaterialQuality::Low),
        ])
        .unwrap();
        assert_eq!(entry.select_level(3.0), 0);
    }

    #[test]
    fn invalid_ladders_are_rejected() {
        assert!(matches!(LodEntry::new(vec![]), Err(LumenError::InvalidLod(_))));
        let unordered = vec![
            LodLevel::new(10.0, 1.0, 1024, MaterialQuality::High),
            LodLevel::new(10.0, 0.5, 512, MaterialQuality::Low),
        ];
        assert!(LodEntry::new(unordered).is_err());
        let zero = vec![LodLevel::new(0.0, 0.0, 1024, MaterialQuality::High)];
        assert!(LodEntry::new(zero).is_err());
    }

    #[test]
    fn variant_keeps_whole_triangles() {
        let base = icosphere(1.0, 2);
        let full = create_variant(&base, 1.0);
        assert_eq!(full.indices, base.indices);

        for complexity in [0.5, 0.3, 0.25, 0.1] {
            let variant = create_variant(&base, complexity);
            assert_eq!(variant.indices.len() % 3, 0);
            assert!(variant.indices.len() < base.indices.len());
            assert_eq!(variant.vertex_count(), base.vertex_count());
        }
    }

    #[test]
    fn manager_reports_level_changes() {
        let mut scene = SceneGraph::new();
        let orb = scene.add_node("orb");
        scene.update_world_transforms();

        let mut lod = LodManager::new();
        lod.register(orb, &icosphere(1.0, 2), LodEntry::standard());
        assert_eq!(lod.current_level(orb), Some(0));

        let mut camera = Camera::looking_at(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO);
        assert!(lod.update(&camera, &scene).is_empty());

        camera.position = Vec3::new(0.0, 0.0, 80.0);
        assert_eq!(lod.update(&camera, &scene), vec![(orb, 2)]);
        let variant = lod.current(orb).unwrap();
        assert_eq!(variant.material_quality, MaterialQuality::Low);
        assert_eq!(variant.texture_resolution, 512);

        // Moving the object, not the camera, also counts
        scene
            .set_local_transform(orb, Mat4::from_translation(Vec3::new(0.0, 0.0, 50.0)))
            .unwrap();
        scene.update_world_transforms();
        assert_eq!(lod.update(&camera, &scene), vec![(orb, 1)]);
    }
}
