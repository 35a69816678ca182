//! View-frustum extraction and sphere culling

use crate::camera::Camera;
use crate::graph::{SceneGraph, SceneNode};
use lumen_core::{Mat4, Vec3, Vec4};
use serde::Serialize;

/// Plane `normal · p + d = 0` with the normal pointing into the frustum
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    pub normal: Vec3,
    pub d: f32,
}

impl Plane {
    fn from_row(v: Vec4) -> Self {
        let normal = v.truncate();
        let len = normal.length();
        if len > 0.0 {
            Self {
                normal: normal / len,
                d: v.w / len,
            }
        } else {
            Self { normal, d: v.w }
        }
    }

    /// Signed distance, positive on the inside
    pub fn distance(&self, point: Vec3) -> f32 {
        self.normal.dot(point) + self.d
    }
}

/// Six planes: left, right, bottom, top, near, far
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frustum {
    planes: [Plane; 6],
}

impl Frustum {
    /// Gribb/Hartmann extraction for a 0..1 depth clip space
    pub fn from_view_projection(m: Mat4) -> Self {
        let (r0, r1, r2, r3) = (m.row(0), m.row(1), m.row(2), m.row(3));
        Self {
            planes: [
                Plane::from_row(r3 + r0),
                Plane::from_row(r3 - r0),
                Plane::from_row(r3 + r1),
                Plane::from_row(r3 - r1),
                Plane::from_row(r2),
                Plane::from_row(r3 - r2),
            ],
        }
    }

    pub fn planes(&self) -> &[Plane; 6] {
        &self.planes
    }

    pub fn contains_point(&self, point: Vec3) -> bool {
        self.planes.iter().all(|p| p.distance(point) >= 0.0)
    }

    /// True unless the sphere lies entirely outside some plane
    pub fn intersects_sphere(&self, center: Vec3, radius: f32) -> bool {
        self.planes.iter().all(|p| p.distance(center) >= -radius)
    }
}

/// Result of one `cull_scene` pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CullStats {
    pub tested: usize,
    pub culled: usize,
}

pub struct FrustumCuller {
    frustum: Frustum,
    last: CullStats,
}

impl Default for FrustumCuller {
    fn default() -> Self {
        Self::new(&Camera::default())
    }
}

impl FrustumCuller {
    pub fn new(camera: &Camera) -> Self {
        Self {
            frustum: Frustum::from_view_projection(camera.view_projection_matrix()),
            last: CullStats::default(),
        }
    }

    /// Re-extract planes from the camera's current view-projection
    pub fn update(&mut self, camera: &Camera) {
        self.frustum = Frustum::from_view_projection(camera.view_projection_matrix());
    }

    pub fn frustum(&self) -> &Frustum {
        &self.frustum
    }

    /// Test a node's world-space bounding sphere. Nodes without one are visible.
    pub fn is_visible(&self, node: &SceneNode) -> bool {
        let Some(sphere) = node.bounding_sphere else {
            return true;
        };
        let world = node.world_transform();
        let center = world.transform_point3(sphere.center);
        let scale = world
            .x_axis
            .truncate()
            .length()
            .max(world.y_axis.truncate().length())
            .max(world.z_axis.truncate().length());
        self.frustum.intersects_sphere(center, sphere.radius * scale)
    }

    /// Write every node's `visible` flag
    pub fn cull_scene(&mut self, scene: &mut SceneGraph) -> CullStats {
        let mut stats = CullStats::default();
        let ids: Vec<_> = scene.ids().collect();
        for id in ids {
            let Some(node) = scene.get_mut(id) else {
                continue;
            };
            let visible = self.is_visible(node);
            node.visible = visible;
            stats.tested += 1;
            if !visible {
                stats.culled += 1;
            }
        }
        self.last = stats;
        stats
    }

    pub fn last_stats(&self) -> CullStats {
        self.last
    }
}
