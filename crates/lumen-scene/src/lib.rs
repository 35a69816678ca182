//! Lumen Scene - what to draw, and at what detail
//!
//! Provides the scene-side half of the performance pipeline:
//! - `Camera` with orbit controls and wgpu-style projection
//! - `SceneGraph` arena of nodes with world transforms and bounds
//! - `LodManager` for distance-driven geometry variants
//! - `FrustumCuller` writing per-node visibility
//! - `MemoryManager` with FIFO-bounded caches and recursive disposal

pub mod camera;
pub mod frustum;
pub mod graph;
pub mod lod;
pub mod memory;

pub use camera::Camera;
pub use frustum::{CullStats, Frustum, FrustumCuller, Plane};
pub use graph::{BoundingSphere, NodeId, SceneGraph, SceneNode};
pub use lod::{create_variant, LodEntry, LodLevel, LodManager, LodVariant, MaterialQuality};
pub use memory::{
    BoundedCache, MemoryManager, MemorySettings, MemoryUsage, NoopDisposer, ResourceDisposer,
    ResourceKind,
};
