//! Bounded resource caches and scene-object disposal

use crate::graph::{NodeId, SceneGraph};
use lumen_core::{ResourceId, Result};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Geometry,
    Material,
    Texture,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ResourceKind::Geometry => "geometry",
            ResourceKind::Material => "material",
            ResourceKind::Texture => "texture",
        })
    }
}

/// Releases backend resources. Implemented by the rendering backend.
pub trait ResourceDisposer {
    fn dispose(&mut self, kind: ResourceKind, id: ResourceId) -> Result<()>;
}

/// Disposer for hosts with no backend resources to free
pub struct NoopDisposer;

impl ResourceDisposer for NoopDisposer {
    fn dispose(&mut self, _kind: ResourceKind, _id: ResourceId) -> Result<()> {
        Ok(())
    }
}

/// Cache limits, the `[memory]` settings table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemorySettings {
    pub max_geometries: usize,
    pub max_materials: usize,
    pub max_textures: usize,
}

impl Default for MemorySettings {
    fn default() -> Self {
        Self {
            max_geometries: 100,
            max_materials: 50,
            max_textures: 50,
        }
    }
}

/// Keyed cache that evicts in insertion order once full
pub struct BoundedCache<V> {
    limit: usize,
    order: VecDeque<String>,
    entries: HashMap<String, V>,
}

impl<V> BoundedCache<V> {
    pub fn new(limit: usize) -> Self {
        Self {
            limit: limit.max(1),
            order: VecDeque::new(),
            entries: HashMap::new(),
        }
    }

    /// Insert or replace. Returns the entry pushed out: the previous value
    /// under `key`, or the oldest entry if the cache overflowed.
    pub fn insert(&mut self, key: impl Into<String>, value: V) -> Option<(String, V)> {
        let key = key.into();
        if let Some(old) = self.entries.insert(key.clone(), value) {
            return Some((key, old));
        }
        self.order.push_back(key);
        if self.order.len() > self.limit {
            let oldest = self.order.pop_front()?;
            let value = self.entries.remove(&oldest)?;
            return Some((oldest, value));
        }
        None
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        self.entries.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<V> {
        let value = self.entries.remove(key)?;
        self.order.retain(|k| k != key);
        Some(value)
    }

    /// Remove everything, oldest first
    pub fn drain(&mut self) -> Vec<(String, V)> {
        let mut out = Vec::with_capacity(self.order.len());
        while let Some(key) = self.order.pop_front() {
            if let Some(value) = self.entries.remove(&key) {
                out.push((key, value));
            }
        }
        out
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }
}

/// Snapshot of cache occupancy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MemoryUsage {
    pub geometries: usize,
    pub materials: usize,
    pub textures: usize,
    /// Resources disposed since creation
    pub disposed: u64,
}

/// Outcome of a single disposal attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Release {
    Freed,
    AlreadyDisposed,
    Failed,
}

impl Release {
    fn is_gone(self) -> bool {
        self != Release::Failed
    }
}

pub struct MemoryManager {
    geometries: BoundedCache<ResourceId>,
    materials: BoundedCache<ResourceId>,
    textures: BoundedCache<ResourceId>,
    disposer: Box<dyn ResourceDisposer>,
    /// Handles freed since the last `cleanup`, so shared handles are freed once
    disposed: HashSet<ResourceId>,
    disposed_total: u64,
    failures: u64,
}

impl MemoryManager {
    pub fn new(settings: MemorySettings, disposer: Box<dyn ResourceDisposer>) -> Self {
        Self {
            geometries: BoundedCache::new(settings.max_geometries),
            materials: BoundedCache::new(settings.max_materials),
            textures: BoundedCache::new(settings.max_textures),
            disposer,
            disposed: HashSet::new(),
            disposed_total: 0,
            failures: 0,
        }
    }

    fn cache_mut(&mut self, kind: ResourceKind) -> &mut BoundedCache<ResourceId> {
        match kind {
            ResourceKind::Geometry => &mut self.geometries,
            ResourceKind::Material => &mut self.materials,
            ResourceKind::Texture => &mut self.textures,
        }
    }

    fn cache(&self, kind: ResourceKind) -> &BoundedCache<ResourceId> {
        match kind {
            ResourceKind::Geometry => &self.geometries,
            ResourceKind::Material => &self.materials,
            ResourceKind::Texture => &self.textures,
        }
    }

    /// Cache a handle under `key`, disposing whatever it pushes out
    pub fn cache_resource(&mut self, kind: ResourceKind, key: impl Into<String>, id: ResourceId) {
        if let Some((evicted_key, evicted)) = self.cache_mut(kind).insert(key, id) {
            if evicted != id {
                log::debug!("Evicting {kind} '{evicted_key}' ({evicted})");
                self.dispose(kind, evicted);
            }
        }
    }

    pub fn cached(&self, kind: ResourceKind, key: &str) -> Option<ResourceId> {
        self.cache(kind).get(key).copied()
    }

    /// Dispose one handle. Returns false if it was already disposed or the
    /// backend failed; failures are logged and counted.
    pub fn dispose(&mut self, kind: ResourceKind, id: ResourceId) -> bool {
        self.release(kind, id) == Release::Freed
    }

    fn release(&mut self, kind: ResourceKind, id: ResourceId) -> Release {
        if self.disposed.contains(&id) {
            return Release::AlreadyDisposed;
        }
        match self.disposer.dispose(kind, id) {
            Ok(()) => {
                self.disposed.insert(id);
                self.disposed_total += 1;
                Release::Freed
            }
            Err(err) => {
                self.failures += 1;
                log::warn!("Failed to dispose {kind} {id}: {err}");
                Release::Failed
            }
        }
    }

    /// Dispose the geometry and material of `node` and all its descendants,
    /// then detach it from its parent. Returns the number of handles freed.
    ///
    /// Handles are cleared from a node only once the backend has released
    /// them, so a failed handle stays on its node and the next call retries
    /// it. Disposing a fully released object again frees nothing.
    pub fn dispose_object(&mut self, scene: &mut SceneGraph, node: NodeId) -> Result<usize> {
        let subtree = scene.subtree(node)?;

        let mut freed = 0;
        let mut pending = 0;
        for id in subtree {
            let (geometry, material) = {
                let n = scene.node(id)?;
                (n.geometry, n.material)
            };
            if let Some(g) = geometry {
                let outcome = self.release(ResourceKind::Geometry, g);
                freed += usize::from(outcome == Release::Freed);
                if outcome.is_gone() {
                    scene.node_mut(id)?.geometry = None;
                } else {
                    pending += 1;
                }
            }
            if let Some(m) = material {
                let outcome = self.release(ResourceKind::Material, m);
                freed += usize::from(outcome == Release::Freed);
                if outcome.is_gone() {
                    scene.node_mut(id)?.material = None;
                } else {
                    pending += 1;
                }
            }
        }
        scene.detach(node)?;
        if pending > 0 {
            log::warn!("Object {node}: {pending} resources still held after disposal");
        }
        log::debug!("Disposed object {node}: {freed} resources");
        Ok(freed)
    }

    /// Dispose every cached handle. Returns the number freed.
    ///
    /// Handles the backend fails to release go back into their cache for the
    /// next pass. Disposal history is forgotten once every cache is empty.
    pub fn cleanup(&mut self) -> usize {
        let mut freed = 0;
        for kind in [ResourceKind::Geometry, ResourceKind::Material, ResourceKind::Texture] {
            for (key, id) in self.cache_mut(kind).drain() {
                match self.release(kind, id) {
                    Release::Freed => freed += 1,
                    Release::AlreadyDisposed => {}
                    Release::Failed => {
                        self.cache_mut(kind).insert(key, id);
                    }
                }
            }
        }
        if freed > 0 {
            log::info!("Memory cleanup released {freed} resources");
        }
        if self.geometries.is_empty() && self.materials.is_empty() && self.textures.is_empty() {
            self.disposed.clear();
        }
        freed
    }

    pub fn memory_usage(&self) -> MemoryUsage {
        MemoryUsage {
            geometries: self.geometries.len(),
            materials: self.materials.len(),
            textures: self.textures.len(),
            disposed: self.disposed_total,
        }
    }

    pub fn failures(&self) -> u64 {
        self.failures
    }

    pub fn is_disposed(&self, id: ResourceId) -> bool {
        self.disposed.contains(&id)
    }

    /// Handles remembered as disposed, bounded by the last `cleanup`
    pub fn tracked_disposals(&self) -> usize {
        self.disposed.len()
    }
}
