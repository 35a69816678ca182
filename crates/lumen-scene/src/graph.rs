//! Arena-backed scene graph of renderable nodes

use lumen_core::{LumenError, Mat4, ResourceId, Result, Vec3};
use serde::Serialize;
use std::fmt;

/// Index of a node in a `SceneGraph`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(u32);

impl NodeId {
    pub fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Object-space bounding sphere
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingSphere {
    pub center: Vec3,
    pub radius: f32,
}

impl BoundingSphere {
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius }
    }
}

pub struct SceneNode {
    pub name: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    /// Transform relative to the parent
    pub local: Mat4,
    world: Mat4,
    pub geometry: Option<ResourceId>,
    pub material: Option<ResourceId>,
    pub bounding_sphere: Option<BoundingSphere>,
    /// Written by the frustum culler every frame
    pub visible: bool,
}

impl SceneNode {
    fn new(name: String, parent: Option<NodeId>) -> Self {
        Self {
            name,
            parent,
            children: Vec::new(),
            local: Mat4::IDENTITY,
            world: Mat4::IDENTITY,
            geometry: None,
            material: None,
            bounding_sphere: None,
            visible: true,
        }
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// World transform as of the last `update_world_transforms`
    pub fn world_transform(&self) -> Mat4 {
        self.world
    }

    pub fn world_position(&self) -> Vec3 {
        self.world.w_axis.truncate()
    }
}

#[derive(Default)]
pub struct SceneGraph {
    nodes: Vec<SceneNode>,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a root node
    pub fn add_node(&mut self, name: impl Into<String>) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(SceneNode::new(name.into(), None));
        id
    }

    /// Add a node under `parent`
    pub fn add_child(&mut self, parent: NodeId, name: impl Into<String>) -> Result<NodeId> {
        self.node(parent)?;
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(SceneNode::new(name.into(), Some(parent)));
        self.nodes[parent.0 as usize].children.push(id);
        Ok(id)
    }

    pub fn get(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.get(id.0 as usize)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut SceneNode> {
        self.nodes.get_mut(id.0 as usize)
    }

    pub fn node(&self, id: NodeId) -> Result<&SceneNode> {
        self.get(id).ok_or(LumenError::NodeNotFound(id.0))
    }

    pub fn node_mut(&mut self, id: NodeId) -> Result<&mut SceneNode> {
        self.get_mut(id).ok_or(LumenError::NodeNotFound(id.0))
    }

    pub fn set_local_transform(&mut self, id: NodeId, local: Mat4) -> Result<()> {
        self.node_mut(id)?.local = local;
        Ok(())
    }

    /// Cut `id` loose from its parent. The node and its subtree become a
    /// separate root. Detaching a root is a no-op.
    pub fn detach(&mut self, id: NodeId) -> Result<()> {
        let Some(parent) = self.node(id)?.parent else {
            return Ok(());
        };
        self.nodes[parent.0 as usize].children.retain(|c| *c != id);
        self.nodes[id.0 as usize].parent = None;
        Ok(())
    }

    /// `id` followed by all of its descendants, depth first
    pub fn subtree(&self, id: NodeId) -> Result<Vec<NodeId>> {
        self.node(id)?;
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.nodes[next.0 as usize].children.iter().rev());
        }
        Ok(out)
    }

    pub fn ids(&self) -> impl Iterator<Item = NodeId> {
        (0..self.nodes.len() as u32).map(NodeId)
    }

    pub fn roots(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.ids().filter(|id| self.nodes[id.0 as usize].parent.is_none())
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Recompute every world transform from the roots down
    pub fn update_world_transforms(&mut self) {
        let roots: Vec<NodeId> = self.roots().collect();
        let mut stack: Vec<(NodeId, Mat4)> = roots.into_iter().map(|r| (r, Mat4::IDENTITY)).collect();
        while let Some((id, parent_world)) = stack.pop() {
            let node = &mut self.nodes[id.0 as usize];
            node.world = parent_world * node.local;
            let world = node.world;
            stack.extend(node.children.iter().map(|c| (*c, world)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn children_inherit_parent_transform() {
        let mut scene = SceneGraph::new();
        let root = scene.add_node("root");
        let child = scene.add_child(root, "child").unwrap();
        scene
            .set_local_transform(root, Mat4::from_translation(Vec3::new(5.0, 0.0, 0.0)))
            .unwrap();
        scene
            .set_local_transform(child, Mat4::from_translation(Vec3::new(0.0, 2.0, 0.0)))
            .unwrap();
        scene.update_world_transforms();

        let pos = scene.node(child).unwrap().world_position();
        assert!(pos.distance(Vec3::new(5.0, 2.0, 0.0)) < 1e-6);
    }

    #[test]
    fn subtree_is_depth_first() {
        let mut scene = SceneGraph::new();
        let a = scene.add_node("a");
        let b = scene.add_child(a, "b").unwrap();
        let c = scene.add_child(b, "c").unwrap();
        let d = scene.add_child(a, "d").unwrap();
        assert_eq!(scene.subtree(a).unwrap(), vec![a, b, c, d]);
        assert_eq!(scene.subtree(b).unwrap(), vec![b, c]);
    }

    #[test]
    fn detach_makes_a_new_root() {
        let mut scene = SceneGraph::new();
        let a = scene.add_node("a");
        let b = scene.add_child(a, "b").unwrap();
        scene.detach(b).unwrap();
        assert!(scene.node(a).unwrap().children().is_empty());
        assert_eq!(scene.node(b).unwrap().parent(), None);
        assert_eq!(scene.roots().count(), 2);
        scene.detach(b).unwrap();
    }

    #[test]
    fn unknown_node_is_an_error() {
        let mut scene = SceneGraph::new();
        let missing = NodeId(7);
        assert!(matches!(scene.node(missing), Err(LumenError::NodeNotFound(7))));
        assert!(scene.add_child(missing, "x").is_err());
    }
}
