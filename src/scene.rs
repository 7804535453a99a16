//! Display-side collaborator: the scene graph that holds controller models and
//! hand joint markers.

use glam::{Quat, Vec3};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub usize);

/// Local transform of a scene node relative to its parent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    pub fn from_pose(position: Vec3, rotation: Quat) -> Self {
        Self {
            position,
            rotation,
            ..Default::default()
        }
    }
}

/// Operations the input core needs from a scene graph.
pub trait SceneGraph {
    /// Create an empty, active node.
    fn create_node(&mut self, name: &str, parent: Option<NodeId>) -> NodeId;

    /// Instantiate a joint marker for joint `index` under `parent`.
    /// New markers start active.
    fn spawn_joint(&mut self, parent: NodeId, index: usize, transform: &Transform) -> NodeId;

    fn set_local_transform(&mut self, node: NodeId, transform: &Transform);

    /// Show or hide a node
    fn set_active(&mut self, node: NodeId, active: bool);
}

#[derive(Debug, Clone)]
pub struct SceneNode {
    pub name: String,
    pub parent: Option<NodeId>,
    pub transform: Transform,
    pub active: bool,
}

/// Flat in-memory scene graph.
///
/// Counts visibility writes so callers can see how much work a frame caused.
#[derive(Debug, Default)]
pub struct SceneTree {
    nodes: Vec<SceneNode>,
    active_writes: usize,
}

impl SceneTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.get(id.0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn children(&self, parent: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter(move |(_, n)| n.parent == Some(parent))
            .map(|(i, _)| NodeId(i))
    }

    pub fn is_active(&self, id: NodeId) -> bool {
        self.node(id).map(|n| n.active).unwrap_or(false)
    }

    /// Total number of `set_active` calls received.
    pub fn active_writes(&self) -> usize {
        self.active_writes
    }

    fn push(&mut self, name: String, parent: Option<NodeId>, transform: Transform) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(SceneNode {
            name,
            parent,
            transform,
            active: true,
        });
        id
    }
}

impl SceneGraph for SceneTree {
    fn create_node(&mut self, name: &str, parent: Option<NodeId>) -> NodeId {
        self.push(name.to_string(), parent, Transform::default())
    }

    fn spawn_joint(&mut self, parent: NodeId, index: usize, transform: &Transform) -> NodeId {
        self.push(format!("joint_{}", index), Some(parent), *transform)
    }

    fn set_local_transform(&mut self, node: NodeId, transform: &Transform) {
        match self.nodes.get_mut(node.0) {
            Some(n) => n.transform = *transform,
            None => log::warn!("Transform write to unknown scene node {:?}", node),
        }
    }

    fn set_active(&mut self, node: NodeId, active: bool) {
        self.active_writes += 1;
        match self.nodes.get_mut(node.0) {
            Some(n) => n.active = active,
            None => log::warn!("Visibility write to unknown scene node {:?}", node),
        }
    }
}
