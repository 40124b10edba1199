//! Display tree: the renderable hierarchy under the stage root.
//!
//! The root holds structural layers (background, variable views, dialogs,
//! coordinate grid, wall, handle) and at most one object container. Each
//! object container holds the entity nodes of one scene.
//!
//! Child order is paint order: index 0 is painted first (backmost). Edges
//! record containment; `child_order` records the order explicitly so it is
//! deterministic on every target.

use crate::id::{EntityId, SceneId};
use petgraph::graph::NodeIndex;
use petgraph::stable_graph::StableDiGraph;
use std::collections::HashMap;

/// Structural layers living directly under the root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Layer {
    Background,
    Variables,
    Dialogs,
    Coordinator,
    Wall,
    Handle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayKind {
    Root,
    Layer(Layer),
    Container(SceneId),
    Entity(EntityId),
}

#[derive(Debug, Clone, PartialEq)]
pub struct DisplayNode {
    pub kind: DisplayKind,
    pub visible: bool,
}

impl DisplayNode {
    pub fn new(kind: DisplayKind) -> Self {
        Self {
            kind,
            visible: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DisplayTree {
    pub graph: StableDiGraph<DisplayNode, ()>,
    pub root: NodeIndex,
    child_order: HashMap<NodeIndex, Vec<NodeIndex>>,
    entity_index: HashMap<EntityId, NodeIndex>,
}

impl Default for DisplayTree {
    fn default() -> Self {
        Self::new()
    }
}

impl DisplayTree {
    #[must_use]
    pub fn new() -> Self {
        let mut graph = StableDiGraph::new();
        let root = graph.add_node(DisplayNode::new(DisplayKind::Root));
        Self {
            graph,
            root,
            child_order: HashMap::new(),
            entity_index: HashMap::new(),
        }
    }

    /// Create a detached node.
    pub fn add_node(&mut self, kind: DisplayKind) -> NodeIndex {
        let idx = self.graph.add_node(DisplayNode::new(kind));
        if let DisplayKind::Entity(id) = kind {
            self.entity_index.insert(id, idx);
        }
        idx
    }

    pub fn node(&self, idx: NodeIndex) -> Option<&DisplayNode> {
        self.graph.node_weight(idx)
    }

    pub fn node_mut(&mut self, idx: NodeIndex) -> Option<&mut DisplayNode> {
        self.graph.node_weight_mut(idx)
    }

    pub fn contains(&self, idx: NodeIndex) -> bool {
        self.graph.contains_node(idx)
    }

    /// Node of an entity, whether attached or not.
    pub fn entity_node(&self, id: EntityId) -> Option<NodeIndex> {
        self.entity_index.get(&id).copied()
    }

    pub fn parent(&self, idx: NodeIndex) -> Option<NodeIndex> {
        self.graph
            .neighbors_directed(idx, petgraph::Direction::Incoming)
            .next()
    }

    /// Children in paint order (back to front).
    pub fn children(&self, idx: NodeIndex) -> &[NodeIndex] {
        self.child_order.get(&idx).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn child_index(&self, parent: NodeIndex, child: NodeIndex) -> Option<usize> {
        self.children(parent).iter().position(|&c| c == child)
    }

    /// Attach `child` under `parent` at `index` (clamped), or on top when
    /// `index` is `None`. A child attached elsewhere is moved.
    pub fn attach(&mut self, parent: NodeIndex, child: NodeIndex, index: Option<usize>) -> bool {
        if !self.contains(parent) || !self.contains(child) || parent == child {
            return false;
        }
        self.detach(child);
        self.graph.add_edge(parent, child, ());
        let order = self.child_order.entry(parent).or_default();
        let at = index.map_or(order.len(), |i| i.min(order.len()));
        order.insert(at, child);
        true
    }

    /// Detach `child` from its parent, keeping the node (and its subtree)
    /// alive. Returns `false` when it was not attached.
    pub fn detach(&mut self, child: NodeIndex) -> bool {
        let Some(parent) = self.parent(child) else {
            return false;
        };
        if let Some(edge) = self.graph.find_edge(parent, child) {
            self.graph.remove_edge(edge);
        }
        if let Some(order) = self.child_order.get_mut(&parent) {
            order.retain(|&c| c != child);
        }
        true
    }

    /// Move an attached child to `index` among its siblings (clamped).
    pub fn set_child_index(&mut self, parent: NodeIndex, child: NodeIndex, index: usize) -> bool {
        let Some(order) = self.child_order.get_mut(&parent) else {
            return false;
        };
        let Some(from) = order.iter().position(|&c| c == child) else {
            return false;
        };
        let node = order.remove(from);
        let to = index.min(order.len());
        order.insert(to, node);
        from != to
    }

    /// Remove a node and everything below it.
    pub fn remove_subtree(&mut self, idx: NodeIndex) -> usize {
        if !self.contains(idx) {
            return 0;
        }
        self.detach(idx);
        let mut stack = vec![idx];
        let mut removed = 0;
        while let Some(next) = stack.pop() {
            if let Some(children) = self.child_order.remove(&next) {
                stack.extend(children);
            }
            if let Some(node) = self.graph.remove_node(next) {
                if let DisplayKind::Entity(id) = node.kind {
                    self.entity_index.remove(&id);
                }
                removed += 1;
            }
        }
        removed
    }

    /// Drop every node except the root.
    pub fn clear(&mut self) {
        let root = self.root;
        let children = self.children(root).to_vec();
        for child in children {
            self.remove_subtree(child);
        }
        self.graph.retain_nodes(|_, idx| idx == root);
        self.child_order.clear();
        self.entity_index.clear();
    }

    /// Root children that are object containers.
    pub fn attached_containers(&self) -> Vec<SceneId> {
        self.children(self.root)
            .iter()
            .filter_map(|&idx| match self.graph[idx].kind {
                DisplayKind::Container(scene) => Some(scene),
                _ => None,
            })
            .collect()
    }

    /// First root child that is the given layer.
    pub fn layer(&self, layer: Layer) -> Option<NodeIndex> {
        self.children(self.root)
            .iter()
            .copied()
            .find(|&idx| self.graph[idx].kind == DisplayKind::Layer(layer))
    }
}
