//! Scene container registry.
//!
//! Every scene owns one object container in the display tree. Only the
//! active scene's container is attached to the root; the others stay
//! detached (but alive) until their scene is activated again.

use crate::display::{DisplayKind, DisplayTree};
use crate::id::SceneId;
use crate::state::StageMode;
use petgraph::graph::NodeIndex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectContainer {
    pub scene: SceneId,
    pub node: NodeIndex,
}

#[derive(Debug, Default)]
pub struct ContainerRegistry {
    containers: Vec<ObjectContainer>,
    selected: Option<SceneId>,
}

impl ContainerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.containers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.containers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ObjectContainer> {
        self.containers.iter()
    }

    /// Create the container for `scene`. An existing container is returned
    /// as-is rather than duplicated.
    pub fn create(&mut self, tree: &mut DisplayTree, scene: SceneId) -> ObjectContainer {
        if let Some(existing) = self.lookup(scene) {
            log::warn!("container for {scene} already exists");
            return *existing;
        }
        let node = tree.add_node(DisplayKind::Container(scene));
        let container = ObjectContainer { scene, node };
        self.containers.push(container);
        log::debug!("created container for {scene}");
        container
    }

    /// Build containers for every scene and activate `selected`.
    ///
    /// With no scenes, a single container for `selected` is created. In
    /// invisible mode nothing is attached to the root.
    pub fn init(
        &mut self,
        tree: &mut DisplayTree,
        scenes: &[SceneId],
        selected: SceneId,
        mode: StageMode,
        structural_index: usize,
    ) {
        if scenes.is_empty() {
            self.create(tree, selected);
        } else {
            for &scene in scenes {
                self.create(tree, scene);
            }
        }
        if mode == StageMode::Invisible {
            self.selected = self.lookup(selected).map(|c| c.scene);
            return;
        }
        if !self.activate(tree, selected, structural_index) {
            // Unknown selection: fall back to the first scene.
            if let Some(first) = self.containers.first().map(|c| c.scene) {
                self.activate(tree, first, structural_index);
            }
        }
    }

    /// Detach every container from the root and attach only `scene`'s at
    /// `structural_index`, so layers below and above keep their place.
    ///
    /// Returns `false` (and changes nothing) when the registry is empty or
    /// the scene has no container.
    pub fn activate(
        &mut self,
        tree: &mut DisplayTree,
        scene: SceneId,
        structural_index: usize,
    ) -> bool {
        if self.containers.is_empty() {
            return false;
        }
        let Some(target) = self.lookup(scene).copied() else {
            log::warn!("activate: no container for {scene}");
            return false;
        };
        for container in &self.containers {
            if tree.parent(container.node) == Some(tree.root) {
                tree.detach(container.node);
            }
        }
        tree.attach(tree.root, target.node, Some(structural_index));
        self.selected = Some(scene);
        log::debug!("activated container for {scene}");
        true
    }

    /// Detach and discard the container of `scene` together with its entity
    /// nodes. Unknown scenes are ignored.
    pub fn remove(&mut self, tree: &mut DisplayTree, scene: SceneId) -> bool {
        let Some(pos) = self.containers.iter().position(|c| c.scene == scene) else {
            return false;
        };
        let container = self.containers.remove(pos);
        tree.remove_subtree(container.node);
        if self.selected == Some(scene) {
            self.selected = None;
        }
        log::debug!("removed container for {scene}");
        true
    }

    /// Linear search by scene id. `None` means "no such scene".
    pub fn lookup(&self, scene: SceneId) -> Option<&ObjectContainer> {
        self.containers.iter().find(|c| c.scene == scene)
    }

    pub fn selected(&self) -> Option<&ObjectContainer> {
        self.selected.and_then(|scene| self.lookup(scene))
    }

    /// Reorder entries to follow `order`. Scenes missing from `order` keep
    /// their relative order at the end.
    pub fn reindex(&mut self, order: &[SceneId]) {
        self.containers.sort_by_key(|c| {
            order
                .iter()
                .position(|&s| s == c.scene)
                .unwrap_or(usize::MAX)
        });
    }

    /// Discard every container (teardown).
    pub fn clear(&mut self, tree: &mut DisplayTree) {
        for container in self.containers.drain(..) {
            tree.remove_subtree(container.node);
        }
        self.selected = None;
    }
}
