//! Entities placed on the stage and the store that owns them.

use crate::id::{EntityId, SceneId};
use crate::transform::EntityTransform;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub scene: SceneId,
    pub transform: EntityTransform,
}

impl Entity {
    pub fn new(id: EntityId, scene: SceneId, transform: EntityTransform) -> Self {
        Self {
            id,
            scene,
            transform,
        }
    }
}

/// All entities known to the stage, across every scene.
#[derive(Debug, Default)]
pub struct EntityStore {
    entities: HashMap<EntityId, Entity>,
}

impl EntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entity, returning the one it replaced.
    pub fn insert(&mut self, entity: Entity) -> Option<Entity> {
        self.entities.insert(entity.id, entity)
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(&id)
    }

    pub fn transform(&self, id: EntityId) -> Option<&EntityTransform> {
        self.entities.get(&id).map(|e| &e.transform)
    }

    pub fn remove(&mut self, id: EntityId) -> Option<Entity> {
        self.entities.remove(&id)
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Ids of every entity belonging to `scene`, in no particular order.
    pub fn in_scene(&self, scene: SceneId) -> Vec<EntityId> {
        self.entities
            .values()
            .filter(|e| e.scene == scene)
            .map(|e| e.id)
            .collect()
    }

    /// Drop every entity of a scene. Returns how many were removed.
    pub fn remove_scene(&mut self, scene: SceneId) -> usize {
        let before = self.entities.len();
        self.entities.retain(|_, e| e.scene != scene);
        before - self.entities.len()
    }

    pub fn clear(&mut self) {
        self.entities.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_filters_by_scene() {
        let main = SceneId::intern("store_main");
        let other = SceneId::intern("store_other");
        let mut store = EntityStore::new();
        store.insert(Entity::new(
            EntityId::intern("store_a"),
            main,
            EntityTransform::new(10.0, 10.0),
        ));
        store.insert(Entity::new(
            EntityId::intern("store_b"),
            other,
            EntityTransform::new(10.0, 10.0),
        ));

        assert_eq!(store.in_scene(main), vec![EntityId::intern("store_a")]);
        assert_eq!(store.remove_scene(other), 1);
        assert_eq!(store.len(), 1);
    }
}
