//! Reference entity store

use super::{Entity, EntityEvent, EntityHost};
use crate::foundation::math::{Transform2D, Vec2};
use slotmap::SlotMap;

/// Arena of entity transforms
///
/// A minimal [`EntityHost`] for tools, demos and tests. Every transform
/// change and destruction is queued as an [`EntityEvent`] until drained.
#[derive(Debug, Default)]
pub struct Entities {
    transforms: SlotMap<Entity, Transform2D>,
    events: Vec<EntityEvent>,
}

impl Entities {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an entity at `origin` with no rotation
    pub fn spawn(&mut self, origin: Vec2) -> Entity {
        self.spawn_with(Transform2D::from_origin(origin))
    }

    /// Create an entity with a full transform
    pub fn spawn_with(&mut self, transform: Transform2D) -> Entity {
        self.transforms.insert(transform)
    }

    /// Destroy an entity, returning whether it existed
    pub fn despawn(&mut self, entity: Entity) -> bool {
        if self.transforms.remove(entity).is_some() {
            self.events.push(EntityEvent::Destroyed(entity));
            true
        } else {
            false
        }
    }

    /// Number of live entities
    pub fn len(&self) -> usize {
        self.transforms.len()
    }

    /// Whether the store holds no entities
    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
    }

    /// Iterate over every live entity and its transform
    pub fn iter(&self) -> impl Iterator<Item = (Entity, &Transform2D)> {
        self.transforms.iter()
    }
}

impl EntityHost for Entities {
    fn is_alive(&self, entity: Entity) -> bool {
        self.transforms.contains_key(entity)
    }

    fn transform(&self, entity: Entity) -> Option<Transform2D> {
        self.transforms.get(entity).copied()
    }

    fn set_origin(&mut self, entity: Entity, origin: Vec2) {
        if let Some(transform) = self.transforms.get_mut(entity) {
            transform.origin = origin;
            self.events.push(EntityEvent::Moved(entity));
        }
    }

    fn set_rotation(&mut self, entity: Entity, rotation: f32) {
        if let Some(transform) = self.transforms.get_mut(entity) {
            transform.rotation = rotation;
            self.events.push(EntityEvent::Moved(entity));
        }
    }

    fn drain_events(&mut self) -> Vec<EntityEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_despawned_key_stays_dead() {
        let mut entities = Entities::new();
        let first = entities.spawn(Vec2::zeros());
        assert!(entities.despawn(first));

        let second = entities.spawn(Vec2::new(1.0, 1.0));
        assert_ne!(first, second);
        assert!(!entities.is_alive(first));
        assert!(entities.is_alive(second));
        assert!(entities.origin(first).is_none());
    }

    #[test]
    fn test_events_are_drained_once() {
        let mut entities = Entities::new();
        let e = entities.spawn(Vec2::zeros());
        entities.set_origin(e, Vec2::new(2.0, 0.0));
        entities.despawn(e);

        assert_eq!(
            entities.drain_events(),
            vec![EntityEvent::Moved(e), EntityEvent::Destroyed(e)]
        );
        assert!(entities.drain_events().is_empty());
    }

    #[test]
    fn test_writes_to_dead_entity_are_ignored() {
        let mut entities = Entities::new();
        let e = entities.spawn(Vec2::zeros());
        entities.despawn(e);
        entities.drain_events();

        entities.set_origin(e, Vec2::new(5.0, 5.0));
        entities.set_rotation(e, 1.0);
        assert!(entities.drain_events().is_empty());
    }
}
