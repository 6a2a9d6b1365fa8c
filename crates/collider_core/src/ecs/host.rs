//! Contract between the collision core and whatever owns the entities

use super::{Entity, EntityEvent};
use crate::foundation::math::{Transform2D, Vec2};

/// Owner of entity transforms, consumed by the collision core
///
/// The core never creates or destroys entities; it only reads and writes
/// their transforms and observes their lifetime through [`is_alive`] and
/// [`drain_events`].
///
/// Implementations may run game callbacks from [`set_origin`] or
/// [`set_rotation`]. Such callbacks execute in the middle of a move
/// resolution and can observe partially applied movement.
///
/// [`is_alive`]: EntityHost::is_alive
/// [`drain_events`]: EntityHost::drain_events
/// [`set_origin`]: EntityHost::set_origin
/// [`set_rotation`]: EntityHost::set_rotation
pub trait EntityHost {
    /// Whether `entity` still exists
    fn is_alive(&self, entity: Entity) -> bool;

    /// Current transform, `None` for dead entities
    fn transform(&self, entity: Entity) -> Option<Transform2D>;

    /// Overwrite the origin; ignored for dead entities
    fn set_origin(&mut self, entity: Entity, origin: Vec2);

    /// Overwrite the rotation; ignored for dead entities
    fn set_rotation(&mut self, entity: Entity, rotation: f32);

    /// Take pending move/destroy notifications
    fn drain_events(&mut self) -> Vec<EntityEvent> {
        Vec::new()
    }

    /// Current origin, `None` for dead entities
    fn origin(&self, entity: Entity) -> Option<Vec2> {
        self.transform(entity).map(|t| t.origin)
    }

    /// Current rotation, `None` for dead entities
    fn rotation(&self, entity: Entity) -> Option<f32> {
        self.transform(entity).map(|t| t.rotation)
    }
}
