//! Entity implementation

slotmap::new_key_type! {
    /// Entity identifier
    ///
    /// A generational index: once the entity is destroyed the key is never
    /// handed out again, so stale copies held by bodies or constraints simply
    /// stop resolving instead of aliasing a newer entity.
    pub struct Entity;
}

/// Notification emitted by an [`EntityHost`](super::EntityHost) for observers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityEvent {
    /// The entity's origin or rotation changed outside the collision core
    Moved(Entity),
    /// The entity was destroyed
    Destroyed(Entity),
}
