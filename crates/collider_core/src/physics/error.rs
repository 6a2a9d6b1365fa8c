//! Error types for the body and constraint stores

use super::{BodyId, ConstraintId};
use crate::ecs::Entity;
use thiserror::Error;

/// Errors from body and constraint accessors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CollisionError {
    /// Body was destroyed or never existed
    #[error("body {0:?} not found")]
    BodyNotFound(BodyId),

    /// Constraint was purged or never existed
    #[error("constraint {0:?} not found")]
    ConstraintNotFound(ConstraintId),

    /// Entity is no longer alive in the host
    #[error("entity {0:?} is not alive")]
    EntityNotFound(Entity),
}

/// Reasons a constraint walk refuses to produce a rigid group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConstraintError {
    /// A followed constraint pins the entity on its far side
    #[error("constraint {constraint:?} pins {entity:?} in place")]
    FixedEndpoint {
        /// Constraint that was followed
        constraint: ConstraintId,
        /// Pinned endpoint
        entity: Entity,
    },

    /// A path that crossed a fixed endpoint loops back into the group
    #[error("fixed constraint path loops back to {entity:?}")]
    FixedCycle {
        /// Node reached a second time
        entity: Entity,
    },
}

/// Result type for collision store operations
pub type CollisionResult<T> = Result<T, CollisionError>;
