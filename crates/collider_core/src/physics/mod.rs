//! Continuous collision and constraint propagation
//!
//! Bodies are rectangles attached to entities. They sweep against static
//! world segments and against each other; constraints bind entities into
//! rigid groups that move as one. Start with [`Collision`].

pub mod body;
pub mod collision;
pub mod collision_data;
pub mod collision_layers;
pub mod constraint;
pub mod error;
pub mod primitives;
pub mod sweep;

pub use body::{Body, BodyId};
pub use collision::{Collision, MoveResult, PushedEntity, RotateResult};
pub use collision_data::CollisionData;
pub use collision_layers::CollisionLayers;
pub use constraint::{Constraint, ConstraintData, ConstraintId};
pub use error::{CollisionError, CollisionResult, ConstraintError};

#[cfg(test)]
mod tests;
