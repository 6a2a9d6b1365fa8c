//! # Collider Core
//!
//! Continuous collision and constraint propagation for rectangular 2D bodies.
//!
//! ## Features
//!
//! - **Swept Movement**: Exact time of impact for translation and rotation
//!   against directed world segments and other bodies
//! - **Pushing**: Blocking bodies are pushed ahead of a mover, with rollback
//!   when the push chain ends short
//! - **Rigid Groups**: Constraints bind entities that move as one
//! - **Broad Phase**: Grid-bucketed spatial hash for body lookups
//! - **Debug Drawing**: World and body outlines for any renderer
//!
//! ## Quick Start
//!
//! ```rust
//! use collider_core::prelude::*;
//!
//! let mut entities = Entities::new();
//! let mut world = SegmentWorld::default();
//! world.add_segment(Segment::new(Vec2::new(5.0, -5.0), Vec2::new(5.0, 5.0)));
//!
//! let mut collision = Collision::new();
//! let player = entities.spawn(Vec2::zeros());
//! let body = collision.bodies_mut().create_obj(player, &entities)?;
//! collision.bodies_mut().set_size(body, Vec2::new(2.0, 2.0), &entities)?;
//! collision.bodies_mut().set_collide_mask(body, CollisionLayers::WORLD)?;
//!
//! let result = collision.collider_move(
//!     &mut entities,
//!     &world,
//!     player,
//!     Vec2::new(10.0, 0.0),
//!     CollisionLayers::empty(),
//!     0,
//! );
//! assert!((result.ratio - 0.4).abs() < 1e-4);
//! # Ok::<(), CollisionError>(())
//! ```

pub mod config;
pub mod debug;
pub mod ecs;
pub mod foundation;
pub mod physics;
pub mod spatial;
pub mod world;

/// Common imports for crate users
pub mod prelude {
    pub use crate::{
        config::{CollisionConfig, Config, ConfigError},
        debug::{DebugDrawSystem, DebugShape},
        ecs::{Entities, Entity, EntityEvent, EntityHost},
        foundation::math::{Aabb, Transform2D, Vec2},
        physics::{
            BodyId, Collision, CollisionData, CollisionError, CollisionLayers, ConstraintData, ConstraintError,
            ConstraintId, MoveResult, PushedEntity, RotateResult,
        },
        spatial::{SpatialHash, SpatialQuery},
        world::{GeometrySource, NoGeometry, Segment, SegmentWorld},
    };
}
