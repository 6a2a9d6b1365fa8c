//! Entity abstraction consumed by the collision core
//!
//! Entities are owned outside this crate. The core only attaches bodies and
//! constraints to them through generational [`Entity`] keys and talks to
//! their owner through [`EntityHost`].

pub mod entity;
pub mod host;
pub mod world;

pub use entity::{Entity, EntityEvent};
pub use host::EntityHost;
pub use world::Entities;
