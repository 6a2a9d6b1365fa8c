//! Debug module for visualization and debugging tools

pub mod collision_debug;
pub mod draw;

pub use collision_debug::{CollisionDebugColors, CollisionDebugVisualizer};
pub use draw::{Color, DebugDrawSystem, DebugShape, DebugShapeId};
