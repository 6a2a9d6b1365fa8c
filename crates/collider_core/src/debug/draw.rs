//! Debug drawing primitives and system
//!
//! Shapes are plain 2D outlines queued for whatever renderer the game
//! uses. Temporary shapes expire after their duration; persistent shapes
//! stay until removed.

use crate::foundation::math::Vec2;
use nalgebra::Vector4;
use std::collections::HashMap;

/// RGBA color, each channel in `[0, 1]`
pub type Color = Vector4<f32>;

/// Unique identifier for persistent debug shapes
pub type DebugShapeId = String;

/// Debug shape primitives that can be rendered for visualization
#[derive(Clone, Debug, PartialEq)]
pub enum DebugShape {
    /// Line segment from start to end
    Line {
        /// Start point
        start: Vec2,
        /// End point
        end: Vec2,
        /// Line color
        color: Color,
        /// Remaining lifetime in seconds
        duration: f32,
    },

    /// Closed outline through `points`
    Polygon {
        /// Outline points in drawing order
        points: Vec<Vec2>,
        /// Outline color
        color: Color,
        /// Remaining lifetime in seconds
        duration: f32,
    },

    /// Circle outline
    Circle {
        /// Center
        center: Vec2,
        /// Radius
        radius: f32,
        /// Outline color
        color: Color,
        /// Remaining lifetime in seconds
        duration: f32,
    },
}

impl DebugShape {
    fn duration_mut(&mut self) -> &mut f32 {
        match self {
            Self::Line { duration, .. }
            | Self::Polygon { duration, .. }
            | Self::Circle { duration, .. } => duration,
        }
    }

    /// Get remaining duration
    pub fn duration(&self) -> f32 {
        match self {
            Self::Line { duration, .. }
            | Self::Polygon { duration, .. }
            | Self::Circle { duration, .. } => *duration,
        }
    }

    /// Set duration (returns modified shape)
    pub fn with_duration(mut self, new_duration: f32) -> Self {
        *self.duration_mut() = new_duration;
        self
    }

    /// Decrease duration by delta_time, returns true if expired
    pub fn tick(&mut self, delta_time: f32) -> bool {
        let duration = self.duration_mut();
        *duration -= delta_time;
        *duration <= 0.0
    }
}

/// Debug drawing system for rendering debug shapes
pub struct DebugDrawSystem {
    /// Temporary shapes that expire after their duration
    temporary_shapes: Vec<DebugShape>,

    /// Persistent shapes that remain until manually removed
    persistent_shapes: HashMap<DebugShapeId, DebugShape>,

    /// Master enable/disable flag
    pub enabled: bool,
}

impl DebugDrawSystem {
    /// Create a new debug draw system
    pub fn new() -> Self {
        Self {
            temporary_shapes: Vec::new(),
            persistent_shapes: HashMap::new(),
            enabled: true,
        }
    }

    fn push(&mut self, shape: DebugShape) {
        if self.enabled {
            self.temporary_shapes.push(shape);
        }
    }

    /// Draw a line segment (temporary)
    pub fn draw_line(&mut self, start: Vec2, end: Vec2, color: Color, duration: f32) {
        self.push(DebugShape::Line {
            start,
            end,
            color,
            duration,
        });
    }

    /// Draw a closed outline (temporary)
    pub fn draw_polygon(&mut self, points: &[Vec2], color: Color, duration: f32) {
        self.push(DebugShape::Polygon {
            points: points.to_vec(),
            color,
            duration,
        });
    }

    /// Draw a circle (temporary)
    pub fn draw_circle(&mut self, center: Vec2, radius: f32, color: Color, duration: f32) {
        self.push(DebugShape::Circle {
            center,
            radius,
            color,
            duration,
        });
    }

    /// Draw a persistent shape that remains until explicitly removed
    pub fn draw_persistent(&mut self, id: impl Into<String>, shape: DebugShape) {
        if !self.enabled {
            return;
        }

        self.persistent_shapes.insert(id.into(), shape);
    }

    /// Remove a persistent shape
    pub fn clear_persistent(&mut self, id: &str) {
        self.persistent_shapes.remove(id);
    }

    /// Update shape lifetimes and remove expired temporary shapes
    pub fn update(&mut self, delta_time: f32) {
        if !self.enabled {
            return;
        }

        self.temporary_shapes.retain_mut(|shape| !shape.tick(delta_time));
    }

    /// Get all shapes for rendering (both temporary and persistent)
    pub fn get_shapes(&self) -> Vec<&DebugShape> {
        if !self.enabled {
            return Vec::new();
        }

        self.temporary_shapes
            .iter()
            .chain(self.persistent_shapes.values())
            .collect()
    }

    /// Get the number of active shapes
    pub fn shape_count(&self) -> usize {
        self.temporary_shapes.len() + self.persistent_shapes.len()
    }

    /// Clear all shapes (temporary and persistent)
    pub fn clear(&mut self) {
        self.temporary_shapes.clear();
        self.persistent_shapes.clear();
    }
}

impl Default for DebugDrawSystem {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temporary_shape_expiration() {
        let mut system = DebugDrawSystem::new();
        system.draw_circle(Vec2::zeros(), 1.0, Color::new(1.0, 0.0, 0.0, 1.0), 1.0);
        assert_eq!(system.shape_count(), 1);

        system.update(0.5);
        assert_eq!(system.shape_count(), 1);

        system.update(0.6);
        assert_eq!(system.shape_count(), 0);
    }

    #[test]
    fn test_persistent_shapes() {
        let mut system = DebugDrawSystem::new();
        system.draw_persistent(
            "spawn_point",
            DebugShape::Circle {
                center: Vec2::new(4.0, 2.0),
                radius: 0.5,
                color: Color::new(0.0, 1.0, 0.0, 1.0),
                duration: f32::INFINITY,
            },
        );

        for _ in 0..100 {
            system.update(1.0);
        }
        assert_eq!(system.shape_count(), 1);

        system.clear_persistent("spawn_point");
        assert_eq!(system.shape_count(), 0);
    }

    #[test]
    fn test_disabled_system_draws_nothing() {
        let mut system = DebugDrawSystem::new();
        system.enabled = false;
        system.draw_line(Vec2::zeros(), Vec2::new(1.0, 0.0), Color::new(1.0, 1.0, 1.0, 1.0), 1.0);
        assert_eq!(system.shape_count(), 0);
        assert!(system.get_shapes().is_empty());
    }
}
