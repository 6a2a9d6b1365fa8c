//! Collision-specific debug visualization
//!
//! Turns world segments and body outlines into [`DebugShape`]s. Drawing
//! never feeds back into the simulation.

use crate::debug::draw::{Color, DebugDrawSystem, DebugShape};
use crate::foundation::math::{Aabb, Vec2};
use crate::world::Segment;

/// Color scheme for collision visualization
#[derive(Clone, Debug)]
pub struct CollisionDebugColors {
    /// Static world segments
    pub world: Color,

    /// Outward normal ticks on world segments
    pub normal: Color,

    /// Body outlines
    pub body: Color,

    /// Body outlines that overlap something
    pub body_overlapping: Color,

    /// Broad-phase bounds
    pub bounds: Color,
}

impl Default for CollisionDebugColors {
    fn default() -> Self {
        Self {
            world: Color::new(1.0, 1.0, 1.0, 1.0),
            normal: Color::new(1.0, 1.0, 0.0, 0.6),
            body: Color::new(0.0, 1.0, 0.0, 0.8),
            body_overlapping: Color::new(1.0, 0.0, 0.0, 0.8),
            bounds: Color::new(0.5, 0.8, 1.0, 0.3),
        }
    }
}

/// Collision-specific debug visualizer
pub struct CollisionDebugVisualizer {
    colors: CollisionDebugColors,

    /// Draw a short tick along each world segment's outward normal
    pub show_normals: bool,

    /// Draw each body's broad-phase bounds
    pub show_bounds: bool,

    /// Length of the normal ticks in world units
    pub normal_length: f32,
}

impl CollisionDebugVisualizer {
    /// Create a new collision debug visualizer
    pub fn new() -> Self {
        Self {
            colors: CollisionDebugColors::default(),
            show_normals: true,
            show_bounds: false,
            normal_length: 4.0,
        }
    }

    /// Set custom color scheme
    pub fn with_colors(mut self, colors: CollisionDebugColors) -> Self {
        self.colors = colors;
        self
    }

    /// Current color scheme
    pub fn colors(&self) -> &CollisionDebugColors {
        &self.colors
    }

    /// Queue one frame of a world segment
    pub fn draw_segment(&self, draw: &mut DebugDrawSystem, segment: &Segment) {
        draw.draw_line(segment.start, segment.end, self.colors.world, 0.0);
        if self.show_normals && !segment.is_degenerate() {
            let mid = segment.point_at(0.5);
            let tick = segment.outward_normal().normalize() * self.normal_length;
            draw.draw_line(mid, mid + tick, self.colors.normal, 0.0);
        }
    }

    /// Queue one frame of a body outline
    pub fn draw_body(&self, draw: &mut DebugDrawSystem, corners: &[Vec2; 4], bounds: &Aabb, overlapping: bool) {
        let color = if overlapping {
            self.colors.body_overlapping
        } else {
            self.colors.body
        };
        draw.draw_polygon(corners, color, 0.0);
        if self.show_bounds {
            draw.draw_polygon(&bounds.corners(), self.colors.bounds, 0.0);
        }
    }

    /// Pin the query region used for the last render
    pub fn draw_view(&self, draw: &mut DebugDrawSystem, view: &Aabb) {
        draw.draw_persistent(
            "collision_view",
            DebugShape::Polygon {
                points: view.corners().to_vec(),
                color: self.colors.bounds,
                duration: f32::INFINITY,
            },
        );
    }
}

impl Default for CollisionDebugVisualizer {
    fn default() -> Self {
        Self::new()
    }
}
