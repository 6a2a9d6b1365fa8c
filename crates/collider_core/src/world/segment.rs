//! Directed line segments

use crate::foundation::math::{utils, Aabb, Vec2};

/// Directed segment with solid mass on its right
///
/// Static world geometry and the edges of bodies are both expressed as
/// segments wound clockwise around the solid they bound, so walking from
/// `start` to `end` keeps the solid on the right-hand side.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    /// Start point
    pub start: Vec2,
    /// End point
    pub end: Vec2,
}

impl Segment {
    /// Create a segment from `start` to `end`
    pub fn new(start: Vec2, end: Vec2) -> Self {
        Self { start, end }
    }

    /// `end - start`
    pub fn direction(&self) -> Vec2 {
        self.end - self.start
    }

    /// Normal pointing away from the solid side (not normalized)
    pub fn outward_normal(&self) -> Vec2 {
        utils::left_perp(&self.direction())
    }

    /// Whether motion along `motion` runs into the solid face
    pub fn faces(&self, motion: &Vec2) -> bool {
        self.outward_normal().dot(motion) < 0.0
    }

    /// Whether the segment has (near) zero length
    pub fn is_degenerate(&self) -> bool {
        self.direction().norm_squared() <= f32::EPSILON
    }

    /// Same segment walked the other way
    pub fn reversed(&self) -> Self {
        Self::new(self.end, self.start)
    }

    /// Bounding box
    pub fn aabb(&self) -> Aabb {
        Aabb::new(self.start, self.end)
    }

    /// Point at parameter `s` along the segment
    pub fn point_at(&self, s: f32) -> Vec2 {
        self.start + self.direction() * s
    }

    /// Whether `point` lies strictly on the solid side of the supporting line
    pub fn is_behind(&self, point: Vec2) -> bool {
        utils::cross(&self.direction(), &(point - self.start)) < 0.0
    }
}

/// Closed clockwise loop of segments through `points`
pub fn closed_loop(points: &[Vec2]) -> Vec<Segment> {
    if points.len() < 2 {
        return Vec::new();
    }
    points
        .iter()
        .zip(points.iter().cycle().skip(1))
        .map(|(a, b)| Segment::new(*a, *b))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upward_segment_faces_left() {
        // Solid on the right (+x), face points toward -x
        let wall = Segment::new(Vec2::new(5.0, -5.0), Vec2::new(5.0, 5.0));
        assert!(wall.faces(&Vec2::new(1.0, 0.0)));
        assert!(!wall.faces(&Vec2::new(-1.0, 0.0)));
        assert!(!wall.faces(&Vec2::new(0.0, 1.0)));
        assert!(wall.is_behind(Vec2::new(6.0, 0.0)));
        assert!(!wall.is_behind(Vec2::new(4.0, 0.0)));
    }

    #[test]
    fn test_closed_loop_wraps() {
        let square = [
            Vec2::new(0.0, 1.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(0.0, 0.0),
        ];
        let edges = closed_loop(&square);
        assert_eq!(edges.len(), 4);
        assert_eq!(edges[3], Segment::new(Vec2::new(0.0, 0.0), Vec2::new(0.0, 1.0)));
        assert!(edges.iter().all(|e| e.is_behind(Vec2::new(0.5, 0.5))));
    }
}
