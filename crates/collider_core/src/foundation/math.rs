//! Math utilities and types
//!
//! Provides the 2D math types used by the collision core. Coordinates are
//! y-up: positive rotation is counter-clockwise.

pub use nalgebra::{Rotation2, Vector2};

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// Position and orientation of an entity in the plane
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform2D {
    /// World-space origin
    pub origin: Vec2,

    /// Rotation in radians (counter-clockwise)
    pub rotation: f32,
}

impl Default for Transform2D {
    fn default() -> Self {
        Self {
            origin: Vec2::zeros(),
            rotation: 0.0,
        }
    }
}

impl Transform2D {
    /// Create a transform from an origin and a rotation
    pub fn new(origin: Vec2, rotation: f32) -> Self {
        Self { origin, rotation }
    }

    /// Create a transform with only an origin
    pub fn from_origin(origin: Vec2) -> Self {
        Self {
            origin,
            ..Default::default()
        }
    }

    /// Map a point from local space into world space
    pub fn transform_point(&self, local: Vec2) -> Vec2 {
        self.origin + Rotation2::new(self.rotation) * local
    }
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner
    pub min: Vec2,
    /// Maximum corner
    pub max: Vec2,
}

impl Aabb {
    /// Create a box from two corners, reordering components as needed
    pub fn new(a: Vec2, b: Vec2) -> Self {
        Self {
            min: Vec2::new(a.x.min(b.x), a.y.min(b.y)),
            max: Vec2::new(a.x.max(b.x), a.y.max(b.y)),
        }
    }

    /// Create a box from a center and half extents
    pub fn from_center_extents(center: Vec2, extents: Vec2) -> Self {
        Self::new(center - extents, center + extents)
    }

    /// Smallest box containing every point in `points`
    ///
    /// Returns `None` for an empty slice.
    pub fn from_points(points: &[Vec2]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        let mut aabb = Self { min: *first, max: *first };
        for p in rest {
            aabb.min = aabb.min.inf(p);
            aabb.max = aabb.max.sup(p);
        }
        Some(aabb)
    }

    /// Center point
    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    /// Half extents
    pub fn extents(&self) -> Vec2 {
        (self.max - self.min) * 0.5
    }

    /// Union of two boxes
    pub fn merged(&self, other: &Self) -> Self {
        Self {
            min: self.min.inf(&other.min),
            max: self.max.sup(&other.max),
        }
    }

    /// Box grown by `amount` on every side
    pub fn expanded(&self, amount: f32) -> Self {
        let grow = Vec2::new(amount, amount);
        Self {
            min: self.min - grow,
            max: self.max + grow,
        }
    }

    /// Box moved by `offset`
    pub fn translated(&self, offset: Vec2) -> Self {
        Self {
            min: self.min + offset,
            max: self.max + offset,
        }
    }

    /// Inclusive overlap test
    pub fn intersects(&self, other: &Self) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
    }

    /// Inclusive point containment
    pub fn contains_point(&self, point: Vec2) -> bool {
        point.x >= self.min.x && point.x <= self.max.x && point.y >= self.min.y && point.y <= self.max.y
    }

    /// Corners in clockwise order starting at the upper left
    pub fn corners(&self) -> [Vec2; 4] {
        [
            Vec2::new(self.min.x, self.max.y),
            self.max,
            Vec2::new(self.max.x, self.min.y),
            self.min,
        ]
    }
}

/// Math constants
pub mod constants {
    /// Pi constant
    pub const PI: f32 = std::f32::consts::PI;

    /// 2 * Pi
    pub const TAU: f32 = 2.0 * PI;

    /// Pi / 2
    pub const HALF_PI: f32 = PI * 0.5;
}

/// Math utility functions
pub mod utils {
    use super::{constants, Rotation2, Vec2};

    /// Z component of the 3D cross product of two planar vectors
    pub fn cross(a: &Vec2, b: &Vec2) -> f32 {
        a.x * b.y - a.y * b.x
    }

    /// Left perpendicular, `(-y, x)`
    pub fn left_perp(v: &Vec2) -> Vec2 {
        Vec2::new(-v.y, v.x)
    }

    /// Rotate `point` around `pivot` by `angle` radians
    pub fn rotate_about(point: Vec2, pivot: Vec2, angle: f32) -> Vec2 {
        pivot + Rotation2::new(angle) * (point - pivot)
    }

    /// Wrap an angle into `[0, 2π)`
    pub fn wrap_angle(angle: f32) -> f32 {
        let wrapped = angle.rem_euclid(constants::TAU);
        // rem_euclid can round up to exactly TAU for tiny negative inputs
        if wrapped >= constants::TAU {
            0.0
        } else {
            wrapped
        }
    }
}
