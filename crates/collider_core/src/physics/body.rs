//! Rectangular collision bodies

use super::CollisionLayers;
use crate::ecs::Entity;
use crate::foundation::math::{Aabb, Rotation2, Transform2D, Vec2};
use crate::world::Segment;

slotmap::new_key_type! {
    /// Handle to a body in [`CollisionData`](super::CollisionData)
    pub struct BodyId;
}

/// Rectangle attached to an entity
///
/// The rectangle is centered at `offset` in the owner's local frame and
/// follows the owner's origin and rotation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Body {
    /// Owning entity
    pub owner: Entity,

    /// Rectangle center relative to the owner's origin
    pub offset: Vec2,

    /// Width and height
    pub size: Vec2,

    /// What this body is
    pub collide_type: CollisionLayers,

    /// What this body runs into when its owner moves or rotates
    pub collide_mask: CollisionLayers,
}

impl Body {
    /// Zeroed body for `owner`
    pub fn new(owner: Entity) -> Self {
        Self {
            owner,
            offset: Vec2::zeros(),
            size: Vec2::zeros(),
            collide_type: CollisionLayers::empty(),
            collide_mask: CollisionLayers::empty(),
        }
    }

    /// Corner positions in local space: ul, ur, dr, dl
    pub fn local_corners(&self) -> [Vec2; 4] {
        let half = self.size * 0.5;
        [
            self.offset + Vec2::new(-half.x, half.y),
            self.offset + Vec2::new(half.x, half.y),
            self.offset + Vec2::new(half.x, -half.y),
            self.offset + Vec2::new(-half.x, -half.y),
        ]
    }

    /// World-space corners for the owner at `transform`, ul, ur, dr, dl
    pub fn corners(&self, transform: &Transform2D) -> [Vec2; 4] {
        let rotation = Rotation2::new(transform.rotation);
        self.local_corners().map(|c| transform.origin + rotation * c)
    }

    /// Clockwise edges ul→ur→dr→dl→ul, solid on the right
    pub fn edges(&self, transform: &Transform2D) -> [Segment; 4] {
        let [ul, ur, dr, dl] = self.corners(transform);
        [
            Segment::new(ul, ur),
            Segment::new(ur, dr),
            Segment::new(dr, dl),
            Segment::new(dl, ul),
        ]
    }

    /// World-space bounding box
    pub fn aabb(&self, transform: &Transform2D) -> Aabb {
        let corners = self.corners(transform);
        corners[1..]
            .iter()
            .fold(Aabb::new(corners[0], corners[0]), |acc, c| acc.merged(&Aabb::new(*c, *c)))
    }
}
