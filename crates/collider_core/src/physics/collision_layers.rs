//! Collision layers for filtering which bodies block which
//!
//! Every body carries two layer sets: `collide_type` says what the body is,
//! `collide_mask` says what it runs into when it moves or rotates. The
//! [`WORLD`](CollisionLayers::WORLD) bit in a mask opts the body into
//! static geometry checks.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Collision layer bitmask
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct CollisionLayers: u32 {
        /// Static world geometry
        const WORLD = 1 << 0;

        /// Player character layer
        const PLAYER = 1 << 1;

        /// Enemy character layer
        const ENEMY = 1 << 2;

        /// Projectiles (bullets, missiles, etc.)
        const PROJECTILE = 1 << 3;

        /// Trigger volumes
        const TRIGGER = 1 << 4;

        /// Crates, debris and other pushable props
        const DEBRIS = 1 << 5;

        /// Moving platforms, doors and other set pieces
        const PLATFORM = 1 << 6;

        /// Pickups and collectibles
        const PICKUP = 1 << 7;

        // Bits 8-31 are left to the game
        const _ = !0;
    }
}

impl CollisionLayers {
    /// Whether a mover with `mask` is blocked by a body of type `layer`
    ///
    /// Blocking is one-way: the other body's mask plays no part.
    ///
    /// # Example
    /// ```
    /// use collider_core::physics::CollisionLayers;
    ///
    /// let player_mask = CollisionLayers::WORLD | CollisionLayers::ENEMY;
    /// assert!(CollisionLayers::blocks(player_mask, CollisionLayers::ENEMY));
    /// assert!(!CollisionLayers::blocks(CollisionLayers::ENEMY, CollisionLayers::PLAYER));
    /// ```
    pub fn blocks(mask: Self, layer: Self) -> bool {
        mask.intersects(layer)
    }

    /// Mask for a custom game-defined layer in bits 8-31
    pub fn custom(bit: u32) -> Option<Self> {
        (8..32).contains(&bit).then(|| Self::from_bits_retain(1 << bit))
    }
}
