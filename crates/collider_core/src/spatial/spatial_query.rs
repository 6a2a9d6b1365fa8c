//! Abstract spatial query interface for broad-phase collision detection
//!
//! The broad phase only narrows candidates: every result must still pass an
//! exact geometric test. Implementations may return a superset of the true
//! overlaps but never miss one.

use crate::foundation::math::Aabb;

/// Region index used for broad-phase lookups
pub trait SpatialQuery<H> {
    /// Insert `handle` with `bounds`, replacing any previous bounds
    fn update(&mut self, handle: H, bounds: Aabb);

    /// Remove `handle`; no-op if absent
    fn remove(&mut self, handle: H);

    /// Write every handle whose bounds overlap `region` into `out`
    ///
    /// `out` is cleared first.
    fn query_region(&self, region: &Aabb, out: &mut Vec<H>);

    /// Stored bounds of `handle`
    fn bounds(&self, handle: H) -> Option<Aabb>;

    /// Remove every entry
    fn clear(&mut self);

    /// Number of stored entries
    fn entry_count(&self) -> usize;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Vec2;
    use crate::spatial::SpatialHash;

    #[test]
    fn test_spatial_query_insert_remove() {
        let mut spatial: Box<dyn SpatialQuery<u32>> = Box::new(SpatialHash::new(16.0));

        let bounds = Aabb::from_center_extents(Vec2::zeros(), Vec2::new(5.0, 5.0));
        spatial.update(1, bounds);
        assert_eq!(spatial.entry_count(), 1);
        assert_eq!(spatial.bounds(1), Some(bounds));

        let mut out = vec![42];
        spatial.query_region(&Aabb::new(Vec2::new(4.0, 4.0), Vec2::new(6.0, 6.0)), &mut out);
        assert_eq!(out, vec![1]);

        spatial.remove(1);
        assert_eq!(spatial.entry_count(), 0);
        spatial.query_region(&bounds, &mut out);
        assert!(out.is_empty());
    }
}
