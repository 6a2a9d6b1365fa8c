//! Static geometry collaborator

use super::Segment;
use crate::foundation::math::Aabb;
use crate::spatial::SpatialHash;

/// Read-only source of static world segments
pub trait GeometrySource {
    /// Write every segment whose bounds overlap `region` into `out`
    ///
    /// `out` is cleared first. Implementations may return extra segments;
    /// callers always run exact tests afterwards.
    fn search(&self, region: &Aabb, out: &mut Vec<Segment>);
}

/// Geometry source with nothing in it
#[derive(Debug, Clone, Copy, Default)]
pub struct NoGeometry;

impl GeometrySource for NoGeometry {
    fn search(&self, _region: &Aabb, out: &mut Vec<Segment>) {
        out.clear();
    }
}

/// Flat list of segments indexed in a [`SpatialHash`]
#[derive(Debug, Clone)]
pub struct SegmentWorld {
    segments: Vec<Segment>,
    index: SpatialHash<usize>,
}

impl SegmentWorld {
    /// Create an empty world with the given broad-phase bucket size
    pub fn new(bucket_size: f32) -> Self {
        Self {
            segments: Vec::new(),
            index: SpatialHash::new(bucket_size),
        }
    }

    /// Add one directed segment, returning its index
    pub fn add_segment(&mut self, segment: Segment) -> usize {
        let id = self.segments.len();
        let bounds = segment.aabb();
        self.index.update(id, bounds.min, bounds.max);
        self.segments.push(segment);
        id
    }

    /// Add a closed clockwise outline (solid inside)
    pub fn add_polygon(&mut self, points: &[crate::foundation::math::Vec2]) {
        for segment in super::segment::closed_loop(points) {
            self.add_segment(segment);
        }
    }

    /// Add a solid axis-aligned block
    pub fn add_block(&mut self, bounds: Aabb) {
        self.add_polygon(&bounds.corners());
    }

    /// Add an enclosing room: solid everywhere outside `bounds`
    pub fn add_room(&mut self, bounds: Aabb) {
        let mut corners = bounds.corners();
        corners.reverse();
        self.add_polygon(&corners);
    }

    /// Every segment in insertion order
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Number of segments
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Whether the world holds no segments
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

impl Default for SegmentWorld {
    fn default() -> Self {
        Self::new(128.0)
    }
}

impl GeometrySource for SegmentWorld {
    fn search(&self, region: &Aabb, out: &mut Vec<Segment>) {
        let mut ids: Vec<usize> = self.index.search(region.min, region.max).collect();
        ids.sort_unstable();
        out.clear();
        out.extend(ids.into_iter().map(|id| self.segments[id]));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Vec2;

    #[test]
    fn test_search_returns_segments_in_insertion_order() {
        let mut world = SegmentWorld::new(4.0);
        let a = Segment::new(Vec2::new(0.0, 0.0), Vec2::new(0.0, 2.0));
        let b = Segment::new(Vec2::new(1.0, 0.0), Vec2::new(1.0, 2.0));
        let far = Segment::new(Vec2::new(100.0, 0.0), Vec2::new(100.0, 2.0));
        world.add_segment(b);
        world.add_segment(far);
        world.add_segment(a);

        let mut out = Vec::new();
        world.search(&Aabb::new(Vec2::new(-1.0, -1.0), Vec2::new(2.0, 3.0)), &mut out);
        assert_eq!(out, vec![b, a]);
    }

    #[test]
    fn test_room_walls_face_inward() {
        let mut world = SegmentWorld::new(8.0);
        world.add_room(Aabb::new(Vec2::new(-10.0, -10.0), Vec2::new(10.0, 10.0)));

        assert_eq!(world.len(), 4);
        let center = Vec2::zeros();
        assert!(world.segments().iter().all(|s| !s.is_behind(center)));
    }

    #[test]
    fn test_block_walls_face_outward() {
        let mut world = SegmentWorld::new(8.0);
        world.add_block(Aabb::new(Vec2::new(-1.0, -1.0), Vec2::new(1.0, 1.0)));

        assert!(world.segments().iter().all(|s| s.is_behind(Vec2::zeros())));
    }

    #[test]
    fn test_no_geometry_is_empty() {
        let mut out = vec![Segment::new(Vec2::zeros(), Vec2::new(1.0, 0.0))];
        NoGeometry.search(&Aabb::new(Vec2::zeros(), Vec2::new(1.0, 1.0)), &mut out);
        assert!(out.is_empty());
    }
}
