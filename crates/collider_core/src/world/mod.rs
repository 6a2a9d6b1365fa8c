//! Static world geometry as seen by the collision core
//!
//! World loading and tile storage live elsewhere; this module only defines
//! the segment type, the query contract, and a simple indexed segment list.

pub mod geometry;
pub mod segment;

pub use geometry::{GeometrySource, NoGeometry, SegmentWorld};
pub use segment::Segment;
