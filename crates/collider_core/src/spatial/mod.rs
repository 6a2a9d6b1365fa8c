//! Spatial partitioning data structures
//!
//! Provides the broad-phase index used to find candidate bodies and world
//! segments near a query region.

pub mod spatial_hash;
pub mod spatial_query;

pub use spatial_hash::{Search, SpatialHash};
pub use spatial_query::SpatialQuery;
