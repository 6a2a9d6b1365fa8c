//! Uniform grid spatial hash
//!
//! Entries are bucketed by the grid cell containing the center of their
//! bounding box. Entries whose half extent exceeds the bucket size go into a
//! single fallback bucket that every search scans, so a search only has to
//! look one cell past the query box in each direction to find everything
//! that can overlap it.

use crate::foundation::math::{Aabb, Vec2};
use crate::spatial::spatial_query::SpatialQuery;
use std::collections::{hash_map, HashMap};
use std::hash::Hash;

/// Grid cell coordinate
pub type BucketKey = (i32, i32);

#[derive(Debug, Clone, Copy)]
struct HashEntry {
    bucket: Option<BucketKey>,
    bounds: Aabb,
}

/// Grid-bucketed bounding box index
#[derive(Debug, Clone)]
pub struct SpatialHash<H> {
    bucket_size: f32,
    buckets: HashMap<BucketKey, Vec<H>>,
    fallback: Vec<H>,
    entries: HashMap<H, HashEntry>,
}

impl<H: Copy + Eq + Hash> SpatialHash<H> {
    /// Create an empty hash
    ///
    /// Non-positive or non-finite sizes fall back to `1.0`.
    pub fn new(bucket_size: f32) -> Self {
        let bucket_size = if bucket_size.is_finite() && bucket_size > 0.0 {
            bucket_size
        } else {
            1.0
        };
        Self {
            bucket_size,
            buckets: HashMap::new(),
            fallback: Vec::new(),
            entries: HashMap::new(),
        }
    }

    /// Edge length of one grid cell
    pub fn bucket_size(&self) -> f32 {
        self.bucket_size
    }

    /// Insert `handle`, or move it if already present
    pub fn update(&mut self, handle: H, min: Vec2, max: Vec2) {
        self.remove(handle);

        let bounds = Aabb::new(min, max);
        let extents = bounds.extents();
        let bucket = if extents.x > self.bucket_size || extents.y > self.bucket_size {
            self.fallback.push(handle);
            None
        } else {
            let key = self.key_for(bounds.center());
            self.buckets.entry(key).or_default().push(handle);
            Some(key)
        };

        self.entries.insert(handle, HashEntry { bucket, bounds });
    }

    /// Remove `handle`; no-op if absent
    pub fn remove(&mut self, handle: H) {
        let Some(entry) = self.entries.remove(&handle) else {
            return;
        };

        match entry.bucket {
            Some(key) => {
                if let Some(bucket) = self.buckets.get_mut(&key) {
                    if let Some(index) = bucket.iter().position(|h| *h == handle) {
                        bucket.swap_remove(index);
                    }
                    if bucket.is_empty() {
                        self.buckets.remove(&key);
                    }
                }
            }
            None => {
                if let Some(index) = self.fallback.iter().position(|h| *h == handle) {
                    self.fallback.swap_remove(index);
                }
            }
        }
    }

    /// Remove every entry
    pub fn clear(&mut self) {
        self.buckets.clear();
        self.fallback.clear();
        self.entries.clear();
    }

    /// Stored bounds of `handle`
    pub fn bounds(&self, handle: H) -> Option<Aabb> {
        self.entries.get(&handle).map(|entry| entry.bounds)
    }

    /// Whether `handle` is stored
    pub fn contains(&self, handle: H) -> bool {
        self.entries.contains_key(&handle)
    }

    /// Number of stored entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the hash is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Lazily iterate every handle whose box overlaps `[min, max]`
    ///
    /// The iterator is cheap to clone; a clone restarts from the same point.
    /// Results come in no particular order.
    pub fn search(&self, min: Vec2, max: Vec2) -> Search<'_, H> {
        let region = Aabb::new(min, max);
        let (x0, y0) = self.key_for(region.min);
        let (x1, y1) = self.key_for(region.max);
        let (x0, y0) = (x0.saturating_sub(1), y0.saturating_sub(1));
        let (x1, y1) = (x1.saturating_add(1), y1.saturating_add(1));

        let cell_count = (i64::from(x1) - i64::from(x0) + 1) * (i64::from(y1) - i64::from(y0) + 1);
        let cells = if cell_count > self.buckets.len() as i64 {
            // Cheaper to walk every occupied bucket than every cell in range
            Cells::Occupied(self.buckets.values())
        } else {
            Cells::Range {
                next: Some((x0, y0)),
                x0,
                x1,
                y1,
            }
        };

        Search {
            hash: self,
            region,
            cells,
            current: <&[H]>::default().iter(),
            fallback_pending: true,
        }
    }

    /// Collect the result of [`search`](Self::search) into `out`
    ///
    /// `out` is cleared first.
    pub fn search_into(&self, min: Vec2, max: Vec2, out: &mut Vec<H>) {
        out.clear();
        out.extend(self.search(min, max));
    }

    /// Collect the result of [`search`](Self::search)
    pub fn search_collect(&self, min: Vec2, max: Vec2) -> Vec<H> {
        self.search(min, max).collect()
    }

    fn key_for(&self, point: Vec2) -> BucketKey {
        // `as` saturates for out-of-range floats, NaN maps to 0
        (
            (point.x / self.bucket_size).floor() as i32,
            (point.y / self.bucket_size).floor() as i32,
        )
    }
}

impl<H: Copy + Eq + Hash> Default for SpatialHash<H> {
    fn default() -> Self {
        Self::new(128.0)
    }
}

#[derive(Debug, Clone)]
enum Cells<'a, H> {
    Range {
        next: Option<BucketKey>,
        x0: i32,
        x1: i32,
        y1: i32,
    },
    Occupied(hash_map::Values<'a, BucketKey, Vec<H>>),
}

/// Lazy region query over a [`SpatialHash`]
#[derive(Debug, Clone)]
pub struct Search<'a, H> {
    hash: &'a SpatialHash<H>,
    region: Aabb,
    cells: Cells<'a, H>,
    current: std::slice::Iter<'a, H>,
    fallback_pending: bool,
}

impl<'a, H: Copy + Eq + Hash> Search<'a, H> {
    fn next_bucket(&mut self) -> Option<&'a [H]> {
        let hash = self.hash;
        match &mut self.cells {
            Cells::Range { next, x0, x1, y1 } => {
                while let Some((x, y)) = *next {
                    *next = if x < *x1 {
                        Some((x + 1, y))
                    } else if y < *y1 {
                        Some((*x0, y + 1))
                    } else {
                        None
                    };
                    if let Some(bucket) = hash.buckets.get(&(x, y)) {
                        return Some(bucket.as_slice());
                    }
                }
            }
            Cells::Occupied(values) => {
                if let Some(bucket) = values.next() {
                    return Some(bucket.as_slice());
                }
            }
        }

        if self.fallback_pending {
            self.fallback_pending = false;
            return Some(hash.fallback.as_slice());
        }
        None
    }
}

impl<'a, H: Copy + Eq + Hash> Iterator for Search<'a, H> {
    type Item = H;

    fn next(&mut self) -> Option<H> {
        loop {
            for handle in self.current.by_ref() {
                let overlaps = self
                    .hash
                    .entries
                    .get(handle)
                    .is_some_and(|entry| entry.bounds.intersects(&self.region));
                if overlaps {
                    return Some(*handle);
                }
            }
            self.current = self.next_bucket()?.iter();
        }
    }
}

impl<H: Copy + Eq + Hash> SpatialQuery<H> for SpatialHash<H> {
    fn update(&mut self, handle: H, bounds: Aabb) {
        SpatialHash::update(self, handle, bounds.min, bounds.max);
    }

    fn remove(&mut self, handle: H) {
        SpatialHash::remove(self, handle);
    }

    fn query_region(&self, region: &Aabb, out: &mut Vec<H>) {
        self.search_into(region.min, region.max, out);
    }

    fn bounds(&self, handle: H) -> Option<Aabb> {
        SpatialHash::bounds(self, handle)
    }

    fn clear(&mut self) {
        SpatialHash::clear(self);
    }

    fn entry_count(&self) -> usize {
        self.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sorted(mut handles: Vec<u32>) -> Vec<u32> {
        handles.sort_unstable();
        handles
    }

    #[test]
    fn test_update_then_search_finds_entry() {
        let mut hash = SpatialHash::new(10.0);
        hash.update(1u32, Vec2::new(2.0, 2.0), Vec2::new(4.0, 4.0));

        assert_eq!(hash.search_collect(Vec2::new(3.0, 3.0), Vec2::new(3.5, 3.5)), vec![1]);
        assert_eq!(hash.search_collect(Vec2::new(4.0, 0.0), Vec2::new(9.0, 2.0)), vec![1]);
        assert!(hash.search_collect(Vec2::new(5.0, 5.0), Vec2::new(9.0, 9.0)).is_empty());
    }

    #[test]
    fn test_remove_hides_entry() {
        let mut hash = SpatialHash::new(10.0);
        hash.update(7u32, Vec2::new(0.0, 0.0), Vec2::new(1.0, 1.0));
        hash.remove(7);
        hash.remove(7);

        assert!(hash.is_empty());
        assert!(hash.search_collect(Vec2::new(-100.0, -100.0), Vec2::new(100.0, 100.0)).is_empty());
    }

    #[test]
    fn test_update_relocates() {
        let mut hash = SpatialHash::new(10.0);
        hash.update(3u32, Vec2::new(0.0, 0.0), Vec2::new(1.0, 1.0));
        hash.update(3u32, Vec2::new(50.0, 50.0), Vec2::new(51.0, 51.0));

        assert_eq!(hash.len(), 1);
        assert!(hash.search_collect(Vec2::new(0.0, 0.0), Vec2::new(1.0, 1.0)).is_empty());
        assert_eq!(hash.search_collect(Vec2::new(49.0, 49.0), Vec2::new(52.0, 52.0)), vec![3]);
    }

    #[test]
    fn test_entry_centered_in_neighbour_bucket() {
        let mut hash = SpatialHash::new(10.0);
        // Centered at x = 14 (bucket 1) but reaching back into bucket 0
        hash.update(5u32, Vec2::new(6.0, 0.0), Vec2::new(22.0, 2.0));

        assert_eq!(hash.search_collect(Vec2::new(6.5, 0.5), Vec2::new(7.0, 1.0)), vec![5]);
    }

    #[test]
    fn test_large_entries_use_fallback_bucket() {
        let mut hash = SpatialHash::new(10.0);
        hash.update(9u32, Vec2::new(-500.0, -1.0), Vec2::new(500.0, 1.0));
        hash.update(2u32, Vec2::new(0.0, 0.0), Vec2::new(1.0, 1.0));

        assert_eq!(hash.search_collect(Vec2::new(400.0, 0.0), Vec2::new(401.0, 0.5)), vec![9]);
        assert_eq!(
            sorted(hash.search_collect(Vec2::new(0.0, 0.0), Vec2::new(0.5, 0.5))),
            vec![2, 9]
        );

        hash.remove(9);
        assert!(hash.search_collect(Vec2::new(400.0, 0.0), Vec2::new(401.0, 0.5)).is_empty());
    }

    #[test]
    fn test_wide_query_walks_occupied_buckets() {
        let mut hash = SpatialHash::new(1.0);
        for i in 0..20u32 {
            let x = i as f32 * 3.0;
            hash.update(i, Vec2::new(x, 0.0), Vec2::new(x + 0.5, 0.5));
        }

        let all = hash.search_collect(Vec2::new(-1.0e6, -1.0e6), Vec2::new(1.0e6, 1.0e6));
        assert_eq!(sorted(all), (0..20).collect::<Vec<_>>());
    }

    #[test]
    fn test_search_is_restartable() {
        let mut hash = SpatialHash::new(4.0);
        hash.update(1u32, Vec2::new(0.0, 0.0), Vec2::new(1.0, 1.0));
        hash.update(2u32, Vec2::new(2.0, 2.0), Vec2::new(3.0, 3.0));

        let mut search = hash.search(Vec2::new(0.0, 0.0), Vec2::new(3.0, 3.0));
        let restart = search.clone();
        let first = search.next();

        assert!(first.is_some());
        assert_eq!(sorted(restart.collect()), vec![1, 2]);
    }

    #[test]
    fn test_empty_hash_search() {
        let hash: SpatialHash<u32> = SpatialHash::new(8.0);
        assert_eq!(hash.search(Vec2::zeros(), Vec2::new(100.0, 100.0)).count(), 0);
    }

    #[test]
    fn test_clear() {
        let mut hash = SpatialHash::new(8.0);
        hash.update(1u32, Vec2::zeros(), Vec2::new(1.0, 1.0));
        hash.update(2u32, Vec2::zeros(), Vec2::new(100.0, 100.0));
        hash.clear();

        assert!(hash.is_empty());
        assert!(hash.bounds(1).is_none());
        assert_eq!(hash.search(Vec2::zeros(), Vec2::new(100.0, 100.0)).count(), 0);
    }
}
