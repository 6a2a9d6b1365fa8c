//! Body store and broad-phase index
//!
//! [`CollisionData`] owns every [`Body`], keeps them indexed by bounding box
//! in a [`SpatialQuery`] implementation and answers read-only overlap
//! queries. The broad phase only narrows candidates; every query result
//! passes an exact outline test before it is returned.
//!
//! Bodies whose owner is no longer alive are skipped by every query and
//! dropped by [`CollisionData::clean_up`].

use super::primitives::{circle_overlaps_outline, outlines_overlap, segment_overlaps_outline};
use super::{Body, BodyId, CollisionError, CollisionLayers, CollisionResult};
use crate::config::CollisionConfig;
use crate::ecs::{Entity, EntityHost};
use crate::foundation::logging::{debug, trace};
use crate::foundation::math::{Aabb, Vec2};
use crate::spatial::{SpatialHash, SpatialQuery};
use crate::world::{GeometrySource, Segment};
use slotmap::SlotMap;
use std::collections::HashMap;

/// Per-entity rectangles plus their spatial index
pub struct CollisionData {
    /// Every body, alive or stale
    bodies: SlotMap<BodyId, Body>,

    /// Bodies owned by each entity, in creation order
    by_entity: HashMap<Entity, Vec<BodyId>>,

    /// Broad-phase index over body bounds
    spatial_query: Box<dyn SpatialQuery<BodyId>>,

    /// Penetration depth below which two outlines count as touching only
    overlap_tolerance: f32,
}

impl CollisionData {
    /// Create an empty store indexed by a [`SpatialHash`] with `bucket_size`
    pub fn new(bucket_size: f32) -> Self {
        Self::with_spatial_query(Box::new(SpatialHash::new(bucket_size)))
    }

    /// Create an empty store using settings from `config`
    pub fn from_config(config: &CollisionConfig) -> Self {
        let mut data = Self::new(config.bucket_size);
        data.overlap_tolerance = config.overlap_tolerance;
        data
    }

    /// Create an empty store on top of any spatial index
    pub fn with_spatial_query(spatial_query: Box<dyn SpatialQuery<BodyId>>) -> Self {
        Self {
            bodies: SlotMap::with_key(),
            by_entity: HashMap::new(),
            spatial_query,
            overlap_tolerance: CollisionConfig::default().overlap_tolerance,
        }
    }

    /// Attach a new zeroed body to `entity` and index it at the owner's origin
    ///
    /// Fails with [`CollisionError::EntityNotFound`] when `entity` is dead.
    pub fn create_obj(&mut self, entity: Entity, host: &dyn EntityHost) -> CollisionResult<BodyId> {
        if !host.is_alive(entity) {
            return Err(CollisionError::EntityNotFound(entity));
        }
        let id = self.bodies.insert(Body::new(entity));
        self.by_entity.entry(entity).or_default().push(id);
        self.reindex(id, host);
        trace!("created body {:?} for {:?}", id, entity);
        Ok(id)
    }

    /// Destroy one body; returns whether it existed
    pub fn destroy_obj(&mut self, id: BodyId) -> bool {
        let Some(body) = self.bodies.remove(id) else {
            return false;
        };
        self.spatial_query.remove(id);
        if let Some(owned) = self.by_entity.get_mut(&body.owner) {
            owned.retain(|b| *b != id);
            if owned.is_empty() {
                self.by_entity.remove(&body.owner);
            }
        }
        true
    }

    /// Destroy every body owned by `entity`; returns how many were removed
    pub fn destroy_all(&mut self, entity: Entity) -> usize {
        let owned = self.by_entity.remove(&entity).unwrap_or_default();
        for id in &owned {
            self.bodies.remove(*id);
            self.spatial_query.remove(*id);
        }
        owned.len()
    }

    /// Drop the bodies of an entity the host reported destroyed
    pub fn entity_destroyed(&mut self, entity: Entity) -> usize {
        let removed = self.destroy_all(entity);
        if removed > 0 {
            debug!("dropped {} bodies of destroyed {:?}", removed, entity);
        }
        removed
    }

    /// Remove every body
    pub fn clear(&mut self) {
        self.bodies.clear();
        self.by_entity.clear();
        self.spatial_query.clear();
    }

    /// Body data
    pub fn body(&self, id: BodyId) -> Option<&Body> {
        self.bodies.get(id)
    }

    /// Owning entity of a body
    pub fn owner(&self, id: BodyId) -> Option<Entity> {
        self.bodies.get(id).map(|b| b.owner)
    }

    /// Bodies owned by `entity`, in creation order
    pub fn bodies_of(&self, entity: Entity) -> &[BodyId] {
        self.by_entity.get(&entity).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Iterate over every stored body, including ones with dead owners
    pub fn iter(&self) -> impl Iterator<Item = (BodyId, &Body)> {
        self.bodies.iter()
    }

    /// Number of stored bodies
    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    /// Whether the store holds no bodies
    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    fn body_mut(&mut self, id: BodyId) -> CollisionResult<&mut Body> {
        self.bodies.get_mut(id).ok_or(CollisionError::BodyNotFound(id))
    }

    /// Move the rectangle center relative to the owner and re-index it
    pub fn set_offset(&mut self, id: BodyId, offset: Vec2, host: &dyn EntityHost) -> CollisionResult<()> {
        self.body_mut(id)?.offset = offset;
        self.reindex(id, host);
        Ok(())
    }

    /// Resize the rectangle and re-index it
    pub fn set_size(&mut self, id: BodyId, size: Vec2, host: &dyn EntityHost) -> CollisionResult<()> {
        self.body_mut(id)?.size = size.abs();
        self.reindex(id, host);
        Ok(())
    }

    /// Set what the body is
    pub fn set_collide_type(&mut self, id: BodyId, collide_type: CollisionLayers) -> CollisionResult<()> {
        self.body_mut(id)?.collide_type = collide_type;
        Ok(())
    }

    /// Set what the body runs into
    pub fn set_collide_mask(&mut self, id: BodyId, collide_mask: CollisionLayers) -> CollisionResult<()> {
        self.body_mut(id)?.collide_mask = collide_mask;
        Ok(())
    }

    /// Recompute and re-index the bounds of every body owned by `entity`
    ///
    /// Must run whenever the entity's origin or rotation changes. Does
    /// nothing for dead entities; their bodies are purged by [`clean_up`].
    ///
    /// [`clean_up`]: CollisionData::clean_up
    pub fn update_spatial_hash(&mut self, entity: Entity, host: &dyn EntityHost) {
        let Some(owned) = self.by_entity.get(&entity) else {
            return;
        };
        for id in owned.clone() {
            self.reindex(id, host);
        }
    }

    fn reindex(&mut self, id: BodyId, host: &dyn EntityHost) {
        if let Some(bounds) = self.aabb(id, host) {
            self.spatial_query.update(id, bounds);
        }
    }

    /// Whether the body exists and its owner is alive
    pub fn is_live(&self, id: BodyId, host: &dyn EntityHost) -> bool {
        self.bodies.get(id).is_some_and(|b| host.is_alive(b.owner))
    }

    /// World-space corners ul, ur, dr, dl
    pub fn corners(&self, id: BodyId, host: &dyn EntityHost) -> Option<[Vec2; 4]> {
        let body = self.bodies.get(id)?;
        Some(body.corners(&host.transform(body.owner)?))
    }

    /// Clockwise world-space edges
    pub fn edges(&self, id: BodyId, host: &dyn EntityHost) -> Option<[Segment; 4]> {
        let body = self.bodies.get(id)?;
        Some(body.edges(&host.transform(body.owner)?))
    }

    /// World-space bounding box
    pub fn aabb(&self, id: BodyId, host: &dyn EntityHost) -> Option<Aabb> {
        let body = self.bodies.get(id)?;
        Some(body.aabb(&host.transform(body.owner)?))
    }

    /// Live broad-phase candidates overlapping `region`, filtered by type
    ///
    /// `out` is cleared first.
    pub(crate) fn candidates(
        &self,
        region: &Aabb,
        filter: Option<CollisionLayers>,
        host: &dyn EntityHost,
        out: &mut Vec<BodyId>,
    ) {
        self.spatial_query.query_region(region, out);
        out.retain(|id| {
            self.bodies.get(*id).is_some_and(|b| {
                host.is_alive(b.owner) && filter.map_or(true, |f| CollisionLayers::blocks(f, b.collide_type))
            })
        });
    }

    /// Bodies touching `region`
    pub fn get_bodies_in_region(
        &self,
        region: &Aabb,
        filter: Option<CollisionLayers>,
        host: &dyn EntityHost,
    ) -> Vec<BodyId> {
        let outline = region.corners();
        let mut found = Vec::new();
        self.candidates(region, filter, host, &mut found);
        found.retain(|id| self.corners(*id, host).is_some_and(|c| outlines_overlap(&outline, &c, 0.0)));
        found
    }

    /// Bodies touching the circle at `center` with `radius`
    pub fn get_bodies_in_radius(
        &self,
        center: Vec2,
        radius: f32,
        filter: Option<CollisionLayers>,
        host: &dyn EntityHost,
    ) -> Vec<BodyId> {
        let radius = radius.abs();
        let region = Aabb::from_center_extents(center, Vec2::new(radius, radius));
        let mut found = Vec::new();
        self.candidates(&region, filter, host, &mut found);
        found.retain(|id| {
            self.corners(*id, host)
                .is_some_and(|c| circle_overlaps_outline(center, radius, &c))
        });
        found
    }

    /// Bodies of other entities that overlap `id`
    ///
    /// Resting contact does not count as overlap.
    pub fn get_bodies_in_body(&self, id: BodyId, filter: Option<CollisionLayers>, host: &dyn EntityHost) -> Vec<BodyId> {
        let (Some(owner), Some(outline), Some(bounds)) = (self.owner(id), self.corners(id, host), self.aabb(id, host))
        else {
            return Vec::new();
        };
        if !host.is_alive(owner) {
            return Vec::new();
        }
        let mut found = Vec::new();
        self.candidates(&bounds, filter, host, &mut found);
        found.retain(|other| {
            self.owner(*other) != Some(owner)
                && self
                    .corners(*other, host)
                    .is_some_and(|c| outlines_overlap(&outline, &c, self.overlap_tolerance))
        });
        found
    }

    /// Distinct live entities owning a body that touches `region`
    pub fn get_entities_in_region(
        &self,
        region: &Aabb,
        filter: Option<CollisionLayers>,
        host: &dyn EntityHost,
    ) -> Vec<Entity> {
        let mut entities: Vec<Entity> = Vec::new();
        for id in self.get_bodies_in_region(region, filter, host) {
            if let Some(owner) = self.owner(id) {
                if !entities.contains(&owner) {
                    entities.push(owner);
                }
            }
        }
        entities
    }

    /// Whether any body owned by `entity` touches `region`
    pub fn source_in_region(&self, entity: Entity, region: &Aabb, host: &dyn EntityHost) -> bool {
        host.is_alive(entity)
            && self
                .bodies_of(entity)
                .iter()
                .any(|id| self.body_in_region(*id, region, host))
    }

    /// Whether body `id` touches `region`
    pub fn body_in_region(&self, id: BodyId, region: &Aabb, host: &dyn EntityHost) -> bool {
        self.is_live(id, host)
            && self
                .corners(id, host)
                .is_some_and(|c| outlines_overlap(&region.corners(), &c, 0.0))
    }

    /// Whether body `id` cuts into any world segment
    pub fn body_overlaps_world(&self, id: BodyId, geometry: &dyn GeometrySource, host: &dyn EntityHost) -> bool {
        let (Some(outline), Some(bounds)) = (self.corners(id, host), self.aabb(id, host)) else {
            return false;
        };
        if !self.is_live(id, host) {
            return false;
        }
        let mut segments = Vec::new();
        geometry.search(&bounds, &mut segments);
        segments
            .iter()
            .filter(|s| !s.is_degenerate())
            .any(|s| segment_overlaps_outline(s, &outline, self.overlap_tolerance))
    }

    /// Drop bodies whose owner has died; returns how many were removed
    ///
    /// Calling it again without intervening changes removes nothing.
    pub fn clean_up(&mut self, host: &dyn EntityHost) -> usize {
        let dead: Vec<Entity> = self
            .by_entity
            .keys()
            .copied()
            .filter(|e| !host.is_alive(*e))
            .collect();
        let removed = dead.into_iter().map(|e| self.destroy_all(e)).sum();
        if removed > 0 {
            debug!("purged {} stale bodies", removed);
        }
        removed
    }
}

impl Default for CollisionData {
    fn default() -> Self {
        Self::from_config(&CollisionConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::Entities;
    use crate::world::SegmentWorld;

    fn square(data: &mut CollisionData, host: &mut Entities, at: Vec2, layer: CollisionLayers) -> (Entity, BodyId) {
        let entity = host.spawn(at);
        let id = data.create_obj(entity, host).unwrap();
        data.set_size(id, Vec2::new(2.0, 2.0), host).unwrap();
        data.set_collide_type(id, layer).unwrap();
        (entity, id)
    }

    #[test]
    fn test_create_obj_is_zeroed_and_indexed() {
        let mut host = Entities::new();
        let mut data = CollisionData::default();
        let entity = host.spawn(Vec2::new(3.0, 4.0));
        let id = data.create_obj(entity, &host).unwrap();

        let body = data.body(id).unwrap();
        assert_eq!(body.size, Vec2::zeros());
        assert!(body.collide_type.is_empty());
        assert_eq!(data.bodies_of(entity), &[id]);

        let region = Aabb::from_center_extents(Vec2::new(3.0, 4.0), Vec2::new(0.5, 0.5));
        assert_eq!(data.get_bodies_in_region(&region, None, &host), vec![id]);
    }

    #[test]
    fn test_create_obj_on_dead_entity_fails() {
        let mut host = Entities::new();
        let mut data = CollisionData::default();
        let entity = host.spawn(Vec2::zeros());
        host.despawn(entity);

        assert_eq!(data.create_obj(entity, &host), Err(CollisionError::EntityNotFound(entity)));
        assert!(data.is_empty());
        assert!(data.bodies_of(entity).is_empty());
    }

    #[test]
    fn test_region_query_filters_by_type() {
        let mut host = Entities::new();
        let mut data = CollisionData::default();
        let (_, crate_body) = square(&mut data, &mut host, Vec2::zeros(), CollisionLayers::DEBRIS);
        let (_, enemy_body) = square(&mut data, &mut host, Vec2::new(1.5, 0.0), CollisionLayers::ENEMY);

        let region = Aabb::new(Vec2::new(0.5, -0.5), Vec2::new(0.8, 0.5));
        let mut all = data.get_bodies_in_region(&region, None, &host);
        all.sort();
        let mut expected = vec![crate_body, enemy_body];
        expected.sort();
        assert_eq!(all, expected);

        assert_eq!(
            data.get_bodies_in_region(&region, Some(CollisionLayers::DEBRIS), &host),
            vec![crate_body]
        );
        assert!(data
            .get_bodies_in_region(&region, Some(CollisionLayers::PICKUP), &host)
            .is_empty());
    }

    #[test]
    fn test_rotated_body_exact_test() {
        let mut host = Entities::new();
        let mut data = CollisionData::default();
        let (entity, id) = square(&mut data, &mut host, Vec2::zeros(), CollisionLayers::DEBRIS);
        host.set_rotation(entity, std::f32::consts::FRAC_PI_4);
        data.update_spatial_hash(entity, &host);

        // Inside the axis-aligned bounds but outside the diamond
        let corner = Aabb::from_center_extents(Vec2::new(1.2, 1.2), Vec2::new(0.1, 0.1));
        assert!(data.aabb(id, &host).unwrap().intersects(&corner));
        assert!(!data.body_in_region(id, &corner, &host));
        assert!(data.body_in_region(id, &Aabb::from_center_extents(Vec2::new(1.3, 0.0), Vec2::new(0.1, 0.1)), &host));
    }

    #[test]
    fn test_radius_query() {
        let mut host = Entities::new();
        let mut data = CollisionData::default();
        let (_, id) = square(&mut data, &mut host, Vec2::new(5.0, 0.0), CollisionLayers::PICKUP);
        assert_eq!(data.get_bodies_in_radius(Vec2::zeros(), 4.0, None, &host), vec![id]);
        assert!(data.get_bodies_in_radius(Vec2::zeros(), 3.9, None, &host).is_empty());
    }

    #[test]
    fn test_bodies_in_body_ignores_touching_and_own_bodies() {
        let mut host = Entities::new();
        let mut data = CollisionData::default();
        let (entity, a) = square(&mut data, &mut host, Vec2::zeros(), CollisionLayers::DEBRIS);
        let sibling = data.create_obj(entity, &host).unwrap();
        data.set_size(sibling, Vec2::new(1.0, 1.0), &host).unwrap();
        let (_, touching) = square(&mut data, &mut host, Vec2::new(2.0, 0.0), CollisionLayers::DEBRIS);
        let (_, overlapping) = square(&mut data, &mut host, Vec2::new(0.0, -1.5), CollisionLayers::DEBRIS);

        let found = data.get_bodies_in_body(a, None, &host);
        assert_eq!(found, vec![overlapping]);
        assert!(!found.contains(&touching));
    }

    #[test]
    fn test_entities_in_region_are_distinct() {
        let mut host = Entities::new();
        let mut data = CollisionData::default();
        let (entity, _) = square(&mut data, &mut host, Vec2::zeros(), CollisionLayers::DEBRIS);
        let extra = data.create_obj(entity, &host).unwrap();
        data.set_size(extra, Vec2::new(1.0, 1.0), &host).unwrap();

        let region = Aabb::from_center_extents(Vec2::zeros(), Vec2::new(0.2, 0.2));
        assert_eq!(data.get_entities_in_region(&region, None, &host), vec![entity]);
        assert!(data.source_in_region(entity, &region, &host));
    }

    #[test]
    fn test_body_overlaps_world() {
        let mut host = Entities::new();
        let mut data = CollisionData::default();
        let mut world = SegmentWorld::default();
        world.add_block(Aabb::new(Vec2::new(5.0, -5.0), Vec2::new(6.0, 5.0)));

        let (entity, id) = square(&mut data, &mut host, Vec2::new(4.0, 0.0), CollisionLayers::PLAYER);
        assert!(!data.body_overlaps_world(id, &world, &host));

        host.set_origin(entity, Vec2::new(4.5, 0.0));
        data.update_spatial_hash(entity, &host);
        assert!(data.body_overlaps_world(id, &world, &host));
    }

    #[test]
    fn test_dead_owner_is_skipped_then_purged() {
        let mut host = Entities::new();
        let mut data = CollisionData::default();
        let (entity, id) = square(&mut data, &mut host, Vec2::zeros(), CollisionLayers::DEBRIS);
        host.despawn(entity);

        let region = Aabb::from_center_extents(Vec2::zeros(), Vec2::new(1.0, 1.0));
        assert!(data.get_bodies_in_region(&region, None, &host).is_empty());
        assert!(data.body(id).is_some());

        assert_eq!(data.clean_up(&host), 1);
        assert!(data.body(id).is_none());
        assert_eq!(data.clean_up(&host), 0);
        assert!(data.is_empty());
    }

    #[test]
    fn test_destroy_obj_and_destroy_all() {
        let mut host = Entities::new();
        let mut data = CollisionData::default();
        let (entity, a) = square(&mut data, &mut host, Vec2::zeros(), CollisionLayers::DEBRIS);
        let b = data.create_obj(entity, &host).unwrap();

        assert!(data.destroy_obj(a));
        assert!(!data.destroy_obj(a));
        assert_eq!(data.bodies_of(entity), &[b]);
        assert_eq!(data.destroy_all(entity), 1);
        assert!(data.bodies_of(entity).is_empty());
        assert_eq!(
            data.set_size(a, Vec2::new(1.0, 1.0), &host),
            Err(CollisionError::BodyNotFound(a))
        );
    }
}
