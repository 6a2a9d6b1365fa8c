//! Swept movement of rigid groups
//!
//! [`Collision`] ties the body store, the constraint store and a static
//! geometry source together. Movement requests are resolved for the whole
//! rigid group of the requested entity:
//!
//! * [`Collision::collider_move`] sweeps every group member along the
//!   requested vector, pushes blocking bodies out of the way when allowed
//!   and commits the largest fraction the whole group can travel.
//! * [`Collision::collider_rotate`] sweeps the group around a pivot. It
//!   never pushes; any blocking body limits the rotation.
//!
//! Pushes are applied as they are resolved. Every origin change is
//! recorded in a journal so that a group that ends up short of its push
//! target can undo the pushes and resolve again at the reduced distance.

use super::sweep::{self, ArcTolerance};
use super::{BodyId, CollisionData, CollisionLayers, ConstraintData};
use crate::config::CollisionConfig;
use crate::debug::{CollisionDebugVisualizer, DebugDrawSystem};
use crate::ecs::{Entity, EntityEvent, EntityHost};
use crate::foundation::logging::{debug, trace};
use crate::foundation::math::{utils, Aabb, Vec2};
use crate::world::{GeometrySource, Segment};
use std::collections::{HashMap, HashSet};

/// Entity displaced by a push
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PushedEntity {
    /// Pushed entity
    pub entity: Entity,
    /// How far it moved
    pub movement: Vec2,
}

/// Outcome of [`Collision::collider_move`]
#[derive(Debug, Clone, PartialEq)]
pub struct MoveResult {
    /// Applied movement, `ratio * requested`
    pub movement: Vec2,
    /// Fraction of the request that was applied, in `[0, 1]`
    pub ratio: f32,
    /// Entities outside the moved group that were pushed along
    pub pushed: Vec<PushedEntity>,
}

impl MoveResult {
    fn denied() -> Self {
        Self {
            movement: Vec2::zeros(),
            ratio: 0.0,
            pushed: Vec::new(),
        }
    }

    /// Whether the full request was applied
    pub fn is_complete(&self) -> bool {
        self.ratio >= 1.0
    }
}

/// Outcome of [`Collision::collider_rotate`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotateResult {
    /// Applied rotation in radians, same sign as the request
    pub rotation: f32,
    /// Fraction of the request that was applied, in `[0, 1]`
    pub ratio: f32,
}

/// Origin of an entity before a move was applied
#[derive(Debug, Clone, Copy)]
struct JournalEntry {
    entity: Entity,
    from: Vec2,
}

/// Collision facade
pub struct Collision {
    bodies: CollisionData,
    constraints: ConstraintData,
    config: CollisionConfig,

    /// Styling for [`Collision::render`]
    pub debug: CollisionDebugVisualizer,
}

impl Collision {
    /// Create a facade with default settings
    pub fn new() -> Self {
        Self::with_config(CollisionConfig::default())
    }

    /// Create a facade with the given settings
    pub fn with_config(config: CollisionConfig) -> Self {
        Self {
            bodies: CollisionData::from_config(&config),
            constraints: ConstraintData::new(),
            config,
            debug: CollisionDebugVisualizer::new(),
        }
    }

    /// Active settings
    pub fn config(&self) -> &CollisionConfig {
        &self.config
    }

    /// Body store
    pub fn bodies(&self) -> &CollisionData {
        &self.bodies
    }

    /// Mutable body store
    pub fn bodies_mut(&mut self) -> &mut CollisionData {
        &mut self.bodies
    }

    /// Constraint store
    pub fn constraints(&self) -> &ConstraintData {
        &self.constraints
    }

    /// Mutable constraint store
    pub fn constraints_mut(&mut self) -> &mut ConstraintData {
        &mut self.constraints
    }

    /// Move `entity` and its rigid group by up to `movement`
    ///
    /// Bodies whose type intersects `push_mask` are pushed ahead of the
    /// group, recursively up to `push_max` levels deep. Returns a zero
    /// result when the constraint walk refuses the group.
    pub fn collider_move(
        &mut self,
        host: &mut dyn EntityHost,
        geometry: &dyn GeometrySource,
        entity: Entity,
        movement: Vec2,
        push_mask: CollisionLayers,
        push_max: u32,
    ) -> MoveResult {
        if !host.is_alive(entity) {
            return MoveResult::denied();
        }
        if movement == Vec2::zeros() {
            return MoveResult {
                ratio: 1.0,
                ..MoveResult::denied()
            };
        }

        let group = match self.constraints.walk(entity, &*host) {
            Ok(group) => group,
            Err(err) => {
                debug!("move of {:?} denied: {}", entity, err);
                return MoveResult::denied();
            }
        };

        let mut journal = Vec::new();
        let ratio = self
            .move_group(host, geometry, &group, movement, push_mask, push_max, &HashSet::new(), &mut journal)
            .clamp(0.0, 1.0);

        MoveResult {
            movement: movement * ratio,
            ratio,
            pushed: Self::pushed_from_journal(&*host, &group, &journal),
        }
    }

    /// Resolve and commit one group; returns the applied fraction of `movement`
    fn move_group(
        &mut self,
        host: &mut dyn EntityHost,
        geometry: &dyn GeometrySource,
        group: &[Entity],
        movement: Vec2,
        push_mask: CollisionLayers,
        push_budget: u32,
        exclude: &HashSet<Entity>,
        journal: &mut Vec<JournalEntry>,
    ) -> f32 {
        let epsilon = self.config.sweep_tolerance;
        let mark = journal.len();
        let mut excluded = exclude.clone();
        excluded.extend(group.iter().copied());

        let mut scale = 1.0;
        for pass in 0..self.config.max_resolve_passes {
            let step = movement * scale;
            let ratio = self.resolve_group(host, geometry, group, step, push_mask, push_budget, &excluded, journal);
            if ratio >= 1.0 - epsilon || journal.len() == mark {
                self.commit(host, group, step * ratio, journal);
                return scale * ratio;
            }

            // Pushed bodies went further than the group can follow
            trace!("rolling back {} moves (pass {}, ratio {})", journal.len() - mark, pass, ratio);
            self.rollback(host, journal, mark);
            scale *= ratio;
            if scale <= epsilon {
                return 0.0;
            }
        }

        let step = movement * scale;
        let ratio = self.resolve_group(host, geometry, group, step, push_mask, 0, &excluded, journal);
        self.commit(host, group, step * ratio, journal);
        scale * ratio
    }

    /// Blocking fraction of `movement` for the group, pushing what it can
    fn resolve_group(
        &mut self,
        host: &mut dyn EntityHost,
        geometry: &dyn GeometrySource,
        group: &[Entity],
        movement: Vec2,
        push_mask: CollisionLayers,
        push_budget: u32,
        excluded: &HashSet<Entity>,
        journal: &mut Vec<JournalEntry>,
    ) -> f32 {
        let tolerance = self.config.sweep_tolerance;
        let mut limit: f32 = 1.0;
        let mut blockers: HashMap<Entity, f32> = HashMap::new();
        let mut segments = Vec::new();
        let mut candidates = Vec::new();

        for &member in group {
            for &id in self.bodies.bodies_of(member) {
                let (Some(body), Some(outline)) = (self.bodies.body(id), self.bodies.corners(id, &*host)) else {
                    continue;
                };
                let Some(start) = Aabb::from_points(&outline) else {
                    continue;
                };
                let region = start.merged(&start.translated(movement)).expanded(tolerance);

                if body.collide_mask.contains(CollisionLayers::WORLD) {
                    geometry.search(&region, &mut segments);
                    limit = limit.min(sweep::translate_against_all(&outline, movement, &segments, tolerance));
                }

                if body.collide_mask.is_empty() {
                    continue;
                }
                self.bodies.candidates(&region, Some(body.collide_mask), &*host, &mut candidates);
                for &other in &candidates {
                    let Some(owner) = self.bodies.owner(other).filter(|o| !excluded.contains(o)) else {
                        continue;
                    };
                    let Some(t) = self.sweep_against_body(&outline, movement, other, &*host) else {
                        continue;
                    };
                    let pushable = self
                        .bodies
                        .body(other)
                        .is_some_and(|b| push_mask.intersects(b.collide_type));
                    if pushable && push_budget > 0 {
                        let entry = blockers.entry(owner).or_insert(t);
                        *entry = entry.min(t);
                    } else {
                        if pushable {
                            debug!("push budget exhausted at {:?}", owner);
                        }
                        limit = limit.min(t);
                    }
                }
            }
        }

        let mut blockers: Vec<(Entity, f32)> = blockers.into_iter().collect();
        blockers.sort_by(|a, b| a.1.total_cmp(&b.1));

        // Fraction of `movement` each already pushed entity travelled
        let mut reached: HashMap<Entity, f32> = HashMap::new();
        for (owner, t) in blockers {
            if t >= limit - tolerance {
                break;
            }
            if let Some(&reach) = reached.get(&owner) {
                limit = limit.min(t + reach);
                continue;
            }

            let pushed_group = match self.constraints.walk(owner, &*host) {
                Ok(g) if !g.iter().any(|e| excluded.contains(e)) => g,
                Ok(_) => {
                    limit = t;
                    continue;
                }
                Err(err) => {
                    debug!("cannot push {:?}: {}", owner, err);
                    limit = t;
                    continue;
                }
            };

            let remaining = limit - t;
            let pushed = self.move_group(
                host,
                geometry,
                &pushed_group,
                movement * remaining,
                push_mask,
                push_budget - 1,
                excluded,
                journal,
            );
            let reach = remaining * pushed;
            for e in pushed_group {
                reached.insert(e, reach);
            }
            limit = limit.min(t + reach);
        }

        limit.clamp(0.0, 1.0)
    }

    fn sweep_against_body(&self, outline: &[Vec2; 4], movement: Vec2, other: BodyId, host: &dyn EntityHost) -> Option<f32> {
        let edges = self.bodies.edges(other, host)?;
        edges
            .iter()
            .filter_map(|edge| sweep::translate_against_segment(outline, movement, edge, self.config.sweep_tolerance))
            .reduce(f32::min)
    }

    fn commit(&mut self, host: &mut dyn EntityHost, group: &[Entity], displacement: Vec2, journal: &mut Vec<JournalEntry>) {
        if displacement == Vec2::zeros() {
            return;
        }
        for &entity in group {
            let Some(from) = host.origin(entity) else {
                continue;
            };
            journal.push(JournalEntry { entity, from });
            host.set_origin(entity, from + displacement);
            self.bodies.update_spatial_hash(entity, &*host);
        }
    }

    fn rollback(&mut self, host: &mut dyn EntityHost, journal: &mut Vec<JournalEntry>, mark: usize) {
        while journal.len() > mark {
            let Some(entry) = journal.pop() else {
                break;
            };
            host.set_origin(entry.entity, entry.from);
            self.bodies.update_spatial_hash(entry.entity, &*host);
        }
    }

    fn pushed_from_journal(host: &dyn EntityHost, group: &[Entity], journal: &[JournalEntry]) -> Vec<PushedEntity> {
        let mut pushed: Vec<PushedEntity> = Vec::new();
        for entry in journal {
            if group.contains(&entry.entity) || pushed.iter().any(|p| p.entity == entry.entity) {
                continue;
            }
            let Some(now) = host.origin(entry.entity) else {
                continue;
            };
            let movement = now - entry.from;
            if movement != Vec2::zeros() {
                pushed.push(PushedEntity {
                    entity: entry.entity,
                    movement,
                });
            }
        }
        pushed
    }

    /// Rotate `entity` and its rigid group by up to `rotate` radians
    ///
    /// The pivot is the entity's origin plus `origin_offset`. Every group
    /// member orbits the pivot and turns by the applied angle. Blocking
    /// bodies are never pushed.
    pub fn collider_rotate(
        &mut self,
        host: &mut dyn EntityHost,
        geometry: &dyn GeometrySource,
        entity: Entity,
        rotate: f32,
        origin_offset: Vec2,
    ) -> RotateResult {
        let denied = RotateResult {
            rotation: 0.0,
            ratio: 0.0,
        };
        let Some(origin) = host.origin(entity) else {
            return denied;
        };
        if rotate == 0.0 {
            return RotateResult { ratio: 1.0, ..denied };
        }

        let group = match self.constraints.walk(entity, &*host) {
            Ok(group) => group,
            Err(err) => {
                debug!("rotation of {:?} denied: {}", entity, err);
                return denied;
            }
        };

        let pivot = origin + origin_offset;
        let limit = self.rotation_limit(&*host, geometry, &group, pivot, rotate);
        let applied = rotate.signum() * limit;

        if applied != 0.0 {
            for &member in &group {
                let Some(transform) = host.transform(member) else {
                    continue;
                };
                host.set_origin(member, utils::rotate_about(transform.origin, pivot, applied));
                host.set_rotation(member, transform.rotation + applied);
                self.bodies.update_spatial_hash(member, &*host);
            }
        }

        RotateResult {
            rotation: applied,
            ratio: (limit / rotate.abs()).clamp(0.0, 1.0),
        }
    }

    fn rotation_limit(&self, host: &dyn EntityHost, geometry: &dyn GeometrySource, group: &[Entity], pivot: Vec2, rotate: f32) -> f32 {
        let tolerance = ArcTolerance {
            linear: self.config.sweep_tolerance,
            angular: self.config.angular_tolerance,
        };
        let mut limit = rotate.abs();
        let mut segments = Vec::new();
        let mut candidates = Vec::new();

        for &member in group {
            for &id in self.bodies.bodies_of(member) {
                let (Some(body), Some(outline)) = (self.bodies.body(id), self.bodies.corners(id, host)) else {
                    continue;
                };
                let reach = outline.iter().map(|c| (c - pivot).norm()).fold(0.0, f32::max);
                let region = Aabb::from_center_extents(pivot, Vec2::new(reach, reach)).expanded(tolerance.linear);

                if body.collide_mask.contains(CollisionLayers::WORLD) {
                    geometry.search(&region, &mut segments);
                    limit = limit.min(sweep::rotate_against_all(&outline, pivot, rotate, &segments, tolerance));
                }

                if body.collide_mask.is_empty() {
                    continue;
                }
                self.bodies.candidates(&region, Some(body.collide_mask), host, &mut candidates);
                for &other in &candidates {
                    if self.bodies.owner(other).map_or(true, |o| group.contains(&o)) {
                        continue;
                    }
                    if let Some(edges) = self.bodies.edges(other, host) {
                        limit = limit.min(sweep::rotate_against_all(&outline, pivot, rotate, &edges, tolerance));
                    }
                }
            }
        }

        limit
    }

    /// Whether body `id` overlaps world geometry (when `mask` has
    /// [`CollisionLayers::WORLD`]) or a body of another entity whose type
    /// intersects `mask`
    pub fn body_check(&self, host: &dyn EntityHost, geometry: &dyn GeometrySource, id: BodyId, mask: CollisionLayers) -> bool {
        if mask.contains(CollisionLayers::WORLD) && self.bodies.body_overlaps_world(id, geometry, host) {
            return true;
        }
        !mask.is_empty() && !self.bodies.get_bodies_in_body(id, Some(mask), host).is_empty()
    }

    /// Whether any body of `entity` passes [`body_check`](Collision::body_check)
    pub fn source_check(&self, host: &dyn EntityHost, geometry: &dyn GeometrySource, entity: Entity, mask: CollisionLayers) -> bool {
        self.bodies
            .bodies_of(entity)
            .iter()
            .any(|id| self.body_check(host, geometry, *id, mask))
    }

    /// Re-index the bodies of an entity whose transform changed outside the facade
    pub fn entity_moved(&mut self, entity: Entity, host: &dyn EntityHost) {
        self.bodies.update_spatial_hash(entity, host);
    }

    /// Apply pending host notifications; returns how many were handled
    ///
    /// Moved entities are re-indexed. Destroyed entities lose their bodies
    /// and their constraints are invalidated.
    pub fn process_events(&mut self, host: &mut dyn EntityHost) -> usize {
        let events = host.drain_events();
        for event in &events {
            match *event {
                EntityEvent::Moved(entity) => self.bodies.update_spatial_hash(entity, &*host),
                EntityEvent::Destroyed(entity) => {
                    self.bodies.entity_destroyed(entity);
                    self.constraints.destroy_constraints(entity, None);
                }
            }
        }
        events.len()
    }

    /// Queue one frame of debug shapes for everything inside `view`
    ///
    /// With bounds display on, `view` itself is kept as a persistent shape.
    pub fn render(&self, host: &dyn EntityHost, geometry: &dyn GeometrySource, view: &Aabb, draw: &mut DebugDrawSystem) {
        if self.debug.show_bounds {
            self.debug.draw_view(draw, view);
        }

        let mut segments: Vec<Segment> = Vec::new();
        geometry.search(view, &mut segments);
        for segment in &segments {
            self.debug.draw_segment(draw, segment);
        }

        let mut visible = Vec::new();
        self.bodies.candidates(view, None, host, &mut visible);
        for id in visible {
            let (Some(body), Some(corners), Some(bounds)) =
                (self.bodies.body(id), self.bodies.corners(id, host), self.bodies.aabb(id, host))
            else {
                continue;
            };
            let overlapping = self.body_check(host, geometry, id, body.collide_mask);
            self.debug.draw_body(draw, &corners, &bounds, overlapping);
        }
    }

    /// Purge stale bodies and dead constraints; returns how many were removed
    pub fn clean_up(&mut self, host: &dyn EntityHost) -> usize {
        self.bodies.clean_up(host) + self.constraints.clean_up(host)
    }
}

impl Default for Collision {
    fn default() -> Self {
        Self::new()
    }
}
