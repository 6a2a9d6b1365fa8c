//! Rigid links between entities
//!
//! A [`Constraint`] ties two entities together so that moving one moves the
//! other. Either side may be flagged fixed, meaning the link can never drag
//! that side along. [`ConstraintData::walk`] turns the link graph around an
//! entity into the rigid group that has to move as one.
//!
//! Links hold entity keys only. A link whose endpoint has died, or that has
//! been invalidated, is dead: every query skips it and
//! [`ConstraintData::clean_up`] eventually drops it.

use super::{CollisionError, CollisionResult, ConstraintError};
use crate::ecs::{Entity, EntityHost};
use crate::foundation::logging::{debug, trace};
use slotmap::SlotMap;
use std::collections::{HashMap, HashSet};

slotmap::new_key_type! {
    /// Handle to a constraint in [`ConstraintData`]
    pub struct ConstraintId;
}

/// Link between a source and a target entity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Constraint {
    /// First endpoint
    pub source: Entity,
    /// Second endpoint
    pub target: Entity,
    /// Source cannot be dragged through this link
    pub source_fixed: bool,
    /// Target cannot be dragged through this link
    pub target_fixed: bool,
    /// Caller-defined group for bulk lookup and removal
    pub tag: i32,
    /// Set by [`ConstraintData::destroy_constraints`] and friends
    pub invalidated: bool,
}

impl Constraint {
    /// Whether both endpoints are alive and the link was not invalidated
    pub fn is_live(&self, host: &dyn EntityHost) -> bool {
        !self.invalidated && host.is_alive(self.source) && host.is_alive(self.target)
    }

    /// Whether `entity` is one of the endpoints
    pub fn touches(&self, entity: Entity) -> bool {
        self.source == entity || self.target == entity
    }

    /// Far endpoint seen from `entity`, with (near fixed, far fixed)
    fn across(&self, entity: Entity) -> (Entity, bool, bool) {
        if self.source == entity {
            (self.target, self.source_fixed, self.target_fixed)
        } else {
            (self.source, self.target_fixed, self.source_fixed)
        }
    }

    fn matches(&self, tag: Option<i32>) -> bool {
        tag.map_or(true, |t| t == self.tag)
    }
}

/// Store of every constraint plus a per-entity index
#[derive(Debug, Default)]
pub struct ConstraintData {
    constraints: SlotMap<ConstraintId, Constraint>,
    by_entity: HashMap<Entity, Vec<ConstraintId>>,
}

impl ConstraintData {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Link `source` and `target`
    ///
    /// The link is usable from either endpoint. Several links may join the
    /// same pair.
    pub fn create_constraint(
        &mut self,
        source: Entity,
        target: Entity,
        source_fixed: bool,
        target_fixed: bool,
        tag: i32,
    ) -> ConstraintId {
        let id = self.constraints.insert(Constraint {
            source,
            target,
            source_fixed,
            target_fixed,
            tag,
            invalidated: false,
        });
        self.by_entity.entry(source).or_default().push(id);
        if target != source {
            self.by_entity.entry(target).or_default().push(id);
        }
        trace!("linked {:?} -> {:?} as {:?} (tag {})", source, target, id, tag);
        id
    }

    /// Constraint data, dead or alive, until purged
    pub fn constraint(&self, id: ConstraintId) -> Option<&Constraint> {
        self.constraints.get(id)
    }

    /// Number of stored constraints, including dead ones not yet purged
    pub fn len(&self) -> usize {
        self.constraints.len()
    }

    /// Whether nothing is stored
    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    fn live_of<'a>(
        &'a self,
        entity: Entity,
        tag: Option<i32>,
        host: &'a dyn EntityHost,
    ) -> impl Iterator<Item = ConstraintId> + 'a {
        self.by_entity
            .get(&entity)
            .into_iter()
            .flatten()
            .copied()
            .filter(move |id| {
                self.constraints
                    .get(*id)
                    .is_some_and(|c| c.matches(tag) && c.is_live(host))
            })
    }

    /// Whether `entity` has a live constraint, optionally only with `tag`
    pub fn has_constraint(&self, entity: Entity, tag: Option<i32>, host: &dyn EntityHost) -> bool {
        self.live_of(entity, tag, host).next().is_some()
    }

    /// Live constraints touching `entity`, optionally only with `tag`
    pub fn get_constraints(&self, entity: Entity, tag: Option<i32>, host: &dyn EntityHost) -> Vec<ConstraintId> {
        self.live_of(entity, tag, host).collect()
    }

    /// Invalidate every constraint touching `entity`, optionally only with
    /// `tag`; returns how many were newly invalidated
    pub fn destroy_constraints(&mut self, entity: Entity, tag: Option<i32>) -> usize {
        let Some(ids) = self.by_entity.get(&entity) else {
            return 0;
        };
        let mut count = 0;
        for id in ids {
            if let Some(c) = self.constraints.get_mut(*id) {
                if c.matches(tag) && !c.invalidated {
                    c.invalidated = true;
                    count += 1;
                }
            }
        }
        count
    }

    /// Invalidate one constraint
    pub fn invalidate(&mut self, id: ConstraintId) -> CollisionResult<()> {
        let constraint = self
            .constraints
            .get_mut(id)
            .ok_or(CollisionError::ConstraintNotFound(id))?;
        constraint.invalidated = true;
        Ok(())
    }

    /// Drop every dead constraint; returns how many were removed
    ///
    /// Calling it again without intervening changes removes nothing.
    pub fn clean_up(&mut self, host: &dyn EntityHost) -> usize {
        let before = self.constraints.len();
        self.constraints.retain(|_, c| c.is_live(host));
        let constraints = &self.constraints;
        self.by_entity.retain(|_, ids| {
            ids.retain(|id| constraints.contains_key(*id));
            !ids.is_empty()
        });
        let removed = before - self.constraints.len();
        if removed > 0 {
            debug!("purged {} dead constraints", removed);
        }
        removed
    }

    /// Rigid group that moves together with `entity`
    ///
    /// Follows every live constraint once, starting from `entity`. The first
    /// element of the group is always `entity` itself.
    ///
    /// # Errors
    ///
    /// * [`ConstraintError::FixedEndpoint`] when a followed link pins its
    ///   far side.
    /// * [`ConstraintError::FixedCycle`] when two paths meet at a node and
    ///   either of them has left a fixed endpoint on the way.
    pub fn walk(&self, entity: Entity, host: &dyn EntityHost) -> Result<Vec<Entity>, ConstraintError> {
        let mut group = vec![entity];
        let mut tainted_at = HashMap::from([(entity, false)]);
        let mut followed = HashSet::new();
        let mut stack = vec![(entity, false)];

        while let Some((node, tainted)) = stack.pop() {
            for id in self.live_of(node, None, host) {
                if !followed.insert(id) {
                    continue;
                }
                let Some(constraint) = self.constraints.get(id) else {
                    continue;
                };
                let (other, near_fixed, far_fixed) = constraint.across(node);
                if far_fixed {
                    return Err(ConstraintError::FixedEndpoint {
                        constraint: id,
                        entity: other,
                    });
                }
                let taint = tainted || near_fixed;
                if let Some(&seen_tainted) = tainted_at.get(&other) {
                    if taint || seen_tainted {
                        return Err(ConstraintError::FixedCycle { entity: other });
                    }
                    continue;
                }
                tainted_at.insert(other, taint);
                group.push(other);
                stack.push((other, taint));
            }
        }

        Ok(group)
    }
}
