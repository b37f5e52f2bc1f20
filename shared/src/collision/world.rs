//! Body registry.
//!
//! The `World` is the single owner of every `Body`. Players and movers refer
//! to bodies by `BodyId` and look them up here; a missing id means the body is
//! gone and callers skip it.
//!
//! Bodies are stored in creation order. Ids are assigned monotonically and
//! removal preserves order, so the vector stays sorted by id and lookups are a
//! binary search. Iteration order is therefore always ascending id.

use serde::{Deserialize, Serialize};

use super::types::{Body, BodyId, BodyKind};
use crate::vector::Vec3;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "WorldRepr")]
pub struct World {
    bodies: Vec<Body>,
    broad_phase_cell_size: f32,
    next_id: BodyId,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WorldRepr {
    bodies: Vec<Body>,
    broad_phase_cell_size: f32,
    #[serde(default)]
    next_id: BodyId,
}

impl From<WorldRepr> for World {
    fn from(repr: WorldRepr) -> Self {
        let mut bodies = repr.bodies;
        bodies.sort_by_key(|b| b.id());
        bodies.dedup_by_key(|b| b.id());

        // Never hand out an id that is already present.
        let after_last = bodies.last().map_or(0, |b| b.id() + 1);
        Self {
            bodies,
            broad_phase_cell_size: repr.broad_phase_cell_size,
            next_id: repr.next_id.max(after_last),
        }
    }
}

impl World {
    pub fn new(broad_phase_cell_size: f32) -> Self {
        Self {
            bodies: Vec::new(),
            broad_phase_cell_size,
            next_id: 0,
        }
    }

    /// Create a box body. `size` is the full extent along each local axis.
    pub fn create_box(&mut self, center: Vec3, size: Vec3, angle: f32, dynamic: bool) -> &Body {
        self.insert(BodyKind::Box, center, size, angle, dynamic)
    }

    /// Create a vertical cylinder body: radius in `size.x`, height in `size.y`.
    pub fn create_cylinder(
        &mut self,
        center: Vec3,
        size: Vec3,
        angle: f32,
        dynamic: bool,
    ) -> &Body {
        self.insert(BodyKind::Cylinder, center, size, angle, dynamic)
    }

    fn insert(
        &mut self,
        kind: BodyKind,
        center: Vec3,
        size: Vec3,
        angle: f32,
        dynamic: bool,
    ) -> &Body {
        let id = self.next_id;
        self.next_id += 1;
        self.bodies
            .push(Body::new(id, kind, center, size, angle, dynamic));
        &self.bodies[self.bodies.len() - 1]
    }

    /// Remove a body. Its id is never reused.
    pub fn remove_body(&mut self, id: BodyId) -> Option<Body> {
        let idx = self.index_of(id)?;
        Some(self.bodies.remove(idx))
    }

    #[inline]
    pub fn body(&self, id: BodyId) -> Option<&Body> {
        self.index_of(id).map(|i| &self.bodies[i])
    }

    /// Mutable access goes through `Body`'s mutators, which keep bounds fresh.
    #[inline]
    pub fn body_mut(&mut self, id: BodyId) -> Option<&mut Body> {
        self.index_of(id).map(move |i| &mut self.bodies[i])
    }

    #[inline]
    pub fn contains(&self, id: BodyId) -> bool {
        self.index_of(id).is_some()
    }

    /// All bodies in ascending id order.
    #[inline]
    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    #[inline]
    pub(crate) fn bodies_mut(&mut self) -> &mut [Body] {
        &mut self.bodies
    }

    #[inline]
    pub fn broad_phase_cell_size(&self) -> f32 {
        self.broad_phase_cell_size
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    #[inline]
    pub(crate) fn index_of(&self, id: BodyId) -> Option<usize> {
        self.bodies.binary_search_by_key(&id, |b| b.id()).ok()
    }
}
