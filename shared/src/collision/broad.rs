//! Broad-phase prefilter keyed by the world's cell size.
//!
//! Each body's AABB is quantized to an inclusive range of integer grid cells.
//! Two bodies whose cell ranges do not intersect cannot have overlapping
//! AABBs (`floor` is monotonic), so the resolver may skip the float test for
//! them. The filter is conservative: it never rejects a pair the pairwise
//! scan would resolve, and it never changes visiting order.
//!
//! Ranges are cached per body index and must be refreshed whenever the
//! resolver moves a body.

use super::{types::Body, world::World};
use crate::vector::Vec3;

/// Inclusive range of grid cells covered by an AABB.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CellRange {
    pub min: [i32; 3],
    pub max: [i32; 3],
}

impl CellRange {
    pub fn from_bounds(min: Vec3, max: Vec3, inv_cell_size: f32) -> Self {
        let cell = |v: f32| (v * inv_cell_size).floor() as i32;
        Self {
            min: [cell(min.x), cell(min.y), cell(min.z)],
            max: [cell(max.x), cell(max.y), cell(max.z)],
        }
    }

    #[inline]
    pub fn intersects(&self, other: &CellRange) -> bool {
        (0..3).all(|axis| self.min[axis] <= other.max[axis] && other.min[axis] <= self.max[axis])
    }
}

/// Cached cell ranges for every body, indexed like `World::bodies()`.
#[derive(Clone, Debug)]
pub struct BroadPhase {
    inv_cell_size: f32,
    ranges: Vec<CellRange>,
}

impl BroadPhase {
    /// Build the prefilter, or `None` when the world's cell size is not a
    /// positive finite number (the resolver then scans every pair).
    pub fn build(world: &World) -> Option<Self> {
        let cell_size = world.broad_phase_cell_size();
        if !(cell_size.is_finite() && cell_size > 0.0) {
            return None;
        }
        let inv_cell_size = 1.0 / cell_size;
        let ranges = world
            .bodies()
            .iter()
            .map(|b| CellRange::from_bounds(b.bounds_min(), b.bounds_max(), inv_cell_size))
            .collect();
        Some(Self {
            inv_cell_size,
            ranges,
        })
    }

    /// False only when bodies `a` and `b` certainly do not overlap.
    #[inline]
    pub fn may_overlap(&self, a: usize, b: usize) -> bool {
        self.ranges[a].intersects(&self.ranges[b])
    }

    /// Re-quantize body `idx` after it moved.
    #[inline]
    pub fn refresh(&mut self, idx: usize, body: &Body) {
        self.ranges[idx] =
            CellRange::from_bounds(body.bounds_min(), body.bounds_max(), self.inv_cell_size);
    }
}
