/*!
Body model shared by the world registry, broad phase and resolver.

A `Body` is either a box (level geometry, platforms) or a vertical cylinder
(players). Every body carries a cached axis-aligned bounding box that the
resolver tests against.

Invariant: `bounds_min`/`bounds_max` always describe the current
`center`/`size`/`angle`. The shape fields are private and every mutator
recomputes the bounds before returning, so a stale AABB cannot be observed.
Deserialised bodies recompute their bounds too.

Size conventions
- Box: `size` is the full extent along each local axis (`max - min` of the
  source element). `angle` is a rotation about +Y.
- Cylinder: radius in `size.x`, full height in `size.y`; `size.z` is unused.
  Cylinders are rotation-invariant for bounds purposes.
*/

use serde::{Deserialize, Serialize};

use crate::vector::{self, Vec3, xyz};

/// Stable body identity. Assigned monotonically by the world, never reused.
pub type BodyId = u32;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BodyKind {
    Box,
    Cylinder,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "BodyRepr")]
pub struct Body {
    id: BodyId,
    kind: BodyKind,
    #[serde(serialize_with = "xyz::serialize")]
    center: Vec3,
    #[serde(serialize_with = "xyz::serialize")]
    size: Vec3,
    angle: f32,
    dynamic: bool,
    vertical_velocity: f32,
    #[serde(serialize_with = "xyz::serialize")]
    bounds_min: Vec3,
    #[serde(serialize_with = "xyz::serialize")]
    bounds_max: Vec3,
}

/// Plain-data form used when decoding; cached bounds in the input are ignored.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BodyRepr {
    id: BodyId,
    kind: BodyKind,
    #[serde(with = "xyz")]
    center: Vec3,
    #[serde(with = "xyz")]
    size: Vec3,
    angle: f32,
    dynamic: bool,
    #[serde(default)]
    vertical_velocity: f32,
}

impl From<BodyRepr> for Body {
    fn from(repr: BodyRepr) -> Self {
        let mut body = Body::new(
            repr.id,
            repr.kind,
            repr.center,
            repr.size,
            repr.angle,
            repr.dynamic,
        );
        body.vertical_velocity = repr.vertical_velocity;
        body
    }
}

impl Body {
    pub(crate) fn new(
        id: BodyId,
        kind: BodyKind,
        center: Vec3,
        size: Vec3,
        angle: f32,
        dynamic: bool,
    ) -> Self {
        let mut body = Self {
            id,
            kind,
            center,
            size,
            angle,
            dynamic,
            vertical_velocity: 0.0,
            bounds_min: center,
            bounds_max: center,
        };
        body.update_bounds();
        body
    }

    #[inline]
    pub fn id(&self) -> BodyId {
        self.id
    }

    #[inline]
    pub fn kind(&self) -> BodyKind {
        self.kind
    }

    #[inline]
    pub fn center(&self) -> Vec3 {
        self.center
    }

    #[inline]
    pub fn size(&self) -> Vec3 {
        self.size
    }

    #[inline]
    pub fn angle(&self) -> f32 {
        self.angle
    }

    #[inline]
    pub fn is_dynamic(&self) -> bool {
        self.dynamic
    }

    /// Last vertical velocity written by the tick (positive = falling).
    #[inline]
    pub fn vertical_velocity(&self) -> f32 {
        self.vertical_velocity
    }

    #[inline]
    pub fn bounds_min(&self) -> Vec3 {
        self.bounds_min
    }

    #[inline]
    pub fn bounds_max(&self) -> Vec3 {
        self.bounds_max
    }

    /// Move the body by `delta` and refresh its bounds.
    pub fn translate(&mut self, delta: Vec3) {
        self.center = vector::add(self.center, delta);
        self.update_bounds();
    }

    pub fn set_center(&mut self, center: Vec3) {
        self.center = center;
        self.update_bounds();
    }

    /// Rotate about +Y by `delta` radians and refresh bounds.
    pub fn rotate(&mut self, delta: f32) {
        self.angle += delta;
        self.update_bounds();
    }

    pub fn set_angle(&mut self, angle: f32) {
        self.angle = angle;
        self.update_bounds();
    }

    /// Velocity does not affect bounds, so no refresh is needed.
    #[inline]
    pub fn set_vertical_velocity(&mut self, vertical_velocity: f32) {
        self.vertical_velocity = vertical_velocity;
    }

    /// Inclusive AABB test: touching bodies count as overlapping.
    #[inline]
    pub fn overlaps(&self, other: &Body) -> bool {
        aabb_overlaps(
            self.bounds_min,
            self.bounds_max,
            other.bounds_min,
            other.bounds_max,
        )
    }

    fn update_bounds(&mut self) {
        let half = half_extents(self.kind, self.size, self.angle);
        self.bounds_min = vector::sub(self.center, half);
        self.bounds_max = vector::add(self.center, half);
    }
}

/// Half extents of the world-space AABB enclosing a body's true shape.
///
/// Boxes are rotated about +Y, so X/Z extents mix by |cos| and |sin| of the angle.
/// `libm` keeps the trigonometry bit-identical across targets.
pub fn half_extents(kind: BodyKind, size: Vec3, angle: f32) -> Vec3 {
    match kind {
        BodyKind::Box => {
            let hx = size.x * 0.5;
            let hy = size.y * 0.5;
            let hz = size.z * 0.5;
            let c = libm::cosf(angle).abs();
            let s = libm::sinf(angle).abs();
            Vec3::new(c * hx + s * hz, hy, s * hx + c * hz)
        }
        BodyKind::Cylinder => Vec3::new(size.x, size.y * 0.5, size.x),
    }
}

#[inline]
pub fn aabb_overlaps(a_min: Vec3, a_max: Vec3, b_min: Vec3, b_max: Vec3) -> bool {
    !(a_max.x < b_min.x
        || a_min.x > b_max.x
        || a_max.y < b_min.y
        || a_min.y > b_max.y
        || a_max.z < b_min.z
        || a_min.z > b_max.z)
}
