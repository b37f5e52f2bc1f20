//! Positional overlap resolver.
//!
//! Dynamic bodies are pushed out of whatever they overlap along the axis of
//! least penetration, one pair at a time in ascending id order. Every settled
//! pair, touching ones included, is reported to a [`CollisionListener`].

use super::{broad::BroadPhase, types::Body, world::World};
use crate::vector::Vec3;

/// Receives every contact the resolver settles.
///
/// `correction` is the displacement already applied to `dynamic`. A positive
/// `correction.y` means the dynamic body was pushed up, i.e. it rests on `fixed`.
pub trait CollisionListener {
    fn on_collision(&mut self, dynamic: &Body, fixed: &Body, correction: Vec3);
}

impl<F> CollisionListener for F
where
    F: FnMut(&Body, &Body, Vec3),
{
    #[inline]
    fn on_collision(&mut self, dynamic: &Body, fixed: &Body, correction: Vec3) {
        self(dynamic, fixed, correction)
    }
}

/// Separate every dynamic body from everything it overlaps.
///
/// Visiting order is fixed: dynamic bodies in ascending id, and for each of
/// them every other body in ascending id. Each overlapping pair is settled on
/// its own by pushing the dynamic body out along its axis of least
/// penetration, so a body overlapping several others gets the same sequence
/// of corrections on every run. Touching pairs (zero penetration) still report
/// a contact with a zero correction.
///
/// Returns the number of contacts reported.
pub fn resolve<L: CollisionListener + ?Sized>(world: &mut World, listener: &mut L) -> usize {
    resolve_with(world, listener, true)
}

pub(crate) fn resolve_with<L: CollisionListener + ?Sized>(
    world: &mut World,
    listener: &mut L,
    use_broad_phase: bool,
) -> usize {
    let mut broad = if use_broad_phase {
        BroadPhase::build(world)
    } else {
        None
    };

    let bodies = world.bodies_mut();
    let mut contacts = 0;

    for d in 0..bodies.len() {
        if !bodies[d].is_dynamic() {
            continue;
        }
        for o in 0..bodies.len() {
            if o == d {
                continue;
            }
            if let Some(broad) = &broad {
                if !broad.may_overlap(d, o) {
                    continue;
                }
            }
            let Some(correction) = penetration_correction(&bodies[d], &bodies[o]) else {
                continue;
            };

            bodies[d].translate(correction);
            if let Some(broad) = broad.as_mut() {
                broad.refresh(d, &bodies[d]);
            }

            listener.on_collision(&bodies[d], &bodies[o], correction);
            contacts += 1;
        }
    }

    contacts
}

/// Minimum axis-aligned displacement that moves `dynamic` out of `other`,
/// or `None` when their AABBs do not overlap.
///
/// Per axis the shorter push wins (ties push towards +). Across axes the
/// smallest magnitude wins, checked in the order y, x, z so ties favour the
/// vertical axis and ground contact stays stable.
pub fn penetration_correction(dynamic: &Body, other: &Body) -> Option<Vec3> {
    if !dynamic.overlaps(other) {
        return None;
    }

    let (d_min, d_max) = (dynamic.bounds_min(), dynamic.bounds_max());
    let (o_min, o_max) = (other.bounds_min(), other.bounds_max());

    let x = axis_push(d_min.x, d_max.x, o_min.x, o_max.x);
    let y = axis_push(d_min.y, d_max.y, o_min.y, o_max.y);
    let z = axis_push(d_min.z, d_max.z, o_min.z, o_max.z);

    let mut correction = Vec3::new(0.0, y, 0.0);
    let mut best = y.abs();
    if x.abs() < best {
        correction = Vec3::new(x, 0.0, 0.0);
        best = x.abs();
    }
    if z.abs() < best {
        correction = Vec3::new(0.0, 0.0, z);
    }
    Some(correction)
}

/// Depth of the shallowest separating axis between two AABBs.
///
/// Zero when touching, `None` when apart. Used to check that resolution left
/// no residual penetration.
pub fn overlap_depth(a: &Body, b: &Body) -> Option<f32> {
    penetration_correction(a, b).map(|c| c.x.abs() + c.y.abs() + c.z.abs())
}

#[inline]
fn axis_push(d_min: f32, d_max: f32, o_min: f32, o_max: f32) -> f32 {
    let up = o_max - d_min;
    let down = d_max - o_min;
    if up <= down { up } else { -down }
}
