//! Vector primitives used by every numeric path in the simulation.
//!
//! All position/velocity math downstream goes through `add`, `sub`, `scale`
//! and `average` so the order of floating-point operations (and therefore
//! rounding) is identical on every participant.

use nalgebra as na;

/// Common math alias, shared with the collision types.
pub type Vec3 = na::Vector3<f32>;

#[inline]
pub fn add(a: Vec3, b: Vec3) -> Vec3 {
    Vec3::new(a.x + b.x, a.y + b.y, a.z + b.z)
}

#[inline]
pub fn sub(a: Vec3, b: Vec3) -> Vec3 {
    Vec3::new(a.x - b.x, a.y - b.y, a.z - b.z)
}

#[inline]
pub fn scale(a: Vec3, by: f32) -> Vec3 {
    Vec3::new(a.x * by, a.y * by, a.z * by)
}

/// Midpoint of `a` and `b`: `(a + b) / 2`.
#[inline]
pub fn average(a: Vec3, b: Vec3) -> Vec3 {
    scale(add(a, b), 0.5)
}

/// True when every component is finite (no NaN/inf).
#[inline]
pub fn is_finite(a: Vec3) -> bool {
    a.x.is_finite() && a.y.is_finite() && a.z.is_finite()
}

/// Serde adapter that keeps the `{ "x": .., "y": .., "z": .. }` wire shape
/// instead of nalgebra's array form.
///
/// Use with `#[serde(with = "crate::vector::xyz")]`.
pub mod xyz {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use super::Vec3;

    #[derive(Serialize, Deserialize)]
    struct Xyz {
        x: f32,
        y: f32,
        z: f32,
    }

    pub fn serialize<S: Serializer>(v: &Vec3, serializer: S) -> Result<S::Ok, S::Error> {
        Xyz {
            x: v.x,
            y: v.y,
            z: v.z,
        }
        .serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec3, D::Error> {
        let Xyz { x, y, z } = Xyz::deserialize(deserializer)?;
        Ok(Vec3::new(x, y, z))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_and_sub_are_componentwise() {
        let a = Vec3::new(1.0, -2.0, 3.5);
        let b = Vec3::new(0.5, 4.0, -1.5);

        assert_eq!(add(a, b), Vec3::new(1.5, 2.0, 2.0));
        assert_eq!(sub(a, b), Vec3::new(0.5, -6.0, 5.0));
        assert_eq!(sub(add(a, b), b), a);
    }

    #[test]
    fn average_is_midpoint() {
        let min = Vec3::new(-1.0, 0.0, 2.0);
        let max = Vec3::new(3.0, 1.0, 4.0);
        assert_eq!(average(min, max), Vec3::new(1.0, 0.5, 3.0));
    }

    #[test]
    fn scale_by_negative_one_negates_exactly() {
        let v = Vec3::new(0.1, -0.2, 0.3);
        let n = scale(v, -1.0);
        assert_eq!(add(v, n), Vec3::zeros());
    }

    #[test]
    fn xyz_wire_shape_uses_named_fields() {
        #[derive(serde::Serialize, serde::Deserialize)]
        struct Holder {
            #[serde(with = "super::xyz")]
            v: Vec3,
        }

        let json = serde_json::to_string(&Holder {
            v: Vec3::new(1.0, 2.0, 3.0),
        })
        .unwrap();
        assert_eq!(json, r#"{"v":{"x":1.0,"y":2.0,"z":3.0}}"#);

        let back: Holder = serde_json::from_str(&json).unwrap();
        assert_eq!(back.v, Vec3::new(1.0, 2.0, 3.0));
    }
}
