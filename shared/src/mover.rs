//! Kinematic platform motion.
//!
//! A mover drives one static body along a prescribed function of logical
//! time. Displacement is computed once per tick and spread evenly over the
//! tick's substeps by the orchestrator.

use serde::{Deserialize, Serialize};

use crate::{
    collision::BodyId,
    constants::tick_duration_ms,
    vector::{self, Vec3, xyz},
};

/// Motion model of a mover. Each variant carries exactly the fields it needs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum MoverKind {
    /// Ping-pong along `direction`: forward for the first half of every
    /// period, backward for the second half, `amplitude` units each way.
    #[serde(rename_all = "camelCase")]
    SimpleTranslate {
        #[serde(with = "xyz")]
        direction: Vec3,
        amplitude: f32,
        period_ms: u64,
        phase_offset_ms: u64,
    },
    /// A kind this build does not know. Decodes from any unrecognised tag and
    /// produces no motion.
    #[serde(other)]
    Unknown,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mover {
    pub body_id: BodyId,
    pub kind: MoverKind,
    pub name: String,
}

impl Mover {
    /// Displacement of this mover's body over the tick starting at `logical_time_ms`.
    pub fn displacement(&self, logical_time_ms: u64, updates_per_second: u32) -> Vec3 {
        compute_displacement(self, logical_time_ms, updates_per_second)
    }
}

/// Per-tick displacement of `mover` at `logical_time_ms`.
///
/// For `SimpleTranslate` the phase is `(time + offset) mod period`; the first
/// half of the period moves along `+direction`, the second along
/// `-direction`. The per-tick step is `2 * amplitude / period * tick_ms`, so a
/// half period of ticks travels `amplitude` and a full period returns to the
/// start. Phase is decided in integer milliseconds and is exact everywhere.
///
/// Unknown kinds and zero-length periods produce no motion (logged at debug;
/// setup already warned about them).
pub fn compute_displacement(mover: &Mover, logical_time_ms: u64, updates_per_second: u32) -> Vec3 {
    match mover.kind {
        MoverKind::SimpleTranslate {
            direction,
            amplitude,
            period_ms,
            phase_offset_ms,
        } => {
            if period_ms == 0 {
                log::debug!("mover `{}` has a zero period; ignoring its motion", mover.name);
                return Vec3::zeros();
            }

            let phase = logical_time_ms.wrapping_add(phase_offset_ms) % period_ms;
            let step =
                ((amplitude * 2.0) / period_ms as f32) * tick_duration_ms(updates_per_second);

            if phase < period_ms - phase {
                vector::scale(direction, step)
            } else {
                vector::scale(direction, -step)
            }
        }
        MoverKind::Unknown => {
            log::debug!("mover `{}` has an unknown kind; ignoring its motion", mover.name);
            Vec3::zeros()
        }
    }
}
