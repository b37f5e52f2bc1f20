use serde::{Deserialize, Serialize};

use crate::state::PlayerId;

/// Per-player control frame: turn axis `x`, move axis `y`, both in `[-1, 1]`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerControls {
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub jump: bool,
}

impl PlayerControls {
    pub fn new(x: f32, y: f32, jump: bool) -> Self {
        Self { x, y, jump }
    }

    /// Clamp both axes into `[-1, 1]`; NaN becomes 0.
    ///
    /// Applied to every incoming control message so unbounded input never
    /// reaches the motion integration.
    pub fn sanitized(self) -> Self {
        Self {
            x: clamp_axis(self.x),
            y: clamp_axis(self.y),
            jump: self.jump,
        }
    }
}

#[inline]
fn clamp_axis(v: f32) -> f32 {
    if v.is_nan() { 0.0 } else { v.clamp(-1.0, 1.0) }
}

/// A control message attributed to a participant, queued by the host and
/// applied at the next tick boundary.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerInput {
    pub player_id: PlayerId,
    pub controls: PlayerControls,
}

impl PlayerInput {
    pub fn new(player_id: impl Into<PlayerId>, controls: PlayerControls) -> Self {
        Self {
            player_id: player_id.into(),
            controls,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn axes_are_clamped() {
        let c = PlayerControls::new(3.5, -12.0, true).sanitized();
        assert_eq!(c, PlayerControls::new(1.0, -1.0, true));
    }

    #[test]
    fn nan_and_infinity_are_tamed() {
        let c = PlayerControls::new(f32::NAN, f32::INFINITY, false).sanitized();
        assert_eq!(c, PlayerControls::new(0.0, 1.0, false));

        let c = PlayerControls::new(f32::NEG_INFINITY, 0.25, false).sanitized();
        assert_eq!(c, PlayerControls::new(-1.0, 0.25, false));
    }

    #[test]
    fn in_range_values_pass_through() {
        let c = PlayerControls::new(-0.3, 0.7, false);
        assert_eq!(c.sanitized(), c);
    }

    #[test]
    fn missing_jump_defaults_to_false() {
        let c: PlayerControls = serde_json::from_str(r#"{"x": 0.5, "y": 1.0}"#).unwrap();
        assert!(!c.jump);
    }
}
