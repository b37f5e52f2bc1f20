//! Runtime-tunable simulation settings.
//!
//! Every participant must run with identical settings, so they travel inside
//! `GameState` and are part of every snapshot. Missing fields fall back to the
//! values in [`crate::constants`], which lets a host override a subset from a
//! small JSON file.

use serde::{Deserialize, Serialize};

use crate::{
    constants::{
        BROAD_PHASE_CELL_SIZE, GRAVITY, JUMP_POWER, MOVE_SPEED, PLAYER_HEIGHT, PLAYER_RADIUS,
        PLAYER_SPAWN, SUBSTEPS, TURN_SPEED, UPDATES_PER_SECOND,
    },
    error::SetupError,
    vector::{self, Vec3, xyz},
};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SimSettings {
    pub move_speed: f32,
    pub turn_speed: f32,
    pub gravity: f32,
    pub jump_power: f32,
    pub substeps: u32,
    pub updates_per_second: u32,
    pub broad_phase_cell_size: f32,
    pub player_radius: f32,
    pub player_height: f32,
    #[serde(with = "xyz")]
    pub player_spawn: Vec3,
}

impl Default for SimSettings {
    fn default() -> Self {
        let [x, y, z] = PLAYER_SPAWN;
        Self {
            move_speed: MOVE_SPEED,
            turn_speed: TURN_SPEED,
            gravity: GRAVITY,
            jump_power: JUMP_POWER,
            substeps: SUBSTEPS,
            updates_per_second: UPDATES_PER_SECOND,
            broad_phase_cell_size: BROAD_PHASE_CELL_SIZE,
            player_radius: PLAYER_RADIUS,
            player_height: PLAYER_HEIGHT,
            player_spawn: Vec3::new(x, y, z),
        }
    }
}

impl SimSettings {
    /// Decode a (possibly partial) settings override.
    pub fn from_json(json: &str) -> Result<Self, SetupError> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), SetupError> {
        if self.substeps == 0 {
            return Err(SetupError::InvalidSettings("substeps must be at least 1"));
        }
        if self.updates_per_second == 0 {
            return Err(SetupError::InvalidSettings("updatesPerSecond must be at least 1"));
        }
        let scalars = [
            self.move_speed,
            self.turn_speed,
            self.gravity,
            self.jump_power,
            self.broad_phase_cell_size,
            self.player_radius,
            self.player_height,
        ];
        if !scalars.iter().all(|v| v.is_finite()) || !vector::is_finite(self.player_spawn) {
            return Err(SetupError::InvalidSettings("all values must be finite"));
        }
        if self.player_radius <= 0.0 || self.player_height <= 0.0 {
            return Err(SetupError::InvalidSettings("player dimensions must be positive"));
        }
        Ok(())
    }

    /// Fraction of a tick covered by one substep.
    #[inline]
    pub fn substep_fraction(&self) -> f32 {
        1.0 / self.substeps as f32
    }

    /// Cylinder size for player bodies: radius in x, height in y.
    #[inline]
    pub fn player_size(&self) -> Vec3 {
        Vec3::new(self.player_radius, self.player_height, self.player_radius)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_override_keeps_defaults() {
        let settings = SimSettings::from_json(r#"{"gravity": 0.1, "substeps": 10}"#).unwrap();

        assert_eq!(settings.gravity, 0.1);
        assert_eq!(settings.substeps, 10);
        assert_eq!(settings.move_speed, MOVE_SPEED);
        assert_eq!(settings.updates_per_second, UPDATES_PER_SECOND);
        assert_eq!(settings.player_spawn, Vec3::new(0.0, 1.1, 0.0));
    }

    #[test]
    fn zero_substeps_is_rejected() {
        let err = SimSettings::from_json(r#"{"substeps": 0}"#).unwrap_err();
        assert!(matches!(err, SetupError::InvalidSettings(_)));
    }

    #[test]
    fn malformed_json_is_a_decode_error() {
        let err = SimSettings::from_json("{ not json").unwrap_err();
        assert!(matches!(err, SetupError::Decode(_)));
    }
}
