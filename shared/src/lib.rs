pub mod collision;
pub mod config;
pub mod constants;
pub mod error;
pub mod input;
pub mod level;
pub mod mover;
pub mod state;
pub mod tick;
pub mod vector;

pub use collision::{Body, BodyId, BodyKind, CollisionListener, World, resolve};
pub use config::SimSettings;
pub use constants::{
    GRAVITY, JUMP_POWER, MAX_PLAYERS, MIN_PLAYERS, MOVE_SPEED, SUBSTEPS, TURN_SPEED,
    UPDATES_PER_SECOND, tick_duration_ms, tick_time_ms,
};
pub use error::{SetupError, SnapshotError};
pub use input::{PlayerControls, PlayerInput};
pub use level::{Level, LevelBox, LevelElement, MoverSpec};
pub use mover::{Mover, MoverKind, compute_displacement};
pub use state::{GameState, Player, PlayerId, setup, setup_with_settings};
pub use tick::tick;
pub use vector::Vec3;
