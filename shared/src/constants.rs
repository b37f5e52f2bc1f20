//! Reference tuning values for the simulation.
//!
//! These are the defaults behind [`crate::config::SimSettings`]. Speeds and
//! gravity are expressed per tick (not per second): one tick moves a player
//! `MOVE_SPEED * controls.y` units, spread evenly over `SUBSTEPS` substeps.

/// Forward/backward distance per tick at full stick deflection.
pub const MOVE_SPEED: f32 = 0.1;

/// Yaw change (radians) per tick at full stick deflection.
pub const TURN_SPEED: f32 = 0.1;

/// Host tick rate (Hz). All parties must simulate at exactly this rate.
pub const UPDATES_PER_SECOND: u32 = 30;

/// Number of integration/collision substeps per tick.
pub const SUBSTEPS: u32 = 20;

/// Vertical velocity gained per tick while airborne.
/// Positive vertical velocity means falling (moving towards -Y).
pub const GRAVITY: f32 = 0.05;

/// Instant upward impulse applied when a grounded player jumps.
pub const JUMP_POWER: f32 = 0.5;

/// Player cylinder height.
pub const PLAYER_HEIGHT: f32 = 0.8;

/// Player cylinder radius.
pub const PLAYER_RADIUS: f32 = 0.2;

/// Where players are created at setup.
pub const PLAYER_SPAWN: [f32; 3] = [0.0, 1.1, 0.0];

/// Cell size used by the broad-phase prefilter (world units).
pub const BROAD_PHASE_CELL_SIZE: f32 = 0.25;

/// Fewest participants a session can start with.
pub const MIN_PLAYERS: usize = 1;

/// Most participants a session can start with.
pub const MAX_PLAYERS: usize = 6;

/// Duration of one tick in milliseconds at the given rate.
#[inline]
pub fn tick_duration_ms(updates_per_second: u32) -> f32 {
    1000.0 / updates_per_second.max(1) as f32
}

/// Logical time (ms) of tick number `tick` at the given rate.
///
/// Integer arithmetic so every party derives the same clock.
#[inline]
pub fn tick_time_ms(tick: u64, updates_per_second: u32) -> u64 {
    tick * 1000 / u64::from(updates_per_second.max(1))
}
