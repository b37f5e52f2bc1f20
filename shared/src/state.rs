//! Session state: players, movers and the world they act on.
//!
//! `GameState` is the whole unit a host snapshots, replays or compares across
//! peers. It is plain data: no callbacks, no shared ownership, no cycles.
//! Players and movers refer to bodies by id only; the `World` owns them.

use std::collections::BTreeSet;

use blake3::Hasher;
use serde::{Deserialize, Serialize};

use crate::{
    collision::{Body, BodyId, BodyKind, World},
    config::SimSettings,
    constants::{MAX_PLAYERS, MIN_PLAYERS},
    error::{SetupError, SnapshotError},
    input::{PlayerControls, PlayerInput},
    level::Level,
    mover::{Mover, MoverKind},
    vector::Vec3,
};

/// Participant identity as assigned by the host platform.
pub type PlayerId = String;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub body_id: BodyId,
    pub id: PlayerId,
    pub controls: PlayerControls,
    /// Positive means falling.
    pub vertical_velocity: f32,
    pub on_ground: bool,
    /// Body the player rests on, while `on_ground`.
    pub on_body: Option<BodyId>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    pub world: World,
    pub players: Vec<Player>,
    pub movers: Vec<Mover>,
    #[serde(default)]
    pub settings: SimSettings,
}

/// Build a session with the default settings. See [`setup_with_settings`].
pub fn setup<I, S>(participant_ids: I, level: &Level) -> Result<GameState, SetupError>
where
    I: IntoIterator<Item = S>,
    S: Into<PlayerId>,
{
    setup_with_settings(participant_ids, level, SimSettings::default())
}

/// Build the initial state: one static box per level element, a mover for
/// every element named in the level's mover table, and one dynamic cylinder
/// per participant at the spawn point.
///
/// Bodies are created in element order and then participant order, so every
/// party given the same inputs assigns the same ids.
pub fn setup_with_settings<I, S>(
    participant_ids: I,
    level: &Level,
    settings: SimSettings,
) -> Result<GameState, SetupError>
where
    I: IntoIterator<Item = S>,
    S: Into<PlayerId>,
{
    settings.validate()?;
    level.validate()?;

    let participant_ids: Vec<PlayerId> = participant_ids.into_iter().map(Into::into).collect();
    if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&participant_ids.len()) {
        return Err(SetupError::PlayerCount {
            got: participant_ids.len(),
            min: MIN_PLAYERS,
            max: MAX_PLAYERS,
        });
    }
    let mut seen = BTreeSet::new();
    for id in &participant_ids {
        if !seen.insert(id.as_str()) {
            return Err(SetupError::DuplicateParticipant(id.clone()));
        }
    }

    let mut world = World::new(settings.broad_phase_cell_size);
    let mut movers = Vec::new();

    for element in &level.elements {
        let body_id = world
            .create_box(element.center(), element.size(), element.rotation, false)
            .id();

        if let Some(spec) = level.mover_for(&element.id) {
            match spec.kind {
                MoverKind::Unknown => {
                    log::warn!("mover `{}` has an unknown kind and will not move", element.id);
                }
                MoverKind::SimpleTranslate { period_ms: 0, .. } => {
                    log::warn!("mover `{}` has a zero period and will not move", element.id);
                }
                MoverKind::SimpleTranslate { .. } => {}
            }
            movers.push(Mover {
                body_id,
                kind: spec.kind.clone(),
                name: element.id.clone(),
            });
        }
    }

    for spec in &level.movers {
        if !level.elements.iter().any(|e| e.id == spec.element_id) {
            log::warn!("mover spec `{}` matches no level element", spec.element_id);
        }
    }

    let players = participant_ids
        .into_iter()
        .map(|id| {
            let body_id = world
                .create_cylinder(settings.player_spawn, settings.player_size(), 0.0, true)
                .id();
            Player {
                body_id,
                id,
                controls: PlayerControls::default(),
                vertical_velocity: 0.0,
                on_ground: false,
                on_body: None,
            }
        })
        .collect::<Vec<_>>();

    log::info!(
        "session setup: {} bodies, {} players, {} movers",
        world.len(),
        players.len(),
        movers.len()
    );

    Ok(GameState {
        world,
        players,
        movers,
        settings,
    })
}

impl GameState {
    pub fn player(&self, id: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn player_mut(&mut self, id: &str) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.id == id)
    }

    /// The body a player controls, if it still exists.
    pub fn player_body(&self, id: &str) -> Option<&Body> {
        self.player(id).and_then(|p| self.world.body(p.body_id))
    }

    /// Replace a player's controls (last write wins). Axes are clamped.
    ///
    /// Returns `false` when no such player exists; the input is dropped.
    pub fn apply_controls(&mut self, player_id: &str, controls: PlayerControls) -> bool {
        match self.player_mut(player_id) {
            Some(player) => {
                player.controls = controls.sanitized();
                true
            }
            None => {
                log::debug!("dropping controls for unknown player `{player_id}`");
                false
            }
        }
    }

    /// Apply a batch of inputs in order, so later messages for the same player win.
    pub fn apply_inputs(&mut self, inputs: &[PlayerInput]) {
        for input in inputs {
            self.apply_controls(&input.player_id, input.controls);
        }
    }

    /// Remove a player and its body. Body ids are not reused, and any other
    /// reference to the removed body is skipped by the tick from now on.
    pub fn remove_player(&mut self, id: &str) -> Option<Player> {
        let idx = self.players.iter().position(|p| p.id == id)?;
        let player = self.players.remove(idx);
        if self.world.remove_body(player.body_id).is_none() {
            log::debug!("player `{id}` had no body to remove");
        }
        log::info!("removed player `{id}`");
        Some(player)
    }

    pub fn to_json(&self) -> Result<String, SnapshotError> {
        serde_json::to_string(self).map_err(SnapshotError::Encode)
    }

    pub fn to_json_pretty(&self) -> Result<String, SnapshotError> {
        serde_json::to_string_pretty(self).map_err(SnapshotError::Encode)
    }

    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        serde_json::from_str(json).map_err(SnapshotError::Decode)
    }

    /// Bit-exact digest of the simulation state for desync detection.
    ///
    /// Floats are hashed by their bit patterns in a fixed field order, so two
    /// peers agree only if every value is identical. Settings are included
    /// since peers with different tuning will diverge.
    pub fn checksum(&self) -> blake3::Hash {
        let mut h = Hasher::new();

        let s = &self.settings;
        for v in [
            s.move_speed,
            s.turn_speed,
            s.gravity,
            s.jump_power,
            s.broad_phase_cell_size,
            s.player_radius,
            s.player_height,
        ] {
            put_f32(&mut h, v);
        }
        put_vec3(&mut h, s.player_spawn);
        h.update(&s.substeps.to_le_bytes());
        h.update(&s.updates_per_second.to_le_bytes());

        h.update(&(self.world.len() as u64).to_le_bytes());
        for body in self.world.bodies() {
            h.update(&body.id().to_le_bytes());
            h.update(&[match body.kind() {
                BodyKind::Box => 0,
                BodyKind::Cylinder => 1,
            }]);
            put_vec3(&mut h, body.center());
            put_vec3(&mut h, body.size());
            put_f32(&mut h, body.angle());
            h.update(&[body.is_dynamic() as u8]);
            put_f32(&mut h, body.vertical_velocity());
        }

        h.update(&(self.players.len() as u64).to_le_bytes());
        for player in &self.players {
            put_str(&mut h, &player.id);
            h.update(&player.body_id.to_le_bytes());
            put_f32(&mut h, player.controls.x);
            put_f32(&mut h, player.controls.y);
            h.update(&[player.controls.jump as u8, player.on_ground as u8]);
            put_f32(&mut h, player.vertical_velocity);
            match player.on_body {
                Some(id) => {
                    h.update(&[1]);
                    h.update(&id.to_le_bytes());
                }
                None => {
                    h.update(&[0]);
                }
            }
        }

        h.update(&(self.movers.len() as u64).to_le_bytes());
        for mover in &self.movers {
            put_str(&mut h, &mover.name);
            h.update(&mover.body_id.to_le_bytes());
            match mover.kind {
                MoverKind::SimpleTranslate {
                    direction,
                    amplitude,
                    period_ms,
                    phase_offset_ms,
                } => {
                    h.update(&[1]);
                    put_vec3(&mut h, direction);
                    put_f32(&mut h, amplitude);
                    h.update(&period_ms.to_le_bytes());
                    h.update(&phase_offset_ms.to_le_bytes());
                }
                MoverKind::Unknown => {
                    h.update(&[0]);
                }
            }
        }

        h.finalize()
    }
}

#[inline]
fn put_f32(h: &mut Hasher, v: f32) {
    h.update(&v.to_bits().to_le_bytes());
}

#[inline]
fn put_vec3(h: &mut Hasher, v: Vec3) {
    put_f32(h, v.x);
    put_f32(h, v.y);
    put_f32(h, v.z);
}

#[inline]
fn put_str(h: &mut Hasher, s: &str) {
    h.update(&(s.len() as u64).to_le_bytes());
    h.update(s.as_bytes());
}
