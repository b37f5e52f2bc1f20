//! Fixed-substep tick orchestrator.
//!
//! One call to [`tick`] advances the session by one host update:
//!
//! 1. queued inputs are applied (last write wins),
//! 2. every mover's displacement for this tick is computed once,
//! 3. `substeps` substeps run in order; each moves platforms, integrates
//!    player input and gravity, carries grounded players with their platform
//!    and finally resolves collisions, which re-establishes ground contact.
//!
//! The tick path never fails. Entities whose body is gone are skipped.

use std::collections::{BTreeMap, BTreeSet};

use crate::{
    collision::{Body, BodyId, resolve},
    input::PlayerInput,
    state::GameState,
    vector::{self, Vec3},
};

/// Per-tick mover displacement keyed by body id.
pub type Displacements = BTreeMap<BodyId, Vec3>;

/// Advance `state` by one tick at `logical_time_ms`.
///
/// `inputs` are applied before any motion, so the whole tick sees one
/// consistent frame of controls.
pub fn tick(state: &mut GameState, logical_time_ms: u64, inputs: &[PlayerInput]) {
    state.apply_inputs(inputs);

    for player in &state.players {
        if !state.world.contains(player.body_id) {
            log::debug!("player `{}` has no body {}; skipping", player.id, player.body_id);
        }
    }

    let displacements = mover_displacements(state, logical_time_ms);
    let fraction = state.settings.substep_fraction();

    for _ in 0..state.settings.substeps {
        substep(state, &displacements, fraction);
    }
}

/// Displacement of every mover whose body still exists.
pub fn mover_displacements(state: &GameState, logical_time_ms: u64) -> Displacements {
    let ups = state.settings.updates_per_second;
    let mut out = Displacements::new();

    for mover in &state.movers {
        if !state.world.contains(mover.body_id) {
            log::debug!("mover `{}` has no body {}; skipping", mover.name, mover.body_id);
            continue;
        }
        out.insert(mover.body_id, mover.displacement(logical_time_ms, ups));
    }
    out
}

/// One substep: `fraction` of the tick's motion, then collision resolution.
pub(crate) fn substep(state: &mut GameState, displacements: &Displacements, fraction: f32) {
    let GameState {
        world,
        players,
        settings,
        ..
    } = state;

    for (&body_id, &delta) in displacements {
        if let Some(body) = world.body_mut(body_id) {
            body.translate(vector::scale(delta, fraction));
        }
    }

    let mut jumped = BTreeSet::new();
    for player in players.iter_mut() {
        let Some(body) = world.body_mut(player.body_id) else {
            continue;
        };
        let controls = player.controls;

        body.rotate(-(controls.x * settings.turn_speed * fraction));

        let angle = body.angle();
        let forward = settings.move_speed * controls.y * fraction;
        body.translate(Vec3::new(
            libm::sinf(angle) * forward,
            0.0,
            libm::cosf(angle) * forward,
        ));

        if player.on_ground {
            if let Some(&carry) = player.on_body.and_then(|id| displacements.get(&id)) {
                body.translate(vector::scale(carry, fraction));
            }
        }

        if player.on_ground && controls.jump {
            player.vertical_velocity -= settings.jump_power;
            jumped.insert(player.body_id);
        } else {
            player.vertical_velocity += settings.gravity * fraction;
            body.translate(Vec3::new(0.0, -(player.vertical_velocity * fraction), 0.0));
        }
        player.on_ground = false;
        player.on_body = None;

        body.set_vertical_velocity(player.vertical_velocity);
    }

    // Pushed up: the player rests on `fixed`. A player that jumped this
    // substep has not moved yet, so any contact is the one it jumped from.
    let mut ground = |dynamic: &Body, fixed: &Body, correction: Vec3| {
        if correction.y <= 0.0 || jumped.contains(&dynamic.id()) {
            return;
        }
        let Some(player) = players.iter_mut().find(|p| p.body_id == dynamic.id()) else {
            return;
        };
        player.on_ground = true;
        player.on_body = Some(fixed.id());
        player.vertical_velocity = 0.0;
    };
    resolve(world, &mut ground);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        constants::tick_time_ms,
        input::PlayerControls,
        level::{Level, LevelBox, LevelElement, default_movers},
        state::setup,
    };

    const EPS: f32 = 1.0e-3;

    fn element(id: &str, min: [f32; 3], max: [f32; 3]) -> LevelElement {
        LevelElement {
            id: id.into(),
            bounds: LevelBox {
                min: Vec3::new(min[0], min[1], min[2]),
                max: Vec3::new(max[0], max[1], max[2]),
            },
            rotation: 0.0,
            translation: Vec3::zeros(),
        }
    }

    fn flat_level() -> Level {
        Level::new(vec![element("ground", [-20.0, -1.0, -20.0], [20.0, 0.0, 20.0])])
    }

    /// Only the moving platform: 4 x 0.5 x 4 centred on the origin, top at 0.25.
    fn platform_level() -> Level {
        Level::new(vec![element("platform003", [-2.0, -0.25, -2.0], [2.0, 0.25, 2.0])])
    }

    /// Put the (only) player at rest on top of the platform.
    fn stand_on_platform(state: &mut GameState) {
        let platform = state.movers[0].body_id;
        let player = &mut state.players[0];
        player.on_ground = true;
        player.on_body = Some(platform);
        let body_id = player.body_id;
        state
            .world
            .body_mut(body_id)
            .unwrap()
            .set_center(Vec3::new(0.0, 0.65, 0.0));
    }

    fn run(state: &mut GameState, ticks: u64) {
        let ups = state.settings.updates_per_second;
        for k in 0..ticks {
            tick(state, tick_time_ms(k, ups), &[]);
        }
    }

    #[test]
    fn falling_player_lands_on_ground() {
        let mut state = setup(["alice"], &flat_level()).unwrap();
        run(&mut state, 30);

        let player = &state.players[0];
        assert!(player.on_ground);
        assert_eq!(player.on_body, Some(0));
        assert_eq!(player.vertical_velocity, 0.0);

        let body = state.player_body("alice").unwrap();
        assert!((body.center().y - 0.4).abs() < 1.0e-4, "{:?}", body.center());
    }

    #[test]
    fn forward_input_walks_along_facing() {
        let mut state = setup(["alice"], &flat_level()).unwrap();
        run(&mut state, 30);

        let start = state.player_body("alice").unwrap().center();
        let walk = [PlayerInput::new("alice", PlayerControls::new(0.0, 1.0, false))];
        for k in 30..40 {
            tick(&mut state, tick_time_ms(k, 30), &walk);
        }

        let end = state.player_body("alice").unwrap().center();
        assert!((end.z - start.z - 1.0).abs() < EPS, "{start:?} -> {end:?}");
        assert!((end.x - start.x).abs() < EPS);
        assert!(state.players[0].on_ground);
    }

    #[test]
    fn positive_turn_input_decreases_yaw() {
        let mut state = setup(["alice"], &flat_level()).unwrap();
        let turn = [PlayerInput::new("alice", PlayerControls::new(1.0, 0.0, false))];
        for k in 0..5 {
            tick(&mut state, tick_time_ms(k, 30), &turn);
        }
        let angle = state.player_body("alice").unwrap().angle();
        assert!((angle + 0.5).abs() < 1.0e-4, "angle {angle}");
    }

    #[test]
    fn jump_impulse_replaces_gravity_on_first_substep() {
        let mut state = setup(["alice"], &platform_level()).unwrap();
        stand_on_platform(&mut state);
        state.movers.clear();
        state.apply_controls("alice", PlayerControls::new(0.0, 0.0, true));

        let fraction = state.settings.substep_fraction();
        substep(&mut state, &Displacements::new(), fraction);

        let player = &state.players[0];
        assert!(!player.on_ground);
        assert_eq!(player.on_body, None);
        assert_eq!(player.vertical_velocity, -0.5);
        assert_eq!(state.player_body("alice").unwrap().vertical_velocity(), -0.5);
    }

    #[test]
    fn rising_player_clipping_a_ledge_lands_on_it() {
        let ledge = Level::new(vec![element("ledge", [-5.0, -1.0, -5.0], [5.0, 1.0, 5.0])]);
        let mut state = setup(["alice"], &ledge).unwrap();
        let body_id = state.players[0].body_id;
        // Feet 0.01 below the ledge top, still moving up.
        state
            .world
            .body_mut(body_id)
            .unwrap()
            .set_center(Vec3::new(0.0, 1.39, 0.0));
        state.players[0].vertical_velocity = -0.1;

        let fraction = state.settings.substep_fraction();
        substep(&mut state, &Displacements::new(), fraction);

        let player = &state.players[0];
        assert!(player.on_ground);
        assert_eq!(player.on_body, Some(0));
        assert_eq!(player.vertical_velocity, 0.0);
        let bottom = state.world.body(body_id).unwrap().bounds_min().y;
        assert!((bottom - 1.0).abs() < 1.0e-5, "bottom {bottom}");
    }

    #[test]
    fn jump_leaves_the_ground_and_comes_back() {
        let mut state = setup(["alice"], &flat_level()).unwrap();
        run(&mut state, 30);
        let rest_y = state.player_body("alice").unwrap().center().y;

        let jump = [PlayerInput::new("alice", PlayerControls::new(0.0, 0.0, true))];
        tick(&mut state, tick_time_ms(30, 30), &jump);
        let release = [PlayerInput::new("alice", PlayerControls::new(0.0, 0.0, false))];
        tick(&mut state, tick_time_ms(31, 30), &release);

        assert!(!state.players[0].on_ground);
        assert!(state.player_body("alice").unwrap().center().y > rest_y + 0.5);

        for k in 32..80 {
            tick(&mut state, tick_time_ms(k, 30), &[]);
        }
        assert!(state.players[0].on_ground);
        assert!((state.player_body("alice").unwrap().center().y - rest_y).abs() < 1.0e-4);
    }

    #[test]
    fn grounded_player_is_carried_by_platform() {
        let mut state = setup(["alice"], &platform_level()).unwrap();
        stand_on_platform(&mut state);

        let platform_id = state.movers[0].body_id;
        let platform_start = state.world.body(platform_id).unwrap().center();
        let player_start = state.player_body("alice").unwrap().center();

        for k in 0..10 {
            tick(&mut state, tick_time_ms(k, 30), &[]);
            assert!(state.players[0].on_ground, "tick {k}");
            assert_eq!(state.players[0].on_body, Some(platform_id));
        }

        let platform_moved = state.world.body(platform_id).unwrap().center() - platform_start;
        let player_moved = state.player_body("alice").unwrap().center() - player_start;
        assert!(platform_moved.z > 0.3);
        assert!((player_moved.x - platform_moved.x).abs() < EPS);
        assert!((player_moved.z - platform_moved.z).abs() < EPS);
    }

    #[test]
    fn platform003_full_period_is_a_closed_cycle() {
        let mut state = setup(["alice"], &platform_level()).unwrap();
        assert_eq!(state.movers[0].kind, default_movers()[0].kind);
        stand_on_platform(&mut state);

        let platform_id = state.movers[0].body_id;
        let platform_start = state.world.body(platform_id).unwrap().center();
        let offset_start = state.player_body("alice").unwrap().center() - platform_start;

        // 5000 ms at 30 Hz.
        let mut furthest = 0.0f32;
        for k in 0..150 {
            tick(&mut state, tick_time_ms(k, 30), &[]);
            assert!(state.players[0].on_ground, "tick {k}");
            let z = state.world.body(platform_id).unwrap().center().z;
            furthest = furthest.max(z.abs());
        }

        let platform_end = state.world.body(platform_id).unwrap().center();
        assert!((platform_end - platform_start).norm() < EPS, "{platform_end:?}");
        assert!((furthest - 1.5).abs() < 0.05, "furthest {furthest}");

        let offset_end = state.player_body("alice").unwrap().center() - platform_end;
        assert!((offset_end.x - offset_start.x).abs() < EPS);
        assert!((offset_end.z - offset_start.z).abs() < EPS);
    }

    #[test]
    fn missing_bodies_are_skipped() {
        let mut state = setup(["alice", "bob"], &platform_level()).unwrap();
        let platform = state.movers[0].body_id;
        let bob_body = state.player("bob").unwrap().body_id;
        state.world.remove_body(platform);
        state.world.remove_body(bob_body);

        assert!(mover_displacements(&state, 0).is_empty());
        run(&mut state, 5);

        assert_eq!(state.players.len(), 2);
        assert!(state.player_body("bob").is_none());
        assert!(state.player_body("alice").unwrap().center().y < 1.1);
    }

    #[test]
    fn removed_ground_body_stops_carrying() {
        let mut state = setup(["alice"], &platform_level()).unwrap();
        stand_on_platform(&mut state);
        let platform = state.movers[0].body_id;
        state.world.remove_body(platform);

        let before = state.player_body("alice").unwrap().center();
        tick(&mut state, 0, &[]);
        let after = state.player_body("alice").unwrap().center();

        assert_eq!(after.z, before.z);
        assert!(after.y < before.y);
    }

    #[test]
    fn identical_runs_are_bit_identical() {
        let level = Level::new(vec![
            element("ground", [-10.0, -1.0, -10.0], [10.0, 0.0, 10.0]),
            element("platform003", [2.0, 0.5, -1.0], [4.0, 1.0, 1.0]),
            element("wall", [-3.0, 0.0, -3.0], [-2.5, 2.0, 3.0]),
        ]);
        let script = |k: u64| {
            vec![
                PlayerInput::new(
                    "alice",
                    PlayerControls::new(((k % 7) as f32 - 3.0) / 3.0, 1.0, k % 23 == 0),
                ),
                PlayerInput::new("bob", PlayerControls::new(0.2, -0.8, k % 31 == 5)),
            ]
        };

        let simulate = || {
            let mut state = setup(["alice", "bob", "carol"], &level).unwrap();
            for k in 0..200 {
                tick(&mut state, tick_time_ms(k, 30), &script(k));
            }
            state
        };

        let a = simulate();
        let b = simulate();
        assert_eq!(a, b);
        assert_eq!(a.checksum(), b.checksum());
    }
}
