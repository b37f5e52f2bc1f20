use std::collections::BTreeMap;

use shared::{GameState, PlayerControls, PlayerId, PlayerInput, tick, tick_time_ms};

use crate::script::InputScript;

/// Authoritative host loop around a [`GameState`].
///
/// Owns the logical clock (tick `k` runs at `k * 1000 / updatesPerSecond` ms)
/// and a pending-input buffer. Inputs submitted between ticks are folded to
/// the latest message per player and handed to the next tick as one frame.
#[derive(Debug)]
pub struct Session {
    state: GameState,
    ticks: u64,
    last_time_ms: Option<u64>,
    pending: BTreeMap<PlayerId, PlayerControls>,
}

impl Session {
    pub fn new(state: GameState) -> Self {
        Self {
            state,
            ticks: 0,
            last_time_ms: None,
            pending: BTreeMap::new(),
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn into_state(self) -> GameState {
        self.state
    }

    /// Number of ticks run so far.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Logical time the next tick will run at.
    pub fn next_time_ms(&self) -> u64 {
        tick_time_ms(self.ticks, self.state.settings.updates_per_second)
    }

    /// Queue controls for the next tick. A later call for the same player
    /// replaces the earlier one.
    pub fn submit(&mut self, player_id: impl Into<PlayerId>, controls: PlayerControls) {
        self.pending.insert(player_id.into(), controls);
    }

    /// Run one tick with whatever input is pending. Returns its logical time.
    pub fn advance(&mut self) -> u64 {
        let now = self.next_time_ms();
        let inputs = std::mem::take(&mut self.pending)
            .into_iter()
            .map(|(player_id, controls)| PlayerInput { player_id, controls })
            .collect::<Vec<_>>();

        tick(&mut self.state, now, &inputs);

        log::trace!("tick {} at {now} ms ({} inputs)", self.ticks, inputs.len());
        self.ticks += 1;
        self.last_time_ms = Some(now);
        now
    }

    /// Run every tick whose logical time falls inside the next `duration_ms`,
    /// submitting script events as the clock reaches them.
    ///
    /// Returns the number of ticks run.
    pub fn run_for(&mut self, duration_ms: u64, script: &InputScript) -> u64 {
        let end = self.next_time_ms().saturating_add(duration_ms);
        let start_ticks = self.ticks;

        while self.next_time_ms() < end {
            let now = self.next_time_ms();
            for event in script.due(self.last_time_ms, now) {
                self.submit(event.player.clone(), event.controls);
            }
            self.advance();
        }

        let ran = self.ticks - start_ticks;
        log::debug!("ran {ran} ticks, clock now at {} ms", self.next_time_ms());
        ran
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::ScriptEvent;
    use shared::{Level, LevelBox, LevelElement, Vec3, setup};

    fn level() -> Level {
        Level::new(vec![
            LevelElement {
                id: "ground".into(),
                bounds: LevelBox {
                    min: Vec3::new(-10.0, -1.0, -10.0),
                    max: Vec3::new(10.0, 0.0, 10.0),
                },
                rotation: 0.0,
                translation: Vec3::zeros(),
            },
            LevelElement {
                id: "platform003".into(),
                bounds: LevelBox {
                    min: Vec3::new(2.0, 0.5, -1.0),
                    max: Vec3::new(4.0, 1.0, 1.0),
                },
                rotation: 0.0,
                translation: Vec3::zeros(),
            },
        ])
    }

    fn session() -> Session {
        Session::new(setup(["alice", "bob"], &level()).unwrap())
    }

    #[test]
    fn clock_follows_tick_rate() {
        let mut session = session();
        assert_eq!(session.advance(), 0);
        assert_eq!(session.advance(), 33);
        assert_eq!(session.advance(), 66);
        assert_eq!(session.next_time_ms(), 100);
        assert_eq!(session.ticks(), 3);
    }

    #[test]
    fn five_seconds_is_150_ticks() {
        let mut session = session();
        assert_eq!(session.run_for(5000, &InputScript::default()), 150);
        assert_eq!(session.next_time_ms(), 5000);
    }

    #[test]
    fn pending_inputs_are_last_write_wins() {
        let mut session = session();
        session.submit("alice", PlayerControls::new(0.0, 1.0, false));
        session.submit("alice", PlayerControls::new(0.5, -1.0, false));
        session.advance();

        assert_eq!(
            session.state().player("alice").unwrap().controls,
            PlayerControls::new(0.5, -1.0, false)
        );
        assert_eq!(
            session.state().player("bob").unwrap().controls,
            PlayerControls::default()
        );
    }

    #[test]
    fn scripted_runs_are_reproducible() {
        let script = InputScript::new(vec![
            ScriptEvent {
                at_ms: 500,
                player: "alice".into(),
                controls: PlayerControls::new(0.0, 1.0, false),
            },
            ScriptEvent {
                at_ms: 1000,
                player: "bob".into(),
                controls: PlayerControls::new(-0.4, 1.0, true),
            },
            ScriptEvent {
                at_ms: 1800,
                player: "alice".into(),
                controls: PlayerControls::new(1.0, 0.0, false),
            },
        ]);

        let mut a = session();
        a.run_for(3000, &script);
        let mut b = session();
        b.run_for(1000, &script);
        b.run_for(2000, &script);

        assert_eq!(a.ticks(), b.ticks());
        assert_eq!(a.state().checksum(), b.state().checksum());
        assert_eq!(
            a.state().player("alice").unwrap().controls,
            PlayerControls::new(1.0, 0.0, false)
        );
    }

    #[test]
    fn demo_level_platform_returns_after_one_period() {
        let level = Level::from_json(include_str!("../levels/demo.json")).unwrap();
        let script = InputScript::from_json(include_str!("../levels/demo_inputs.json")).unwrap();
        let mut session = Session::new(setup(["player1", "player2"], &level).unwrap());

        session.run_for(5000, &script);

        let state = session.state();
        let platform = state.world.body(state.movers[0].body_id).unwrap();
        assert!((platform.center() - Vec3::new(4.0, 1.5, 0.0)).norm() < 1.0e-3);
        for player in &state.players {
            let body = state.world.body(player.body_id).unwrap();
            assert!(body.center().iter().all(|v| v.is_finite()));
        }
    }

    #[test]
    fn script_events_apply_at_their_tick() {
        let script = InputScript::new(vec![ScriptEvent {
            at_ms: 100,
            player: "bob".into(),
            controls: PlayerControls::new(0.0, 1.0, false),
        }]);
        let mut session = session();

        session.run_for(100, &script);
        assert_eq!(session.state().player("bob").unwrap().controls.y, 0.0);

        session.run_for(1, &script);
        assert_eq!(session.state().player("bob").unwrap().controls.y, 1.0);
    }
}
