use serde::{Deserialize, Serialize};
use shared::{PlayerControls, PlayerId};

/// A control message scheduled at a logical time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptEvent {
    pub at_ms: u64,
    pub player: PlayerId,
    pub controls: PlayerControls,
}

/// Timed input replay, sorted by `at_ms`. Events sharing a timestamp keep
/// their file order, so the last of them wins for a given player.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct InputScript {
    events: Vec<ScriptEvent>,
}

impl<'de> Deserialize<'de> for InputScript {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Vec::<ScriptEvent>::deserialize(deserializer).map(Self::new)
    }
}

impl InputScript {
    pub fn new(mut events: Vec<ScriptEvent>) -> Self {
        events.sort_by_key(|e| e.at_ms);
        Self { events }
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn events(&self) -> &[ScriptEvent] {
        &self.events
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Events with `after < at_ms <= until`; `after = None` includes time 0.
    pub fn due(&self, after: Option<u64>, until: u64) -> &[ScriptEvent] {
        let start = match after {
            Some(after) => self.events.partition_point(|e| e.at_ms <= after),
            None => 0,
        };
        let end = self.events.partition_point(|e| e.at_ms <= until);
        &self.events[start..end.max(start)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCRIPT: &str = r#"[
        {"atMs": 100, "player": "bob", "controls": {"x": 0, "y": 1}},
        {"atMs": 0, "player": "alice", "controls": {"x": 1, "y": 0, "jump": true}},
        {"atMs": 100, "player": "bob", "controls": {"x": 0, "y": -1}}
    ]"#;

    #[test]
    fn events_are_stably_sorted() {
        let script = InputScript::from_json(SCRIPT).unwrap();
        let events = script.events();

        assert_eq!(events[0].player, "alice");
        assert!(events[0].controls.jump);
        assert_eq!(events[1].controls.y, 1.0);
        assert_eq!(events[2].controls.y, -1.0);
    }

    #[test]
    fn due_selects_half_open_windows() {
        let script = InputScript::from_json(SCRIPT).unwrap();

        assert_eq!(script.due(None, 0).len(), 1);
        assert!(script.due(Some(0), 66).is_empty());
        assert_eq!(script.due(Some(66), 100).len(), 2);
        assert!(script.due(Some(100), 10_000).is_empty());
    }
}
