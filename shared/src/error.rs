use thiserror::Error;

/// Reasons a session cannot be created. Setup has no recovery path: without
/// valid geometry and participants there is nothing to simulate.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("level data could not be decoded: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("level has no elements")]
    EmptyLevel,

    #[error("level element `{id}` has non-finite values")]
    NonFiniteElement { id: String },

    #[error("level element `{id}` has min > max on at least one axis")]
    InvertedElement { id: String },

    #[error("session needs between {min} and {max} participants, got {got}")]
    PlayerCount { got: usize, min: usize, max: usize },

    #[error("participant `{0}` joined twice")]
    DuplicateParticipant(String),

    #[error("invalid settings: {0}")]
    InvalidSettings(&'static str),
}

/// Snapshot encode/decode failures.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot could not be encoded: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("snapshot could not be decoded: {0}")]
    Decode(#[source] serde_json::Error),
}
