//! Headless host for the shared simulation: logical clock, input buffering
//! and scripted replay. The `sim-host` binary wraps this with a CLI.

pub mod script;
pub mod session;

pub use script::{InputScript, ScriptEvent};
pub use session::Session;
