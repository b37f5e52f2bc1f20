use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use clap::Parser;
use server::{InputScript, Session};
use shared::{Level, SimSettings, setup_with_settings};

/// Run a session headless and emit its final snapshot.
#[derive(Parser, Debug)]
#[command(name = "sim-host", version, about = "Headless deterministic simulation host")]
struct Cli {
    /// Level JSON: an element array or `{ "elements": [...], "movers": [...] }`.
    #[arg(long)]
    level: PathBuf,

    /// Comma-separated participant ids.
    #[arg(long, value_delimiter = ',', default_value = "player1")]
    players: Vec<String>,

    /// Logical time to simulate.
    #[arg(long, default_value_t = 5000)]
    duration_ms: u64,

    /// Timed input events (`[{ "atMs", "player", "controls" }]`).
    #[arg(long)]
    inputs: Option<PathBuf>,

    /// Partial `SimSettings` override.
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Write the snapshot here instead of stdout.
    #[arg(long)]
    out: Option<PathBuf>,

    #[arg(long)]
    pretty: bool,
}

fn read(path: &Path, what: &str) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("reading {what} from {}", path.display()))
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let level = Level::from_json(&read(&cli.level, "level")?)
        .with_context(|| format!("loading level {}", cli.level.display()))?;

    let settings = match &cli.settings {
        Some(path) => SimSettings::from_json(&read(path, "settings")?)
            .with_context(|| format!("loading settings {}", path.display()))?,
        None => SimSettings::default(),
    };

    let script = match &cli.inputs {
        Some(path) => InputScript::from_json(&read(path, "inputs")?)
            .with_context(|| format!("loading input script {}", path.display()))?,
        None => InputScript::default(),
    };

    let state = setup_with_settings(cli.players.iter().cloned(), &level, settings)
        .context("session setup failed")?;

    let mut session = Session::new(state);
    let ticks = session.run_for(cli.duration_ms, &script);
    let state = session.into_state();

    log::info!("ran {ticks} ticks; checksum {}", state.checksum().to_hex());

    let snapshot = if cli.pretty {
        state.to_json_pretty()
    } else {
        state.to_json()
    }
    .context("encoding snapshot")?;

    match &cli.out {
        Some(path) => fs::write(path, snapshot)
            .with_context(|| format!("writing snapshot to {}", path.display()))?,
        None => println!("{snapshot}"),
    }
    Ok(())
}
