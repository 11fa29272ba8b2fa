//! Fates Engine Demo
//!
//! Runs one headless bot session against the default spec (optionally
//! overridden by a JSON file given as the first argument), then replays it
//! and checks the two runs are byte-identical.

use std::fs;

use anyhow::{bail, Context};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use fates::{
    game::{FrameInput, Outcome, Session, SessionConfig},
    spec::{load_spec, load_spec_str, spec_hash, GameSpec},
    FRAME_MS, VERSION,
};

/// Hard stop for sessions whose win condition never triggers.
const MAX_FRAMES: u32 = 60 * 60 * 10;

/// Result of one run, compared across replays.
struct RunSummary {
    outcome: Option<Outcome>,
    frames: u32,
    telemetry_json: String,
    telemetry_digest: [u8; 32],
    state_bytes: Vec<u8>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Fates Engine v{}", VERSION);

    let spec = match std::env::args().nth(1) {
        Some(path) => {
            let text = fs::read_to_string(&path).with_context(|| format!("reading {path}"))?;
            load_spec_str(&text).with_context(|| format!("parsing {path}"))?
        }
        None => load_spec(None)?,
    };
    info!("Spec hash: {}", spec_hash(&spec)?);
    info!("Seed: {}", spec.seed);

    info!("=== Starting Bot Session ===");
    let first = run_bot(&spec)?;
    match first.outcome {
        Some(outcome) => info!("Outcome after {} frames: {}", first.frames, outcome.as_str()),
        None => warn!("No outcome after {} frames", first.frames),
    }
    info!("Telemetry digest: {}", hex::encode(first.telemetry_digest));

    info!("=== Verifying Determinism ===");
    let replay = run_bot(&spec)?;
    info!("Replay digest:    {}", hex::encode(replay.telemetry_digest));

    if first.telemetry_json != replay.telemetry_json || first.state_bytes != replay.state_bytes {
        bail!("DETERMINISM FAILURE: replay diverged");
    }
    info!("DETERMINISM VERIFIED: telemetry and state match");
    Ok(())
}

fn run_bot(spec: &GameSpec) -> anyhow::Result<RunSummary> {
    let mut session = Session::new(spec.clone(), SessionConfig::default());
    session.start()?;
    session.set_bot_mode(true);

    let mut frames = 0;
    while session.is_running() && frames < MAX_FRAMES {
        session.frame(FRAME_MS, FrameInput::idle())?;
        frames += 1;
    }

    let telemetry = session.telemetry();
    info!(
        "{} telemetry events, {} enemies alive, player hp {:.2}",
        telemetry.count(),
        session.entities().enemies.len(),
        session.entities().player.hp
    );

    let kinds = session.engine().kinds();
    for missing in session.catalog().unmet_emissions(&kinds, telemetry) {
        warn!("Rule never emitted required event {}", missing);
    }

    Ok(RunSummary {
        outcome: session.outcome(),
        frames,
        telemetry_json: telemetry.to_json()?,
        telemetry_digest: telemetry.digest()?,
        state_bytes: session.state_bytes()?,
    })
}
