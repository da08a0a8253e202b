//! Tetragon Tussle headless demo
//!
//! Runs a scripted four-player match on a built-in arena, then replays it
//! and checks that both runs end in the same state.
//!
//! Usage: `tetragon-tussle [config.json]`. Logging follows `RUST_LOG`
//! (default `info`).

use std::cell::RefCell;
use std::rc::Rc;

use anyhow::{Context, Result};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use tetragon_tussle::{
    core::hash::StateHash,
    game::{
        entity::EntityCell,
        events::Elimination,
        input::ScriptedInput,
        maps,
        modes::LastStanding,
        surface::RecordingSurface,
        weapons::{loadout, WeaponKind},
    },
    PlayerConfig, SimConfig, Simulation, Vec2, VERSION,
};

/// Frame length of the simulated host, in ms.
const FRAME_MS: f64 = 1000.0 / 60.0;

/// Upper bound on simulated frames (two minutes).
const MAX_FRAMES: u64 = 7200;

const COLORS: [(&str, &str, &str, &str); 4] = [
    ("red", "#e33", "#722", "#f99"),
    ("blue", "#36e", "#237", "#9bf"),
    ("green", "#3b4", "#264", "#9e9"),
    ("yellow", "#eb2", "#763", "#fe8"),
];

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Tetragon Tussle v{}", VERSION);

    let config = match std::env::args().nth(1) {
        Some(path) => {
            let text = std::fs::read_to_string(&path).with_context(|| format!("reading {path}"))?;
            SimConfig::from_json(&text).with_context(|| format!("parsing {path}"))?
        }
        None => SimConfig::default(),
    };
    info!("RNG Seed: {}", config.rng_seed);

    info!("=== Starting Demo Match ===");
    let first = run_match(&config)?;
    info!("Final State Hash: {}", hex::encode(first.hash));

    info!("=== Verifying Determinism ===");
    let replay = run_match(&config)?;
    info!("Replay State Hash: {}", hex::encode(replay.hash));

    if first.hash == replay.hash && first.winner == replay.winner {
        info!("DETERMINISM VERIFIED: Hashes match!");
    } else {
        warn!("DETERMINISM FAILURE: Hashes differ!");
    }
    Ok(())
}

struct MatchOutcome {
    hash: StateHash,
    winner: Option<String>,
}

/// Scripted input for player `slot` at `frame`.
fn drive(input: &ScriptedInput, slot: u64, frame: u64) {
    let x = ((frame / (40 + slot * 13) + slot) % 3) as f64 - 1.0;
    let y = if (frame + slot * 17) % 90 < 5 { -1.0 } else { 0.0 };
    input.set_move(Vec2::new(x, y));

    if (frame / 20 + slot) % 4 == 0 {
        input.press("primary");
    } else {
        input.release("primary");
    }
    if (frame + slot * 7) % 200 < 3 {
        input.press("secondary");
    } else {
        input.release("secondary");
    }
}

fn run_match(config: &SimConfig) -> Result<MatchOutcome> {
    let arena = maps::walled_arena().context("loading built-in arena")?;
    info!("Arena: {} ({}x{})", arena.name, arena.board.width(), arena.board.height());

    let mut inputs = Vec::new();
    let mut players = Vec::new();
    for (&start, (name, color, mid, light)) in arena.spawn_points.iter().zip(COLORS) {
        let input = ScriptedInput::new();
        let player = PlayerConfig::new(name, start, Box::new(input.clone()))
            .with_colors(color, mid, light)
            .with_on_spawn(loadout(vec![
                (WeaponKind::Gun, "primary".to_string()),
                (WeaponKind::Shield, "secondary".to_string()),
            ]));
        inputs.push(input);
        players.push(Rc::new(player));
    }

    let mode = Rc::new(RefCell::new(LastStanding::new()));
    let mode_cell: EntityCell = mode.clone();
    let mut sim = Simulation::new(config.clone(), arena.board, players, vec![mode_cell]);
    sim.subscribe(Box::new(|event: &Elimination| info!("{}", event)));
    sim.start();

    let mut surface = RecordingSurface::default();
    let mut frame: u64 = 0;
    while frame < MAX_FRAMES {
        for (slot, input) in inputs.iter().enumerate() {
            drive(input, slot as u64, frame);
        }
        if !sim.frame(frame as f64 * FRAME_MS) {
            break;
        }
        if sim.is_running() && frame % 600 == 0 {
            surface.fills.clear();
            sim.draw(&mut surface)?;
            debug!(frame, fills = surface.fills.len(), "drew frame");
            info!("Frame {}: {} alive, {} entities", frame, sim.player_count(), sim.entity_count());
        }
        frame += 1;
    }

    let winner = mode.borrow().winner().map(str::to_string);
    match &winner {
        Some(name) => info!("Match ended at frame {}! Winner: {}", sim.frame_count(), name),
        None if mode.borrow().is_finished() => info!("Match ended at frame {} with no survivor", sim.frame_count()),
        None => info!("Time limit reached with {} players left", sim.player_count()),
    }
    sim.stop();

    Ok(MatchOutcome { hash: sim.state_hash(), winner })
}
