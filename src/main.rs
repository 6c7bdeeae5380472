//! Bounce Sim entry point
//!
//! Headless native driver: plays one scripted round through the simulation
//! core and prints the final frame snapshot as JSON.
//!
//! Usage: `bounce-sim [settings.json] [seed]`

use std::path::Path;

use glam::Vec2;

use bounce_sim::Settings;
use bounce_sim::consts::*;
use bounce_sim::sim::{GameEvent, GamePhase, GameState, TickInput, tick};

/// Aim offsets from the ball, in screen space
const SCRIPTED_AIMS: [(f32, f32); 5] = [
    (0.0, -50.0),
    (250.0, -300.0),
    (-400.0, -150.0),
    (150.0, 80.0),
    (-60.0, -380.0),
];

/// Upper bound on ticks for the whole scripted round
const MAX_TICKS: u64 = 4_000_000;

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Bounce Sim (headless) starting...");

    let mut args = std::env::args().skip(1);
    let settings = match args.next() {
        Some(path) => Settings::load_from(Path::new(&path)),
        None => Settings::default(),
    };
    let seed = args.next().and_then(|s| s.parse().ok()).unwrap_or(12345);

    let mut state = match GameState::new(seed, settings) {
        Ok(state) => state,
        Err(e) => {
            log::error!("Cannot start round: {}", e);
            std::process::exit(1);
        }
    };
    log::info!("Game initialized with seed: {}", seed);

    let launches = state.launches_remaining.max(0) as usize;
    let mut aims = SCRIPTED_AIMS.iter().cycle().take(launches);
    let mut pending_launch = true;

    for _ in 0..MAX_TICKS {
        let mut input = TickInput::default();
        if state.phase == GamePhase::Idle {
            if !pending_launch {
                break;
            }
            match aims.next() {
                Some(&(dx, dy)) => {
                    input.aim = Some(state.particle.pos + Vec2::new(dx, dy));
                    input.launch = true;
                }
                None => pending_launch = false,
            }
        }

        tick(&mut state, &input, SIM_DT);

        for event in state.drain_events() {
            match event {
                GameEvent::CameToRest { pos } => log::info!(
                    "Rest at ({:.1}, {:.1}) after {} bounces, score {}",
                    pos.x,
                    pos.y,
                    state.display_bounces,
                    state.score
                ),
                GameEvent::PointCollected { .. } => log::info!("Point! score {}", state.score),
                _ => {}
            }
        }
    }

    match serde_json::to_string_pretty(&state.snapshot()) {
        Ok(json) => println!("{}", json),
        Err(e) => log::error!("Could not serialize snapshot: {}", e),
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // Browser builds drive the simulation from the host page
}
