//! Bugs Arena entry point
//!
//! Headless native runner: loads settings, then drives the simulation at a
//! fixed timestep with a scripted player that presses on the lowest actor.
//! Rendering and input belong to a front end; this binary only exercises the
//! core and logs what happens.

#[cfg(not(target_arch = "wasm32"))]
use bugs_arena::{
    ArenaSettings,
    consts::SIM_DT,
    sim::{ArenaEvent, ArenaState, TickInput, tick},
};

/// Simulated seconds per run
#[cfg(not(target_arch = "wasm32"))]
const RUN_SECONDS: f32 = 30.0;

/// The scripted player presses once every this many ticks
#[cfg(not(target_arch = "wasm32"))]
const PRESS_EVERY: u64 = 45;

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Bugs Arena (headless) starting...");

    let settings = match std::env::args().nth(1) {
        Some(path) => match ArenaSettings::load(&path) {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("Could not load settings from {}: {} - using defaults", path, e);
                ArenaSettings::default()
            }
        },
        None => {
            log::info!("Using default settings");
            ArenaSettings::default()
        }
    };

    let mut state = match ArenaState::new(settings) {
        Ok(state) => state,
        Err(e) => {
            log::error!("Could not build arena: {}", e);
            std::process::exit(1);
        }
    };

    let (mut spawned, mut escaped, mut squashed) = (0u32, 0u32, 0u32);
    let ticks = (RUN_SECONDS / SIM_DT) as u64;

    for t in 0..ticks {
        // Aim at the actor closest to escaping
        let pointer = if t % PRESS_EVERY == 0 {
            state
                .active
                .values()
                .min_by(|a, b| a.center().y.total_cmp(&b.center().y))
                .map(|bug| bug.center())
        } else {
            None
        };

        tick(&mut state, &TickInput { pointer }, SIM_DT);

        for event in state.drain_events() {
            match event {
                ArenaEvent::Spawned { .. } => spawned += 1,
                ArenaEvent::Escaped { .. } => escaped += 1,
                ArenaEvent::Squashed { .. } => squashed += 1,
            }
        }
    }

    log::info!(
        "{} ticks: {} spawned, {} squashed, {} escaped, {} still active",
        ticks,
        spawned,
        squashed,
        escaped,
        state.active_count()
    );
    println!("spawned={spawned} squashed={squashed} escaped={escaped}");
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // No headless runner on the web; a front end drives `tick` directly
}
