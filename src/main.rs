//! City Hopper entry point
//!
//! On wasm the browser host in `city_hopper::web` takes over. Natively there
//! is no window; a scripted headless run exercises the simulation and logs
//! what happens, which is handy for balancing `Tuning` values.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    city_hopper::web::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("City Hopper (native) starting...");
    log::info!("Native mode runs headless - serve the wasm build for the playable version");

    let seed = std::env::args()
        .nth(1)
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(42);
    headless::run(seed, 120.0);
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use city_hopper::sim::{GameEvent, GamePhase, GameState, Stepper, TickInput};
    use city_hopper::{HighScores, Settings};

    /// Play a scripted run: walk right, hop every so often, retry on death
    pub fn run(seed: u64, seconds: f32) {
        let settings = Settings::load();
        let mut state = GameState::new(seed);
        settings.apply(&mut state);
        let mut stepper = Stepper::default();
        let mut scores = HighScores::load();

        let frame_dt = 1.0 / 60.0;
        let frames = (seconds / frame_dt) as u32;
        let mut input = TickInput {
            start: true,
            ..Default::default()
        };

        for frame in 0..frames {
            input.right = true;
            // Hold jump for a quarter second out of every second
            input.jump = frame % 60 < 15;
            stepper.advance(&mut state, &input, frame_dt);
            input.start = false;

            for event in stepper.events() {
                match event {
                    GameEvent::QuestCompleted { index } => {
                        log::info!("Quest {} completed", index + 1)
                    }
                    GameEvent::EnteredBuilding { kind, .. } => {
                        log::info!("Entered {}", kind.as_str())
                    }
                    _ => {}
                }
            }

            if state.phase == GamePhase::GameOver {
                let meters = state.meters();
                log::info!("Run ended at {meters} m");
                scores.record_run(meters, state.counters.notes, state.mode, frame as f64);
                input.start = true;
            }
        }

        log::info!(
            "Finished: {} m, {} notes, {} records, {} enemies defeated, skill {:.2}",
            state.meters(),
            state.counters.notes,
            state.counters.records,
            state.counters.enemies_defeated,
            state.difficulty.skill,
        );
        log::info!(
            "Streamed {} objects up to x={:.0} ({} enemies alive)",
            state.objects.len(),
            state.frontier,
            state.enemies.len(),
        );
        if let Some(best) = scores.top_score() {
            log::info!("Best run: {best} m");
        }
        scores.save();
    }
}
