//! Simulation tick
//!
//! Advances the game by one step in a fixed order: phase handling, player
//! movement, collision, interactions, enemies, world streaming, timed
//! effects, quests and difficulty, camera, animation.

use serde::{Deserialize, Serialize};

use super::collision::resolve_player;
use super::effects::Expiry;
use super::enemy::{apply_speed_multiplier, update_enemies};
use super::interact::{interact, rearm_pad, resolve_enemy_contact};
use super::physics::{step_player, update_animation};
use super::quest::Reward;
use super::state::{GameEvent, GamePhase, GameState, InputLatch};
use super::worldgen;
use crate::consts::*;

/// Normalized input intent for a single tick
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TickInput {
    pub left: bool,
    pub right: bool,
    pub jump: bool,
    pub crouch: bool,
    /// Analog speed factor in [0, 1] (tilt/stick); `None` is full speed
    pub analog_speed: Option<f32>,
    /// Start or restart a run (one-shot)
    pub start: bool,
    /// Pause toggle (one-shot)
    pub pause: bool,
}

/// Advance the game state by `dt` seconds
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    state.events.clear();
    let dt = dt.clamp(0.0, MAX_FRAME_DT);

    match state.phase {
        GamePhase::Menu | GamePhase::GameOver => {
            if input.start {
                log::info!("Starting run (seed {})", state.seed);
                state.reset_game();
            }
            latch_input(state, input);
            return;
        }
        GamePhase::Paused => {
            if input.pause {
                state.phase = GamePhase::Playing;
            } else {
                return;
            }
        }
        GamePhase::Playing => {
            if input.pause {
                state.phase = GamePhase::Paused;
                return;
            }
        }
    }

    state.time += dt as f64;
    state.time_ticks += 1;

    // Player
    let crouch_pressed = input.crouch && !state.latch.crouch;
    let room_width = state.is_inside().then_some(INTERIOR_WIDTH);
    let outcome = step_player(
        &mut state.player,
        input,
        &state.latch,
        dt,
        state.difficulty.multipliers.stamina_drain,
        room_width,
    );
    if outcome.sprint_started {
        state.difficulty.stats.sprint_uses += 1;
        state.events.push(GameEvent::SprintStarted);
    }

    let report = match &state.interior {
        Some(room) => resolve_player(&mut state.player, &[], &room.furniture),
        None => resolve_player(&mut state.player, &state.objects, &[]),
    };
    interact(state, &report, crouch_pressed);
    state.camera.follow(&state.player, &state.viewport);

    // The street is frozen while the player is inside
    if !state.is_inside() {
        let target = state.player.center();
        update_enemies(&mut state.enemies, target, dt, &mut state.rng);
        resolve_enemy_contact(state);
        worldgen::stream(state);
    }

    for expiry in state.effects.drain_due(state.time) {
        apply_expiry(state, expiry);
    }

    report_distance(state);
    update_quests(state);
    state
        .difficulty
        .update(dt, &state.tuning.difficulty, state.adaptive);
    apply_speed_multiplier(&mut state.enemies, state.difficulty.multipliers.enemy_speed);

    update_animation(&mut state.player, dt);
    latch_input(state, input);
}

fn latch_input(state: &mut GameState, input: &TickInput) {
    state.latch = InputLatch {
        jump: input.jump,
        crouch: input.crouch,
    };
}

fn apply_expiry(state: &mut GameState, expiry: Expiry) {
    match expiry {
        Expiry::RevertSpeedBuff { amount } => {
            state.player.speed_buff = (state.player.speed_buff - amount).max(0.0);
        }
        Expiry::PadCooldown { object_id } => rearm_pad(state, object_id),
        Expiry::ClearNotification => {
            // A newer message keeps its own timer
            if !state.effects.has_pending(&Expiry::ClearNotification) {
                state.notification = None;
            }
        }
        Expiry::AdvanceQuest => {
            let next = state.quests.advance().map(|q| q.title.clone());
            if let Some(title) = next {
                state.notify(format!("New quest: {title}"));
            }
        }
    }
}

/// Emit newly walked meters
fn report_distance(state: &mut GameState) {
    let meters = state.meters();
    if meters > state.meters_reported {
        let delta = meters - state.meters_reported;
        state.meters_reported = meters;
        state.difficulty.add_distance(delta);
        state.events.push(GameEvent::Distance { meters: delta });
    }
}

fn update_quests(state: &mut GameState) {
    let events = state.events.clone();
    for event in &events {
        if let Some(index) = state.quests.update_progress(event) {
            complete_quest(state, index);
        }
    }
}

fn complete_quest(state: &mut GameState, index: usize) {
    let Some(quest) = state.quests.quests.get(index) else {
        return;
    };
    let (title, reward) = (quest.title.clone(), quest.reward);
    match reward {
        Reward::Notes(n) => state.counters.notes += n,
        Reward::Records(n) => state.counters.records += n,
        Reward::FullStamina => state.player.stamina = 1.0,
    }
    state.difficulty.stats.quests_completed += 1;
    state.notify(format!("Quest complete: {title} ({})", reward.describe()));
    state.effects.schedule(
        state.time + QUEST_ADVANCE_DELAY as f64,
        Expiry::AdvanceQuest,
    );
    state.events.push(GameEvent::QuestCompleted { index });
}

/// Fixed-timestep driver for hosts with a measured frame time
///
/// One-shot inputs (start, pause) are held until a tick consumes them, so a
/// frame shorter than `SIM_DT` does not swallow a key press.
#[derive(Debug, Clone, Default)]
pub struct Stepper {
    accumulator: f32,
    pending_start: bool,
    pending_pause: bool,
    events: Vec<GameEvent>,
}

impl Stepper {
    /// Run as many `SIM_DT` ticks as `frame_dt` covers (at most
    /// `MAX_SUBSTEPS`) and return how many ran. One-shot inputs only reach
    /// the first tick that runs.
    pub fn advance(&mut self, state: &mut GameState, input: &TickInput, frame_dt: f32) -> u32 {
        self.accumulator += frame_dt.clamp(0.0, MAX_FRAME_DT);
        self.pending_start |= input.start;
        self.pending_pause |= input.pause;
        self.events.clear();

        let mut input = input.clone();
        let mut steps = 0;
        while self.accumulator >= SIM_DT && steps < MAX_SUBSTEPS {
            input.start = std::mem::take(&mut self.pending_start);
            input.pause = std::mem::take(&mut self.pending_pause);
            tick(state, &input, SIM_DT);
            self.events.extend(state.events.iter().cloned());
            self.accumulator -= SIM_DT;
            steps += 1;
        }
        if steps == MAX_SUBSTEPS {
            self.accumulator = self.accumulator.min(SIM_DT);
        }
        steps
    }

    /// Events from every tick run by the last `advance`
    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    /// Fraction of a step left in the accumulator (for interpolation)
    pub fn alpha(&self) -> f32 {
        self.accumulator / SIM_DT
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::KeyState;
    use crate::sim::interact::insert_sorted;
    use crate::sim::world::{ItemType, WorldObject};

    fn playing(seed: u64) -> GameState {
        let mut state = GameState::new(seed);
        let start = TickInput {
            start: true,
            ..Default::default()
        };
        tick(&mut state, &start, SIM_DT);
        state
    }

    #[test]
    fn test_tick_menu_to_playing() {
        let mut state = GameState::new(12345);
        assert_eq!(state.phase, GamePhase::Menu);

        tick(&mut state, &TickInput::default(), SIM_DT);
        assert_eq!(state.phase, GamePhase::Menu);
        assert_eq!(state.time_ticks, 0);

        let start = TickInput {
            start: true,
            ..Default::default()
        };
        tick(&mut state, &start, SIM_DT);
        assert_eq!(state.phase, GamePhase::Playing);
    }

    #[test]
    fn test_tick_pause() {
        let mut state = playing(12345);
        let pause = TickInput {
            pause: true,
            ..Default::default()
        };
        tick(&mut state, &pause, SIM_DT);
        assert_eq!(state.phase, GamePhase::Paused);

        let ticks = state.time_ticks;
        tick(&mut state, &TickInput::default(), SIM_DT);
        assert_eq!(state.time_ticks, ticks);

        tick(&mut state, &pause, SIM_DT);
        assert_eq!(state.phase, GamePhase::Playing);
    }

    #[test]
    fn test_walking_reports_distance() {
        let mut state = playing(3);
        state.mode = crate::sim::state::DifficultyMode::Easy;
        let right = TickInput {
            right: true,
            ..Default::default()
        };
        for _ in 0..240 {
            tick(&mut state, &right, SIM_DT);
        }
        assert!(state.meters() > 0);
        assert_eq!(state.meters_reported, state.meters());
        assert!(state.difficulty.stats.distance_m >= state.meters() as f32);
        assert!(state.camera.left() > 0.0);
    }

    #[test]
    fn test_notification_expires() {
        let mut state = playing(5);
        state.notify("hello");
        let steps = ((NOTIFICATION_DURATION + 0.1) / SIM_DT) as usize;
        for _ in 0..steps {
            tick(&mut state, &TickInput::default(), SIM_DT);
        }
        assert!(state.notification.is_none());
    }

    #[test]
    fn test_speed_buff_reverts() {
        let mut state = playing(5);
        state.add_speed_buff(SPEED_BUFF_AMOUNT, 0.5);
        for _ in 0..120 {
            tick(&mut state, &TickInput::default(), SIM_DT);
        }
        assert_eq!(state.player.speed_buff, 0.0);
    }

    #[test]
    fn test_welcome_quest_advances_after_delay() {
        let mut state = playing(7);
        state.objects.clear();
        state.enemies.clear();
        for _ in 0..5 {
            let id = state.next_entity_id();
            let center = state.player.center();
            insert_sorted(
                &mut state.objects,
                WorldObject::collectible(id, center.x, state.player.bottom(), ItemType::Note),
            );
            tick(&mut state, &TickInput::default(), SIM_DT);
        }
        let welcome = &state.quests.quests[0];
        assert!(welcome.completed);
        assert_eq!(welcome.progress, 5);
        assert_eq!(state.quests.active, 0);
        assert!(state.notification.is_some());

        let steps = ((QUEST_ADVANCE_DELAY + 0.1) / SIM_DT) as usize;
        for _ in 0..steps {
            tick(&mut state, &TickInput::default(), SIM_DT);
        }
        assert_eq!(state.quests.active, 1);
    }

    #[test]
    fn test_stepper_caps_substeps() {
        let mut state = playing(9);
        let mut stepper = Stepper::default();
        let steps = stepper.advance(&mut state, &TickInput::default(), 1.0);
        assert_eq!(steps, MAX_SUBSTEPS);
        assert!(stepper.alpha() <= 1.0);

        let steps = stepper.advance(&mut state, &TickInput::default(), SIM_DT * 2.5);
        assert!((2..=3).contains(&steps));
    }

    #[test]
    fn test_short_frames_keep_start_press() {
        let mut state = GameState::new(9);
        let mut stepper = Stepper::default();
        let mut keys = KeyState::default();
        keys.key_down("Enter");
        // A 144 Hz display runs no tick on some frames
        for _ in 0..4 {
            stepper.advance(&mut state, &keys.intent(), 1.0 / 144.0);
        }
        assert_eq!(state.phase, GamePhase::Playing);

        keys.key_up("Enter");
        keys.key_down("KeyP");
        for _ in 0..4 {
            stepper.advance(&mut state, &keys.intent(), 1.0 / 144.0);
        }
        assert_eq!(state.phase, GamePhase::Paused);
    }

    #[test]
    fn test_stepper_collects_events_from_every_substep() {
        let mut state = playing(13);
        state.objects.clear();
        state.enemies.clear();
        let mut stepper = Stepper::default();
        let right = TickInput {
            right: true,
            ..Default::default()
        };
        let mut meters = 0;
        for _ in 0..240 {
            let steps = stepper.advance(&mut state, &right, 1.0 / 30.0);
            assert!(steps >= 3);
            meters += stepper
                .events()
                .iter()
                .map(|e| match e {
                    GameEvent::Distance { meters } => *meters,
                    _ => 0,
                })
                .sum::<u32>();
        }
        assert!(meters > 0);
        assert_eq!(meters, state.meters());
    }

    #[test]
    fn test_determinism() {
        let mut state1 = playing(99999);
        let mut state2 = playing(99999);

        let inputs = [
            TickInput {
                right: true,
                ..Default::default()
            },
            TickInput {
                right: true,
                jump: true,
                ..Default::default()
            },
            TickInput {
                right: true,
                crouch: true,
                ..Default::default()
            },
            TickInput::default(),
        ];

        for input in inputs.iter().cycle().take(600) {
            tick(&mut state1, input, SIM_DT);
            tick(&mut state2, input, SIM_DT);
        }

        assert_eq!(state1.time_ticks, state2.time_ticks);
        assert_eq!(state1.player.pos, state2.player.pos);
        assert_eq!(state1.objects.len(), state2.objects.len());
        assert_eq!(state1.enemies.len(), state2.enemies.len());
        assert_eq!(state1.phase, state2.phase);
    }
}
