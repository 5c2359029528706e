//! City Hopper - A side-scrolling city platformer
//!
//! Core modules:
//! - `sim`: Deterministic simulation (physics, collisions, AI, world streaming)
//! - `platform`: Browser/native input normalization
//! - `tuning`: Data-driven game balance
//! - `highscores`: Top-10 distance leaderboard
//! - `settings`: Player preferences
//! - `storage`: LocalStorage persistence

pub mod highscores;
pub mod platform;
pub mod settings;
pub mod sim;
pub mod storage;
pub mod tuning;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use highscores::HighScores;
pub use settings::Settings;
pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (120 Hz for smooth physics)
    pub const SIM_DT: f32 = 1.0 / 120.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Longest frame the host will feed into the accumulator
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// World units per meter of distance walked
    pub const UNITS_PER_METER: f32 = 20.0;
    /// Y of the street surface (y grows downward)
    pub const GROUND_Y: f32 = 540.0;

    /// Player dimensions
    pub const PLAYER_WIDTH: f32 = 32.0;
    pub const PLAYER_STAND_HEIGHT: f32 = 48.0;
    pub const PLAYER_CROUCH_HEIGHT: f32 = 28.0;
    pub const PLAYER_SPAWN_X: f32 = 80.0;

    /// Horizontal movement (units/s)
    pub const PLAYER_BASE_SPEED: f32 = 220.0;
    pub const SPRINT_MULTIPLIER: f32 = 2.0;
    /// Ground friction base, applied as `base^(dt*60)`
    pub const GROUND_FRICTION: f32 = 0.85;

    /// Stamina (fraction of full per second)
    pub const STAMINA_DRAIN: f32 = 0.35;
    pub const STAMINA_REGEN: f32 = 0.15;
    pub const SPRINT_MIN_STAMINA: f32 = 0.1;

    /// Vertical motion
    pub const GRAVITY: f32 = 1500.0;
    pub const TERMINAL_VELOCITY: f32 = 700.0;
    /// Above this total speed the velocity vector is damped
    pub const DRAG_THRESHOLD: f32 = 900.0;
    pub const DRAG_FACTOR: f32 = 0.995;

    /// Jumping
    pub const JUMP_IMPULSE: f32 = 520.0;
    /// Extra lift is applied while jump is held this long after takeoff
    pub const JUMP_HOLD_WINDOW: f32 = 0.15;
    pub const JUMP_HOLD_FORCE: f32 = 900.0;
    /// Releasing jump before this cuts the ascent
    pub const JUMP_HOLD_MAX: f32 = 0.3;
    pub const JUMP_CUT_FACTOR: f32 = 0.5;

    /// Accelerated jump (charge bar red zone)
    pub const ACCEL_JUMP_MULTIPLIER: f32 = 1.35;
    /// Linear decay of the accelerated-jump factor per second
    pub const ACCEL_JUMP_DECAY: f32 = 0.25;
    /// Charge bar oscillation (radians/s)
    pub const JUMP_BAR_SPEED: f32 = 2.5;
    pub const JUMP_BAR_RED_ZONE: f32 = 0.85;

    /// Wall slide / wall jump
    pub const WALL_SLIDE_MAX_SPEED: f32 = 120.0;
    pub const WALL_SLIDE_FRICTION: f32 = 0.96;
    pub const WALL_JUMP_VY: f32 = 480.0;
    pub const WALL_JUMP_VX: f32 = 260.0;
    pub const WALL_JUMP_LOCK: f32 = 0.18;

    /// Animation cues: ascending faster than this shows the jump pose,
    /// anything between this and the fall threshold shows the apex pose
    pub const ANIM_RISE_SPEED: f32 = 400.0;
    pub const ANIM_FALL_SPEED: f32 = 200.0;

    /// Half-width of the horizontal scan window for collisions
    pub const COLLISION_WINDOW: f32 = 400.0;

    /// Combat
    pub const STOMP_BOUNCE: f32 = 380.0;
    pub const STOMP_TOLERANCE: f32 = 10.0;
    pub const ENEMY_DEATH_DELAY: f32 = 0.5;
    /// Enemies wandering this far past the frontier are dropped
    pub const ENEMY_ROAM_MARGIN: f32 = 400.0;

    /// Hazards
    pub const CRATE_SIZE: f32 = 36.0;
    pub const CRATE_BOUNCE: f32 = 300.0;
    pub const PAD_BOOST: f32 = 1.8;
    pub const PAD_COOLDOWN: f32 = 2.0;

    /// Timed speed buffs (fraction added to base speed)
    pub const SPEED_BUFF_AMOUNT: f32 = 0.5;
    pub const SPEED_BUFF_DURATION: f32 = 5.0;
    pub const FIRE_STATION_BUFF_AMOUNT: f32 = 0.3;
    pub const FIRE_STATION_BUFF_DURATION: f32 = 8.0;

    /// Camera and streaming
    pub const CAMERA_LEAD: f32 = 0.35;
    pub const VIEW_RANGE_MULTIPLIER: f32 = 1.0;
    pub const GENERATION_BUFFER: f32 = 800.0;
    pub const SEGMENT_SPAN: f32 = 1200.0;
    /// No enemies are generated before this x
    pub const SAFE_START_DISTANCE: f32 = 600.0;

    /// Notifications and quests (seconds)
    pub const NOTIFICATION_DURATION: f32 = 3.0;
    pub const QUEST_ADVANCE_DELAY: f32 = 2.0;

    /// Building interiors
    pub const INTERIOR_WIDTH: f32 = 800.0;
    pub const INTERIOR_DOOR_ZONE: f32 = 90.0;
    pub const INTERIOR_DOOR_X: f32 = 30.0;
    pub const DOOR_WIDTH: f32 = 40.0;
    pub const DOOR_HEIGHT: f32 = 70.0;
    pub const STORE_GIFT_RECORDS: u32 = 3;
    pub const SUPERMARKET_ITEMS: u32 = 8;
}

/// Convert world units to whole meters
#[inline]
pub fn units_to_meters(units: f32) -> u32 {
    (units.max(0.0) / consts::UNITS_PER_METER).floor() as u32
}

/// Piecewise-linear interpolation over `(x, y)` knots sorted by x
///
/// Values outside the knot range clamp to the end knots.
pub fn piecewise_linear(x: f32, knots: &[(f32, f32)]) -> f32 {
    let Some(&(first_x, first_y)) = knots.first() else {
        return 0.0;
    };
    if x <= first_x {
        return first_y;
    }
    for pair in knots.windows(2) {
        let (x0, y0) = pair[0];
        let (x1, y1) = pair[1];
        if x <= x1 {
            let span = x1 - x0;
            if span <= f32::EPSILON {
                return y1;
            }
            return y0 + (y1 - y0) * (x - x0) / span;
        }
    }
    knots.last().map(|&(_, y)| y).unwrap_or(first_y)
}
