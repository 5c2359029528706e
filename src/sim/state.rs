//! Game state and core simulation types
//!
//! Everything a run needs lives in [`GameState`]; tick functions take it by
//! `&mut` and nothing else is mutated.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::aabb::Aabb;
use super::camera::Camera;
use super::difficulty::DifficultyState;
use super::effects::TimedEffects;
use super::enemy::{Enemy, EnemyKind};
use super::interior::Interior;
use super::quest::QuestTracker;
use super::world::{BuildingKind, ItemType, WorldObject};
use super::worldgen;
use crate::consts::*;
use crate::tuning::Tuning;

/// Current phase of the game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Title screen, waiting for start input
    Menu,
    /// Active gameplay
    Playing,
    /// Game is paused
    Paused,
    /// Player died; waiting for restart
    GameOver,
}

/// Difficulty mode chosen by the player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DifficultyMode {
    /// Side hits from enemies are harmless, no high scores
    Easy,
    #[default]
    Normal,
}

impl DifficultyMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DifficultyMode::Easy => "Easy",
            DifficultyMode::Normal => "Normal",
        }
    }
}

/// Horizontal facing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Facing {
    Left,
    Right,
}

/// Logical canvas size
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 960.0,
            height: 600.0,
        }
    }
}

/// Player animation tags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnimTag {
    Idle,
    Walk,
    Run,
    Jump,
    Apex,
    Fall,
    Crouch,
    WallSlide,
}

impl AnimTag {
    /// (frame count, seconds per frame)
    pub fn timing(&self) -> (u32, f32) {
        match self {
            AnimTag::Idle => (4, 0.25),
            AnimTag::Walk => (6, 0.1),
            AnimTag::Run => (6, 0.06),
            AnimTag::Jump | AnimTag::Apex | AnimTag::Fall => (1, 1.0),
            AnimTag::Crouch => (2, 0.3),
            AnimTag::WallSlide => (2, 0.15),
        }
    }
}

/// Frame-based animation cursor
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Animation {
    pub tag: AnimTag,
    pub frame: u32,
    pub timer: f32,
}

impl Animation {
    pub fn new(tag: AnimTag) -> Self {
        Self {
            tag,
            frame: 0,
            timer: 0.0,
        }
    }

    /// Switch tag (restarting on change) and advance the frame clock
    pub fn update(&mut self, tag: AnimTag, dt: f32) {
        if tag != self.tag {
            *self = Self::new(tag);
            return;
        }
        let (frames, frame_time) = tag.timing();
        self.timer += dt;
        while self.timer >= frame_time {
            self.timer -= frame_time;
            self.frame = (self.frame + 1) % frames;
        }
    }
}

/// Which side of the player a wall is on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WallSide {
    Left,
    Right,
}

impl WallSide {
    /// Direction pointing away from the wall
    pub fn away(&self) -> f32 {
        match self {
            WallSide::Left => 1.0,
            WallSide::Right => -1.0,
        }
    }
}

/// The player character
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    /// Top-left corner
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: Vec2,
    pub facing: Facing,
    pub on_ground: bool,
    pub crouching: bool,
    /// Wall the player is currently sliding down
    pub wall_slide: Option<WallSide>,
    /// Wall touched during the last collision pass
    pub wall_contact: Option<WallSide>,
    /// Seconds since takeoff while jump is held
    pub jump_hold_time: f32,
    /// Currently in a jump started by the player (for hold/cut)
    pub jump_active: bool,
    /// Horizontal input is ignored until this reaches zero
    pub wall_jump_lock: f32,
    /// Accelerated-jump factor (>= 1, decays to 1)
    pub accel_factor: f32,
    /// Charge bar oscillator phase (radians)
    pub jump_bar_phase: f32,
    pub anim: Animation,
    pub base_speed: f32,
    /// Sum of active timed speed buffs
    pub speed_buff: f32,
    /// 0..=1
    pub stamina: f32,
    pub sprinting: bool,
    /// Bottom edge at the start of the tick (for crossing tests)
    pub prev_bottom: f32,
    /// Furthest x reached this run
    pub max_x: f32,
}

impl Player {
    pub fn new() -> Self {
        let size = Vec2::new(PLAYER_WIDTH, PLAYER_STAND_HEIGHT);
        Self {
            pos: Vec2::new(PLAYER_SPAWN_X, GROUND_Y - size.y),
            vel: Vec2::ZERO,
            size,
            facing: Facing::Right,
            on_ground: true,
            crouching: false,
            wall_slide: None,
            wall_contact: None,
            jump_hold_time: 0.0,
            jump_active: false,
            wall_jump_lock: 0.0,
            accel_factor: 1.0,
            jump_bar_phase: 0.0,
            anim: Animation::new(AnimTag::Idle),
            base_speed: PLAYER_BASE_SPEED,
            speed_buff: 0.0,
            stamina: 1.0,
            sprinting: false,
            prev_bottom: GROUND_Y,
            max_x: PLAYER_SPAWN_X,
        }
    }

    pub fn aabb(&self) -> Aabb {
        Aabb::new(self.pos, self.size)
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.pos.y + self.size.y
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.pos + self.size * 0.5
    }

    /// Toggle crouch height while keeping the feet planted
    pub fn set_crouching(&mut self, crouch: bool) {
        if crouch == self.crouching {
            return;
        }
        let height = if crouch {
            PLAYER_CROUCH_HEIGHT
        } else {
            PLAYER_STAND_HEIGHT
        };
        self.pos.y += self.size.y - height;
        self.size.y = height;
        self.crouching = crouch;
    }

    /// Current charge bar fill, 0..=1
    pub fn jump_bar(&self) -> f32 {
        0.5 - 0.5 * self.jump_bar_phase.cos()
    }

    pub fn jump_bar_in_red_zone(&self) -> bool {
        self.jump_bar() >= JUMP_BAR_RED_ZONE
    }

    /// Sprint eligibility, derived from stamina
    pub fn can_sprint(&self) -> bool {
        self.stamina > SPRINT_MIN_STAMINA
    }

    pub fn effective_speed(&self) -> f32 {
        self.base_speed * (1.0 + self.speed_buff)
    }
}

impl Default for Player {
    fn default() -> Self {
        Self::new()
    }
}

/// Gameplay events raised during a tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    Collected { item: ItemType },
    CrateBroken { id: u32 },
    PadBoost { id: u32 },
    SprintStarted,
    EnteredBuilding { id: u32, kind: BuildingKind },
    ExitedBuilding { id: u32 },
    /// First entry into a given building this run
    VisitBuilding { id: u32, kind: BuildingKind },
    EnemyStomped { id: u32 },
    DefeatEnemy { id: u32, kind: EnemyKind },
    /// New meters walked this tick
    Distance { meters: u32 },
    QuestCompleted { index: usize },
    PlayerDied { meters: u32 },
}

/// Run counters shown on the HUD
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Counters {
    pub notes: u32,
    pub records: u32,
    pub golden_notes: u32,
    pub crystals: u32,
    pub items: u32,
    pub enemies_defeated: u32,
}

/// Button states carried between ticks for edge detection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputLatch {
    pub jump: bool,
    pub crouch: bool,
}

/// Monotonic entity ID allocator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityIds {
    next: u32,
}

impl Default for EntityIds {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl EntityIds {
    pub fn next_id(&mut self) -> u32 {
        let id = self.next;
        self.next += 1;
        id
    }
}

/// Complete game state (deterministic, serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub rng: Pcg32,
    pub tuning: Tuning,
    pub phase: GamePhase,
    pub mode: DifficultyMode,
    /// Adaptive difficulty scaling enabled
    pub adaptive: bool,
    /// Simulation seconds this run
    pub time: f64,
    pub time_ticks: u64,
    pub viewport: Viewport,
    pub player: Player,
    /// Active enemies (sorted by id for determinism)
    pub enemies: Vec<Enemy>,
    /// Street objects (sorted by x)
    pub objects: Vec<WorldObject>,
    /// Rightmost generated x
    pub frontier: f32,
    pub camera: Camera,
    /// Set while the player is inside a building
    pub interior: Option<Interior>,
    pub quests: QuestTracker,
    /// Cumulative across runs
    pub difficulty: DifficultyState,
    pub effects: TimedEffects,
    pub counters: Counters,
    /// Meters already reported through `GameEvent::Distance`
    pub meters_reported: u32,
    pub notification: Option<String>,
    /// Events raised by the most recent tick
    pub events: Vec<GameEvent>,
    pub latch: InputLatch,
    pub ids: EntityIds,
}

impl GameState {
    /// Create a new game state with the given seed, sitting at the menu
    pub fn new(seed: u64) -> Self {
        Self::with_tuning(seed, Tuning::default())
    }

    /// Create a game with a custom balance table, sanitized first
    pub fn with_tuning(seed: u64, tuning: Tuning) -> Self {
        let viewport = Viewport::default();
        let mut state = Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            tuning: tuning.sanitized(),
            phase: GamePhase::Menu,
            mode: DifficultyMode::Normal,
            adaptive: true,
            time: 0.0,
            time_ticks: 0,
            viewport,
            player: Player::new(),
            enemies: Vec::new(),
            objects: Vec::new(),
            frontier: 0.0,
            camera: Camera::default(),
            interior: None,
            quests: QuestTracker::new(),
            difficulty: DifficultyState::new(),
            effects: TimedEffects::default(),
            counters: Counters::default(),
            meters_reported: 0,
            notification: None,
            events: Vec::new(),
            latch: InputLatch::default(),
            ids: EntityIds::default(),
        };
        state.spawn_world();
        state
    }

    /// Reinitialize the run to spawn defaults
    ///
    /// Cumulative play statistics, the mode and the viewport survive; all
    /// pending timed effects are dropped so nothing from the old run can
    /// fire into the new one.
    pub fn reset_game(&mut self) {
        log::info!(
            "Resetting run (deaths so far: {})",
            self.difficulty.stats.deaths
        );
        self.time = 0.0;
        self.time_ticks = 0;
        self.player = Player::new();
        self.enemies.clear();
        self.objects.clear();
        self.frontier = 0.0;
        self.camera = Camera::default();
        self.interior = None;
        self.quests = QuestTracker::new();
        self.effects.clear();
        self.counters = Counters::default();
        self.meters_reported = 0;
        self.notification = None;
        self.events.clear();
        self.latch = InputLatch::default();
        self.phase = GamePhase::Playing;
        self.spawn_world();
    }

    fn spawn_world(&mut self) {
        self.camera.follow(&self.player, &self.viewport);
        worldgen::stream(self);
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        self.ids.next_id()
    }

    /// Change the viewport (canvas resize)
    pub fn set_viewport(&mut self, width: f32, height: f32) {
        self.viewport = Viewport {
            width: width.max(1.0),
            height: height.max(1.0),
        };
    }

    /// Meters walked this run
    pub fn meters(&self) -> u32 {
        crate::units_to_meters(self.player.max_x - PLAYER_SPAWN_X)
    }

    pub fn is_inside(&self) -> bool {
        self.interior.is_some()
    }

    /// Show a HUD message for a few seconds
    pub fn notify(&mut self, text: impl Into<String>) {
        let text = text.into();
        log::debug!("Notification: {text}");
        self.notification = Some(text);
        self.effects.schedule(
            self.time + NOTIFICATION_DURATION as f64,
            super::effects::Expiry::ClearNotification,
        );
    }

    /// Stack a temporary speed buff that reverts after `duration` seconds
    pub fn add_speed_buff(&mut self, amount: f32, duration: f32) {
        self.player.speed_buff += amount;
        self.effects.schedule(
            self.time + duration as f64,
            super::effects::Expiry::RevertSpeedBuff { amount },
        );
    }

    /// Ensure entities are sorted for deterministic iteration
    pub fn normalize_order(&mut self) {
        self.enemies.sort_by_key(|e| e.id);
    }
}
