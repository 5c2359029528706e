//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Seeded RNG only, carried in the state
//! - Stable iteration order (objects by x, enemies by ID)
//! - Timed effects measured in simulation seconds
//! - No rendering or platform dependencies

pub mod aabb;
pub mod camera;
pub mod collision;
pub mod difficulty;
pub mod effects;
pub mod enemy;
pub mod interact;
pub mod interior;
pub mod physics;
pub mod quest;
pub mod snapshot;
pub mod state;
pub mod tick;
pub mod world;
pub mod worldgen;

pub use aabb::Aabb;
pub use camera::Camera;
pub use collision::{CollisionReport, resolve_player};
pub use difficulty::{DifficultyState, Multipliers, PlayStats};
pub use effects::{Expiry, TimedEffects};
pub use enemy::{Behavior, Enemy, EnemyKind};
pub use interior::Interior;
pub use quest::{Quest, QuestTarget, QuestTracker, Reward};
pub use snapshot::{Drawable, Hud, RenderSnapshot, snapshot};
pub use state::{
    DifficultyMode, Facing, GameEvent, GamePhase, GameState, Player, Viewport, WallSide,
};
pub use tick::{Stepper, TickInput, tick};
pub use world::{BuildingKind, ItemType, Layer, ObjectKind, WorldObject};
pub use worldgen::{GenParams, Segment, generate_segment};
