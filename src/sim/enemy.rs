//! Enemies and their behaviors
//!
//! Each enemy carries a [`Behavior`] chosen at spawn time. The behavior
//! variant holds that enemy's own phase/timer state, and [`advance`]
//! dispatches on it to produce the next position and velocity.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::aabb::Aabb;
use super::physics::{apply_gravity, land_on};
use crate::consts::*;

/// Enemy species
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnemyKind {
    Slime,
    Bat,
    Spider,
    Ghost,
    Snake,
    Wolf,
}

impl EnemyKind {
    pub const ALL: [EnemyKind; 6] = [
        EnemyKind::Slime,
        EnemyKind::Bat,
        EnemyKind::Spider,
        EnemyKind::Ghost,
        EnemyKind::Snake,
        EnemyKind::Wolf,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EnemyKind::Slime => "slime",
            EnemyKind::Bat => "bat",
            EnemyKind::Spider => "spider",
            EnemyKind::Ghost => "ghost",
            EnemyKind::Snake => "snake",
            EnemyKind::Wolf => "wolf",
        }
    }

    pub fn size(&self) -> Vec2 {
        match self {
            EnemyKind::Slime => Vec2::new(32.0, 24.0),
            EnemyKind::Bat => Vec2::new(32.0, 20.0),
            EnemyKind::Spider => Vec2::new(28.0, 24.0),
            EnemyKind::Ghost => Vec2::new(30.0, 36.0),
            EnemyKind::Snake => Vec2::new(44.0, 16.0),
            EnemyKind::Wolf => Vec2::new(48.0, 30.0),
        }
    }

    pub fn max_health(&self) -> u8 {
        match self {
            EnemyKind::Slime | EnemyKind::Bat | EnemyKind::Snake => 1,
            EnemyKind::Spider | EnemyKind::Ghost => 2,
            EnemyKind::Wolf => 3,
        }
    }

    /// Base horizontal speed (units/s)
    pub fn speed(&self) -> f32 {
        match self {
            EnemyKind::Slime => 60.0,
            EnemyKind::Bat => 0.0,
            EnemyKind::Spider => 90.0,
            EnemyKind::Ghost => 0.0,
            EnemyKind::Snake => 50.0,
            EnemyKind::Wolf => 80.0,
        }
    }
}

/// Patrol half-range around the origin
pub const PATROL_DISTANCE: f32 = 120.0;

/// Bat flight: horizontal sweep + vertical bob
pub const BAT_SWEEP: f32 = 80.0;
pub const BAT_SWEEP_FREQ: f32 = 1.2;
pub const BAT_BOB: f32 = 30.0;
pub const BAT_BOB_FREQ: f32 = 3.0;
pub const BAT_ALTITUDE: f32 = 170.0;

/// Ghost float: wider, slower drift, lower baseline
pub const GHOST_SWEEP: f32 = 60.0;
pub const GHOST_SWEEP_FREQ: f32 = 0.8;
pub const GHOST_BOB: f32 = 40.0;
pub const GHOST_BOB_FREQ: f32 = 1.6;
pub const GHOST_ALTITUDE: f32 = 130.0;

/// Spider web
pub const SPIDER_HANG_HEIGHT: f32 = 220.0;
pub const SPIDER_TRIGGER_RADIUS: f32 = 150.0;
pub const SPIDER_HOMING_FACTOR: f32 = 0.5;

/// Snake slither
pub const SNAKE_AMPLITUDE: f32 = 6.0;
pub const SNAKE_FREQUENCY: f32 = 5.0;

/// Wolf chase
pub const WOLF_CHASE_DISTANCE: f32 = 350.0;
pub const WOLF_STANDOFF: f32 = 20.0;
pub const WOLF_CHASE_MULTIPLIER: f32 = 1.8;
/// Chance per second of jumping while chasing
pub const WOLF_JUMP_CHANCE: f32 = 1.2;
pub const WOLF_JUMP_VELOCITY: f32 = 420.0;
pub const WOLF_JUMP_COOLDOWN: f32 = 1.5;

/// Behavior tag with per-enemy phase state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Behavior {
    Patrol { origin_x: f32, dir: f32 },
    Fly { origin: Vec2, t: f32 },
    Web { dropped: bool },
    Float { origin: Vec2, t: f32 },
    Slither { phase: f32, dir: f32 },
    Chase { origin_x: f32, dir: f32, jump_cooldown: f32 },
}

impl Behavior {
    /// Initial behavior for a kind spawned with its top-left at `pos`
    pub fn for_kind(kind: EnemyKind, pos: Vec2) -> Self {
        match kind {
            EnemyKind::Slime => Behavior::Patrol {
                origin_x: pos.x,
                dir: -1.0,
            },
            EnemyKind::Bat => Behavior::Fly { origin: pos, t: 0.0 },
            EnemyKind::Spider => Behavior::Web { dropped: false },
            EnemyKind::Ghost => Behavior::Float { origin: pos, t: 0.0 },
            EnemyKind::Snake => Behavior::Slither {
                phase: 0.0,
                dir: -1.0,
            },
            EnemyKind::Wolf => Behavior::Chase {
                origin_x: pos.x,
                dir: -1.0,
                jump_cooldown: 0.0,
            },
        }
    }

    /// Behaviors that fall and stand on the street
    pub fn is_ground_bound(&self) -> bool {
        match self {
            Behavior::Patrol { .. } | Behavior::Chase { .. } => true,
            Behavior::Web { dropped } => *dropped,
            Behavior::Fly { .. } | Behavior::Float { .. } | Behavior::Slither { .. } => false,
        }
    }
}

/// An enemy entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub id: u32,
    pub kind: EnemyKind,
    /// Top-left corner
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: Vec2,
    pub behavior: Behavior,
    pub health: u8,
    pub dead: bool,
    /// Seconds left of the death animation
    pub death_timer: f32,
    /// Difficulty speed multiplier
    pub speed_mult: f32,
    pub on_ground: bool,
    pub anim_frame: u32,
    pub anim_timer: f32,
}

const ENEMY_FRAME_TIME: f32 = 0.15;
const ENEMY_FRAMES: u32 = 4;

impl Enemy {
    /// Spawn an enemy with its feet (or hang point) derived from `x`
    pub fn spawn(id: u32, kind: EnemyKind, x: f32) -> Self {
        let size = kind.size();
        let y = match kind {
            EnemyKind::Bat => GROUND_Y - BAT_ALTITUDE,
            EnemyKind::Ghost => GROUND_Y - GHOST_ALTITUDE,
            EnemyKind::Spider => GROUND_Y - SPIDER_HANG_HEIGHT,
            _ => GROUND_Y - size.y,
        };
        let pos = Vec2::new(x, y);
        Self {
            id,
            kind,
            pos,
            vel: Vec2::ZERO,
            size,
            behavior: Behavior::for_kind(kind, pos),
            health: kind.max_health(),
            dead: false,
            death_timer: 0.0,
            speed_mult: 1.0,
            on_ground: matches!(kind, EnemyKind::Slime | EnemyKind::Wolf),
            anim_frame: 0,
            anim_timer: 0.0,
        }
    }

    pub fn aabb(&self) -> Aabb {
        Aabb::new(self.pos, self.size)
    }

    pub fn center(&self) -> Vec2 {
        self.pos + self.size * 0.5
    }

    /// Apply one point of damage
    ///
    /// Returns true only on the hit that kills the enemy.
    pub fn damage(&mut self) -> bool {
        if self.dead {
            return false;
        }
        self.health = self.health.saturating_sub(1);
        if self.health == 0 {
            self.dead = true;
            self.death_timer = ENEMY_DEATH_DELAY;
            self.vel = Vec2::ZERO;
            return true;
        }
        false
    }

    /// Dead and finished with its death animation
    pub fn is_expired(&self) -> bool {
        self.dead && self.death_timer <= 0.0
    }
}

/// Advance one living enemy toward the player at `target` (player center)
pub fn advance(enemy: &mut Enemy, target: Vec2, dt: f32, rng: &mut Pcg32) {
    let speed = enemy.kind.speed() * enemy.speed_mult;
    let center_x = enemy.center().x;

    match &mut enemy.behavior {
        Behavior::Patrol { origin_x, dir } => {
            patrol(&mut enemy.pos, &mut enemy.vel, *origin_x, dir, speed, dt);
        }
        Behavior::Fly { origin, t } => {
            *t += dt * enemy.speed_mult;
            let (pos, vel) = oscillate(
                *origin,
                *t,
                (BAT_SWEEP, BAT_SWEEP_FREQ),
                (BAT_BOB, BAT_BOB_FREQ),
            );
            enemy.pos = pos;
            enemy.vel = vel * enemy.speed_mult;
        }
        Behavior::Float { origin, t } => {
            *t += dt * enemy.speed_mult;
            let (pos, vel) = oscillate(
                *origin,
                *t,
                (GHOST_SWEEP, GHOST_SWEEP_FREQ),
                (GHOST_BOB, GHOST_BOB_FREQ),
            );
            enemy.pos = pos;
            enemy.vel = vel * enemy.speed_mult;
        }
        Behavior::Web { dropped } => {
            let dx = target.x - center_x;
            if !*dropped {
                if dx.abs() < SPIDER_TRIGGER_RADIUS {
                    *dropped = true;
                    log::debug!("Spider {} dropped", enemy.id);
                } else {
                    enemy.vel = Vec2::ZERO;
                }
            }
            if *dropped {
                enemy.vel.x = dx.signum() * speed * SPIDER_HOMING_FACTOR;
            }
        }
        Behavior::Slither { phase, dir } => {
            *phase += SNAKE_FREQUENCY * dt * enemy.speed_mult;
            enemy.vel.x = *dir * speed;
            enemy.pos.x += enemy.vel.x * dt;
            // Offset rides above the ground line, never below it
            let lift = SNAKE_AMPLITUDE * (0.5 + 0.5 * phase.sin());
            enemy.pos.y = GROUND_Y - enemy.size.y - lift;
            enemy.vel.y =
                -SNAKE_AMPLITUDE * 0.5 * phase.cos() * SNAKE_FREQUENCY * enemy.speed_mult;
        }
        Behavior::Chase {
            origin_x,
            dir,
            jump_cooldown,
        } => {
            *jump_cooldown = (*jump_cooldown - dt).max(0.0);
            let dx = target.x - center_x;
            if dx.abs() < WOLF_CHASE_DISTANCE {
                if dx.abs() > WOLF_STANDOFF {
                    *dir = dx.signum();
                    enemy.vel.x = *dir * speed * WOLF_CHASE_MULTIPLIER;
                } else {
                    enemy.vel.x = 0.0;
                }
                let roll: f32 = rng.random();
                if enemy.on_ground && *jump_cooldown <= 0.0 && roll < WOLF_JUMP_CHANCE * dt {
                    enemy.vel.y = -WOLF_JUMP_VELOCITY;
                    enemy.on_ground = false;
                    *jump_cooldown = WOLF_JUMP_COOLDOWN;
                }
                enemy.pos.x += enemy.vel.x * dt;
            } else {
                // Lost the player: patrol around where it was last anchored
                if (enemy.pos.x - *origin_x).abs() > PATROL_DISTANCE * 2.0 {
                    *origin_x = enemy.pos.x;
                }
                patrol(&mut enemy.pos, &mut enemy.vel, *origin_x, dir, speed, dt);
            }
        }
    }

    if enemy.behavior.is_ground_bound() {
        if !enemy.on_ground {
            apply_gravity(&mut enemy.vel, dt);
        }
        enemy.pos.y += enemy.vel.y * dt;
        enemy.on_ground = land_on(&mut enemy.pos, &mut enemy.vel, enemy.size.y, GROUND_Y);
        if matches!(enemy.behavior, Behavior::Web { .. }) {
            enemy.pos.x += enemy.vel.x * dt;
        }
    }

    enemy.anim_timer += dt;
    while enemy.anim_timer >= ENEMY_FRAME_TIME {
        enemy.anim_timer -= ENEMY_FRAME_TIME;
        enemy.anim_frame = (enemy.anim_frame + 1) % ENEMY_FRAMES;
    }
}

/// Back-and-forth walk, flipping at `PATROL_DISTANCE` from the origin
fn patrol(pos: &mut Vec2, vel: &mut Vec2, origin_x: f32, dir: &mut f32, speed: f32, dt: f32) {
    let offset = pos.x - origin_x;
    if offset > PATROL_DISTANCE {
        *dir = -1.0;
    } else if offset < -PATROL_DISTANCE {
        *dir = 1.0;
    }
    vel.x = *dir * speed;
    pos.x += vel.x * dt;
}

/// Position on a two-axis sine path and its analytic derivative
fn oscillate(origin: Vec2, t: f32, (ax, wx): (f32, f32), (ay, wy): (f32, f32)) -> (Vec2, Vec2) {
    let pos = origin + Vec2::new(ax * (wx * t).sin(), ay * (wy * t).sin());
    let vel = Vec2::new(ax * wx * (wx * t).cos(), ay * wy * (wy * t).cos());
    (pos, vel)
}

/// Advance every enemy and expire finished deaths
pub fn update_enemies(enemies: &mut Vec<Enemy>, target: Vec2, dt: f32, rng: &mut Pcg32) {
    for enemy in enemies.iter_mut() {
        if enemy.dead {
            enemy.death_timer -= dt;
            continue;
        }
        advance(enemy, target, dt, rng);
    }
    enemies.retain(|e| !e.is_expired());
}

/// Drop enemies that left the live street `[min_x, max_x]`
pub fn prune_enemies(enemies: &mut Vec<Enemy>, min_x: f32, max_x: f32) {
    let before = enemies.len();
    enemies.retain(|e| e.pos.x + e.size.x >= min_x && e.pos.x <= max_x);
    if enemies.len() != before {
        log::debug!("Removed {} enemies", before - enemies.len());
    }
}

/// Rewrite the difficulty speed multiplier on every live enemy
pub fn apply_speed_multiplier(enemies: &mut [Enemy], multiplier: f32) {
    for enemy in enemies.iter_mut() {
        enemy.speed_mult = multiplier;
    }
}
