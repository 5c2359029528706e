//! Player movement and integration
//!
//! Horizontal speed is input-driven (the player snaps to the target speed);
//! vertical speed integrates gravity. Every damping term is written as
//! `base^(dt*60)` so behavior does not depend on the frame rate.

use glam::Vec2;

use super::state::{AnimTag, Facing, InputLatch, Player};
use super::tick::TickInput;
use crate::consts::*;

/// Side effects of a movement step the tick needs to know about
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MoveOutcome {
    pub jumped: bool,
    pub wall_jumped: bool,
    pub sprint_started: bool,
}

/// Frame-rate independent damping factor
#[inline]
pub fn damping(base: f32, dt: f32) -> f32 {
    base.powf(dt * 60.0)
}

/// Integrate gravity and clamp to terminal velocity
#[inline]
pub fn apply_gravity(vel: &mut Vec2, dt: f32) {
    vel.y = (vel.y + GRAVITY * dt).min(TERMINAL_VELOCITY);
}

/// Snap a falling body standing on `surface_y`
///
/// Returns true when the body's bottom edge reached the surface; the body is
/// then placed exactly on it with no vertical speed.
pub fn land_on(pos: &mut Vec2, vel: &mut Vec2, height: f32, surface_y: f32) -> bool {
    if pos.y + height >= surface_y && vel.y >= 0.0 {
        pos.y = surface_y - height;
        vel.y = 0.0;
        true
    } else {
        false
    }
}

/// Advance the player one step from input
///
/// `stamina_drain` is the difficulty multiplier on sprint drain and
/// `max_x` bounds the right edge (building interiors).
pub fn step_player(
    player: &mut Player,
    input: &TickInput,
    latch: &InputLatch,
    dt: f32,
    stamina_drain: f32,
    max_x: Option<f32>,
) -> MoveOutcome {
    let mut outcome = MoveOutcome::default();
    let grounded_at_start = player.on_ground;

    player.jump_bar_phase = (player.jump_bar_phase + JUMP_BAR_SPEED * dt) % std::f32::consts::TAU;
    player.accel_factor = (player.accel_factor - ACCEL_JUMP_DECAY * dt).max(1.0);
    player.wall_jump_lock = (player.wall_jump_lock - dt).max(0.0);
    player.prev_bottom = player.bottom();

    player.set_crouching(input.crouch);

    let dir = match (input.left, input.right) {
        (true, false) => -1.0,
        (false, true) => 1.0,
        _ => 0.0,
    };
    let analog = input.analog_speed.unwrap_or(1.0).clamp(0.0, 1.0);

    // Sprint is a crouched dash to the right
    let sprint = input.right
        && input.crouch
        && dir > 0.0
        && analog > 0.0
        && player.on_ground
        && player.can_sprint();
    outcome.sprint_started = sprint && !player.sprinting;
    player.sprinting = sprint;

    let stamina_delta = if sprint {
        -STAMINA_DRAIN * stamina_drain.max(0.0) * dt
    } else {
        STAMINA_REGEN * dt
    };
    player.stamina = (player.stamina + stamina_delta).clamp(0.0, 1.0);

    // --- Horizontal ---
    let friction = damping(GROUND_FRICTION, dt);
    if player.wall_jump_lock <= 0.0 {
        let moving = dir != 0.0 && (!player.crouching || sprint);
        if moving {
            let sprint_mult = if sprint { SPRINT_MULTIPLIER } else { 1.0 };
            let target = dir * player.effective_speed() * analog * sprint_mult * player.accel_factor;
            let overspeed = player.vel.x * dir > target.abs();
            if overspeed {
                // Keep boosted momentum, bleeding it off on the ground
                if player.on_ground {
                    player.vel.x = target + (player.vel.x - target) * friction;
                }
            } else {
                player.vel.x = target;
            }
            player.facing = if dir > 0.0 { Facing::Right } else { Facing::Left };
        } else if player.on_ground {
            player.vel.x *= friction;
            if player.vel.x.abs() < 1.0 {
                player.vel.x = 0.0;
            }
        }
    }

    // --- Vertical ---
    if !grounded_at_start {
        player.vel.y += GRAVITY * dt;
    }

    let jump_pressed = input.jump && !latch.jump;
    let wall_jump_side = if jump_pressed && !player.on_ground {
        player.wall_slide
    } else {
        None
    };
    if let Some(side) = wall_jump_side {
        player.wall_slide = None;
        player.vel.y = -WALL_JUMP_VY;
        player.vel.x = side.away() * WALL_JUMP_VX;
        player.facing = if side.away() > 0.0 { Facing::Right } else { Facing::Left };
        player.wall_jump_lock = WALL_JUMP_LOCK;
        player.jump_active = true;
        player.jump_hold_time = 0.0;
        outcome.wall_jumped = true;
    } else if jump_pressed && player.on_ground {
        if player.jump_bar_in_red_zone() {
            player.accel_factor = ACCEL_JUMP_MULTIPLIER;
            log::debug!("Accelerated jump");
        }
        player.vel.y = -JUMP_IMPULSE.abs() * player.accel_factor;
        player.on_ground = false;
        player.jump_active = true;
        player.jump_hold_time = 0.0;
        outcome.jumped = true;
    } else if player.jump_active {
        if player.vel.y >= 0.0 {
            player.jump_active = false;
        } else if input.jump {
            player.jump_hold_time += dt;
            if player.jump_hold_time <= JUMP_HOLD_WINDOW {
                player.vel.y -= JUMP_HOLD_FORCE * dt;
            }
        } else {
            if player.jump_hold_time < JUMP_HOLD_MAX {
                player.vel.y *= JUMP_CUT_FACTOR;
            }
            player.jump_active = false;
        }
    }

    // Wall slide: airborne, falling, pressed against a solid side
    if !player.on_ground && player.vel.y > 0.0 && player.wall_contact.is_some() {
        player.wall_slide = player.wall_contact;
        player.vel.y = player.vel.y.min(WALL_SLIDE_MAX_SPEED) * damping(WALL_SLIDE_FRICTION, dt);
    } else if player.on_ground || player.wall_contact.is_none() {
        player.wall_slide = None;
    }

    let speed = player.vel.length();
    if speed > DRAG_THRESHOLD {
        player.vel *= damping(DRAG_FACTOR, dt);
    }
    player.vel.y = player.vel.y.min(TERMINAL_VELOCITY);

    // --- Integrate ---
    player.pos += player.vel * dt;
    if player.pos.x < 0.0 {
        player.pos.x = 0.0;
        player.vel.x = player.vel.x.max(0.0);
    }
    if let Some(limit) = max_x {
        let limit = (limit - player.size.x).max(0.0);
        if player.pos.x > limit {
            player.pos.x = limit;
            player.vel.x = player.vel.x.min(0.0);
        }
    }
    if max_x.is_none() {
        player.max_x = player.max_x.max(player.pos.x);
    }

    outcome
}

/// Pick the animation for the player's resolved state and advance it
pub fn update_animation(player: &mut Player, dt: f32) {
    let tag = if player.wall_slide.is_some() {
        AnimTag::WallSlide
    } else if !player.on_ground {
        if player.vel.y < -ANIM_RISE_SPEED {
            AnimTag::Jump
        } else if player.vel.y <= ANIM_FALL_SPEED {
            AnimTag::Apex
        } else {
            AnimTag::Fall
        }
    } else if player.sprinting {
        AnimTag::Run
    } else if player.crouching {
        AnimTag::Crouch
    } else if player.vel.x.abs() > 1.0 {
        AnimTag::Walk
    } else {
        AnimTag::Idle
    };
    player.anim.update(tag, dt);
}
