//! Collision resolution against the street
//!
//! Two kinds of contact:
//! - Surfaces (the ground plane, walkable tops, the tops of solids) are only
//!   landed on when the feet cross them moving downward this tick.
//! - Solids (poles, crates) push the player out along the axis of least
//!   penetration; a horizontal push zeroes speed into the wall and records
//!   the wall side for wall sliding.

use glam::Vec2;

use super::aabb::Aabb;
use super::physics::land_on;
use super::state::{Player, WallSide};
use super::world::{Furniture, MAX_OBJECT_WIDTH, WorldObject, window_range};
use crate::consts::*;

/// Slack for "was above the surface last tick"
const SURFACE_EPSILON: f32 = 0.5;
/// Horizontal skin for detecting resting wall contact
const CONTACT_SKIN: f32 = 1.0;

/// What the player touched during resolution
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollisionReport {
    /// Objects landed on from above while falling this tick
    pub landed_on: Vec<u32>,
    pub wall: Option<WallSide>,
    pub hit_ceiling: bool,
}

/// Resolve the player against the ground, the objects near it and any
/// interior furniture
///
/// `objects` must be sorted by x.
pub fn resolve_player(
    player: &mut Player,
    objects: &[WorldObject],
    furniture: &[Furniture],
) -> CollisionReport {
    let mut report = CollisionReport::default();
    let falling = player.vel.y > 0.0;
    player.on_ground = false;

    let window = window_range(
        objects,
        player.pos.x - COLLISION_WINDOW,
        player.pos.x + COLLISION_WINDOW,
        MAX_OBJECT_WIDTH,
    );
    let nearby = &objects[window];

    // --- Surfaces ---
    for object in nearby {
        let top = match object.walkable_surface_y() {
            Some(y) => y,
            None if object.is_collidable() => object.pos.y,
            None => continue,
        };
        if land_on_surface(player, &object.aabb(), top) && falling {
            report.landed_on.push(object.id);
        }
    }
    for piece in furniture {
        land_on_surface(player, &piece.aabb(), piece.pos.y);
    }
    if land_on(&mut player.pos, &mut player.vel, player.size.y, GROUND_Y) {
        player.on_ground = true;
    }

    // --- Solids ---
    for object in nearby.iter().filter(|o| o.is_collidable()) {
        let Some(push) = player.aabb().push_out(&object.aabb()) else {
            continue;
        };
        player.pos += push;
        if push.y < 0.0 {
            player.vel.y = player.vel.y.min(0.0);
            player.on_ground = true;
            if falling {
                report.landed_on.push(object.id);
            }
        } else if push.y > 0.0 {
            player.vel.y = player.vel.y.max(0.0);
            report.hit_ceiling = true;
        } else if push.x < 0.0 {
            player.vel.x = player.vel.x.min(0.0);
            report.wall = Some(WallSide::Right);
        } else if push.x > 0.0 {
            player.vel.x = player.vel.x.max(0.0);
            report.wall = Some(WallSide::Left);
        }
    }

    // Resting against a wall without penetrating it
    if report.wall.is_none() && !player.on_ground {
        let body = player.aabb();
        let skin = Aabb {
            min: body.min - Vec2::new(CONTACT_SKIN, 0.0),
            max: body.max + Vec2::new(CONTACT_SKIN, 0.0),
        };
        for object in nearby.iter().filter(|o| o.is_collidable()) {
            let solid = object.aabb();
            if skin.overlaps(&solid) && !body.overlaps(&solid) {
                report.wall = Some(if solid.center().x > body.center().x {
                    WallSide::Right
                } else {
                    WallSide::Left
                });
                break;
            }
        }
    }

    if player.on_ground {
        player.jump_active = false;
        player.wall_slide = None;
    }
    player.wall_contact = report.wall;
    report.landed_on.dedup();
    report
}

/// Land on a surface whose top the feet crossed going down
fn land_on_surface(player: &mut Player, body: &Aabb, top: f32) -> bool {
    if player.vel.y < 0.0 || !player.aabb().overlaps_x(body) {
        return false;
    }
    let crossed = player.prev_bottom <= top + SURFACE_EPSILON && player.bottom() >= top;
    if crossed {
        player.pos.y = top - player.size.y;
        player.vel.y = 0.0;
        player.on_ground = true;
    }
    crossed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::world::{Layer, ObjectKind};

    fn object(id: u32, kind: ObjectKind, pos: Vec2, size: Vec2) -> WorldObject {
        WorldObject {
            id,
            pos,
            size,
            layer: Layer::Foreground,
            kind,
        }
    }

    fn falling_player(x: f32, bottom: f32, vy: f32) -> Player {
        let mut player = Player::new();
        player.on_ground = false;
        player.pos = Vec2::new(x, bottom - player.size.y);
        player.vel = Vec2::new(0.0, vy);
        player.prev_bottom = bottom - vy / 60.0;
        player
    }

    #[test]
    fn test_lands_on_ground() {
        let mut player = falling_player(100.0, GROUND_Y + 5.0, 300.0);
        let report = resolve_player(&mut player, &[], &[]);
        assert!(player.on_ground);
        assert_eq!(player.bottom(), GROUND_Y);
        assert_eq!(player.vel.y, 0.0);
        assert!(report.landed_on.is_empty());
    }

    #[test]
    fn test_lands_on_fence_top_only_from_above() {
        let fence = object(
            1,
            ObjectKind::Fence,
            Vec2::new(90.0, GROUND_Y - 40.0),
            Vec2::new(120.0, 40.0),
        );
        let mut player = falling_player(100.0, GROUND_Y - 38.0, 300.0);
        let report = resolve_player(&mut player, std::slice::from_ref(&fence), &[]);
        assert!(player.on_ground);
        assert_eq!(player.bottom(), GROUND_Y - 40.0);
        assert_eq!(report.landed_on, vec![1]);

        // Walking through the fence at street level does not pop the player up
        let mut player = Player::new();
        player.pos.x = 100.0;
        resolve_player(&mut player, std::slice::from_ref(&fence), &[]);
        assert_eq!(player.bottom(), GROUND_Y);
    }

    #[test]
    fn test_standing_on_fence_stays_grounded() {
        let fence = object(
            1,
            ObjectKind::Fence,
            Vec2::new(90.0, GROUND_Y - 40.0),
            Vec2::new(120.0, 40.0),
        );
        let mut player = Player::new();
        player.pos = Vec2::new(100.0, GROUND_Y - 40.0 - player.size.y);
        player.prev_bottom = player.bottom();
        let report = resolve_player(&mut player, std::slice::from_ref(&fence), &[]);
        assert!(player.on_ground);
        assert!(report.landed_on.is_empty());
    }

    #[test]
    fn test_pole_blocks_and_records_wall() {
        let pole = object(
            7,
            ObjectKind::Pole,
            Vec2::new(200.0, GROUND_Y - 160.0),
            Vec2::new(20.0, 160.0),
        );
        let mut player = falling_player(170.0, GROUND_Y - 60.0, 100.0);
        player.vel.x = 200.0;
        let report = resolve_player(&mut player, std::slice::from_ref(&pole), &[]);
        assert_eq!(report.wall, Some(WallSide::Right));
        assert_eq!(player.pos.x + player.size.x, 200.0);
        assert_eq!(player.vel.x, 0.0);
        assert_eq!(player.wall_contact, Some(WallSide::Right));

        // Next tick, merely touching still counts as wall contact
        player.prev_bottom = player.bottom();
        let report = resolve_player(&mut player, std::slice::from_ref(&pole), &[]);
        assert_eq!(report.wall, Some(WallSide::Right));
    }

    #[test]
    fn test_landing_on_crate_reports_it() {
        let crate_obj = WorldObject::breakable_crate(3, 100.0);
        let top = crate_obj.pos.y;
        let mut player = falling_player(104.0, top + 4.0, 250.0);
        let report = resolve_player(&mut player, std::slice::from_ref(&crate_obj), &[]);
        assert_eq!(report.landed_on, vec![3]);
        assert_eq!(player.bottom(), top);
    }

    #[test]
    fn test_furniture_is_walkable() {
        let table = Furniture {
            kind: crate::sim::world::FurnitureKind::Table,
            pos: Vec2::new(300.0, GROUND_Y - 50.0),
            size: Vec2::new(80.0, 50.0),
        };
        let mut player = falling_player(310.0, GROUND_Y - 48.0, 200.0);
        resolve_player(&mut player, &[], &[table]);
        assert!(player.on_ground);
        assert_eq!(player.bottom(), GROUND_Y - 50.0);
    }

    #[test]
    fn test_empty_world_is_noop_above_ground() {
        let mut player = falling_player(10.0, 100.0, 50.0);
        let report = resolve_player(&mut player, &[], &[]);
        assert!(!player.on_ground);
        assert_eq!(report, CollisionReport::default());
    }
}
