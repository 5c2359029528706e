//! Player interactions with street objects and enemies
//!
//! Runs after collision resolution. Each contact type resolves at most once
//! per object: collected items stay collected, pads stay activated until
//! their cooldown expires, broken crates stop colliding.

use rand::Rng;

use super::aabb::Aabb;
use super::collision::CollisionReport;
use super::effects::Expiry;
use super::interior;
use super::state::{DifficultyMode, GameEvent, GamePhase, GameState};
use super::world::{ItemType, MAX_OBJECT_WIDTH, ObjectKind, WorldObject, window_range};
use super::worldgen::pick_item;
use crate::consts::*;

/// Items a mystery box can turn into
const MYSTERY_OUTCOMES: [ItemType; 5] = [
    ItemType::Note,
    ItemType::Record,
    ItemType::GoldenNote,
    ItemType::EnergyCrystal,
    ItemType::SpeedBoost,
];

/// Resolve every object interaction for this tick
///
/// `crouch_pressed` is the crouch press edge, used for doors.
pub fn interact(state: &mut GameState, report: &CollisionReport, crouch_pressed: bool) {
    collect_items(state);

    if state.is_inside() {
        if crouch_pressed && interior::at_exit(&state.player) {
            interior::exit(state);
        }
        return;
    }

    trigger_pads(state);
    break_crates(state, &report.landed_on);
    if crouch_pressed {
        if let Some(index) = door_at_player(state) {
            interior::enter(state, index);
        }
    }
}

/// Mark every overlapped, uncollected item as collected and return them
pub fn touch_items(objects: &mut [WorldObject], body: &Aabb) -> Vec<ItemType> {
    let mut taken = Vec::new();
    for object in objects.iter_mut() {
        let hit = body.overlaps(&object.aabb());
        if let ObjectKind::Collectible(item) = &mut object.kind {
            if hit && !item.collected {
                item.collected = true;
                taken.push(item.item);
            }
        }
    }
    taken
}

fn collect_items(state: &mut GameState) {
    let body = state.player.aabb();
    let taken = match state.interior.as_mut() {
        Some(room) => touch_items(&mut room.collectibles, &body),
        None => {
            let window = window_range(
                &state.objects,
                body.left() - COLLISION_WINDOW,
                body.right() + COLLISION_WINDOW,
                MAX_OBJECT_WIDTH,
            );
            touch_items(&mut state.objects[window], &body)
        }
    };
    for item in taken {
        apply_item(state, item);
    }
}

/// Apply a picked-up item's effect and report it
pub fn apply_item(state: &mut GameState, item: ItemType) {
    log::debug!("Collected {item:?}");
    state.counters.items += 1;
    state.difficulty.stats.items_collected += 1;
    apply_item_effect(state, item);
    state.events.push(GameEvent::Collected { item });
}

fn apply_item_effect(state: &mut GameState, item: ItemType) {
    match item {
        ItemType::Note => state.counters.notes += 1,
        ItemType::Record => state.counters.records += 1,
        ItemType::GoldenNote => {
            state.counters.golden_notes += 1;
            state.counters.notes += 5;
        }
        ItemType::EnergyCrystal => {
            state.counters.crystals += 1;
            state.player.stamina = 1.0;
        }
        ItemType::SpeedBoost => {
            state.add_speed_buff(SPEED_BUFF_AMOUNT, SPEED_BUFF_DURATION);
            state.notify("Speed boost!");
        }
        ItemType::MysteryBox => {
            let outcome = MYSTERY_OUTCOMES[state.rng.random_range(0..MYSTERY_OUTCOMES.len())];
            state.notify(format!("Mystery box: {outcome:?}"));
            apply_item_effect(state, outcome);
        }
    }
}

fn nearby(state: &GameState) -> std::ops::Range<usize> {
    let x = state.player.pos.x;
    window_range(
        &state.objects,
        x - COLLISION_WINDOW,
        x + COLLISION_WINDOW,
        MAX_OBJECT_WIDTH,
    )
}

fn trigger_pads(state: &mut GameState) {
    let body = state.player.aabb();
    let window = nearby(state);
    let mut boosted = Vec::new();
    for object in &mut state.objects[window] {
        let hit = body.overlaps(&object.aabb());
        if let ObjectKind::SpeedPad { activated } = &mut object.kind {
            if hit && !*activated {
                *activated = true;
                boosted.push(object.id);
            }
        }
    }
    for id in boosted {
        state.player.vel.x *= PAD_BOOST;
        state.effects.schedule(
            state.time + PAD_COOLDOWN as f64,
            Expiry::PadCooldown { object_id: id },
        );
        state.events.push(GameEvent::PadBoost { id });
    }
}

/// Re-arm a pad whose cooldown expired
pub fn rearm_pad(state: &mut GameState, object_id: u32) {
    if let Some(object) = state.objects.iter_mut().find(|o| o.id == object_id) {
        if let ObjectKind::SpeedPad { activated } = &mut object.kind {
            *activated = false;
        }
    }
}

fn break_crates(state: &mut GameState, landed_on: &[u32]) {
    for &id in landed_on {
        let Some(object) = state.objects.iter_mut().find(|o| o.id == id) else {
            continue;
        };
        let ObjectKind::Crate { broken } = &mut object.kind else {
            continue;
        };
        if *broken {
            continue;
        }
        *broken = true;
        let center_x = object.aabb().center().x;
        log::debug!("Crate {id} broken");

        state.player.vel.y = -CRATE_BOUNCE;
        state.player.on_ground = false;
        state.events.push(GameEvent::CrateBroken { id });

        if state.rng.random::<f32>() < state.tuning.crate_drop_chance {
            let item = pick_item(&mut state.rng, &state.tuning.items);
            let drop = WorldObject::collectible(state.next_entity_id(), center_x, GROUND_Y, item);
            insert_sorted(&mut state.objects, drop);
        }
    }
}

/// Insert keeping x order
pub fn insert_sorted(objects: &mut Vec<WorldObject>, object: WorldObject) {
    let at = objects.partition_point(|o| {
        o.pos.x < object.pos.x || (o.pos.x == object.pos.x && o.id < object.id)
    });
    objects.insert(at, object);
}

/// Index of the building whose door the player is standing in
fn door_at_player(state: &GameState) -> Option<usize> {
    let body = state.player.aabb();
    let window = nearby(state);
    let start = window.start;
    state.objects[window]
        .iter()
        .position(|o| match &o.kind {
            ObjectKind::Structure(structure) => structure.door.overlaps(&body),
            _ => false,
        })
        .map(|i| start + i)
}

/// Stomp or be hit by any enemy the player overlaps
pub fn resolve_enemy_contact(state: &mut GameState) {
    if state.is_inside() || state.phase != GamePhase::Playing {
        return;
    }
    for i in 0..state.enemies.len() {
        let enemy = &mut state.enemies[i];
        if enemy.dead || !state.player.aabb().overlaps(&enemy.aabb()) {
            continue;
        }

        let stomp = state.player.vel.y > 0.0
            && state.player.prev_bottom <= enemy.pos.y + STOMP_TOLERANCE;
        if stomp {
            state.player.pos.y = enemy.pos.y - state.player.size.y;
            state.player.vel.y = -STOMP_BOUNCE;
            state.player.on_ground = false;
            let (id, kind) = (enemy.id, enemy.kind);
            let killed = enemy.damage();
            state.events.push(GameEvent::EnemyStomped { id });
            if killed {
                log::debug!("Defeated {} #{id}", kind.as_str());
                state.counters.enemies_defeated += 1;
                state.events.push(GameEvent::DefeatEnemy { id, kind });
            }
        } else if state.mode == DifficultyMode::Normal {
            kill_player(state);
            return;
        }
    }
}

/// End the run
pub fn kill_player(state: &mut GameState) {
    if state.phase != GamePhase::Playing {
        return;
    }
    let meters = state.meters();
    log::info!("Game over at {meters} m");
    state.phase = GamePhase::GameOver;
    state.player.vel = glam::Vec2::ZERO;
    state.difficulty.stats.deaths += 1;
    state.events.push(GameEvent::PlayerDied { meters });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::enemy::{Enemy, EnemyKind};
    use crate::sim::world::Layer;
    use glam::Vec2;

    /// A playing state with an empty street
    fn empty_state() -> GameState {
        let mut state = GameState::new(1);
        state.objects.clear();
        state.enemies.clear();
        state.phase = GamePhase::Playing;
        state
    }

    fn note_on_player(state: &mut GameState) -> u32 {
        let id = state.next_entity_id();
        let center = state.player.center();
        let note = WorldObject::collectible(id, center.x, state.player.bottom(), ItemType::Note);
        insert_sorted(&mut state.objects, note);
        id
    }

    #[test]
    fn test_collecting_is_idempotent() {
        let mut state = empty_state();
        let id = note_on_player(&mut state);

        interact(&mut state, &CollisionReport::default(), false);
        assert_eq!(state.counters.notes, 1);
        let note = state.objects.iter().find(|o| o.id == id).unwrap();
        assert!(note.is_spent());

        interact(&mut state, &CollisionReport::default(), false);
        interact(&mut state, &CollisionReport::default(), false);
        assert_eq!(state.counters.notes, 1);
        assert_eq!(state.counters.items, 1);
    }

    #[test]
    fn test_golden_note_and_crystal_effects() {
        let mut state = empty_state();
        apply_item(&mut state, ItemType::GoldenNote);
        assert_eq!(state.counters.notes, 5);

        state.player.stamina = 0.1;
        apply_item(&mut state, ItemType::EnergyCrystal);
        assert_eq!(state.player.stamina, 1.0);
    }

    #[test]
    fn test_speed_boost_is_timed() {
        let mut state = empty_state();
        apply_item(&mut state, ItemType::SpeedBoost);
        assert!((state.player.speed_buff - SPEED_BUFF_AMOUNT).abs() < 1e-6);
        assert!(state.effects.has_pending(&Expiry::RevertSpeedBuff {
            amount: SPEED_BUFF_AMOUNT
        }));
    }

    #[test]
    fn test_mystery_box_counts_once() {
        let mut state = empty_state();
        apply_item(&mut state, ItemType::MysteryBox);
        assert_eq!(state.counters.items, 1);
        let collected: Vec<_> = state
            .events
            .iter()
            .filter(|e| matches!(e, GameEvent::Collected { .. }))
            .collect();
        assert_eq!(collected.len(), 1);
    }

    #[test]
    fn test_pad_boosts_once_until_rearmed() {
        let mut state = empty_state();
        let id = state.next_entity_id();
        let pad = WorldObject {
            id,
            pos: Vec2::new(state.player.pos.x - 10.0, GROUND_Y - 8.0),
            size: Vec2::new(60.0, 8.0),
            layer: Layer::Foreground,
            kind: ObjectKind::SpeedPad { activated: false },
        };
        insert_sorted(&mut state.objects, pad);
        state.player.vel.x = 200.0;

        interact(&mut state, &CollisionReport::default(), false);
        assert!((state.player.vel.x - 200.0 * PAD_BOOST).abs() < 1e-3);
        interact(&mut state, &CollisionReport::default(), false);
        assert!((state.player.vel.x - 200.0 * PAD_BOOST).abs() < 1e-3);

        rearm_pad(&mut state, id);
        interact(&mut state, &CollisionReport::default(), false);
        assert!(state.player.vel.x > 200.0 * PAD_BOOST);
    }

    #[test]
    fn test_landing_breaks_crate_and_bounces() {
        let mut state = empty_state();
        let id = state.next_entity_id();
        insert_sorted(&mut state.objects, WorldObject::breakable_crate(id, 300.0));
        let report = CollisionReport {
            landed_on: vec![id],
            ..CollisionReport::default()
        };

        interact(&mut state, &report, false);
        let crate_obj = state.objects.iter().find(|o| o.id == id).unwrap();
        assert!(!crate_obj.is_collidable());
        assert_eq!(state.player.vel.y, -CRATE_BOUNCE);
        assert!(state.events.contains(&GameEvent::CrateBroken { id }));
        assert!(state.objects.windows(2).all(|w| w[0].pos.x <= w[1].pos.x));

        // A broken crate cannot break again
        state.events.clear();
        interact(&mut state, &report, false);
        assert!(state.events.is_empty());
    }

    fn enemy_at_player(state: &mut GameState, kind: EnemyKind) -> u32 {
        let id = state.next_entity_id();
        let mut enemy = Enemy::spawn(id, kind, state.player.pos.x);
        enemy.pos.y = GROUND_Y - enemy.size.y;
        state.enemies.push(enemy);
        id
    }

    #[test]
    fn test_stomp_kills_and_reports_once() {
        let mut state = empty_state();
        enemy_at_player(&mut state, EnemyKind::Slime);
        let top = state.enemies[0].pos.y;
        state.player.pos.y = top - state.player.size.y + 4.0;
        state.player.prev_bottom = top - 2.0;
        state.player.vel.y = 300.0;

        resolve_enemy_contact(&mut state);
        assert!(state.enemies[0].dead);
        assert_eq!(state.player.vel.y, -STOMP_BOUNCE);
        assert_eq!(state.counters.enemies_defeated, 1);

        // Overlapping a dead enemy does nothing
        state.player.vel.y = 300.0;
        resolve_enemy_contact(&mut state);
        let defeats = state
            .events
            .iter()
            .filter(|e| matches!(e, GameEvent::DefeatEnemy { .. }))
            .count();
        assert_eq!(defeats, 1);
        assert_eq!(state.phase, GamePhase::Playing);
    }

    #[test]
    fn test_side_hit_depends_on_mode() {
        let mut state = empty_state();
        enemy_at_player(&mut state, EnemyKind::Wolf);
        state.mode = DifficultyMode::Easy;
        resolve_enemy_contact(&mut state);
        assert_eq!(state.phase, GamePhase::Playing);

        state.mode = DifficultyMode::Normal;
        resolve_enemy_contact(&mut state);
        assert_eq!(state.phase, GamePhase::GameOver);
        assert_eq!(state.difficulty.stats.deaths, 1);
        assert!(matches!(
            state.events.last(),
            Some(GameEvent::PlayerDied { .. })
        ));
    }

    #[test]
    fn test_crouch_at_door_enters_building() {
        let mut state = empty_state();
        let id = state.next_entity_id();
        let x = state.player.pos.x - 80.0;
        let building = WorldObject {
            id,
            pos: Vec2::new(x, GROUND_Y - 200.0),
            size: Vec2::new(200.0, 200.0),
            layer: Layer::Background,
            kind: ObjectKind::Structure(crate::sim::world::Structure {
                kind: crate::sim::world::BuildingKind::House,
                wall_color: 0,
                roof_color: 0,
                door: Aabb::new(
                    Vec2::new(state.player.pos.x, GROUND_Y - DOOR_HEIGHT),
                    Vec2::new(DOOR_WIDTH, DOOR_HEIGHT),
                ),
                furniture: None,
                used: false,
            }),
        };
        insert_sorted(&mut state.objects, building);

        interact(&mut state, &CollisionReport::default(), false);
        assert!(!state.is_inside());
        interact(&mut state, &CollisionReport::default(), true);
        assert!(state.is_inside());

        // The room door sits right where the player spawns inside
        interact(&mut state, &CollisionReport::default(), true);
        assert!(!state.is_inside());
    }
}
