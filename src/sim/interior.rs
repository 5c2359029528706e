//! Building interiors
//!
//! Entering a building swaps the street for a single room. The street keeps
//! its state untouched while the player is inside; leaving drops the room
//! and puts the player back at the door.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::state::{GameEvent, GameState, Player};
use super::world::{BuildingKind, Furniture, FurnitureKind, ItemType, ObjectKind, WorldObject};
use crate::consts::*;

/// Furniture starts this far from the door
const FURNITURE_START_X: f32 = 160.0;
const FURNITURE_GAP_MIN: f32 = 40.0;
const FURNITURE_GAP_MAX: f32 = 110.0;
const MAX_FURNITURE: usize = 5;

/// The room the player is standing in
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Interior {
    pub building_id: u32,
    pub kind: BuildingKind,
    /// Player position on the street before entering
    pub entrance: Vec2,
    pub furniture: Vec<Furniture>,
    /// Items that exist only inside this visit
    pub collectibles: Vec<WorldObject>,
}

fn furniture_size(kind: FurnitureKind) -> Vec2 {
    match kind {
        FurnitureKind::Table => Vec2::new(80.0, 40.0),
        FurnitureKind::Couch => Vec2::new(120.0, 45.0),
        FurnitureKind::Shelf => Vec2::new(60.0, 90.0),
        FurnitureKind::Bed => Vec2::new(130.0, 50.0),
    }
}

/// Random house layout, left to right along the floor
pub fn generate_furniture(rng: &mut Pcg32) -> Vec<Furniture> {
    const KINDS: [FurnitureKind; 4] = [
        FurnitureKind::Table,
        FurnitureKind::Couch,
        FurnitureKind::Shelf,
        FurnitureKind::Bed,
    ];
    let count = rng.random_range(2..=MAX_FURNITURE);
    let mut pieces = Vec::with_capacity(count);
    let mut x = FURNITURE_START_X;

    for _ in 0..count {
        let kind = KINDS[rng.random_range(0..KINDS.len())];
        let size = furniture_size(kind);
        if x + size.x > INTERIOR_WIDTH - FURNITURE_GAP_MIN {
            break;
        }
        pieces.push(Furniture {
            kind,
            pos: Vec2::new(x, GROUND_Y - size.y),
            size,
        });
        x += size.x + rng.random_range(FURNITURE_GAP_MIN..FURNITURE_GAP_MAX);
    }
    pieces
}

/// Notes lined up across the room
fn stock_shelves(state: &mut GameState) -> Vec<WorldObject> {
    let spacing = (INTERIOR_WIDTH - FURNITURE_START_X) / SUPERMARKET_ITEMS as f32;
    (0..SUPERMARKET_ITEMS)
        .map(|i| {
            let x = FURNITURE_START_X + spacing * (i as f32 + 0.5);
            let height = state.rng.random_range(30.0..110.0);
            WorldObject::collectible(state.next_entity_id(), x, GROUND_Y - height, ItemType::Note)
        })
        .collect()
}

/// Enter the building at `index` in `state.objects`
///
/// Returns false if that object is not a building or the player is already
/// inside.
pub fn enter(state: &mut GameState, index: usize) -> bool {
    if state.is_inside() {
        return false;
    }
    let Some(object) = state.objects.get_mut(index) else {
        return false;
    };
    let building_id = object.id;
    let ObjectKind::Structure(structure) = &mut object.kind else {
        return false;
    };
    let kind = structure.kind;
    let furniture = match kind {
        BuildingKind::House => structure
            .furniture
            .get_or_insert_with(|| generate_furniture(&mut state.rng))
            .clone(),
        _ => Vec::new(),
    };
    let store_gift = kind == BuildingKind::Store && !structure.used;
    if store_gift {
        structure.used = true;
    }

    log::info!("Entering {} #{building_id}", kind.as_str());
    let entrance = state.player.pos;
    state.interior = Some(Interior {
        building_id,
        kind,
        entrance,
        furniture,
        collectibles: Vec::new(),
    });
    place_in_room(&mut state.player);

    match kind {
        BuildingKind::House => state.notify("Home sweet home"),
        BuildingKind::Hospital => {
            state.player.stamina = 1.0;
            state.notify("Fully rested!");
        }
        BuildingKind::FireStation => {
            state.add_speed_buff(FIRE_STATION_BUFF_AMOUNT, FIRE_STATION_BUFF_DURATION);
            state.notify("Fire drill! Speed up");
        }
        BuildingKind::Store if store_gift => {
            state.counters.records += STORE_GIFT_RECORDS;
            state.notify(format!("The clerk hands you {STORE_GIFT_RECORDS} records"));
        }
        BuildingKind::Store => state.notify("Nothing new in stock"),
        BuildingKind::Supermarket => {
            let items = stock_shelves(state);
            if let Some(interior) = state.interior.as_mut() {
                interior.collectibles = items;
            }
            state.notify("Sale on notes!");
        }
    }

    state.events.push(GameEvent::EnteredBuilding {
        id: building_id,
        kind,
    });
    state.events.push(GameEvent::VisitBuilding {
        id: building_id,
        kind,
    });
    true
}

/// Leave the current building, back onto the street at its door
pub fn exit(state: &mut GameState) -> bool {
    let Some(interior) = state.interior.take() else {
        return false;
    };
    log::info!("Leaving building #{}", interior.building_id);
    let player = &mut state.player;
    player.pos = interior.entrance;
    player.vel = Vec2::ZERO;
    player.prev_bottom = player.bottom();
    player.wall_slide = None;
    state.events.push(GameEvent::ExitedBuilding {
        id: interior.building_id,
    });
    true
}

/// Standing close enough to the room's door to leave
pub fn at_exit(player: &Player) -> bool {
    player.pos.x < INTERIOR_DOOR_ZONE
}

fn place_in_room(player: &mut Player) {
    player.pos = Vec2::new(INTERIOR_DOOR_X, GROUND_Y - player.size.y);
    player.vel = Vec2::ZERO;
    player.prev_bottom = GROUND_Y;
    player.on_ground = true;
    player.wall_slide = None;
    player.wall_contact = None;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::aabb::Aabb;
    use crate::sim::world::{Layer, Structure};
    use rand::SeedableRng;

    fn building(state: &mut GameState, kind: BuildingKind) -> usize {
        let id = state.next_entity_id();
        let pos = Vec2::new(400.0, GROUND_Y - 200.0);
        state.objects.push(WorldObject {
            id,
            pos,
            size: Vec2::new(200.0, 200.0),
            layer: Layer::Background,
            kind: ObjectKind::Structure(Structure {
                kind,
                wall_color: 0,
                roof_color: 0,
                door: Aabb::new(
                    Vec2::new(480.0, GROUND_Y - DOOR_HEIGHT),
                    Vec2::new(DOOR_WIDTH, DOOR_HEIGHT),
                ),
                furniture: None,
                used: false,
            }),
        });
        state.objects.len() - 1
    }

    #[test]
    fn test_furniture_fits_room() {
        let mut rng = Pcg32::seed_from_u64(1);
        for _ in 0..50 {
            let pieces = generate_furniture(&mut rng);
            assert!(!pieces.is_empty());
            for piece in &pieces {
                assert!(piece.pos.x >= FURNITURE_START_X);
                assert!(piece.pos.x + piece.size.x <= INTERIOR_WIDTH);
                assert_eq!(piece.pos.y + piece.size.y, GROUND_Y);
            }
        }
    }

    #[test]
    fn test_house_layout_is_cached() {
        let mut state = GameState::new(4);
        let idx = building(&mut state, BuildingKind::House);
        assert!(enter(&mut state, idx));
        let first = state.interior.as_ref().unwrap().furniture.clone();
        assert!(exit(&mut state));

        assert!(enter(&mut state, idx));
        assert_eq!(state.interior.as_ref().unwrap().furniture, first);
    }

    #[test]
    fn test_enter_and_exit_restore_position() {
        let mut state = GameState::new(4);
        let idx = building(&mut state, BuildingKind::Hospital);
        state.player.pos.x = 485.0;
        state.player.stamina = 0.2;
        let before = state.player.pos;

        assert!(enter(&mut state, idx));
        assert!(state.is_inside());
        assert_eq!(state.player.stamina, 1.0);
        assert!(at_exit(&state.player));
        assert!(!enter(&mut state, idx));

        assert!(exit(&mut state));
        assert!(!state.is_inside());
        assert_eq!(state.player.pos, before);
        assert!(!exit(&mut state));
    }

    #[test]
    fn test_store_gift_is_one_shot() {
        let mut state = GameState::new(4);
        let idx = building(&mut state, BuildingKind::Store);
        enter(&mut state, idx);
        exit(&mut state);
        enter(&mut state, idx);
        assert_eq!(state.counters.records, STORE_GIFT_RECORDS);
    }

    #[test]
    fn test_supermarket_items_vanish_on_exit() {
        let mut state = GameState::new(4);
        let idx = building(&mut state, BuildingKind::Supermarket);
        enter(&mut state, idx);
        let inside = &state.interior.as_ref().unwrap().collectibles;
        assert_eq!(inside.len(), SUPERMARKET_ITEMS as usize);
        exit(&mut state);
        assert!(state.interior.is_none());
    }

    #[test]
    fn test_fire_station_buff_is_timed() {
        let mut state = GameState::new(4);
        let idx = building(&mut state, BuildingKind::FireStation);
        enter(&mut state, idx);
        assert!((state.player.speed_buff - FIRE_STATION_BUFF_AMOUNT).abs() < 1e-6);
        assert!(state.effects.has_pending(&crate::sim::effects::Expiry::RevertSpeedBuff {
            amount: FIRE_STATION_BUFF_AMOUNT
        }));
    }

    #[test]
    fn test_each_entry_reports_a_visit() {
        let mut state = GameState::new(4);
        let idx = building(&mut state, BuildingKind::House);
        enter(&mut state, idx);
        exit(&mut state);
        enter(&mut state, idx);
        let visits = state
            .events
            .iter()
            .filter(|e| matches!(e, GameEvent::VisitBuilding { .. }))
            .count();
        assert_eq!(visits, 2);
    }
}
