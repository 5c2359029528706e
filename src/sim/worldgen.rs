//! Procedural street generation and streaming
//!
//! The street is produced in `SEGMENT_SPAN` chunks ahead of the camera. Each
//! chunk is a pure function of its x-range, the balance table and the rng, so
//! a seeded run always builds the same city.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use super::aabb::Aabb;
use super::enemy::{Enemy, EnemyKind, prune_enemies};
use super::state::{EntityIds, GameState};
use super::world::{
    BuildingKind, ItemType, Layer, ObjectKind, Structure, WorldObject, sort_by_x,
};
use crate::consts::*;
use crate::tuning::{ItemOdds, ObjectOdds, Tuning};

const WALL_COLORS: [u32; 6] = [0xC8_6B_5A, 0xD9_B3_82, 0x8F_A3_B8, 0xE6_D5_B8, 0x9C_7A_6B, 0xB5_C9_A0];
const ROOF_COLORS: [u32; 4] = [0x5A_3A_2E, 0x3E_4A_5C, 0x6B_2F_2F, 0x44_44_44];
const FOLIAGE_COLORS: [u32; 3] = [0x3C_8D_40, 0x2E_6B_34, 0x5A_A8_4B];
const BUSH_COLORS: [u32; 3] = [0x4C_9A_52, 0x37_7D_3D, 0x6D_B3_5F];

/// Gap kept after a building before the next step
const BUILDING_MARGIN: f32 = 30.0;
/// Smallest forward step, whatever the tuning says
const MIN_STEP: f32 = 20.0;
/// Items float this far above the street
const ITEM_HEIGHT_MIN: f32 = 30.0;
const ITEM_HEIGHT_MAX: f32 = 140.0;

/// One draw from the object table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Category {
    Building(BuildingKind),
    Tree,
    Streetlight,
    Fence,
    Bush,
    Hazard,
    Nothing,
}

/// Table order matches `ObjectOdds::as_array`
const CATEGORIES: [Category; 10] = [
    Category::Building(BuildingKind::House),
    Category::Building(BuildingKind::Hospital),
    Category::Building(BuildingKind::FireStation),
    Category::Building(BuildingKind::Store),
    Category::Building(BuildingKind::Supermarket),
    Category::Tree,
    Category::Streetlight,
    Category::Fence,
    Category::Bush,
    Category::Hazard,
];

/// Run-dependent inputs to generation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenParams {
    /// Cumulative meters travelled across runs
    pub distance_m: f32,
    /// Adaptive spawn-frequency multiplier
    pub spawn_frequency: f32,
}

impl Default for GenParams {
    fn default() -> Self {
        Self {
            distance_m: 0.0,
            spawn_frequency: 1.0,
        }
    }
}

/// Content produced for one x-range
#[derive(Debug, Clone, Default)]
pub struct Segment {
    /// Sorted by x
    pub objects: Vec<WorldObject>,
    pub enemies: Vec<Enemy>,
}

/// Generate street content for `[start_x, end_x)`
///
/// Walks forward in steps of `segment_width + jitter`. At each step one
/// object category is drawn, then an enemy and a collectible are rolled
/// independently. `spawn_frequency` scales the enemy, collectible and
/// hazard odds.
pub fn generate_segment(
    start_x: f32,
    end_x: f32,
    tuning: &Tuning,
    params: &GenParams,
    rng: &mut Pcg32,
    ids: &mut EntityIds,
) -> Segment {
    let mut segment = Segment::default();
    let mut x = start_x;
    let frequency = params.spawn_frequency.max(0.0);
    let collectible_chance = (tuning.collectible_chance * frequency).min(1.0);

    while x < end_x {
        let jitter = rng.random::<f32>() * tuning.segment_jitter;
        let mut step = (tuning.segment_width + jitter).max(MIN_STEP);

        let category = pick_category(rng.random(), &tuning.objects, frequency);
        let category = if category == Category::Hazard && x < SAFE_START_DISTANCE {
            Category::Nothing
        } else {
            category
        };
        if let Some(object) = build_object(category, x, rng, ids) {
            if matches!(object.kind, ObjectKind::Structure(_)) {
                step = step.max(object.size.x + BUILDING_MARGIN);
            }
            segment.objects.push(object);
        }

        if x >= SAFE_START_DISTANCE {
            let chance = (enemy_chance(tuning, params.distance_m) * frequency).min(1.0);
            if rng.random::<f32>() < chance {
                let kind = EnemyKind::ALL[rng.random_range(0..EnemyKind::ALL.len())];
                segment
                    .enemies
                    .push(Enemy::spawn(ids.next_id(), kind, x + step * 0.5));
            }
        }

        if rng.random::<f32>() < collectible_chance {
            let item = pick_item(rng, &tuning.items);
            let height = rng.random_range(ITEM_HEIGHT_MIN..ITEM_HEIGHT_MAX);
            segment.objects.push(WorldObject::collectible(
                ids.next_id(),
                x + step * 0.5,
                GROUND_Y - height,
                item,
            ));
        }

        x += step;
    }

    sort_by_x(&mut segment.objects);
    segment
}

/// Per-step enemy spawn chance at a distance, before the adaptive multiplier
pub fn enemy_chance(tuning: &Tuning, meters: f32) -> f32 {
    (tuning.enemy_spawn_base + meters * tuning.enemy_spawn_per_meter).min(tuning.enemy_spawn_cap)
}

/// Cumulative walk over the table with the hazard weight scaled
fn pick_category(roll: f32, odds: &ObjectOdds, hazard_scale: f32) -> Category {
    let mut weights = odds.as_array();
    weights[9] = (weights[9] * hazard_scale).min(1.0);
    let mut acc = 0.0;
    for (p, category) in weights.into_iter().zip(CATEGORIES) {
        acc += p;
        if roll < acc {
            return category;
        }
    }
    Category::Nothing
}

/// Nested tier roll: common (note/record) or rare
pub fn pick_item(rng: &mut Pcg32, odds: &ItemOdds) -> ItemType {
    if rng.random::<f32>() < odds.common {
        if rng.random::<f32>() < odds.note {
            ItemType::Note
        } else {
            ItemType::Record
        }
    } else {
        let roll = rng.random::<f32>();
        if roll < odds.golden_note {
            ItemType::GoldenNote
        } else if roll < odds.energy_crystal {
            ItemType::EnergyCrystal
        } else if roll < odds.speed_boost {
            ItemType::SpeedBoost
        } else {
            ItemType::MysteryBox
        }
    }
}

fn pick<T: Copy>(rng: &mut Pcg32, options: &[T]) -> T {
    options[rng.random_range(0..options.len())]
}

fn grounded(id: u32, x: f32, size: Vec2, layer: Layer, kind: ObjectKind) -> WorldObject {
    WorldObject {
        id,
        pos: Vec2::new(x, GROUND_Y - size.y),
        size,
        layer,
        kind,
    }
}

fn build_object(
    category: Category,
    x: f32,
    rng: &mut Pcg32,
    ids: &mut EntityIds,
) -> Option<WorldObject> {
    let object = match category {
        Category::Building(kind) => build_structure(kind, x, rng, ids.next_id()),
        Category::Tree => {
            let size = Vec2::new(rng.random_range(60.0..100.0), rng.random_range(120.0..200.0));
            let foliage_color = pick(rng, &FOLIAGE_COLORS);
            grounded(ids.next_id(), x, size, Layer::Background, ObjectKind::Tree { foliage_color })
        }
        Category::Streetlight => grounded(
            ids.next_id(),
            x,
            Vec2::new(16.0, 180.0),
            Layer::Background,
            ObjectKind::Streetlight,
        ),
        Category::Fence => {
            let size = Vec2::new(rng.random_range(80.0..160.0), rng.random_range(36.0..48.0));
            grounded(ids.next_id(), x, size, Layer::Foreground, ObjectKind::Fence)
        }
        Category::Bush => {
            let size = Vec2::new(rng.random_range(40.0..80.0), rng.random_range(24.0..40.0));
            let color = pick(rng, &BUSH_COLORS);
            grounded(ids.next_id(), x, size, Layer::Foreground, ObjectKind::Bush { color })
        }
        Category::Hazard => {
            let roll = rng.random::<f32>();
            if roll < 0.4 {
                let size = Vec2::new(20.0, rng.random_range(140.0..200.0));
                grounded(ids.next_id(), x, size, Layer::Foreground, ObjectKind::Pole)
            } else if roll < 0.7 {
                grounded(
                    ids.next_id(),
                    x,
                    Vec2::new(60.0, 8.0),
                    Layer::Foreground,
                    ObjectKind::SpeedPad { activated: false },
                )
            } else {
                WorldObject::breakable_crate(ids.next_id(), x)
            }
        }
        Category::Nothing => return None,
    };
    Some(object)
}

fn build_structure(kind: BuildingKind, x: f32, rng: &mut Pcg32, id: u32) -> WorldObject {
    let (min_w, max_w) = match kind {
        BuildingKind::House => (160.0, 220.0),
        BuildingKind::Hospital | BuildingKind::Supermarket => (220.0, 260.0),
        BuildingKind::FireStation => (200.0, 240.0),
        BuildingKind::Store => (140.0, 180.0),
    };
    let size = Vec2::new(rng.random_range(min_w..max_w), rng.random_range(140.0..260.0));
    let door = Aabb::new(
        Vec2::new(x + size.x / 2.0 - DOOR_WIDTH / 2.0, GROUND_Y - DOOR_HEIGHT),
        Vec2::new(DOOR_WIDTH, DOOR_HEIGHT),
    );
    let wall_color = pick(rng, &WALL_COLORS);
    let roof_color = pick(rng, &ROOF_COLORS);
    grounded(
        id,
        x,
        size,
        Layer::Background,
        ObjectKind::Structure(Structure {
            kind,
            wall_color,
            roof_color,
            door,
            furniture: None,
            used: false,
        }),
    )
}

/// Keep the street generated ahead of the camera and pruned behind it
///
/// Enemies share the objects' window: they live from the cutoff behind the
/// camera up to the frontier, so a freshly spawned enemy is kept until the
/// player reaches it.
///
/// Safe to call repeatedly: with the camera unchanged nothing is generated
/// twice.
pub fn stream(state: &mut GameState) {
    let needed = state.camera.right() + GENERATION_BUFFER;
    let mut generated = false;

    while state.frontier < needed {
        let start = state.frontier;
        let end = start + SEGMENT_SPAN;
        let params = GenParams {
            distance_m: state.difficulty.stats.distance_m,
            spawn_frequency: state.difficulty.multipliers.spawn_frequency,
        };
        let segment = generate_segment(
            start,
            end,
            &state.tuning,
            &params,
            &mut state.rng,
            &mut state.ids,
        );
        log::debug!(
            "Generated [{start:.0}, {end:.0}): {} objects, {} enemies",
            segment.objects.len(),
            segment.enemies.len()
        );
        state.objects.extend(segment.objects);
        state.enemies.extend(segment.enemies);
        state.frontier = end;
        generated = true;
    }

    if generated {
        sort_by_x(&mut state.objects);
        state.normalize_order();
    }

    let cutoff = state.camera.left() - state.viewport.width * VIEW_RANGE_MULTIPLIER;
    prune(&mut state.objects, cutoff);
    prune_enemies(&mut state.enemies, cutoff, state.frontier + ENEMY_ROAM_MARGIN);
}

/// Drop objects entirely behind `cutoff` and collected items
pub fn prune(objects: &mut Vec<WorldObject>, cutoff: f32) {
    objects.retain(|o| o.right() >= cutoff && !o.is_spent());
}
