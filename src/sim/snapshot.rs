//! Read-only render snapshot handed to the external renderer

use serde::Serialize;

use super::enemy::{Enemy, EnemyKind};
use super::state::{AnimTag, Facing, GamePhase, GameState, Player, Viewport};
use super::world::{
    BuildingKind, FurnitureKind, ItemType, Layer, MAX_OBJECT_WIDTH, ObjectKind, WorldObject,
    window_range,
};

/// Extra distance drawn past each screen edge
const DRAW_MARGIN: f32 = 64.0;

/// One sprite to draw, in world coordinates
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Drawable {
    pub id: u32,
    pub sprite: &'static str,
    pub layer: Layer,
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
    pub frame: u32,
    pub flip: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Hud {
    pub phase: GamePhase,
    pub stamina: f32,
    pub meters: u32,
    pub notes: u32,
    pub records: u32,
    pub jump_bar: f32,
    pub jump_bar_red: bool,
    pub quest: String,
    pub notification: Option<String>,
    pub speed_buff: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderSnapshot {
    pub scroll_x: f32,
    pub viewport: Viewport,
    /// Building kind while inside one
    pub inside: Option<BuildingKind>,
    /// Draw order: background, foreground, collectibles, enemies, player
    pub entities: Vec<Drawable>,
    pub hud: Hud,
}

impl RenderSnapshot {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

fn object_sprite(object: &WorldObject) -> (&'static str, Option<u32>) {
    match &object.kind {
        ObjectKind::Structure(s) => {
            let sprite = match s.kind {
                BuildingKind::House => "house",
                BuildingKind::Hospital => "hospital",
                BuildingKind::FireStation => "fire_station",
                BuildingKind::Store => "store",
                BuildingKind::Supermarket => "supermarket",
            };
            (sprite, Some(s.wall_color))
        }
        ObjectKind::Tree { foliage_color } => ("tree", Some(*foliage_color)),
        ObjectKind::Streetlight => ("streetlight", None),
        ObjectKind::Fence => ("fence", None),
        ObjectKind::Bush { color } => ("bush", Some(*color)),
        ObjectKind::Pole => ("pole", None),
        ObjectKind::SpeedPad { activated: false } => ("speed_pad", None),
        ObjectKind::SpeedPad { activated: true } => ("speed_pad_used", None),
        ObjectKind::Crate { broken: false } => ("crate", None),
        ObjectKind::Crate { broken: true } => ("crate_broken", None),
        ObjectKind::Collectible(c) => (item_sprite(c.item), None),
    }
}

fn item_sprite(item: ItemType) -> &'static str {
    match item {
        ItemType::Note => "note",
        ItemType::Record => "record",
        ItemType::GoldenNote => "golden_note",
        ItemType::EnergyCrystal => "energy_crystal",
        ItemType::SpeedBoost => "speed_boost",
        ItemType::MysteryBox => "mystery_box",
    }
}

fn object_drawable(object: &WorldObject) -> Drawable {
    let (sprite, color) = object_sprite(object);
    Drawable {
        id: object.id,
        sprite,
        layer: object.layer,
        x: object.pos.x,
        y: object.pos.y,
        w: object.size.x,
        h: object.size.y,
        frame: 0,
        flip: false,
        color,
    }
}

fn enemy_drawable(enemy: &Enemy) -> Drawable {
    let sprite = match enemy.kind {
        EnemyKind::Slime => "slime",
        EnemyKind::Bat => "bat",
        EnemyKind::Spider => "spider",
        EnemyKind::Ghost => "ghost",
        EnemyKind::Snake => "snake",
        EnemyKind::Wolf => "wolf",
    };
    Drawable {
        id: enemy.id,
        sprite,
        layer: Layer::Foreground,
        x: enemy.pos.x,
        y: enemy.pos.y,
        w: enemy.size.x,
        h: enemy.size.y,
        frame: enemy.anim_frame,
        flip: enemy.vel.x < 0.0,
        color: if enemy.dead { Some(0x80_80_80) } else { None },
    }
}

fn player_drawable(player: &Player) -> Drawable {
    let sprite = match player.anim.tag {
        AnimTag::Idle => "player_idle",
        AnimTag::Walk => "player_walk",
        AnimTag::Run => "player_run",
        AnimTag::Jump => "player_jump",
        AnimTag::Apex => "player_apex",
        AnimTag::Fall => "player_fall",
        AnimTag::Crouch => "player_crouch",
        AnimTag::WallSlide => "player_wall_slide",
    };
    Drawable {
        id: 0,
        sprite,
        layer: Layer::Foreground,
        x: player.pos.x,
        y: player.pos.y,
        w: player.size.x,
        h: player.size.y,
        frame: player.anim.frame,
        flip: player.facing == Facing::Left,
        color: None,
    }
}

fn furniture_sprite(kind: FurnitureKind) -> &'static str {
    match kind {
        FurnitureKind::Table => "table",
        FurnitureKind::Couch => "couch",
        FurnitureKind::Shelf => "shelf",
        FurnitureKind::Bed => "bed",
    }
}

/// Build the frame's draw list and HUD
pub fn snapshot(state: &GameState) -> RenderSnapshot {
    let mut entities = Vec::new();
    let left = state.camera.left() - DRAW_MARGIN;
    let right = state.camera.right() + DRAW_MARGIN;
    let visible = |o: &&WorldObject| o.right() >= left && o.pos.x <= right && !o.is_spent();

    if let Some(room) = &state.interior {
        entities.extend(room.furniture.iter().enumerate().map(|(i, piece)| Drawable {
            id: i as u32,
            sprite: furniture_sprite(piece.kind),
            layer: Layer::Background,
            x: piece.pos.x,
            y: piece.pos.y,
            w: piece.size.x,
            h: piece.size.y,
            frame: 0,
            flip: false,
            color: None,
        }));
        entities.extend(
            room.collectibles
                .iter()
                .filter(|o| !o.is_spent())
                .map(object_drawable),
        );
    } else {
        let window = window_range(&state.objects, left, right, MAX_OBJECT_WIDTH);
        let on_screen: Vec<&WorldObject> = state.objects[window].iter().filter(visible).collect();
        for layer in [Layer::Background, Layer::Foreground] {
            entities.extend(
                on_screen
                    .iter()
                    .filter(|o| o.layer == layer && !o.is_collectible())
                    .map(|o| object_drawable(o)),
            );
        }
        entities.extend(
            on_screen
                .iter()
                .filter(|o| o.is_collectible())
                .map(|o| object_drawable(o)),
        );
        entities.extend(
            state
                .enemies
                .iter()
                .filter(|e| e.pos.x + e.size.x >= left && e.pos.x <= right)
                .map(enemy_drawable),
        );
    }
    entities.push(player_drawable(&state.player));

    RenderSnapshot {
        scroll_x: state.camera.left(),
        viewport: state.viewport,
        inside: state.interior.as_ref().map(|room| room.kind),
        entities,
        hud: Hud {
            phase: state.phase,
            stamina: state.player.stamina,
            meters: state.meters(),
            notes: state.counters.notes,
            records: state.counters.records,
            jump_bar: state.player.jump_bar(),
            jump_bar_red: state.player.jump_bar_in_red_zone(),
            quest: state.quests.hud_text(),
            notification: state.notification.clone(),
            speed_buff: state.player.speed_buff,
        },
    }
}
