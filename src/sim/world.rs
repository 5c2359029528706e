//! Street objects: buildings, scenery, hazards and collectibles

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::aabb::Aabb;
use crate::consts::*;

/// Parallax layer an object is drawn on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Layer {
    Background,
    Foreground,
}

/// Building subtypes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BuildingKind {
    House,
    Hospital,
    FireStation,
    Store,
    Supermarket,
}

impl BuildingKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BuildingKind::House => "house",
            BuildingKind::Hospital => "hospital",
            BuildingKind::FireStation => "fire station",
            BuildingKind::Store => "store",
            BuildingKind::Supermarket => "supermarket",
        }
    }
}

/// Collectible item types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemType {
    Note,
    Record,
    GoldenNote,
    EnergyCrystal,
    SpeedBoost,
    MysteryBox,
}

impl ItemType {
    /// Edge length of the item's pickup box
    pub fn size(&self) -> f32 {
        match self {
            ItemType::Note | ItemType::Record => 24.0,
            ItemType::GoldenNote | ItemType::EnergyCrystal => 28.0,
            ItemType::SpeedBoost | ItemType::MysteryBox => 30.0,
        }
    }
}

/// A piece of furniture inside a house (walkable top)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Furniture {
    pub kind: FurnitureKind,
    pub pos: Vec2,
    pub size: Vec2,
}

impl Furniture {
    pub fn aabb(&self) -> Aabb {
        Aabb::new(self.pos, self.size)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FurnitureKind {
    Table,
    Couch,
    Shelf,
    Bed,
}

/// Building payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Structure {
    pub kind: BuildingKind,
    pub wall_color: u32,
    pub roof_color: u32,
    /// Door rectangle in world space
    pub door: Aabb,
    /// Interior layout, generated on first entry
    pub furniture: Option<Vec<Furniture>>,
    /// One-shot effect already consumed (stores)
    pub used: bool,
}

/// Collectible payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Collectible {
    pub item: ItemType,
    /// Monotonic: once true, never drawn or collided again
    pub collected: bool,
}

/// Variant payloads of a world object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ObjectKind {
    Structure(Structure),
    Tree { foliage_color: u32 },
    Streetlight,
    Fence,
    Bush { color: u32 },
    /// Tall solid obstacle (wall-slide surface)
    Pole,
    SpeedPad { activated: bool },
    Crate { broken: bool },
    Collectible(Collectible),
}

/// Anything placed in the street
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldObject {
    pub id: u32,
    pub pos: Vec2,
    pub size: Vec2,
    pub layer: Layer,
    pub kind: ObjectKind,
}

impl WorldObject {
    pub fn aabb(&self) -> Aabb {
        Aabb::new(self.pos, self.size)
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.pos.x + self.size.x
    }

    /// Blocks movement (push-out resolution)
    pub fn is_collidable(&self) -> bool {
        match &self.kind {
            ObjectKind::Pole => true,
            ObjectKind::Crate { broken } => !broken,
            _ => false,
        }
    }

    /// Top surface the player can land on from above
    pub fn walkable_surface_y(&self) -> Option<f32> {
        match &self.kind {
            ObjectKind::Fence => Some(self.pos.y),
            _ => None,
        }
    }

    pub fn is_collectible(&self) -> bool {
        matches!(self.kind, ObjectKind::Collectible(_))
    }

    /// Collectible that has already been picked up
    pub fn is_spent(&self) -> bool {
        matches!(&self.kind, ObjectKind::Collectible(c) if c.collected)
    }

    /// Build a collectible resting with its bottom at `bottom_y`
    pub fn collectible(id: u32, center_x: f32, bottom_y: f32, item: ItemType) -> Self {
        let size = item.size();
        Self {
            id,
            pos: Vec2::new(center_x - size / 2.0, bottom_y - size),
            size: Vec2::splat(size),
            layer: Layer::Foreground,
            kind: ObjectKind::Collectible(Collectible {
                item,
                collected: false,
            }),
        }
    }

    /// Build a crate standing on the street
    pub fn breakable_crate(id: u32, x: f32) -> Self {
        Self {
            id,
            pos: Vec2::new(x, GROUND_Y - CRATE_SIZE),
            size: Vec2::splat(CRATE_SIZE),
            layer: Layer::Foreground,
            kind: ObjectKind::Crate { broken: false },
        }
    }
}

/// Keep objects in ascending x order (render order and windowed scans)
pub fn sort_by_x(objects: &mut [WorldObject]) {
    objects.sort_by(|a, b| a.pos.x.total_cmp(&b.pos.x).then(a.id.cmp(&b.id)));
}

/// Index range of objects that may intersect `[min_x, max_x]`
///
/// Requires `objects` sorted by x. `max_width` bounds how far left of
/// `min_x` an object may start and still reach into the window.
pub fn window_range(objects: &[WorldObject], min_x: f32, max_x: f32, max_width: f32) -> std::ops::Range<usize> {
    let start = objects.partition_point(|o| o.pos.x < min_x - max_width);
    let end = objects.partition_point(|o| o.pos.x <= max_x);
    start..end.max(start)
}

/// Widest object the generator produces (bounds windowed scans)
pub const MAX_OBJECT_WIDTH: f32 = 260.0;

#[cfg(test)]
mod tests {
    use super::*;

    fn pole(id: u32, x: f32) -> WorldObject {
        WorldObject {
            id,
            pos: Vec2::new(x, GROUND_Y - 160.0),
            size: Vec2::new(20.0, 160.0),
            layer: Layer::Foreground,
            kind: ObjectKind::Pole,
        }
    }

    #[test]
    fn test_predicates() {
        let mut c = WorldObject::breakable_crate(1, 10.0);
        assert!(c.is_collidable());
        c.kind = ObjectKind::Crate { broken: true };
        assert!(!c.is_collidable());

        let note = WorldObject::collectible(2, 100.0, GROUND_Y - 40.0, ItemType::Note);
        assert!(note.is_collectible());
        assert!(!note.is_spent());
        assert!(!note.is_collidable());
        assert_eq!(note.walkable_surface_y(), None);
    }

    #[test]
    fn test_window_range() {
        let mut objects: Vec<_> = (0..10).map(|i| pole(i, i as f32 * 100.0)).collect();
        sort_by_x(&mut objects);
        let range = window_range(&objects, 250.0, 450.0, 20.0);
        let xs: Vec<f32> = objects[range].iter().map(|o| o.pos.x).collect();
        assert_eq!(xs, vec![300.0, 400.0]);

        let range = window_range(&objects, 5000.0, 6000.0, 20.0);
        assert!(range.is_empty());
    }
}
