//! Axis-aligned bounding boxes
//!
//! Every entity in the street is a rectangle in world space with y growing
//! downward, so "top" is the smaller y.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    /// Build from a top-left position and a size
    #[inline]
    pub fn new(pos: Vec2, size: Vec2) -> Self {
        Self {
            min: pos,
            max: pos + size,
        }
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.min.x
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.max.x
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.min.y
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.max.y
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    /// Strict overlap (touching edges do not count)
    #[inline]
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
    }

    /// Whether the horizontal extents overlap
    #[inline]
    pub fn overlaps_x(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x && self.max.x > other.min.x
    }

    /// Minimum translation that moves `self` out of `other`
    ///
    /// Returns `None` when the boxes do not overlap. The push is along the
    /// axis of least penetration; its sign says which way to move `self`.
    pub fn push_out(&self, other: &Aabb) -> Option<Vec2> {
        if !self.overlaps(other) {
            return None;
        }
        let push_left = other.min.x - self.max.x;
        let push_right = other.max.x - self.min.x;
        let push_up = other.min.y - self.max.y;
        let push_down = other.max.y - self.min.y;

        let dx = if push_right < -push_left {
            push_right
        } else {
            push_left
        };
        let dy = if push_down < -push_up {
            push_down
        } else {
            push_up
        };

        if dx.abs() < dy.abs() {
            Some(Vec2::new(dx, 0.0))
        } else {
            Some(Vec2::new(0.0, dy))
        }
    }
}
