//! Horizontal scrolling camera

use serde::{Deserialize, Serialize};

use super::state::{Player, Viewport};
use crate::consts::CAMERA_LEAD;

/// Scroll window over the street
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    /// World x of the left screen edge
    pub x: f32,
    pub width: f32,
}

impl Camera {
    /// Keep the player `CAMERA_LEAD` of the way across the screen
    pub fn follow(&mut self, player: &Player, viewport: &Viewport) {
        self.width = viewport.width;
        self.x = (player.pos.x - viewport.width * CAMERA_LEAD).max(0.0);
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.x
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }
}
