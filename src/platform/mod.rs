//! Platform abstraction layer
//!
//! Turns raw keyboard state from the host into the normalized
//! [`TickInput`] intent the simulation consumes. Devices that are missing
//! simply never report anything, which reads as "no input".

use std::collections::BTreeSet;

use crate::sim::TickInput;

/// Logical buttons the game understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Button {
    Left,
    Right,
    Jump,
    Crouch,
    Start,
    Pause,
}

impl Button {
    /// Map a `KeyboardEvent.code` to a button
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "ArrowLeft" | "KeyA" => Some(Button::Left),
            "ArrowRight" | "KeyD" => Some(Button::Right),
            "ArrowUp" | "KeyW" | "Space" => Some(Button::Jump),
            "ArrowDown" | "KeyS" | "ShiftLeft" | "ShiftRight" => Some(Button::Crouch),
            "Enter" => Some(Button::Start),
            "KeyP" | "Escape" => Some(Button::Pause),
            _ => None,
        }
    }
}

/// Held buttons plus one-shot presses waiting to be consumed
#[derive(Debug, Clone, Default)]
pub struct KeyState {
    held: BTreeSet<Button>,
    start_queued: bool,
    pause_queued: bool,
    analog_speed: Option<f32>,
}

impl KeyState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if the code maps to a game button (the host should
    /// then suppress the browser default)
    pub fn key_down(&mut self, code: &str) -> bool {
        let Some(button) = Button::from_code(code) else {
            return false;
        };
        // Auto-repeat must not re-trigger one-shots
        if self.held.insert(button) {
            match button {
                Button::Start | Button::Jump => self.start_queued = true,
                Button::Pause => self.pause_queued = true,
                _ => {}
            }
        }
        true
    }

    pub fn key_up(&mut self, code: &str) -> bool {
        match Button::from_code(code) {
            Some(button) => {
                self.held.remove(&button);
                true
            }
            None => false,
        }
    }

    /// Release everything (focus lost)
    pub fn clear(&mut self) {
        self.held.clear();
        self.start_queued = false;
        self.pause_queued = false;
    }

    /// Analog speed from a tilt sensor or stick; `None` disables it
    pub fn set_analog_speed(&mut self, speed: Option<f32>) {
        self.analog_speed = speed.filter(|s| s.is_finite()).map(|s| s.clamp(0.0, 1.0));
    }

    pub fn is_held(&self, button: Button) -> bool {
        self.held.contains(&button)
    }

    /// Build this frame's intent, consuming queued one-shots
    pub fn intent(&mut self) -> TickInput {
        let input = TickInput {
            left: self.is_held(Button::Left),
            right: self.is_held(Button::Right),
            jump: self.is_held(Button::Jump),
            crouch: self.is_held(Button::Crouch),
            analog_speed: self.analog_speed,
            start: self.start_queued,
            pause: self.pause_queued,
        };
        self.start_queued = false;
        self.pause_queued = false;
        input
    }
}
