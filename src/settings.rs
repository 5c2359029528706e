//! Game settings and preferences
//!
//! Persisted separately from the high scores in LocalStorage.

use serde::{Deserialize, Serialize};

use crate::sim::{DifficultyMode, GameState};
use crate::storage;

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Easy mode forgives side hits but runs are not ranked
    pub difficulty: DifficultyMode,
    /// Scale enemies, spawns and stamina drain to the player's skill
    pub adaptive_difficulty: bool,

    // === HUD ===
    /// Show FPS counter
    pub show_fps: bool,

    /// Pause when the tab is hidden or loses focus
    pub auto_pause: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            difficulty: DifficultyMode::Normal,
            adaptive_difficulty: true,
            show_fps: false,
            auto_pause: true,
        }
    }
}

impl Settings {
    /// Push gameplay preferences into a state
    pub fn apply(&self, state: &mut GameState) {
        state.mode = self.difficulty;
        state.adaptive = self.adaptive_difficulty;
    }

    /// Switch between Easy and Normal
    pub fn toggle_difficulty(&mut self) {
        self.difficulty = match self.difficulty {
            DifficultyMode::Easy => DifficultyMode::Normal,
            DifficultyMode::Normal => DifficultyMode::Easy,
        };
        log::info!("Difficulty set to {}", self.difficulty.as_str());
    }

    /// LocalStorage key
    const STORAGE_KEY: &'static str = "city_hopper_settings";

    /// Load stored settings, falling back to defaults
    pub fn load() -> Self {
        let Some(json) = storage::read(Self::STORAGE_KEY) else {
            log::info!("Using default settings");
            return Self::default();
        };
        match serde_json::from_str(&json) {
            Ok(settings) => {
                log::info!("Loaded settings from LocalStorage");
                settings
            }
            Err(e) => {
                log::warn!("Ignoring stored settings: {e}");
                Self::default()
            }
        }
    }

    pub fn save(&self) {
        match serde_json::to_string(self) {
            Ok(json) => {
                if storage::write(Self::STORAGE_KEY, &json) {
                    log::info!("Settings saved");
                }
            }
            Err(e) => log::warn!("Failed to encode settings: {e}"),
        }
    }
}
