//! Adaptive difficulty
//!
//! Cumulative play statistics are folded into a skill score in [0, 1], which
//! the balance curves turn into multipliers for enemy speed, spawn frequency
//! and stamina drain.

use serde::{Deserialize, Serialize};

use crate::piecewise_linear;
use crate::tuning::DifficultyCurves;

/// Below this much play time the skill score stays neutral
const MIN_SAMPLE_SECONDS: f32 = 20.0;
const NEUTRAL_SKILL: f32 = 0.5;

/// Statistics accumulated across runs
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayStats {
    pub deaths: u32,
    pub distance_m: f32,
    pub items_collected: u32,
    pub time_played: f32,
    pub quests_completed: u32,
    pub sprint_uses: u32,
}

/// Active difficulty multipliers
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Multipliers {
    pub enemy_speed: f32,
    pub spawn_frequency: f32,
    pub stamina_drain: f32,
}

impl Default for Multipliers {
    fn default() -> Self {
        Self {
            enemy_speed: 1.0,
            spawn_frequency: 1.0,
            stamina_drain: 1.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DifficultyState {
    pub stats: PlayStats,
    pub skill: f32,
    pub multipliers: Multipliers,
}

impl DifficultyState {
    pub fn new() -> Self {
        Self {
            skill: NEUTRAL_SKILL,
            ..Self::default()
        }
    }

    /// Fold `dt` into the stats and recompute the multipliers
    ///
    /// With `adaptive` off the multipliers are pinned to 1.0.
    pub fn update(&mut self, dt: f32, curves: &DifficultyCurves, adaptive: bool) {
        self.stats.time_played += dt.max(0.0);
        self.skill = skill_score(&self.stats, curves);

        self.multipliers = if adaptive {
            Multipliers {
                enemy_speed: piecewise_linear(self.skill, &curves.enemy_speed),
                spawn_frequency: piecewise_linear(self.skill, &curves.spawn_frequency),
                stamina_drain: piecewise_linear(self.skill, &curves.stamina_drain),
            }
        } else {
            Multipliers::default()
        };
    }

    /// Credit newly walked meters
    pub fn add_distance(&mut self, meters: u32) {
        self.stats.distance_m += meters as f32;
    }
}

/// Mean of the survival, collection and exploration sub-scores
pub fn skill_score(stats: &PlayStats, curves: &DifficultyCurves) -> f32 {
    if stats.time_played < MIN_SAMPLE_SECONDS {
        return NEUTRAL_SKILL;
    }
    let minutes = stats.time_played / 60.0;
    let survival = normalized(
        stats.distance_m / (stats.deaths + 1) as f32,
        curves.survival_norm,
    );
    let collection = normalized(stats.items_collected as f32 / minutes, curves.collection_norm);
    let exploration = normalized(stats.distance_m / minutes, curves.exploration_norm);
    (survival + collection + exploration) / 3.0
}

fn normalized(value: f32, norm: f32) -> f32 {
    if norm <= 0.0 {
        return 0.0;
    }
    (value / norm).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_player_is_neutral() {
        let mut state = DifficultyState::new();
        let curves = DifficultyCurves::default();
        state.update(1.0, &curves, true);
        assert_eq!(state.skill, NEUTRAL_SKILL);
        assert!((state.multipliers.spawn_frequency - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_strong_player_gets_harder_game() {
        let curves = DifficultyCurves::default();
        let mut state = DifficultyState::new();
        state.stats = PlayStats {
            deaths: 0,
            distance_m: 5000.0,
            items_collected: 500,
            time_played: 300.0,
            ..PlayStats::default()
        };
        state.update(0.0, &curves, true);
        assert!((state.skill - 1.0).abs() < 1e-5);
        assert!((state.multipliers.enemy_speed - 1.3).abs() < 1e-5);
        assert!((state.multipliers.stamina_drain - 1.25).abs() < 1e-5);
    }

    #[test]
    fn test_deaths_lower_skill() {
        let curves = DifficultyCurves::default();
        let mut stats = PlayStats {
            distance_m: 400.0,
            items_collected: 20,
            time_played: 120.0,
            ..PlayStats::default()
        };
        let careful = skill_score(&stats, &curves);
        stats.deaths = 9;
        let reckless = skill_score(&stats, &curves);
        assert!(reckless < careful);
    }

    #[test]
    fn test_disabled_pins_multipliers() {
        let curves = DifficultyCurves::default();
        let mut state = DifficultyState::new();
        state.stats.time_played = 600.0;
        state.stats.distance_m = 10_000.0;
        state.update(1.0, &curves, false);
        assert_eq!(state.multipliers, Multipliers::default());
    }
}
