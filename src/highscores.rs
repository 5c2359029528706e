//! Distance leaderboard
//!
//! Top 10 runs by meters travelled, best first. Persisted as JSON in
//! LocalStorage on wasm; native builds keep it in memory.

use serde::{Deserialize, Serialize};

use crate::sim::DifficultyMode;
use crate::storage;

/// Maximum number of high scores to keep
pub const MAX_HIGH_SCORES: usize = 10;

/// A single high score entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    pub meters: u32,
    /// Notes held at the end of the run
    #[serde(default)]
    pub notes: u32,
    /// Unix timestamp (ms) when achieved
    pub timestamp: f64,
}

/// High score leaderboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct HighScores {
    pub entries: Vec<HighScoreEntry>,
}

impl HighScores {
    /// LocalStorage key
    const STORAGE_KEY: &'static str = "city_hopper_highscores";

    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Check if a distance earns a place on the board
    pub fn qualifies(&self, meters: u32) -> bool {
        if meters == 0 {
            return false;
        }
        if self.entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        self.entries.last().is_none_or(|e| meters > e.meters)
    }

    /// Rank a distance would achieve (1-indexed, None if it doesn't qualify)
    pub fn potential_rank(&self, meters: u32) -> Option<usize> {
        if !self.qualifies(meters) {
            return None;
        }
        let rank = self.entries.iter().position(|e| meters > e.meters);
        Some(rank.unwrap_or(self.entries.len()) + 1)
    }

    /// Insert a run, keeping the board sorted and capped
    ///
    /// Returns the rank achieved (1-indexed) or None if it didn't qualify.
    pub fn add_score(&mut self, meters: u32, notes: u32, timestamp: f64) -> Option<usize> {
        let rank = self.potential_rank(meters)?;
        self.entries.insert(
            rank - 1,
            HighScoreEntry {
                meters,
                notes,
                timestamp,
            },
        );
        self.entries.truncate(MAX_HIGH_SCORES);
        Some(rank)
    }

    /// Record a finished run; only Normal mode runs are ranked
    pub fn record_run(
        &mut self,
        meters: u32,
        notes: u32,
        mode: DifficultyMode,
        timestamp: f64,
    ) -> Option<usize> {
        if mode != DifficultyMode::Normal {
            log::debug!("{} mode run not ranked", mode.as_str());
            return None;
        }
        let rank = self.add_score(meters, notes, timestamp);
        if let Some(rank) = rank {
            log::info!("New high score: {meters} m (rank {rank})");
        }
        rank
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Best distance (if any)
    pub fn top_score(&self) -> Option<u32> {
        self.entries.first().map(|e| e.meters)
    }

    /// Parse a stored board, restoring order and the size cap
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        let mut scores: HighScores = serde_json::from_str(json)?;
        scores.entries.sort_by(|a, b| b.meters.cmp(&a.meters));
        scores.entries.truncate(MAX_HIGH_SCORES);
        Ok(scores)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Load the stored board; unreadable data starts a fresh one
    pub fn load() -> Self {
        let Some(json) = storage::read(Self::STORAGE_KEY) else {
            log::info!("No high scores found, starting fresh");
            return Self::new();
        };
        match Self::from_json(&json) {
            Ok(scores) => {
                log::info!("Loaded {} high scores", scores.entries.len());
                scores
            }
            Err(e) => {
                log::warn!("Discarding unreadable high scores: {e}");
                Self::new()
            }
        }
    }

    pub fn save(&self) {
        match self.to_json() {
            Ok(json) => {
                if storage::write(Self::STORAGE_KEY, &json) {
                    log::info!("High scores saved ({} entries)", self.entries.len());
                }
            }
            Err(e) => log::warn!("Failed to encode high scores: {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_board_is_sorted_and_capped() {
        let mut scores = HighScores::new();
        for (i, meters) in [120, 40, 300, 75, 10, 500, 220, 90, 60, 35, 410, 15].iter().enumerate() {
            scores.add_score(*meters, 0, i as f64);
        }
        assert_eq!(scores.entries.len(), MAX_HIGH_SCORES);
        assert_eq!(scores.top_score(), Some(500));
        assert!(scores.entries.windows(2).all(|w| w[0].meters >= w[1].meters));
        assert!(!scores.entries.iter().any(|e| e.meters == 10 || e.meters == 15));
    }

    #[test]
    fn test_zero_never_qualifies() {
        let scores = HighScores::new();
        assert!(!scores.qualifies(0));
        assert_eq!(scores.potential_rank(1), Some(1));
    }

    #[test]
    fn test_easy_runs_are_not_ranked() {
        let mut scores = HighScores::new();
        assert_eq!(scores.record_run(250, 3, DifficultyMode::Easy, 0.0), None);
        assert!(scores.is_empty());
        assert_eq!(scores.record_run(250, 3, DifficultyMode::Normal, 0.0), Some(1));
    }

    #[test]
    fn test_json_load_restores_order() {
        let json = r#"{"entries":[{"meters":5,"timestamp":0},{"meters":50,"timestamp":1}]}"#;
        let scores = HighScores::from_json(json).unwrap();
        assert_eq!(scores.top_score(), Some(50));
        assert_eq!(scores.entries[1].notes, 0);

        let round = HighScores::from_json(&scores.to_json().unwrap()).unwrap();
        assert_eq!(round, scores);
    }
}
