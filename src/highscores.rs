//! High score leaderboard
//!
//! Tracks the top 10 finished runs, persisted as JSON by the runner.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::GameResult;

/// Maximum number of high scores to keep
pub const MAX_HIGH_SCORES: usize = 10;

/// A single high score entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    /// Final score
    pub score: u64,
    /// How long the run lasted
    pub seconds: u32,
    /// Unix timestamp (s) when achieved
    pub timestamp: u64,
}

/// High score leaderboard, sorted by descending score
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HighScores {
    pub entries: Vec<HighScoreEntry>,
}

impl HighScores {
    /// Create empty leaderboard
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Check if a score qualifies for the leaderboard
    pub fn qualifies(&self, score: u64) -> bool {
        if score == 0 {
            return false;
        }
        if self.entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        self.entries.last().map(|e| score > e.score).unwrap_or(true)
    }

    /// Rank a score would achieve (1-indexed, None if it doesn't qualify)
    pub fn potential_rank(&self, score: u64) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }
        let rank = self.entries.iter().position(|e| score > e.score);
        Some(rank.unwrap_or(self.entries.len()) + 1)
    }

    /// Add a finished run; returns the rank achieved or None
    pub fn add_score(&mut self, score: u64, seconds: u32, timestamp: u64) -> Option<usize> {
        let rank = self.potential_rank(score)?;
        self.entries.insert(
            rank - 1,
            HighScoreEntry {
                score,
                seconds,
                timestamp,
            },
        );
        self.entries.truncate(MAX_HIGH_SCORES);
        Some(rank)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }

    /// Load from a JSON file; a missing file is an empty board
    pub fn load(path: impl AsRef<Path>) -> GameResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            log::info!("No high scores at {}, starting fresh", path.display());
            return Ok(Self::new());
        }
        let json = std::fs::read_to_string(path)?;
        let scores: Self = serde_json::from_str(&json)?;
        log::info!("Loaded {} high scores", scores.entries.len());
        Ok(scores)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> GameResult<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        log::info!("High scores saved ({} entries)", self.entries.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_never_qualifies() {
        assert!(!HighScores::new().qualifies(0));
    }

    #[test]
    fn test_entries_stay_sorted_and_capped() {
        let mut scores = HighScores::new();
        for score in [50, 10, 90, 30, 70, 20, 80, 40, 60, 100, 5] {
            scores.add_score(score, 1, 0);
        }
        assert_eq!(scores.entries.len(), MAX_HIGH_SCORES);
        assert_eq!(scores.top_score(), Some(100));
        let values: Vec<_> = scores.entries.iter().map(|e| e.score).collect();
        assert_eq!(values, vec![100, 90, 80, 70, 60, 50, 40, 30, 20, 10]);
        assert!(!scores.qualifies(10));
        assert_eq!(scores.potential_rank(95), Some(2));
    }

    #[test]
    fn test_add_score_reports_rank() {
        let mut scores = HighScores::new();
        assert_eq!(scores.add_score(100, 30, 1), Some(1));
        assert_eq!(scores.add_score(200, 45, 2), Some(1));
        assert_eq!(scores.add_score(150, 40, 3), Some(2));
        assert_eq!(scores.add_score(0, 0, 4), None);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("scores.json");

        assert!(HighScores::load(&path).expect("missing is empty").is_empty());

        let mut scores = HighScores::new();
        scores.add_score(321, 64, 1_700_000_000);
        scores.save(&path).expect("save");
        let loaded = HighScores::load(&path).expect("load");
        assert_eq!(loaded.entries, scores.entries);
    }
}
