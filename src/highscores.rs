//! High score table
//!
//! Tracks the top 10 finished runs. The session only needs `best()` to decide
//! whether a run earns a leaderboard submission.

use serde::{Deserialize, Serialize};

/// Maximum number of high scores to keep
pub const MAX_HIGH_SCORES: usize = 10;

/// A single high score entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    pub score: u64,
    /// Simulated session time (seconds) when the run ended
    pub timestamp: f64,
}

/// High score table, sorted descending by score
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HighScores {
    pub entries: Vec<HighScoreEntry>,
}

impl HighScores {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Best score so far (0 when empty)
    pub fn best(&self) -> u64 {
        self.entries.first().map(|e| e.score).unwrap_or(0)
    }

    /// Strictly beats the stored best
    pub fn is_new_best(&self, score: u64) -> bool {
        score > self.best()
    }

    /// Check if a score qualifies for the table
    pub fn qualifies(&self, score: u64) -> bool {
        if score == 0 {
            return false;
        }
        if self.entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        self.entries.last().map(|e| score > e.score).unwrap_or(true)
    }

    /// Add a score. Returns the rank achieved (1-indexed) or None if it didn't qualify.
    pub fn add_score(&mut self, score: u64, timestamp: f64) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }

        let entry = HighScoreEntry { score, timestamp };
        let rank = match self.entries.iter().position(|e| score > e.score) {
            Some(i) => {
                self.entries.insert(i, entry);
                i + 1
            }
            None => {
                self.entries.push(entry);
                self.entries.len()
            }
        };
        self.entries.truncate(MAX_HIGH_SCORES);

        Some(rank)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_table() {
        let scores = HighScores::new();
        assert_eq!(scores.best(), 0);
        assert!(!scores.qualifies(0));
        assert!(scores.is_new_best(1));
        assert!(!scores.is_new_best(0));
    }

    #[test]
    fn test_ranks_descending() {
        let mut scores = HighScores::new();
        assert_eq!(scores.add_score(50, 1.0), Some(1));
        assert_eq!(scores.add_score(80, 2.0), Some(1));
        assert_eq!(scores.add_score(60, 3.0), Some(2));
        assert_eq!(scores.add_score(50, 4.0), Some(4));
        let ordered: Vec<u64> = scores.entries.iter().map(|e| e.score).collect();
        assert_eq!(ordered, vec![80, 60, 50, 50]);
        assert_eq!(scores.best(), 80);
        assert!(!scores.is_new_best(80));
    }

    #[test]
    fn test_table_is_capped() {
        let mut scores = HighScores::new();
        for s in 1..=MAX_HIGH_SCORES as u64 {
            scores.add_score(s * 10, 0.0);
        }
        assert!(!scores.qualifies(10));
        assert_eq!(scores.add_score(5, 0.0), None);
        assert_eq!(scores.add_score(15, 0.0), Some(MAX_HIGH_SCORES));
        assert_eq!(scores.entries.len(), MAX_HIGH_SCORES);
        assert_eq!(scores.entries.last().unwrap().score, 15);
    }
}
