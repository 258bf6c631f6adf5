//! High score leaderboard
//!
//! Persisted through a [`KeyValueStore`], tracks the top 5 scores.

use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::persistence::{self, KeyValueStore};

/// Maximum number of high scores to keep
pub const MAX_HIGH_SCORES: usize = 5;

/// Initials length
pub const NAME_LEN: usize = 3;

/// Used when the player enters nothing
pub const DEFAULT_NAME: &str = "AAA";

/// A single high score entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    /// Player initials
    pub name: String,
    pub score: u64,
}

/// High score leaderboard, sorted by score descending
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct HighScores {
    pub entries: Vec<HighScoreEntry>,
}

/// Upper-case and trim to three characters; empty becomes "AAA"
pub fn normalize_name(name: &str) -> String {
    let name: String = name.trim().chars().take(NAME_LEN).collect::<String>().to_uppercase();
    if name.is_empty() {
        DEFAULT_NAME.to_string()
    } else {
        name
    }
}

impl HighScores {
    /// Storage key
    pub const STORAGE_KEY: &'static str = "highscores";

    /// Create empty leaderboard
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Check if a score qualifies for the leaderboard
    pub fn qualifies(&self, score: u64) -> bool {
        if self.entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        // Check if score beats the lowest entry
        self.entries.last().map(|e| score > e.score).unwrap_or(true)
    }

    /// Add a score; returns the rank achieved (1-indexed) or None if it
    /// didn't qualify
    pub fn add_score(&mut self, name: &str, score: u64) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }

        let entry = HighScoreEntry {
            name: normalize_name(name),
            score,
        };

        // Ties go below existing entries
        let pos = self
            .entries
            .iter()
            .position(|e| score > e.score)
            .unwrap_or(self.entries.len());
        self.entries.insert(pos, entry);
        self.entries.truncate(MAX_HIGH_SCORES);

        Some(pos + 1)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get the top score (if any)
    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }

    /// Load high scores, starting fresh when missing or unreadable
    pub fn load(store: &dyn KeyValueStore) -> Self {
        match persistence::load::<HighScores>(store, Self::STORAGE_KEY) {
            Ok(Some(mut scores)) => {
                scores.entries.sort_by(|a, b| b.score.cmp(&a.score));
                scores.entries.truncate(MAX_HIGH_SCORES);
                log::info!("Loaded {} high scores", scores.entries.len());
                scores
            }
            Ok(None) => {
                log::info!("No high scores found, starting fresh");
                Self::new()
            }
            Err(err) => {
                log::warn!("Discarding stored high scores: {}", err);
                Self::new()
            }
        }
    }

    pub fn save(&self, store: &mut dyn KeyValueStore) -> Result<(), StoreError> {
        persistence::save(store, Self::STORAGE_KEY, self)?;
        log::info!("High scores saved ({} entries)", self.entries.len());
        Ok(())
    }
}
