//! Leaderboard records and ranked boards

use serde::{Deserialize, Serialize};

use crate::core::config::{Character, Difficulty};
use crate::simulation::state::FinalStats;

/// One finished shift as stored on disk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    /// Display name of the character played
    pub name: String,
    pub score: i64,
    pub saved: u32,
    pub lost: u32,
    /// Rounded percentage
    pub accuracy: u8,
    pub difficulty: Difficulty,
    /// `%Y-%m-%d`
    pub date: String,
    /// Only set on global and merged entries
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub character: Option<Character>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub character_name: Option<String>,
}

impl LeaderboardEntry {
    /// Entry for the character/difficulty board
    pub fn from_stats(stats: &FinalStats, date: &str) -> Self {
        Self {
            name: stats.character.display_name().to_string(),
            score: stats.score,
            saved: stats.saved,
            lost: stats.lost,
            accuracy: stats.accuracy,
            difficulty: stats.difficulty,
            date: date.to_string(),
            character: None,
            character_name: None,
        }
    }

    /// Same entry tagged with who played it
    pub fn with_character(mut self, character: Character) -> Self {
        self.character = Some(character);
        self.character_name = Some(character.display_name().to_string());
        self
    }
}

/// Entries ranked by score, highest first, capped at `cap`
#[derive(Debug, Clone, PartialEq)]
pub struct Leaderboard {
    entries: Vec<LeaderboardEntry>,
    cap: usize,
}

impl Leaderboard {
    pub fn new(cap: usize) -> Self {
        Self {
            entries: Vec::new(),
            cap,
        }
    }

    /// Rank and cap an arbitrary list
    pub fn from_entries(entries: Vec<LeaderboardEntry>, cap: usize) -> Self {
        let mut board = Self { entries, cap };
        board.rank();
        board
    }

    /// Add an entry, keeping only the top `cap`
    ///
    /// Ties keep insertion order, so an older score stays ahead of a newer
    /// equal one.
    pub fn push(&mut self, entry: LeaderboardEntry) {
        self.entries.push(entry);
        self.rank();
    }

    fn rank(&mut self) {
        self.entries.sort_by(|a, b| b.score.cmp(&a.score));
        self.entries.truncate(self.cap);
    }

    pub fn entries(&self) -> &[LeaderboardEntry] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<LeaderboardEntry> {
        self.entries
    }

    pub fn cap(&self) -> usize {
        self.cap
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
