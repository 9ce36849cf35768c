//! JSON leaderboard files in one directory
//!
//! One board per character and difficulty plus a global board. Reads never
//! fail: a missing or damaged file is treated as an empty board.

use std::fs;
use std::path::{Path, PathBuf};

use crate::core::config::{Character, Difficulty, ShiftConfig};
use crate::core::error::Result;
use crate::leaderboard::entry::{Leaderboard, LeaderboardEntry};
use crate::simulation::state::FinalStats;

/// Which board to show
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaderboardFilter {
    /// The global board
    All,
    /// This character at this difficulty
    Character,
    /// Every character at this difficulty
    Difficulty,
}

/// Today's date in the stored format
pub fn today() -> String {
    chrono::Local::now().format("%Y-%m-%d").to_string()
}

#[derive(Debug, Clone)]
pub struct LeaderboardStore {
    dir: PathBuf,
    category_cap: usize,
    global_cap: usize,
}

impl LeaderboardStore {
    pub fn new(dir: impl Into<PathBuf>, config: &ShiftConfig) -> Self {
        Self {
            dir: dir.into(),
            category_cap: config.category_cap,
            global_cap: config.global_cap,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn category_path(&self, character: Character, difficulty: Difficulty) -> PathBuf {
        self.dir
            .join(format!("leaderboard_{}_{}.json", character, difficulty))
    }

    pub fn global_path(&self) -> PathBuf {
        self.dir.join("leaderboard_global.json")
    }

    pub fn load_category(&self, character: Character, difficulty: Difficulty) -> Leaderboard {
        load_board(&self.category_path(character, difficulty), self.category_cap)
    }

    pub fn load_global(&self) -> Leaderboard {
        load_board(&self.global_path(), self.global_cap)
    }

    /// Add a finished shift to its category board and the global board
    pub fn record(&self, stats: &FinalStats, date: &str) -> Result<LeaderboardEntry> {
        let entry = LeaderboardEntry::from_stats(stats, date);

        let mut category = self.load_category(stats.character, stats.difficulty);
        category.push(entry.clone());
        save_board(&self.category_path(stats.character, stats.difficulty), &category)?;

        let mut global = self.load_global();
        global.push(entry.clone().with_character(stats.character));
        save_board(&self.global_path(), &global)?;

        tracing::info!(
            "Recorded score {} for {} on {}",
            entry.score,
            entry.name,
            stats.difficulty
        );
        Ok(entry)
    }

    /// Ranked entries for display, at most `category_cap` of them
    pub fn view(
        &self,
        filter: LeaderboardFilter,
        character: Character,
        difficulty: Difficulty,
    ) -> Vec<LeaderboardEntry> {
        let board = match filter {
            LeaderboardFilter::All => self.load_global(),
            LeaderboardFilter::Character => self.load_category(character, difficulty),
            LeaderboardFilter::Difficulty => {
                let merged = Character::all()
                    .into_iter()
                    .flat_map(|c| {
                        self.load_category(c, difficulty)
                            .into_entries()
                            .into_iter()
                            .map(move |e| e.with_character(c))
                    })
                    .collect();
                Leaderboard::from_entries(merged, self.category_cap)
            }
        };

        let mut entries = board.into_entries();
        entries.truncate(self.category_cap);
        entries
    }
}

fn load_board(path: &Path, cap: usize) -> Leaderboard {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Leaderboard::new(cap),
        Err(e) => {
            tracing::warn!("Could not read leaderboard {}: {}", path.display(), e);
            return Leaderboard::new(cap);
        }
    };
    match serde_json::from_str::<Vec<LeaderboardEntry>>(&content) {
        Ok(entries) => Leaderboard::from_entries(entries, cap),
        Err(e) => {
            tracing::warn!("Ignoring corrupt leaderboard {}: {}", path.display(), e);
            Leaderboard::new(cap)
        }
    }
}

fn save_board(path: &Path, board: &Leaderboard) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, serde_json::to_string_pretty(board.entries())?)?;
    Ok(())
}
