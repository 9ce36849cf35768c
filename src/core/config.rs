//! Shift configuration with documented constants
//!
//! Difficulty and character tables are fixed enumerations; the tunable
//! numbers that shape scoring and pacing live in `ShiftConfig`, which can be
//! overridden from a TOML file.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::core::error::{Result, TriageError};

/// Difficulty selected before the shift starts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

/// Per-difficulty shift parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DifficultySettings {
    /// Patient generation period, in units of `ShiftConfig::generation_unit_secs`
    pub patient_rate: u32,
    pub starting_budget: u32,
    pub staff_count: u32,
    pub shift_seconds: u32,
}

impl Difficulty {
    pub fn settings(&self) -> DifficultySettings {
        match self {
            Self::Easy => DifficultySettings {
                patient_rate: 3,
                starting_budget: 7000,
                staff_count: 12,
                shift_seconds: 300,
            },
            Self::Medium => DifficultySettings {
                patient_rate: 2,
                starting_budget: 5000,
                staff_count: 10,
                shift_seconds: 180,
            },
            Self::Hard => DifficultySettings {
                patient_rate: 1,
                starting_budget: 3000,
                staff_count: 8,
                shift_seconds: 60,
            },
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        }
    }

    pub fn all() -> [Difficulty; 3] {
        [Self::Easy, Self::Medium, Self::Hard]
    }
}

impl FromStr for Difficulty {
    type Err = TriageError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Self::Easy),
            "medium" => Ok(Self::Medium),
            "hard" => Ok(Self::Hard),
            other => Err(TriageError::UnknownDifficulty(other.to_string())),
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Playable character, each with one bonus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Character {
    Veteran,
    Empath,
    Efficient,
    Resourceful,
}

/// Bonuses granted by a character
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CharacterAbilities {
    pub name: &'static str,
    /// Fractional bonus on accurate-triage points
    pub diagnosis_bonus: f64,
    /// Fractional extension of the shift length
    pub speed_bonus: f64,
    /// Fractional reduction of patient deterioration
    pub comfort_bonus: f64,
    pub extra_beds: u32,
}

impl Character {
    pub fn abilities(&self) -> CharacterAbilities {
        match self {
            Self::Veteran => CharacterAbilities {
                name: "Dr. Saniel",
                diagnosis_bonus: 0.1,
                speed_bonus: 0.0,
                comfort_bonus: 0.0,
                extra_beds: 0,
            },
            Self::Empath => CharacterAbilities {
                name: "Nurse Ihris",
                diagnosis_bonus: 0.0,
                speed_bonus: 0.0,
                comfort_bonus: 0.15,
                extra_beds: 0,
            },
            Self::Efficient => CharacterAbilities {
                name: "Dr. Dunny",
                diagnosis_bonus: 0.0,
                speed_bonus: 0.2,
                comfort_bonus: 0.0,
                extra_beds: 0,
            },
            Self::Resourceful => CharacterAbilities {
                name: "Dr. Ssaac",
                diagnosis_bonus: 0.0,
                speed_bonus: 0.0,
                comfort_bonus: 0.0,
                extra_beds: 2,
            },
        }
    }

    pub fn display_name(&self) -> &'static str {
        self.abilities().name
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Veteran => "veteran",
            Self::Empath => "empath",
            Self::Efficient => "efficient",
            Self::Resourceful => "resourceful",
        }
    }

    pub fn all() -> [Character; 4] {
        [Self::Veteran, Self::Empath, Self::Efficient, Self::Resourceful]
    }
}

impl FromStr for Character {
    type Err = TriageError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "veteran" => Ok(Self::Veteran),
            "empath" => Ok(Self::Empath),
            "efficient" => Ok(Self::Efficient),
            "resourceful" => Ok(Self::Resourceful),
            other => Err(TriageError::UnknownCharacter(other.to_string())),
        }
    }
}

impl fmt::Display for Character {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tunable constants for a shift
///
/// Defaults give a three-minute medium shift. Every field has
/// a default so a TOML override may name only the values it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShiftConfig {
    // === WARD ===
    /// Beds available before character bonuses
    pub base_beds: u32,

    /// Waiting room size above which no new patients are generated
    pub queue_capacity: usize,

    /// Patients waiting when the shift opens
    pub initial_patients: usize,

    /// Generation period is `patient_rate * generation_unit_secs`
    ///
    /// At 5s, a hard shift generates a patient every 5s and an easy
    /// shift every 15s.
    pub generation_unit_secs: u32,

    // === DILEMMAS ===
    /// Chance of a dilemma on each successful generation
    pub dilemma_chance: f64,

    /// Dilemmas allowed per shift
    pub max_dilemmas: u32,

    /// Treatment time for synthetic crisis victims
    pub crisis_victim_secs: u32,

    /// Delay before a bed marked deceased by a dilemma clears to empty
    pub deceased_clear_secs: u32,

    // === TREATMENT ===
    /// Treatment takes `(6 - assigned priority) * treatment_secs_per_level`
    /// before staff efficiency and character speed are applied
    pub treatment_secs_per_level: u32,

    /// Treatment time multiplier for the efficient character
    pub efficient_speed_multiplier: f64,

    // === SCORING ===
    /// Base award for a triage within one level of the truth
    pub accurate_points: i64,
    pub inaccurate_penalty: i64,
    pub survival_points: i64,
    pub death_penalty: i64,
    /// Charged per patient still waiting when the shift ends
    pub untriaged_penalty: i64,

    // === LEADERBOARD ===
    pub category_cap: usize,
    pub global_cap: usize,
}

impl Default for ShiftConfig {
    fn default() -> Self {
        Self {
            base_beds: 10,
            queue_capacity: 15,
            initial_patients: 5,
            generation_unit_secs: 5,

            dilemma_chance: 0.05,
            max_dilemmas: 3,
            crisis_victim_secs: 15,
            deceased_clear_secs: 5,

            treatment_secs_per_level: 10,
            efficient_speed_multiplier: 0.8,

            accurate_points: 100,
            inaccurate_penalty: 50,
            survival_points: 200,
            death_penalty: 100,
            untriaged_penalty: 100,

            category_cap: 20,
            global_cap: 50,
        }
    }
}

impl ShiftConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Load and validate a config from a TOML file
    pub fn load_from_toml(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse_toml(&content)
    }

    /// Parse and validate a config from a TOML string
    pub fn parse_toml(content: &str) -> Result<Self> {
        let config: ShiftConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        if self.base_beds == 0 {
            return Err(TriageError::InvalidConfig("base_beds must be positive".into()));
        }

        if self.generation_unit_secs == 0 || self.treatment_secs_per_level == 0 {
            return Err(TriageError::InvalidConfig(
                "generation_unit_secs and treatment_secs_per_level must be positive".into(),
            ));
        }

        if !(0.0..=1.0).contains(&self.dilemma_chance) {
            return Err(TriageError::InvalidConfig(format!(
                "dilemma_chance ({}) must be within 0..=1",
                self.dilemma_chance
            )));
        }

        if self.efficient_speed_multiplier <= 0.0 {
            return Err(TriageError::InvalidConfig(
                "efficient_speed_multiplier must be positive".into(),
            ));
        }

        if self.initial_patients > self.queue_capacity {
            return Err(TriageError::InvalidConfig(format!(
                "initial_patients ({}) exceeds queue_capacity ({})",
                self.initial_patients, self.queue_capacity
            )));
        }

        if self.category_cap == 0 || self.global_cap == 0 {
            return Err(TriageError::InvalidConfig("leaderboard caps must be positive".into()));
        }

        Ok(())
    }

    /// Shift length after the character's speed bonus
    pub fn shift_seconds(&self, difficulty: Difficulty, character: Character) -> u32 {
        let base = difficulty.settings().shift_seconds as f64;
        (base * (1.0 + character.abilities().speed_bonus)).round() as u32
    }

    /// Bed count after the character's extra beds
    pub fn bed_count(&self, character: Character) -> usize {
        (self.base_beds + character.abilities().extra_beds) as usize
    }

    pub fn generation_period_secs(&self, difficulty: Difficulty) -> u32 {
        difficulty.settings().patient_rate * self.generation_unit_secs
    }

    pub fn speed_multiplier(&self, character: Character) -> f64 {
        if character == Character::Efficient {
            self.efficient_speed_multiplier
        } else {
            1.0
        }
    }
}
