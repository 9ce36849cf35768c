//! Condition catalog - the weighted table patients are drawn from
//!
//! Selection walks the catalog in order, so the same roll always picks the
//! same condition for a given catalog.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::core::error::{Result, TriageError};
use crate::core::types::Priority;

/// A medical condition a patient can present with
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub name: String,
    /// Ground-truth triage priority
    pub severity: Priority,
    pub symptoms: Vec<String>,
    /// Relative frequency weight
    pub frequency: u32,
}

impl Condition {
    pub fn new(name: &str, severity: u8, symptoms: [&str; 3], frequency: u32) -> Self {
        Self {
            name: name.to_string(),
            severity: Priority::new(severity).unwrap_or(Priority::CRITICAL),
            symptoms: symptoms.iter().map(|s| s.to_string()).collect(),
            frequency,
        }
    }
}

/// Ordered, weighted catalog of conditions
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionCatalog {
    conditions: Vec<Condition>,
    total_weight: u32,
}

impl ConditionCatalog {
    /// Build a catalog; rejects an empty table and zero weights
    pub fn new(conditions: Vec<Condition>) -> Result<Self> {
        if conditions.is_empty() {
            return Err(TriageError::InvalidConfig("condition catalog is empty".into()));
        }
        if let Some(bad) = conditions.iter().find(|c| c.frequency == 0) {
            return Err(TriageError::InvalidConfig(format!(
                "condition '{}' has zero frequency",
                bad.name
            )));
        }
        let total_weight = conditions.iter().map(|c| c.frequency).sum();
        Ok(Self { conditions, total_weight })
    }

    /// The emergency department's standard case mix
    pub fn with_defaults() -> Self {
        let conditions = vec![
            Condition::new("Cardiac arrest", 5, ["No pulse", "Not breathing", "Unconscious"], 2),
            Condition::new("Severe trauma", 5, ["Heavy bleeding", "Multiple injuries", "Shock"], 3),
            Condition::new("Stroke", 5, ["Facial drooping", "Arm weakness", "Speech difficulty"], 3),
            Condition::new("Respiratory failure", 5, ["Can't breathe", "Blue lips", "Gasping"], 2),
            Condition::new("Anaphylactic shock", 5, ["Swelling", "Hives", "Difficulty breathing"], 2),
            Condition::new("Heart attack", 4, ["Chest pain", "Shortness of breath", "Sweating"], 4),
            Condition::new("Severe burns", 4, ["Third-degree burns", "Large area affected", "Pain"], 3),
            Condition::new("Head injury", 4, ["Confusion", "Vomiting", "Loss of consciousness"], 4),
            Condition::new("Sepsis", 4, ["High fever", "Rapid heart rate", "Confusion"], 3),
            Condition::new("Diabetic emergency", 4, ["Unconscious", "Sweet breath", "Sweating"], 4),
            Condition::new("Severe asthma", 3, ["Wheezing", "Can't speak full sentences", "Anxiety"], 5),
            Condition::new("Broken bones", 3, ["Visible deformity", "Severe pain", "Can't move limb"], 6),
            Condition::new("Kidney stones", 3, ["Severe back pain", "Blood in urine", "Nausea"], 5),
            Condition::new("Severe dehydration", 3, ["Dizziness", "Rapid heartbeat", "No urination"], 5),
            Condition::new("High fever", 3, ["Temperature 103°F+", "Chills", "Weakness"], 6),
            Condition::new("Moderate laceration", 2, ["Deep cut", "Bleeding controlled", "Needs stitches"], 7),
            Condition::new("Migraine", 2, ["Severe headache", "Light sensitivity", "Nausea"], 8),
            Condition::new("Food poisoning", 2, ["Vomiting", "Diarrhea", "Stomach cramps"], 8),
            Condition::new("Sprained ankle", 1, ["Swelling", "Pain when walking", "Bruising"], 10),
            Condition::new("Common cold", 1, ["Runny nose", "Cough", "Mild fever"], 10),
        ];
        let total_weight = conditions.iter().map(|c| c.frequency).sum();
        Self { conditions, total_weight }
    }

    pub fn all(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn get(&self, name: &str) -> Option<&Condition> {
        self.conditions.iter().find(|c| c.name == name)
    }

    pub fn total_weight(&self) -> u32 {
        self.total_weight
    }

    /// Pick the first condition whose cumulative weight reaches `roll`
    ///
    /// `roll` is expected in `[0, total_weight)`; anything past the end
    /// resolves to the last condition.
    pub fn select(&self, roll: f64) -> &Condition {
        let mut remaining = roll;
        for condition in &self.conditions {
            remaining -= condition.frequency as f64;
            if remaining <= 0.0 {
                return condition;
            }
        }
        // Non-empty by construction
        &self.conditions[self.conditions.len() - 1]
    }

    /// Frequency-weighted random draw
    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> &Condition {
        let roll = rng.gen::<f64>() * self.total_weight as f64;
        self.select(roll)
    }

    /// Load a catalog from a TOML file
    pub fn load_from_toml(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse_toml(&content)
    }

    /// Parse a catalog from a TOML string of `[[conditions]]` tables
    pub fn parse_toml(content: &str) -> Result<Self> {
        let toml_data: TomlConditions = toml::from_str(content)?;
        Self::new(toml_data.conditions)
    }
}

impl Default for ConditionCatalog {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// TOML representation of a conditions file
#[derive(Debug, Deserialize)]
struct TomlConditions {
    conditions: Vec<Condition>,
}
