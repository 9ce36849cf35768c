//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for patients
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PatientId(pub Uuid);

impl PatientId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PatientId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PatientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Staff identifier, assigned sequentially when the roster is built
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StaffId(pub u32);

/// Bed slot index (0-based; displayed 1-based)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BedId(pub usize);

impl fmt::Display for BedId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Bed {}", self.0 + 1)
    }
}

/// Simulated time in milliseconds since the shift started
pub type SimTime = u64;

pub const MILLIS_PER_SECOND: SimTime = 1000;

/// Triage priority, 1 (minor) to 5 (critical)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Priority(u8);

impl Priority {
    pub const MINOR: Priority = Priority(1);
    pub const STABLE: Priority = Priority(2);
    pub const SERIOUS: Priority = Priority(3);
    pub const URGENT: Priority = Priority(4);
    pub const CRITICAL: Priority = Priority(5);

    /// Returns None outside 1..=5
    pub fn new(level: u8) -> Option<Self> {
        (1..=5).contains(&level).then_some(Self(level))
    }

    pub fn level(self) -> u8 {
        self.0
    }

    /// One level worse, saturating at critical
    pub fn escalated(self) -> Self {
        Self((self.0 + 1).min(5))
    }

    /// Absolute distance between two priorities
    pub fn distance(self, other: Priority) -> u8 {
        self.0.abs_diff(other.0)
    }

    pub fn label(self) -> &'static str {
        match self.0 {
            5 => "CRITICAL",
            4 => "URGENT",
            3 => "SERIOUS",
            2 => "STABLE",
            _ => "MINOR",
        }
    }

    pub fn all() -> impl Iterator<Item = Priority> {
        (1..=5).map(Priority)
    }
}

impl TryFrom<u8> for Priority {
    type Error = String;

    fn try_from(level: u8) -> Result<Self, Self::Error> {
        Priority::new(level).ok_or_else(|| format!("priority {} outside 1..=5", level))
    }
}

impl From<Priority> for u8 {
    fn from(priority: Priority) -> u8 {
        priority.0
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.0, self.label())
    }
}
