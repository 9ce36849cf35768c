use thiserror::Error;

use crate::core::types::{PatientId, StaffId};

#[derive(Error, Debug)]
pub enum TriageError {
    #[error("Please select a patient first.")]
    NoPatientSelected,

    #[error("Patient not found: {0}. Please select a patient from the waiting room.")]
    PatientNotFound(PatientId),

    #[error("Please assign a priority level first.")]
    PriorityNotAssigned,

    #[error("Invalid priority {0}: must be between 1 and 5")]
    InvalidPriority(u8),

    #[error("Please select a staff member.")]
    NoStaffSelected,

    #[error("Staff member not found: {0:?}")]
    StaffNotFound(StaffId),

    #[error("{0} is already treating a patient")]
    StaffUnavailable(String),

    #[error("All beds are occupied! No more patients can be treated.")]
    NoEmptyBed,

    #[error("A dilemma is waiting for a decision")]
    DilemmaPending,

    #[error("No dilemma is active")]
    NoDilemmaActive,

    #[error("Invalid dilemma choice {choice}: scenario has {available} choices")]
    InvalidChoice { choice: usize, available: usize },

    #[error("The shift is over")]
    ShiftOver,

    #[error("Unknown difficulty: {0} (expected easy, medium or hard)")]
    UnknownDifficulty(String),

    #[error("Unknown character: {0} (expected veteran, empath, efficient or resourceful)")]
    UnknownCharacter(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),
}

impl TriageError {
    /// True for player-facing validation rejections that leave state unchanged
    pub fn is_rejection(&self) -> bool {
        !matches!(
            self,
            TriageError::InvalidConfig(_)
                | TriageError::IoError(_)
                | TriageError::SerdeError(_)
                | TriageError::TomlError(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, TriageError>;
