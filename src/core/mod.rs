pub mod config;
pub mod error;
pub mod types;

pub use config::{Character, CharacterAbilities, Difficulty, DifficultySettings, ShiftConfig};
pub use error::{Result, TriageError};
pub use types::{BedId, PatientId, Priority, SimTime, StaffId, MILLIS_PER_SECOND};
