//! Triage - conditions, patients and the waiting room

pub mod condition;
pub mod patient;
pub mod queue;

pub use condition::{Condition, ConditionCatalog};
pub use patient::{generate_patient, is_accurate_triage, BloodPressure, Patient, VitalSigns};
pub use queue::{Escalation, TriageQueue};
