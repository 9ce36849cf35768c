//! Notifications for the presentation layer
//!
//! The session buffers these as state changes; a front end drains them and
//! re-renders whatever they mention.

use serde::{Deserialize, Serialize};

use crate::core::types::{BedId, PatientId, Priority, StaffId};
use crate::hospital::BedStatus;
use crate::simulation::state::FinalStats;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ShiftEvent {
    /// Waiting room contents changed; ids in display order
    QueueChanged { patients: Vec<PatientId> },
    PriorityAssigned {
        patient: PatientId,
        priority: Priority,
    },
    PatientAssigned {
        patient: PatientId,
        staff: StaffId,
        bed: BedId,
        accurate: bool,
        treatment_ms: u64,
    },
    BedStateChanged {
        bed: BedId,
        status: BedStatus,
        patient_name: Option<String>,
    },
    TreatmentResolved {
        bed: BedId,
        patient_name: String,
        survived: bool,
    },
    /// A waiting patient's hidden priority escalated
    PatientDeteriorated {
        patient: PatientId,
        from: Priority,
        to: Priority,
    },
    DilemmaRaised { text: String, choices: Vec<String> },
    DilemmaResolved { choice: usize, text: String },
    /// Transient score feedback
    ScoreDelta { amount: i64 },
    ShiftTick { remaining_secs: u32 },
    GameOver { stats: FinalStats },
}
