//! Shift simulation - timers, allocation, outcomes, dilemmas and the clock

pub mod allocation;
pub mod autopilot;
pub mod clock;
pub mod dilemma;
pub mod events;
pub mod outcome;
pub mod scheduler;
pub mod session;
pub mod state;

pub use allocation::{assign_patient_to_bed, treatment_duration_ms, triage_points, Assignment};
pub use autopilot::{estimate_priority, Autopilot, ShiftPlayer};
pub use clock::{finalize_shift, tick_clock, ClockTick};
pub use dilemma::{
    BedRelease, ChoiceEffect, Consequence, DilemmaChoice, DilemmaDeck, DilemmaEngine,
    DilemmaOutcome, DilemmaScenario, FreedBed,
};
pub use events::ShiftEvent;
pub use outcome::{resolve_treatment, survives, TreatmentResult};
pub use scheduler::{Scheduler, Task, TimerId};
pub use session::ShiftSession;
pub use state::{FinalStats, ShiftState, TreatedPatient, TreatmentOutcome};
