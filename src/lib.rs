//! Triage Shift - emergency department triage simulation
//!
//! Patients arrive with hidden conditions, the player triages them and puts
//! them into beds with staff, and the shift is scored on triage accuracy and
//! survival while dilemmas force hard choices.

pub mod core;
pub mod hospital;
pub mod leaderboard;
pub mod simulation;
pub mod triage;
