//! Bed and staff allocation
//!
//! Moves a triaged patient from the waiting room into the first empty bed
//! with an idle staff member, and scores the triage at that moment.

use serde::{Deserialize, Serialize};

use crate::core::config::{Character, ShiftConfig};
use crate::core::error::{Result, TriageError};
use crate::core::types::{BedId, PatientId, Priority, SimTime, StaffId, MILLIS_PER_SECOND};
use crate::hospital::Occupancy;
use crate::simulation::state::ShiftState;

/// A successful bed assignment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub patient: PatientId,
    pub staff: StaffId,
    pub bed: BedId,
    pub accurate: bool,
    /// Score change awarded for the triage
    pub points: i64,
    /// Time until treatment completes
    pub treatment_ms: SimTime,
}

/// `(6 - assigned) * secs_per_level`, scaled by staff efficiency and the
/// efficient character's speed multiplier
pub fn treatment_duration_ms(
    config: &ShiftConfig,
    assigned: Priority,
    efficiency: f64,
    character: Character,
) -> SimTime {
    let levels = (6 - assigned.level()) as f64;
    let base_ms = levels * config.treatment_secs_per_level as f64 * MILLIS_PER_SECOND as f64;
    (base_ms * efficiency * config.speed_multiplier(character)).round() as SimTime
}

/// Points for an assessment: bonus-scaled award if accurate, flat penalty if not
pub fn triage_points(config: &ShiftConfig, accurate: bool, character: Character) -> i64 {
    if accurate {
        let bonus = character.abilities().diagnosis_bonus;
        (config.accurate_points as f64 * (1.0 + bonus)).round() as i64
    } else {
        -config.inaccurate_penalty
    }
}

/// Check every precondition without touching state
fn validate(
    state: &ShiftState,
    patient: Option<PatientId>,
    staff: Option<StaffId>,
) -> Result<(PatientId, Priority, StaffId, BedId)> {
    let patient_id = patient.ok_or(TriageError::NoPatientSelected)?;
    let patient = state
        .queue
        .get(patient_id)
        .ok_or(TriageError::PatientNotFound(patient_id))?;
    let assigned = patient
        .assigned_priority
        .ok_or(TriageError::PriorityNotAssigned)?;

    let staff_id = staff.ok_or(TriageError::NoStaffSelected)?;
    let member = state
        .staff
        .get(staff_id)
        .ok_or(TriageError::StaffNotFound(staff_id))?;
    if !member.available || state.ward.is_staff_bound(staff_id) {
        return Err(TriageError::StaffUnavailable(member.name.clone()));
    }

    let bed = state.ward.first_empty().ok_or(TriageError::NoEmptyBed)?;
    Ok((patient_id, assigned, staff_id, bed))
}

/// Assign a queued patient and a staff member to the first empty bed
///
/// On rejection nothing changes. On success the patient leaves the queue,
/// the staff member becomes unavailable, the bed is occupied and the triage
/// is scored. Scheduling the completion is left to the caller.
pub fn assign_patient_to_bed(
    state: &mut ShiftState,
    config: &ShiftConfig,
    patient: Option<PatientId>,
    staff: Option<StaffId>,
    now: SimTime,
) -> Result<Assignment> {
    let (patient_id, assigned, staff_id, bed) = validate(state, patient, staff)?;

    let efficiency = state.staff.get(staff_id).map(|s| s.efficiency).unwrap_or(1.0);
    let patient = state
        .queue
        .dequeue(patient_id)
        .ok_or(TriageError::PatientNotFound(patient_id))?;
    let accurate = patient.was_accurately_triaged.unwrap_or(false);

    state.ward.admit(
        bed,
        Occupancy {
            patient,
            staff: Some(staff_id),
            assigned_priority: assigned,
            admitted_at: now,
        },
    )?;
    state.staff.set_available(staff_id, false);

    let points = triage_points(config, accurate, state.character);
    state.score += points;
    state.total_assessments += 1;
    if accurate {
        state.accuracy_count += 1;
    }
    if state.selected_patient == Some(patient_id) {
        state.selected_patient = None;
    }

    Ok(Assignment {
        patient: patient_id,
        staff: staff_id,
        bed,
        accurate,
        points,
        treatment_ms: treatment_duration_ms(config, assigned, efficiency, state.character),
    })
}
