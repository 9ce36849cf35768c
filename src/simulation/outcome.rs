//! Treatment outcome resolution
//!
//! When a treatment timer fires the staff member is freed and the patient
//! survives or dies. The bed keeps showing the result; it is not recycled.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::core::config::ShiftConfig;
use crate::core::types::{BedId, Priority, SimTime, StaffId};
use crate::simulation::state::{ShiftState, TreatedPatient, TreatmentOutcome};

/// Result of one completed treatment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreatmentResult {
    pub bed: BedId,
    pub patient_name: String,
    pub staff: Option<StaffId>,
    pub survived: bool,
    pub points: i64,
}

/// Survives iff `roll` exceeds `actual * 0.1`
pub fn survives(actual: Priority, roll: f64) -> bool {
    roll > actual.level() as f64 * 0.1
}

/// Resolve the treatment in `bed`
///
/// Returns None when the bed no longer holds a patient under treatment,
/// e.g. a dilemma freed it before the timer fired.
pub fn resolve_treatment<R: Rng + ?Sized>(
    state: &mut ShiftState,
    config: &ShiftConfig,
    bed: BedId,
    now: SimTime,
    rng: &mut R,
) -> Option<TreatmentResult> {
    let actual = state.ward.get(bed)?.occupancy()?.patient.actual_priority;
    let survived = survives(actual, rng.gen());
    let occupancy = state.ward.conclude(bed, survived)?;

    if let Some(staff) = occupancy.staff {
        state.staff.set_available(staff, true);
    }

    let points = if survived {
        state.saved_count += 1;
        config.survival_points
    } else {
        state.lost_count += 1;
        -config.death_penalty
    };
    state.score += points;

    let result = TreatmentResult {
        bed,
        patient_name: occupancy.patient.name.clone(),
        staff: occupancy.staff,
        survived,
        points,
    };

    state.treated.push(TreatedPatient {
        patient: occupancy.patient,
        bed,
        outcome: if survived {
            TreatmentOutcome::Survived
        } else {
            TreatmentOutcome::Died
        },
        resolved_at: now,
    });

    Some(result)
}
