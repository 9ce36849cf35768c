//! Headless player
//!
//! Drives a shift without a front end: reads vitals to guess a triage level,
//! puts the most urgent-looking patients into beds with whoever is free, and
//! picks dilemma choices at random.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::cmp::Reverse;

use crate::core::types::Priority;
use crate::simulation::session::ShiftSession;
use crate::triage::Patient;

/// Something that can take turns in a shift
pub trait ShiftPlayer {
    /// Make every move currently possible; returns the number of assignments
    fn act(&mut self, session: &mut ShiftSession) -> usize;

    fn name(&self) -> &str;
}

/// Guess a triage level from what is visible on the chart
pub fn estimate_priority(patient: &Patient) -> Priority {
    let vitals = &patient.vital_signs;
    if vitals.is_arrest() {
        Priority::CRITICAL
    } else if vitals.pulse >= 120 || vitals.resp_rate >= 24 {
        Priority::URGENT
    } else if vitals.temperature >= 38.0 {
        Priority::SERIOUS
    } else {
        Priority::STABLE
    }
}

pub struct Autopilot {
    rng: ChaCha8Rng,
}

impl Autopilot {
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl ShiftPlayer for Autopilot {
    fn act(&mut self, session: &mut ShiftSession) -> usize {
        if session.is_over() {
            return 0;
        }

        if let Some(choices) = session.pending_dilemma().map(|d| d.choices.len()) {
            let choice = self.rng.gen_range(0..choices.max(1));
            if let Err(e) = session.resolve_dilemma(choice) {
                tracing::warn!("Autopilot could not resolve dilemma: {}", e);
                return 0;
            }
        }

        let mut assigned = 0;
        loop {
            let state = session.state();
            if state.ward.first_empty().is_none() {
                break;
            }
            let Some(staff) = state.staff.first_available().map(|s| s.id) else {
                break;
            };
            // Most urgent first, ties by arrival
            let Some((patient, estimate)) = state
                .queue
                .iter()
                .map(|p| (p.id, estimate_priority(p)))
                .min_by_key(|(_, estimate)| Reverse(*estimate))
            else {
                break;
            };

            if session.assign_priority(patient, estimate.level()).is_err() {
                break;
            }
            match session.request_assignment(patient, staff) {
                Ok(_) => assigned += 1,
                Err(_) => break,
            }
        }
        assigned
    }

    fn name(&self) -> &str {
        "autopilot"
    }
}
