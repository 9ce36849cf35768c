//! Patients and the patient generator

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::types::{PatientId, Priority, SimTime, MILLIS_PER_SECOND};
use crate::triage::condition::ConditionCatalog;

const FIRST_NAMES: [&str; 8] = ["John", "Jane", "Mike", "Sarah", "David", "Lisa", "Robert", "Mary"];
const LAST_NAMES: [&str; 6] = ["Smith", "Johnson", "Williams", "Brown", "Jones", "Garcia"];

/// Per-tick escalation chance for severity 4 and 5 arrivals
pub const SEVERE_DETERIORATION_RATE: f64 = 0.001;
/// Per-tick escalation chance for everyone else
pub const MILD_DETERIORATION_RATE: f64 = 0.0001;

/// Systolic/diastolic pair, displayed as "120/80"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BloodPressure {
    pub systolic: u32,
    pub diastolic: u32,
}

impl fmt::Display for BloodPressure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.systolic, self.diastolic)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VitalSigns {
    /// Beats per minute
    pub pulse: u32,
    pub blood_pressure: BloodPressure,
    /// Degrees Celsius
    pub temperature: f32,
    /// Breaths per minute
    pub resp_rate: u32,
}

impl VitalSigns {
    /// Randomised vitals; severity 4 is abnormal, severity 5 is arrest
    pub fn generate<R: Rng + ?Sized>(severity: Priority, rng: &mut R) -> Self {
        let mut vitals = Self {
            pulse: rng.gen_range(60..100),
            blood_pressure: BloodPressure {
                systolic: rng.gen_range(110..150),
                diastolic: rng.gen_range(70..90),
            },
            temperature: 36.5 + rng.gen::<f32>() * 2.0,
            resp_rate: rng.gen_range(12..20),
        };

        if severity == Priority::CRITICAL {
            vitals.pulse = 0;
            vitals.blood_pressure = BloodPressure { systolic: 0, diastolic: 0 };
            vitals.resp_rate = 0;
        } else if severity >= Priority::URGENT {
            vitals.pulse = rng.gen_range(120..160);
            vitals.blood_pressure = BloodPressure {
                systolic: rng.gen_range(80..100),
                diastolic: rng.gen_range(40..60),
            };
            vitals.resp_rate = rng.gen_range(24..36);
        }

        vitals
    }

    /// Code/arrest state: no pulse, no pressure, no breathing
    pub fn is_arrest(&self) -> bool {
        self.pulse == 0 && self.resp_rate == 0
    }
}

/// A patient from arrival until the end of treatment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    pub id: PatientId,
    pub name: String,
    pub age: u32,
    pub condition: String,
    /// Ground truth, hidden from the player; only ever escalates
    pub actual_priority: Priority,
    pub symptoms: Vec<String>,
    pub arrival_time: SimTime,
    pub vital_signs: VitalSigns,
    /// Chance per clock tick that `actual_priority` escalates by one
    pub deterioration_rate: f64,
    /// 0.0..1.0, scales deterioration down
    pub comfort_level: f64,
    pub assigned_priority: Option<Priority>,
    pub was_accurately_triaged: Option<bool>,
}

impl Patient {
    /// Synthetic critical arrival injected by a mass-casualty dilemma
    pub fn crisis_victim(number: usize, now: SimTime) -> Self {
        Self {
            id: PatientId::new(),
            name: format!("Accident Victim {}", number),
            age: 18,
            condition: "Multiple trauma".to_string(),
            actual_priority: Priority::CRITICAL,
            symptoms: vec!["Critical condition".to_string()],
            arrival_time: now,
            vital_signs: VitalSigns {
                pulse: 0,
                blood_pressure: BloodPressure { systolic: 0, diastolic: 0 },
                temperature: 36.5,
                resp_rate: 0,
            },
            deterioration_rate: SEVERE_DETERIORATION_RATE,
            comfort_level: 0.0,
            assigned_priority: Some(Priority::CRITICAL),
            was_accurately_triaged: Some(true),
        }
    }

    /// Record the player's priority and derive accuracy against the truth
    pub fn assign_priority(&mut self, priority: Priority) {
        self.assigned_priority = Some(priority);
        self.was_accurately_triaged = Some(is_accurate_triage(self.actual_priority, priority));
    }

    /// Effective per-tick escalation chance after comfort
    pub fn adjusted_deterioration_rate(&self) -> f64 {
        self.deterioration_rate * (1.0 - self.comfort_level)
    }

    /// Escalate one level if `roll` falls under the adjusted rate
    ///
    /// Returns true when the priority actually rose.
    pub fn deteriorate(&mut self, roll: f64) -> bool {
        if roll < self.adjusted_deterioration_rate() {
            let before = self.actual_priority;
            self.actual_priority = before.escalated();
            return self.actual_priority != before;
        }
        false
    }

    /// Whole seconds spent waiting since arrival
    pub fn waited_secs(&self, now: SimTime) -> u64 {
        now.saturating_sub(self.arrival_time) / MILLIS_PER_SECOND
    }

    /// The complaint shown on the waiting-room card
    pub fn chief_complaint(&self) -> &str {
        self.symptoms.first().map(String::as_str).unwrap_or("Unknown")
    }
}

/// Accurate when the assigned priority is within one level of the truth
pub fn is_accurate_triage(actual: Priority, assigned: Priority) -> bool {
    actual.distance(assigned) <= 1
}

/// Draws a condition from the catalog and builds a fresh patient
pub fn generate_patient<R: Rng + ?Sized>(
    catalog: &ConditionCatalog,
    comfort_bonus: f64,
    now: SimTime,
    rng: &mut R,
) -> Patient {
    let condition = catalog.draw(rng);
    let first = FIRST_NAMES.choose(rng).copied().unwrap_or("John");
    let last = LAST_NAMES.choose(rng).copied().unwrap_or("Smith");
    let severity = condition.severity;

    Patient {
        id: PatientId::new(),
        name: format!("{} {}", first, last),
        age: 18 + rng.gen_range(0..70),
        condition: condition.name.clone(),
        actual_priority: severity,
        symptoms: condition.symptoms.clone(),
        arrival_time: now,
        vital_signs: VitalSigns::generate(severity, rng),
        deterioration_rate: if severity >= Priority::URGENT {
            SEVERE_DETERIORATION_RATE
        } else {
            MILD_DETERIORATION_RATE
        },
        comfort_level: comfort_bonus,
        assigned_priority: None,
        was_accurately_triaged: None,
    }
}
