//! Waiting room - patients held until a bed is assigned
//!
//! Order is arrival order, used for display and generation. The player may
//! pick any entry for treatment.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::core::error::{Result, TriageError};
use crate::core::types::{PatientId, Priority};
use crate::triage::patient::Patient;

/// Escalation caused by one deterioration pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Escalation {
    pub patient: PatientId,
    pub from: Priority,
    pub to: Priority,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TriageQueue {
    patients: Vec<Patient>,
    /// Generation is suppressed at or above this size
    capacity: usize,
}

impl TriageQueue {
    pub fn new(capacity: usize) -> Self {
        Self {
            patients: Vec::new(),
            capacity,
        }
    }

    pub fn len(&self) -> usize {
        self.patients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patients.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// True when the generator should hold off
    pub fn is_full(&self) -> bool {
        self.patients.len() >= self.capacity
    }

    /// Append to the end of the queue
    ///
    /// The cap is soft: it gates generation, not admission.
    pub fn enqueue(&mut self, patient: Patient) -> PatientId {
        let id = patient.id;
        self.patients.push(patient);
        id
    }

    pub fn get(&self, id: PatientId) -> Option<&Patient> {
        self.patients.iter().find(|p| p.id == id)
    }

    pub fn contains(&self, id: PatientId) -> bool {
        self.get(id).is_some()
    }

    /// Record the player's priority; scoring waits for bed assignment
    pub fn assign_priority(&mut self, id: PatientId, priority: Priority) -> Result<&Patient> {
        let patient = self
            .patients
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(TriageError::PatientNotFound(id))?;
        patient.assign_priority(priority);
        Ok(patient)
    }

    /// Remove and return a patient wherever it sits in the queue
    pub fn dequeue(&mut self, id: PatientId) -> Option<Patient> {
        let index = self.patients.iter().position(|p| p.id == id)?;
        Some(self.patients.remove(index))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Patient> {
        self.patients.iter()
    }

    pub fn ids(&self) -> Vec<PatientId> {
        self.patients.iter().map(|p| p.id).collect()
    }

    /// One deterioration check for every waiting patient
    pub fn deteriorate_all<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Vec<Escalation> {
        let mut escalations = Vec::new();
        for patient in &mut self.patients {
            let from = patient.actual_priority;
            if patient.deteriorate(rng.gen()) {
                escalations.push(Escalation {
                    patient: patient.id,
                    from,
                    to: patient.actual_priority,
                });
            }
        }
        escalations
    }

    /// Empty the queue, returning whoever was still waiting
    pub fn drain(&mut self) -> Vec<Patient> {
        std::mem::take(&mut self.patients)
    }
}
