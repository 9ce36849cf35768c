//! Treatment beds
//!
//! Bed state lives here and nowhere else; presentation derives its view from
//! it. A bed cycles empty -> occupied -> discharged/deceased and only returns
//! to empty when a dilemma frees it.

use serde::{Deserialize, Serialize};

use crate::core::error::{Result, TriageError};
use crate::core::types::{BedId, Priority, SimTime, StaffId};
use crate::triage::patient::Patient;

/// Who is in an occupied bed and who is treating them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Occupancy {
    pub patient: Patient,
    /// None for crisis victims admitted by a dilemma
    pub staff: Option<StaffId>,
    pub assigned_priority: Priority,
    pub admitted_at: SimTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BedState {
    Empty,
    Occupied(Occupancy),
    /// Treatment finished, patient survived
    Discharged { patient_name: String },
    /// Treatment finished or life support failed, patient died
    Deceased { patient_name: String },
}

/// Fieldless view of `BedState` for notifications
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BedStatus {
    Empty,
    Occupied,
    Discharged,
    Deceased,
}

impl BedState {
    pub fn status(&self) -> BedStatus {
        match self {
            BedState::Empty => BedStatus::Empty,
            BedState::Occupied(_) => BedStatus::Occupied,
            BedState::Discharged { .. } => BedStatus::Discharged,
            BedState::Deceased { .. } => BedStatus::Deceased,
        }
    }

    pub fn patient_name(&self) -> Option<&str> {
        match self {
            BedState::Empty => None,
            BedState::Occupied(occupancy) => Some(&occupancy.patient.name),
            BedState::Discharged { patient_name } | BedState::Deceased { patient_name } => {
                Some(patient_name)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bed {
    pub id: BedId,
    pub state: BedState,
}

impl Bed {
    pub fn is_empty(&self) -> bool {
        self.state == BedState::Empty
    }

    pub fn occupancy(&self) -> Option<&Occupancy> {
        match &self.state {
            BedState::Occupied(occupancy) => Some(occupancy),
            _ => None,
        }
    }
}

/// Fixed set of beds for the session
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Ward {
    beds: Vec<Bed>,
}

impl Ward {
    pub fn new(count: usize) -> Self {
        Self {
            beds: (0..count)
                .map(|i| Bed {
                    id: BedId(i),
                    state: BedState::Empty,
                })
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.beds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.beds.is_empty()
    }

    pub fn get(&self, id: BedId) -> Option<&Bed> {
        self.beds.get(id.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Bed> {
        self.beds.iter()
    }

    pub fn first_empty(&self) -> Option<BedId> {
        self.beds.iter().find(|b| b.is_empty()).map(|b| b.id)
    }

    pub fn count(&self, status: BedStatus) -> usize {
        self.beds.iter().filter(|b| b.state.status() == status).count()
    }

    /// Occupied beds in slot order
    pub fn occupied_ids(&self) -> Vec<BedId> {
        self.beds
            .iter()
            .filter(|b| b.occupancy().is_some())
            .map(|b| b.id)
            .collect()
    }

    /// True if this staff member is bound to any occupied bed
    pub fn is_staff_bound(&self, staff: StaffId) -> bool {
        self.beds
            .iter()
            .filter_map(Bed::occupancy)
            .any(|o| o.staff == Some(staff))
    }

    /// Put a patient in an empty bed
    ///
    /// A bed that is not empty is never given a second patient.
    pub fn admit(&mut self, id: BedId, occupancy: Occupancy) -> Result<()> {
        let bed = self.beds.get_mut(id.0).ok_or(TriageError::NoEmptyBed)?;
        if !bed.is_empty() {
            return Err(TriageError::NoEmptyBed);
        }
        bed.state = BedState::Occupied(occupancy);
        Ok(())
    }

    /// Finish treatment: occupied -> discharged or deceased
    pub fn conclude(&mut self, id: BedId, survived: bool) -> Option<Occupancy> {
        let bed = self.beds.get_mut(id.0)?;
        let occupancy = match std::mem::replace(&mut bed.state, BedState::Empty) {
            BedState::Occupied(occupancy) => occupancy,
            other => {
                bed.state = other;
                return None;
            }
        };
        let patient_name = occupancy.patient.name.clone();
        bed.state = if survived {
            BedState::Discharged { patient_name }
        } else {
            BedState::Deceased { patient_name }
        };
        Some(occupancy)
    }

    /// Take the patient out of an occupied bed early
    ///
    /// With `mark_deceased` the bed shows deceased until cleared, otherwise
    /// it is immediately empty.
    pub fn release(&mut self, id: BedId, mark_deceased: bool) -> Option<Occupancy> {
        let bed = self.beds.get_mut(id.0)?;
        let occupancy = match std::mem::replace(&mut bed.state, BedState::Empty) {
            BedState::Occupied(occupancy) => occupancy,
            other => {
                bed.state = other;
                return None;
            }
        };
        if mark_deceased {
            bed.state = BedState::Deceased {
                patient_name: occupancy.patient.name.clone(),
            };
        }
        Some(occupancy)
    }

    /// Reset a discharged or deceased bed to empty
    ///
    /// Returns false if the bed was empty or has been re-occupied.
    pub fn clear(&mut self, id: BedId) -> bool {
        match self.beds.get_mut(id.0) {
            Some(bed) if matches!(bed.state, BedState::Discharged { .. } | BedState::Deceased { .. }) => {
                bed.state = BedState::Empty;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::triage::condition::ConditionCatalog;
    use crate::triage::patient::generate_patient;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn occupancy(staff: Option<StaffId>) -> Occupancy {
        let mut rng = ChaCha8Rng::seed_from_u64(31);
        let patient = generate_patient(&ConditionCatalog::with_defaults(), 0.0, 0, &mut rng);
        Occupancy {
            assigned_priority: patient.actual_priority,
            patient,
            staff,
            admitted_at: 0,
        }
    }

    #[test]
    fn test_new_ward_all_empty() {
        let ward = Ward::new(10);
        assert_eq!(ward.count(BedStatus::Empty), 10);
        assert_eq!(ward.first_empty(), Some(BedId(0)));
    }

    #[test]
    fn test_admit_rejects_occupied_bed() {
        let mut ward = Ward::new(2);
        ward.admit(BedId(0), occupancy(Some(StaffId(1)))).unwrap();

        let result = ward.admit(BedId(0), occupancy(Some(StaffId(2))));
        assert!(matches!(result, Err(TriageError::NoEmptyBed)));
        assert_eq!(ward.get(BedId(0)).unwrap().occupancy().unwrap().staff, Some(StaffId(1)));
        assert_eq!(ward.first_empty(), Some(BedId(1)));
        assert!(ward.is_staff_bound(StaffId(1)));
        assert!(!ward.is_staff_bound(StaffId(2)));
    }

    #[test]
    fn test_conclude_leaves_terminal_state() {
        let mut ward = Ward::new(2);
        ward.admit(BedId(0), occupancy(None)).unwrap();
        ward.admit(BedId(1), occupancy(None)).unwrap();

        assert!(ward.conclude(BedId(0), true).is_some());
        assert!(ward.conclude(BedId(1), false).is_some());
        assert_eq!(ward.count(BedStatus::Discharged), 1);
        assert_eq!(ward.count(BedStatus::Deceased), 1);
        assert_eq!(ward.first_empty(), None, "resolved beds are not recycled");

        // Concluding again is a no-op
        assert!(ward.conclude(BedId(0), false).is_none());
        assert_eq!(ward.get(BedId(0)).unwrap().state.status(), BedStatus::Discharged);
    }

    #[test]
    fn test_release_and_clear() {
        let mut ward = Ward::new(2);
        ward.admit(BedId(0), occupancy(None)).unwrap();
        ward.admit(BedId(1), occupancy(None)).unwrap();

        assert!(ward.release(BedId(0), false).is_some());
        assert!(ward.get(BedId(0)).unwrap().is_empty());

        assert!(ward.release(BedId(1), true).is_some());
        assert_eq!(ward.get(BedId(1)).unwrap().state.status(), BedStatus::Deceased);
        assert!(ward.clear(BedId(1)));
        assert!(ward.get(BedId(1)).unwrap().is_empty());
        assert!(!ward.clear(BedId(1)));
    }

    #[test]
    fn test_release_ignores_non_occupied() {
        let mut ward = Ward::new(1);
        assert!(ward.release(BedId(0), true).is_none());
        assert!(ward.get(BedId(0)).unwrap().is_empty());
    }
}
