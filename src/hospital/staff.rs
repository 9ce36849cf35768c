//! Staff roster

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::types::StaffId;

const FIRST_NAMES: [&str; 12] = [
    "Alex", "Jordan", "Taylor", "Casey", "Morgan", "Riley", "Avery", "Quinn", "Blake", "Cameron",
    "Drew", "Sage",
];
const LAST_NAMES: [&str; 16] = [
    "Smith", "Johnson", "Williams", "Brown", "Jones", "Garcia", "Miller", "Davis", "Rodriguez",
    "Martinez", "Anderson", "Taylor", "Thomas", "Hernandez", "Moore", "Martin",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StaffRole {
    Doctor,
    Nurse,
    Specialist,
}

impl StaffRole {
    /// Roles cycle in roster order
    pub fn for_index(index: usize) -> Self {
        match index % 3 {
            0 => Self::Doctor,
            1 => Self::Nurse,
            _ => Self::Specialist,
        }
    }
}

impl fmt::Display for StaffRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Doctor => "Doctor",
            Self::Nurse => "Nurse",
            Self::Specialist => "Specialist",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Staff {
    pub id: StaffId,
    pub name: String,
    pub role: StaffRole,
    pub available: bool,
    /// Treatment time multiplier, 0.8..1.2
    pub efficiency: f64,
}

/// Everyone on shift; fixed size for the whole session
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StaffRoster {
    members: Vec<Staff>,
}

impl StaffRoster {
    pub fn new(members: Vec<Staff>) -> Self {
        Self { members }
    }

    /// Build `count` staff with cycling roles and random efficiency
    pub fn generate<R: Rng + ?Sized>(count: u32, rng: &mut R) -> Self {
        let members = (0..count as usize)
            .map(|i| {
                let role = StaffRole::for_index(i);
                let first = FIRST_NAMES[i % FIRST_NAMES.len()];
                let last = LAST_NAMES[(i / FIRST_NAMES.len()) % LAST_NAMES.len()];
                Staff {
                    id: StaffId(i as u32),
                    name: format!("{} {} {}", role, first, last),
                    role,
                    available: true,
                    efficiency: 0.8 + rng.gen::<f64>() * 0.4,
                }
            })
            .collect();
        Self { members }
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn get(&self, id: StaffId) -> Option<&Staff> {
        self.members.iter().find(|s| s.id == id)
    }

    pub fn get_mut(&mut self, id: StaffId) -> Option<&mut Staff> {
        self.members.iter_mut().find(|s| s.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Staff> {
        self.members.iter()
    }

    pub fn iter_available(&self) -> impl Iterator<Item = &Staff> {
        self.members.iter().filter(|s| s.available)
    }

    pub fn available_count(&self) -> usize {
        self.iter_available().count()
    }

    pub fn first_available(&self) -> Option<&Staff> {
        self.iter_available().next()
    }

    pub fn set_available(&mut self, id: StaffId, available: bool) -> bool {
        match self.get_mut(id) {
            Some(staff) => {
                staff.available = available;
                true
            }
            None => false,
        }
    }
}
