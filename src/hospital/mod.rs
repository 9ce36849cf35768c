//! Hospital resources - staff and beds

pub mod bed;
pub mod staff;

pub use bed::{Bed, BedState, BedStatus, Occupancy, Ward};
pub use staff::{Staff, StaffRole, StaffRoster};
