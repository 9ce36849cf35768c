//! Session state for one shift
//!
//! Built fresh for every shift; restarting means constructing a new one.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::core::config::{Character, Difficulty, ShiftConfig};
use crate::core::types::{BedId, PatientId, SimTime};
use crate::hospital::{StaffRoster, Ward};
use crate::triage::{Patient, TriageQueue};

/// How a patient left the treatment area
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TreatmentOutcome {
    Survived,
    Died,
    /// Sent home early to make room during a dilemma
    DischargedEarly,
    /// Died when a dilemma took their bed
    LostInCrisis,
}

impl TreatmentOutcome {
    pub fn survived(&self) -> bool {
        matches!(self, Self::Survived | Self::DischargedEarly)
    }
}

/// History record for a patient who left a bed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreatedPatient {
    pub patient: Patient,
    pub bed: BedId,
    pub outcome: TreatmentOutcome,
    pub resolved_at: SimTime,
}

/// Summary produced once when the shift ends
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalStats {
    pub character: Character,
    pub difficulty: Difficulty,
    pub score: i64,
    pub saved: u32,
    pub lost: u32,
    /// Patients still waiting at the end, included in `lost`
    pub untriaged: u32,
    /// Rounded percentage of accurate assessments, 0 with no assessments
    pub accuracy: u8,
    pub accurate_assessments: u32,
    pub total_assessments: u32,
    pub treated: usize,
    pub dilemmas: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShiftState {
    pub character: Character,
    pub difficulty: Difficulty,
    /// Can go negative
    pub score: i64,
    pub remaining_secs: u32,
    pub budget: u32,
    pub staff: StaffRoster,
    pub ward: Ward,
    pub queue: TriageQueue,
    pub treated: Vec<TreatedPatient>,
    pub saved_count: u32,
    pub lost_count: u32,
    pub accuracy_count: u32,
    pub total_assessments: u32,
    /// Freezes the clock and arrivals
    pub paused: bool,
    pub dilemma_active: bool,
    pub dilemma_count: u32,
    /// Deterioration reduction applied to new arrivals
    pub comfort_bonus: f64,
    pub selected_patient: Option<PatientId>,
    pub game_over: bool,
}

impl ShiftState {
    pub fn new<R: Rng + ?Sized>(
        character: Character,
        difficulty: Difficulty,
        config: &ShiftConfig,
        rng: &mut R,
    ) -> Self {
        let settings = difficulty.settings();
        Self {
            character,
            difficulty,
            score: 0,
            remaining_secs: config.shift_seconds(difficulty, character),
            budget: settings.starting_budget,
            staff: StaffRoster::generate(settings.staff_count, rng),
            ward: Ward::new(config.bed_count(character)),
            queue: TriageQueue::new(config.queue_capacity),
            treated: Vec::new(),
            saved_count: 0,
            lost_count: 0,
            accuracy_count: 0,
            total_assessments: 0,
            paused: false,
            dilemma_active: false,
            dilemma_count: 0,
            comfort_bonus: character.abilities().comfort_bonus,
            selected_patient: None,
            game_over: false,
        }
    }

    /// Rounded accuracy percentage
    pub fn accuracy_percent(&self) -> u8 {
        if self.total_assessments == 0 {
            return 0;
        }
        ((self.accuracy_count as f64 / self.total_assessments as f64) * 100.0).round() as u8
    }

    pub fn final_stats(&self, untriaged: u32) -> FinalStats {
        FinalStats {
            character: self.character,
            difficulty: self.difficulty,
            score: self.score,
            saved: self.saved_count,
            lost: self.lost_count,
            untriaged,
            accuracy: self.accuracy_percent(),
            accurate_assessments: self.accuracy_count,
            total_assessments: self.total_assessments,
            treated: self.treated.len(),
            dilemmas: self.dilemma_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hospital::BedStatus;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_new_state_applies_difficulty_and_character() {
        let mut rng = ChaCha8Rng::seed_from_u64(41);
        let config = ShiftConfig::default();

        let state = ShiftState::new(Character::Resourceful, Difficulty::Hard, &config, &mut rng);
        assert_eq!(state.remaining_secs, 60);
        assert_eq!(state.budget, 3000);
        assert_eq!(state.staff.len(), 8);
        assert_eq!(state.ward.count(BedStatus::Empty), 12);
        assert_eq!(state.comfort_bonus, 0.0);

        let state = ShiftState::new(Character::Empath, Difficulty::Easy, &config, &mut rng);
        assert_eq!(state.remaining_secs, 300);
        assert_eq!(state.staff.len(), 12);
        assert_eq!(state.ward.len(), 10);
        assert_eq!(state.comfort_bonus, 0.15);
    }

    #[test]
    fn test_accuracy_percent_rounds() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let mut state =
            ShiftState::new(Character::Veteran, Difficulty::Medium, &ShiftConfig::default(), &mut rng);
        assert_eq!(state.accuracy_percent(), 0);

        state.total_assessments = 3;
        state.accuracy_count = 2;
        assert_eq!(state.accuracy_percent(), 67);
    }

    #[test]
    fn test_outcome_survival() {
        assert!(TreatmentOutcome::Survived.survived());
        assert!(TreatmentOutcome::DischargedEarly.survived());
        assert!(!TreatmentOutcome::Died.survived());
        assert!(!TreatmentOutcome::LostInCrisis.survived());
    }
}
