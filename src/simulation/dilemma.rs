//! Dilemma events
//!
//! A dilemma pauses the shift and forces the player to pick one of a few
//! choices. Each choice releases beds, admits crisis victims, shifts the
//! saved/lost counters and changes the score. Some choices are gambles that
//! roll for one of two consequences. At most `max_dilemmas` are raised per
//! shift and never two at once.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::core::config::ShiftConfig;
use crate::core::error::{Result, TriageError};
use crate::core::types::{BedId, Priority, SimTime, StaffId};
use crate::hospital::Occupancy;
use crate::simulation::state::{ShiftState, TreatedPatient, TreatmentOutcome};
use crate::triage::Patient;

/// Free the first `count` occupied beds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BedRelease {
    pub count: usize,
    /// Freed beds show deceased until the clear timer fires
    pub mark_deceased: bool,
}

/// What happens when a choice is applied
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Consequence {
    pub release: Option<BedRelease>,
    /// Put a critical accident victim in every bed the release emptied
    pub admit_crisis_victims: bool,
    pub saved: u32,
    pub lost: u32,
    pub score: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ChoiceEffect {
    Fixed(Consequence),
    /// Succeeds iff a uniform roll exceeds `failure_chance`
    Gamble {
        failure_chance: f64,
        success: Consequence,
        failure: Consequence,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DilemmaChoice {
    pub text: String,
    pub effect: ChoiceEffect,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DilemmaScenario {
    pub text: String,
    pub choices: Vec<DilemmaChoice>,
}

impl DilemmaScenario {
    pub fn choice_texts(&self) -> Vec<String> {
        self.choices.iter().map(|c| c.text.clone()).collect()
    }
}

/// Fixed set of scenarios a dilemma is drawn from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DilemmaDeck {
    scenarios: Vec<DilemmaScenario>,
}

impl DilemmaDeck {
    pub fn new(scenarios: Vec<DilemmaScenario>) -> Result<Self> {
        if scenarios.is_empty() {
            return Err(TriageError::InvalidConfig("dilemma deck is empty".into()));
        }
        if let Some(s) = scenarios.iter().find(|s| s.choices.is_empty()) {
            return Err(TriageError::InvalidConfig(format!(
                "dilemma has no choices: {}",
                s.text
            )));
        }
        Ok(Self { scenarios })
    }

    /// The mass-casualty and generator-failure scenarios
    pub fn with_defaults() -> Self {
        let mass_casualty = DilemmaScenario {
            text: "Emergency! A multi-car accident just arrived with 5 critical patients, \
                   but you only have 2 beds available. What do you do?"
                .to_string(),
            choices: vec![
                DilemmaChoice {
                    text: "Discharge 3 stable patients early to make room".to_string(),
                    effect: ChoiceEffect::Fixed(Consequence {
                        release: Some(BedRelease { count: 3, mark_deceased: false }),
                        admit_crisis_victims: true,
                        score: 150,
                        ..Default::default()
                    }),
                },
                DilemmaChoice {
                    text: "Only treat the 2 most critical".to_string(),
                    effect: ChoiceEffect::Fixed(Consequence {
                        saved: 2,
                        lost: 3,
                        score: -100,
                        ..Default::default()
                    }),
                },
            ],
        };

        let life_support = Consequence {
            release: Some(BedRelease { count: 2, mark_deceased: true }),
            saved: 2,
            lost: 2,
            ..Default::default()
        };
        let generator_failure = DilemmaScenario {
            text: "Crisis! The hospital generator failed. You must evacuate 4 patients from \
                   life support. Two are young with good chances, two are elderly with poor \
                   prognosis. Who gets the portable equipment?"
                .to_string(),
            choices: vec![
                DilemmaChoice {
                    text: "Save the younger patients".to_string(),
                    effect: ChoiceEffect::Fixed(Consequence {
                        score: 50,
                        ..life_support.clone()
                    }),
                },
                DilemmaChoice {
                    text: "First come, first served".to_string(),
                    effect: ChoiceEffect::Fixed(Consequence {
                        score: 100,
                        ..life_support
                    }),
                },
                DilemmaChoice {
                    text: "Try to save all four (risky)".to_string(),
                    effect: ChoiceEffect::Gamble {
                        failure_chance: 0.3,
                        success: Consequence {
                            saved: 4,
                            score: 200,
                            ..Default::default()
                        },
                        failure: Consequence {
                            release: Some(BedRelease { count: 4, mark_deceased: true }),
                            lost: 4,
                            score: -200,
                            ..Default::default()
                        },
                    },
                },
            ],
        };

        Self {
            scenarios: vec![mass_casualty, generator_failure],
        }
    }

    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&DilemmaScenario> {
        self.scenarios.get(index)
    }
}

impl Default for DilemmaDeck {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// A patient displaced from a bed by a dilemma
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FreedBed {
    pub bed: BedId,
    pub patient_name: String,
    pub staff: Option<StaffId>,
}

/// Everything a resolved choice changed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DilemmaOutcome {
    pub choice: usize,
    pub text: String,
    pub freed: Vec<FreedBed>,
    pub mark_deceased: bool,
    /// Beds now holding crisis victims
    pub crisis_beds: Vec<BedId>,
    pub score_delta: i64,
    /// Some for gamble choices
    pub gamble_succeeded: Option<bool>,
}

#[derive(Debug, Clone, Default)]
pub struct DilemmaEngine {
    deck: DilemmaDeck,
    /// Index into the deck of the scenario awaiting a choice
    pending: Option<usize>,
}

impl DilemmaEngine {
    pub fn new(deck: DilemmaDeck) -> Self {
        Self { deck, pending: None }
    }

    pub fn deck(&self) -> &DilemmaDeck {
        &self.deck
    }

    pub fn pending(&self) -> Option<&DilemmaScenario> {
        self.pending.and_then(|i| self.deck.get(i))
    }

    pub fn is_eligible(&self, state: &ShiftState, config: &ShiftConfig) -> bool {
        self.pending.is_none()
            && !self.deck.is_empty()
            && !state.dilemma_active
            && !state.game_over
            && state.dilemma_count < config.max_dilemmas
    }

    /// Roll for a dilemma after a successful patient generation
    ///
    /// The roll is drawn even when ineligible so the random stream does not
    /// depend on dilemma state.
    pub fn roll<R: Rng + ?Sized>(
        &mut self,
        state: &mut ShiftState,
        config: &ShiftConfig,
        rng: &mut R,
    ) -> Option<&DilemmaScenario> {
        let roll: f64 = rng.gen();
        if roll < config.dilemma_chance {
            self.raise(state, config, rng)
        } else {
            None
        }
    }

    /// Raise a uniformly drawn scenario and pause the shift
    ///
    /// Returns None without touching state when not eligible.
    pub fn raise<R: Rng + ?Sized>(
        &mut self,
        state: &mut ShiftState,
        config: &ShiftConfig,
        rng: &mut R,
    ) -> Option<&DilemmaScenario> {
        if !self.is_eligible(state, config) {
            return None;
        }
        let index = rng.gen_range(0..self.deck.len());
        self.pending = Some(index);
        state.dilemma_active = true;
        state.paused = true;
        state.dilemma_count += 1;
        self.deck.get(index)
    }

    /// Drop a pending dilemma without applying any choice
    pub fn abandon(&mut self, state: &mut ShiftState) {
        if self.pending.take().is_some() {
            state.dilemma_active = false;
        }
    }

    /// Apply the player's choice and unpause
    ///
    /// An out-of-range choice is rejected and the dilemma stays pending.
    pub fn resolve<R: Rng + ?Sized>(
        &mut self,
        state: &mut ShiftState,
        choice: usize,
        now: SimTime,
        rng: &mut R,
    ) -> Result<DilemmaOutcome> {
        let scenario = self.pending().ok_or(TriageError::NoDilemmaActive)?;
        let selected = scenario.choices.get(choice).ok_or(TriageError::InvalidChoice {
            choice,
            available: scenario.choices.len(),
        })?;

        let (consequence, gamble_succeeded) = match &selected.effect {
            ChoiceEffect::Fixed(consequence) => (consequence.clone(), None),
            ChoiceEffect::Gamble {
                failure_chance,
                success,
                failure,
            } => {
                let roll: f64 = rng.gen();
                if roll > *failure_chance {
                    (success.clone(), Some(true))
                } else {
                    (failure.clone(), Some(false))
                }
            }
        };
        let text = selected.text.clone();

        let mark_deceased = consequence.release.map(|r| r.mark_deceased).unwrap_or(false);
        let freed = match consequence.release {
            Some(release) => free_beds(state, release, now),
            None => Vec::new(),
        };

        let mut crisis_beds = Vec::new();
        if consequence.admit_crisis_victims {
            for (i, freed_bed) in freed.iter().enumerate() {
                let occupancy = Occupancy {
                    patient: Patient::crisis_victim(i + 1, now),
                    staff: None,
                    assigned_priority: Priority::CRITICAL,
                    admitted_at: now,
                };
                if state.ward.admit(freed_bed.bed, occupancy).is_ok() {
                    crisis_beds.push(freed_bed.bed);
                }
            }
        }

        state.saved_count += consequence.saved;
        state.lost_count += consequence.lost;
        state.score += consequence.score;

        self.pending = None;
        state.dilemma_active = false;
        state.paused = false;

        Ok(DilemmaOutcome {
            choice,
            text,
            freed,
            mark_deceased,
            crisis_beds,
            score_delta: consequence.score,
            gamble_succeeded,
        })
    }
}

/// Release up to `release.count` occupied beds in slot order
///
/// Staff come back through the bed's staff binding. Displaced patients go to
/// the treated history; counters are left to the consequence.
fn free_beds(state: &mut ShiftState, release: BedRelease, now: SimTime) -> Vec<FreedBed> {
    let targets: Vec<BedId> = state
        .ward
        .occupied_ids()
        .into_iter()
        .take(release.count)
        .collect();

    let mut freed = Vec::with_capacity(targets.len());
    for bed in targets {
        let Some(occupancy) = state.ward.release(bed, release.mark_deceased) else {
            continue;
        };
        if let Some(staff) = occupancy.staff {
            state.staff.set_available(staff, true);
        }
        freed.push(FreedBed {
            bed,
            patient_name: occupancy.patient.name.clone(),
            staff: occupancy.staff,
        });
        state.treated.push(TreatedPatient {
            patient: occupancy.patient,
            bed,
            outcome: if release.mark_deceased {
                TreatmentOutcome::LostInCrisis
            } else {
                TreatmentOutcome::DischargedEarly
            },
            resolved_at: now,
        });
    }
    freed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::{Character, Difficulty};
    use crate::hospital::BedStatus;
    use crate::triage::{generate_patient, ConditionCatalog};
    use rand::rngs::mock::StepRng;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn state_with_occupied(beds: usize) -> (ShiftState, ShiftConfig, ChaCha8Rng) {
        let mut rng = ChaCha8Rng::seed_from_u64(71);
        let config = ShiftConfig::default();
        let mut state = ShiftState::new(Character::Veteran, Difficulty::Medium, &config, &mut rng);
        let catalog = ConditionCatalog::with_defaults();
        for i in 0..beds {
            let patient = generate_patient(&catalog, 0.0, 0, &mut rng);
            let staff = StaffId(i as u32);
            state
                .ward
                .admit(
                    BedId(i),
                    Occupancy {
                        patient,
                        staff: Some(staff),
                        assigned_priority: Priority::STABLE,
                        admitted_at: 0,
                    },
                )
                .unwrap();
            state.staff.set_available(staff, false);
        }
        (state, config, rng)
    }

    /// Engine with the given scenario already pending
    fn pending_engine(state: &mut ShiftState, scenario: usize) -> DilemmaEngine {
        let mut engine = DilemmaEngine::default();
        engine.pending = Some(scenario);
        state.dilemma_active = true;
        state.paused = true;
        state.dilemma_count += 1;
        engine
    }

    #[test]
    fn test_default_deck() {
        let deck = DilemmaDeck::with_defaults();
        assert_eq!(deck.len(), 2);
        assert_eq!(deck.get(0).unwrap().choices.len(), 2);
        assert_eq!(deck.get(1).unwrap().choices.len(), 3);
        assert!(DilemmaDeck::new(Vec::new()).is_err());
    }

    #[test]
    fn test_raise_pauses_and_counts() {
        let (mut state, config, mut rng) = state_with_occupied(0);
        let mut engine = DilemmaEngine::default();

        assert!(engine.raise(&mut state, &config, &mut rng).is_some());
        assert!(state.paused);
        assert!(state.dilemma_active);
        assert_eq!(state.dilemma_count, 1);

        // Never two at once
        assert!(engine.raise(&mut state, &config, &mut rng).is_none());
        assert_eq!(state.dilemma_count, 1);
    }

    #[test]
    fn test_raise_capped_per_shift() {
        let (mut state, config, mut rng) = state_with_occupied(0);
        let mut engine = DilemmaEngine::default();

        for _ in 0..config.max_dilemmas {
            assert!(engine.raise(&mut state, &config, &mut rng).is_some());
            engine.resolve(&mut state, 1, 0, &mut rng).unwrap();
        }
        assert!(engine.raise(&mut state, &config, &mut rng).is_none());
        assert_eq!(state.dilemma_count, config.max_dilemmas);
        assert!(!state.paused);
    }

    #[test]
    fn test_roll_respects_chance() {
        let (mut state, config, _) = state_with_occupied(0);
        let mut engine = DilemmaEngine::default();

        let mut high = StepRng::new(u64::MAX, 0);
        assert!(engine.roll(&mut state, &config, &mut high).is_none());
        assert!(!state.dilemma_active);

        let mut low = StepRng::new(0, 0);
        assert!(engine.roll(&mut state, &config, &mut low).is_some());
        assert!(state.dilemma_active);
    }

    #[test]
    fn test_discharge_admits_crisis_victims() {
        let (mut state, _, mut rng) = state_with_occupied(4);
        let mut engine = pending_engine(&mut state, 0);

        let outcome = engine.resolve(&mut state, 0, 1000, &mut rng).unwrap();

        assert_eq!(outcome.freed.len(), 3);
        assert_eq!(outcome.crisis_beds, vec![BedId(0), BedId(1), BedId(2)]);
        assert_eq!(outcome.score_delta, 150);
        assert_eq!(state.score, 150);
        assert_eq!(state.ward.count(BedStatus::Occupied), 4);
        let victim = state.ward.get(BedId(0)).unwrap().occupancy().unwrap();
        assert_eq!(victim.patient.name, "Accident Victim 1");
        assert_eq!(victim.staff, None);
        // Freed staff are available again, the fourth bed keeps its staff
        for i in 0..3 {
            assert!(state.staff.get(StaffId(i)).unwrap().available);
        }
        assert!(!state.staff.get(StaffId(3)).unwrap().available);
        assert_eq!(state.treated.len(), 3);
        assert!(state
            .treated
            .iter()
            .all(|t| t.outcome == TreatmentOutcome::DischargedEarly));
        assert!(!state.paused);
        assert!(!state.dilemma_active);
        assert!(engine.pending().is_none());
    }

    #[test]
    fn test_release_limited_to_occupied_beds() {
        let (mut state, _, mut rng) = state_with_occupied(1);
        let mut engine = pending_engine(&mut state, 0);

        let outcome = engine.resolve(&mut state, 0, 0, &mut rng).unwrap();
        assert_eq!(outcome.freed.len(), 1);
        assert_eq!(outcome.crisis_beds, vec![BedId(0)]);
    }

    #[test]
    fn test_treat_two_adjusts_counters_only() {
        let (mut state, _, mut rng) = state_with_occupied(2);
        let mut engine = pending_engine(&mut state, 0);

        let outcome = engine.resolve(&mut state, 1, 0, &mut rng).unwrap();
        assert!(outcome.freed.is_empty());
        assert_eq!(state.saved_count, 2);
        assert_eq!(state.lost_count, 3);
        assert_eq!(state.score, -100);
        assert_eq!(state.ward.count(BedStatus::Occupied), 2);
    }

    #[test]
    fn test_life_support_marks_deceased() {
        let (mut state, _, mut rng) = state_with_occupied(3);
        let mut engine = pending_engine(&mut state, 1);

        let outcome = engine.resolve(&mut state, 1, 0, &mut rng).unwrap();
        assert!(outcome.mark_deceased);
        assert_eq!(outcome.freed.len(), 2);
        assert_eq!(state.ward.count(BedStatus::Deceased), 2);
        assert_eq!(state.saved_count, 2);
        assert_eq!(state.lost_count, 2);
        assert_eq!(state.score, 100);
        assert!(state
            .treated
            .iter()
            .all(|t| t.outcome == TreatmentOutcome::LostInCrisis));
    }

    #[test]
    fn test_gamble_outcomes() {
        let (mut state, _, _) = state_with_occupied(4);
        let mut engine = pending_engine(&mut state, 1);
        let mut lucky = StepRng::new(u64::MAX, 0);
        let outcome = engine.resolve(&mut state, 2, 0, &mut lucky).unwrap();
        assert_eq!(outcome.gamble_succeeded, Some(true));
        assert_eq!(state.saved_count, 4);
        assert_eq!(state.score, 200);
        assert_eq!(state.ward.count(BedStatus::Occupied), 4);

        let (mut state, _, _) = state_with_occupied(4);
        let mut engine = pending_engine(&mut state, 1);
        let mut unlucky = StepRng::new(0, 0);
        let outcome = engine.resolve(&mut state, 2, 0, &mut unlucky).unwrap();
        assert_eq!(outcome.gamble_succeeded, Some(false));
        assert_eq!(state.lost_count, 4);
        assert_eq!(state.score, -200);
        assert_eq!(state.ward.count(BedStatus::Deceased), 4);
    }

    #[test]
    fn test_invalid_choice_keeps_dilemma_pending() {
        let (mut state, _, mut rng) = state_with_occupied(0);
        let mut engine = pending_engine(&mut state, 0);

        let result = engine.resolve(&mut state, 5, 0, &mut rng);
        assert!(matches!(
            result,
            Err(TriageError::InvalidChoice { choice: 5, available: 2 })
        ));
        assert!(state.paused);
        assert!(engine.pending().is_some());

        let mut idle = DilemmaEngine::default();
        assert!(matches!(
            idle.resolve(&mut state, 0, 0, &mut rng),
            Err(TriageError::NoDilemmaActive)
        ));
    }
}
