//! Integration tests for a full shift
//!
//! These drive `ShiftSession` end to end the way a front end would:
//! - Triage scoring on assignment
//! - Bed and staff scarcity
//! - Treatment, crisis-victim and deceased-bed timers
//! - Dilemma limits and pausing
//! - End-of-shift accounting

use ahash::AHashSet;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use triage_shift::core::config::{Character, Difficulty, ShiftConfig};
use triage_shift::core::error::TriageError;
use triage_shift::core::types::{BedId, PatientId, Priority, StaffId};
use triage_shift::hospital::BedStatus;
use triage_shift::simulation::{
    Autopilot, DilemmaDeck, ShiftEvent, ShiftPlayer, ShiftSession,
};
use triage_shift::triage::{generate_patient, ConditionCatalog, Patient};

fn started(character: Character, difficulty: Difficulty, config: ShiftConfig) -> ShiftSession {
    let mut session = ShiftSession::new(character, difficulty, config, 1234).unwrap();
    session.start();
    session.drain_events();
    session
}

/// Config where nothing arrives and no dilemma rolls on its own
///
/// A zero-capacity waiting room stops generation; scripted admissions still
/// go through.
fn quiet_config() -> ShiftConfig {
    ShiftConfig {
        initial_patients: 0,
        queue_capacity: 0,
        dilemma_chance: 0.0,
        ..ShiftConfig::default()
    }
}

fn patient_with(actual: Priority, rng: &mut ChaCha8Rng) -> Patient {
    let mut patient = generate_patient(&ConditionCatalog::with_defaults(), 0.0, 0, rng);
    patient.actual_priority = actual;
    patient
}

fn admit_triaged(
    session: &mut ShiftSession,
    actual: Priority,
    assigned: u8,
    rng: &mut ChaCha8Rng,
) -> PatientId {
    let id = session.admit(patient_with(actual, rng)).unwrap();
    session.assign_priority(id, assigned).unwrap();
    id
}

fn count_events(events: &[ShiftEvent], pred: impl Fn(&ShiftEvent) -> bool) -> usize {
    events.iter().filter(|e| pred(e)).count()
}

// ============================================================================
// Triage scoring
// ============================================================================

#[test]
fn test_accurate_assignment_scores_exactly_100() {
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    let mut session = started(Character::Empath, Difficulty::Medium, quiet_config());

    let id = admit_triaged(&mut session, Priority::SERIOUS, 3, &mut rng);
    session.request_assignment(id, StaffId(0)).unwrap();

    assert_eq!(session.state().score, 100);
    assert_eq!(session.state().accuracy_count, 1);
    assert_eq!(session.state().total_assessments, 1);

    let events = session.drain_events();
    assert!(events.contains(&ShiftEvent::ScoreDelta { amount: 100 }));
}

#[test]
fn test_inaccurate_assignment_costs_exactly_50() {
    let mut rng = ChaCha8Rng::seed_from_u64(2);
    let mut session = started(Character::Empath, Difficulty::Medium, quiet_config());

    let id = admit_triaged(&mut session, Priority::CRITICAL, 1, &mut rng);
    session.request_assignment(id, StaffId(0)).unwrap();

    assert_eq!(session.state().score, -50);
    assert_eq!(session.state().accuracy_count, 0, "accuracy counter must not move");
    assert_eq!(session.state().total_assessments, 1);
}

#[test]
fn test_within_one_level_counts_as_accurate() {
    let mut rng = ChaCha8Rng::seed_from_u64(3);
    let mut session = started(Character::Veteran, Difficulty::Medium, quiet_config());

    let id = admit_triaged(&mut session, Priority::URGENT, 5, &mut rng);
    let assignment = session.request_assignment(id, StaffId(0)).unwrap();

    assert!(assignment.accurate);
    assert_eq!(assignment.points, 110, "veteran diagnosis bonus applies");
}

// ============================================================================
// Beds and staff
// ============================================================================

#[test]
fn test_full_ward_rejects_assignment() {
    let mut rng = ChaCha8Rng::seed_from_u64(4);
    // Easy has 12 staff for 10 beds, so beds run out first
    let mut session = started(Character::Veteran, Difficulty::Easy, quiet_config());

    for i in 0..10 {
        let id = admit_triaged(&mut session, Priority::MINOR, 1, &mut rng);
        session.request_assignment(id, StaffId(i)).unwrap();
    }

    let id = admit_triaged(&mut session, Priority::MINOR, 1, &mut rng);
    let score = session.state().score;
    let result = session.request_assignment(id, StaffId(10));

    assert!(matches!(result, Err(TriageError::NoEmptyBed)));
    assert!(session.patient(id).is_some(), "patient stays in the waiting room");
    assert_eq!(session.state().score, score);
    assert!(session.state().staff.get(StaffId(10)).unwrap().available);
}

#[test]
fn test_resolved_beds_are_not_recycled() {
    let mut rng = ChaCha8Rng::seed_from_u64(5);
    let mut session = started(Character::Veteran, Difficulty::Easy, quiet_config());

    let id = admit_triaged(&mut session, Priority::CRITICAL, 5, &mut rng);
    let assignment = session.request_assignment(id, StaffId(0)).unwrap();
    session.advance(assignment.treatment_ms);

    let status = session.state().ward.get(BedId(0)).unwrap().state.status();
    assert!(matches!(status, BedStatus::Discharged | BedStatus::Deceased));
    assert!(session.state().staff.get(StaffId(0)).unwrap().available);

    session.advance_seconds(60);
    let status_later = session.state().ward.get(BedId(0)).unwrap().state.status();
    assert_eq!(status, status_later, "resolved bed keeps its outcome");
    assert_eq!(session.state().ward.first_empty(), Some(BedId(1)));
}

#[test]
fn test_busy_staff_cannot_take_second_patient() {
    let mut rng = ChaCha8Rng::seed_from_u64(6);
    let mut session = started(Character::Veteran, Difficulty::Medium, quiet_config());

    let first = admit_triaged(&mut session, Priority::STABLE, 2, &mut rng);
    let second = admit_triaged(&mut session, Priority::STABLE, 2, &mut rng);
    session.request_assignment(first, StaffId(3)).unwrap();

    let result = session.request_assignment(second, StaffId(3));
    assert!(matches!(result, Err(TriageError::StaffUnavailable(_))));
}

#[test]
fn test_staff_never_bound_to_two_beds_during_play() {
    let mut session = started(Character::Resourceful, Difficulty::Hard, ShiftConfig::default());
    let mut pilot = Autopilot::with_seed(99);

    while !session.is_over() {
        pilot.act(&mut session);
        session.advance(500);

        let state = session.state();
        let mut bound = AHashSet::new();
        for bed in state.ward.iter() {
            if let Some(staff) = bed.occupancy().and_then(|o| o.staff) {
                assert!(bound.insert(staff), "{:?} bound to two beds", staff);
                assert!(!state.staff.get(staff).unwrap().available);
            }
        }
    }
}

// ============================================================================
// Timers
// ============================================================================

#[test]
fn test_treatment_resolves_on_schedule() {
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let mut session = started(Character::Veteran, Difficulty::Easy, quiet_config());

    let id = admit_triaged(&mut session, Priority::MINOR, 2, &mut rng);
    let assignment = session.request_assignment(id, StaffId(0)).unwrap();
    session.drain_events();

    session.advance(assignment.treatment_ms - 1);
    let events = session.drain_events();
    assert_eq!(
        count_events(&events, |e| matches!(e, ShiftEvent::TreatmentResolved { .. })),
        0
    );

    session.advance(1);
    let events = session.drain_events();
    assert_eq!(
        count_events(&events, |e| matches!(e, ShiftEvent::TreatmentResolved { .. })),
        1
    );
    let state = session.state();
    assert_eq!(state.saved_count + state.lost_count, 1);
    assert_eq!(state.treated.len(), 1);
}

#[test]
fn test_dilemma_freeing_bed_cancels_its_treatment() {
    let mut rng = ChaCha8Rng::seed_from_u64(8);
    let mass_casualty = DilemmaDeck::with_defaults().get(0).unwrap().clone();
    let mut session = ShiftSession::new(Character::Veteran, Difficulty::Easy, quiet_config(), 8)
        .unwrap()
        .with_dilemmas(DilemmaDeck::new(vec![mass_casualty]).unwrap());
    session.start();

    let id = admit_triaged(&mut session, Priority::MINOR, 1, &mut rng);
    session.request_assignment(id, StaffId(0)).unwrap();

    assert!(session.trigger_dilemma().is_some());
    let outcome = session.resolve_dilemma(0).unwrap();
    assert_eq!(outcome.crisis_beds, vec![BedId(0)]);
    assert!(session.state().staff.get(StaffId(0)).unwrap().available);
    session.drain_events();

    // Crisis victim resolves at 15s; the displaced 50s treatment never fires
    session.advance_seconds(120);
    let events = session.drain_events();
    let resolved: Vec<_> = events
        .iter()
        .filter_map(|e| match e {
            ShiftEvent::TreatmentResolved { bed, patient_name, .. } => Some((*bed, patient_name.clone())),
            _ => None,
        })
        .collect();
    assert_eq!(resolved, vec![(BedId(0), "Accident Victim 1".to_string())]);
}

#[test]
fn test_deceased_beds_clear_after_delay() {
    let mut rng = ChaCha8Rng::seed_from_u64(9);
    let generator_failure = DilemmaDeck::with_defaults().get(1).unwrap().clone();
    let mut session = ShiftSession::new(Character::Veteran, Difficulty::Easy, quiet_config(), 9)
        .unwrap()
        .with_dilemmas(DilemmaDeck::new(vec![generator_failure]).unwrap());
    session.start();

    for i in 0..3 {
        let id = admit_triaged(&mut session, Priority::MINOR, 1, &mut rng);
        session.request_assignment(id, StaffId(i)).unwrap();
    }
    session.trigger_dilemma().unwrap();
    session.resolve_dilemma(0).unwrap();

    assert_eq!(session.state().ward.count(BedStatus::Deceased), 2);
    assert_eq!(session.state().saved_count, 2);
    assert_eq!(session.state().lost_count, 2);

    session.advance_seconds(4);
    assert_eq!(session.state().ward.count(BedStatus::Deceased), 2);
    session.advance_seconds(1);
    assert_eq!(session.state().ward.count(BedStatus::Deceased), 0);
    assert_eq!(session.state().ward.first_empty(), Some(BedId(0)));
}

#[test]
fn test_pending_dilemma_freezes_all_timers() {
    let mut rng = ChaCha8Rng::seed_from_u64(10);
    let mut session = started(Character::Veteran, Difficulty::Easy, quiet_config());

    let id = admit_triaged(&mut session, Priority::CRITICAL, 5, &mut rng);
    session.request_assignment(id, StaffId(0)).unwrap();
    session.trigger_dilemma().unwrap();

    let now = session.now();
    let remaining = session.state().remaining_secs;
    assert_eq!(session.advance_seconds(600), 0);
    assert_eq!(session.now(), now);
    assert_eq!(session.state().remaining_secs, remaining);
    assert_eq!(session.state().ward.count(BedStatus::Occupied), 1);
}

// ============================================================================
// Dilemmas
// ============================================================================

#[test]
fn test_dilemmas_capped_and_never_overlap() {
    let config = ShiftConfig {
        dilemma_chance: 1.0,
        ..ShiftConfig::default()
    };
    for seed in 0..5 {
        let mut session =
            ShiftSession::new(Character::Veteran, Difficulty::Easy, config.clone(), seed).unwrap();
        session.start();
        let mut pilot = Autopilot::with_seed(seed);

        let mut raised = 0;
        let mut open = false;
        while !session.is_over() {
            pilot.act(&mut session);
            session.advance_seconds(1);
            for event in session.drain_events() {
                match event {
                    ShiftEvent::DilemmaRaised { .. } => {
                        assert!(!open, "second dilemma raised while one is pending");
                        open = true;
                        raised += 1;
                    }
                    ShiftEvent::DilemmaResolved { .. } => open = false,
                    _ => {}
                }
            }
        }
        assert_eq!(raised, 3, "seed {}: every eligible generation raises", seed);
        assert_eq!(session.final_stats().unwrap().dilemmas, 3);
    }
}

#[test]
fn test_actions_rejected_while_dilemma_pending() {
    let mut rng = ChaCha8Rng::seed_from_u64(11);
    let mut session = started(Character::Veteran, Difficulty::Medium, quiet_config());
    let id = session.admit(patient_with(Priority::SERIOUS, &mut rng)).unwrap();

    session.trigger_dilemma().unwrap();
    assert!(matches!(
        session.assign_priority(id, 3),
        Err(TriageError::DilemmaPending)
    ));
    assert!(matches!(
        session.resolve_dilemma(9),
        Err(TriageError::InvalidChoice { .. })
    ));
    assert!(session.is_paused());
}

// ============================================================================
// End of shift
// ============================================================================

#[test]
fn test_untriaged_patients_lost_at_shift_end() {
    let config = ShiftConfig {
        initial_patients: 2,
        queue_capacity: 2,
        dilemma_chance: 0.0,
        ..ShiftConfig::default()
    };
    let mut session = started(Character::Veteran, Difficulty::Hard, config);

    session.advance_seconds(60);
    assert!(session.is_over());

    let stats = session.final_stats().unwrap().clone();
    assert_eq!(stats.untriaged, 2);
    assert_eq!(stats.lost, 2);
    assert_eq!(stats.score, -200);
    assert_eq!(stats.accuracy, 0);
    assert!(session.state().queue.is_empty());

    let events = session.drain_events();
    assert_eq!(
        count_events(&events, |e| matches!(e, ShiftEvent::GameOver { .. })),
        1
    );

    // Nothing moves after the end
    assert_eq!(session.advance_seconds(60), 0);
    assert!(session.drain_events().is_empty());
    assert!(matches!(session.give_up(), Err(TriageError::ShiftOver)));
}

#[test]
fn test_efficient_character_gets_longer_shift() {
    let session = started(Character::Efficient, Difficulty::Hard, quiet_config());
    assert_eq!(session.state().remaining_secs, 72);
}

#[test]
fn test_seeded_shift_replays_identically() {
    let play = |seed| {
        let mut session =
            ShiftSession::new(Character::Empath, Difficulty::Medium, ShiftConfig::default(), seed)
                .unwrap();
        session.start();
        let mut pilot = Autopilot::with_seed(seed);
        while !session.is_over() {
            pilot.act(&mut session);
            session.advance_seconds(1);
        }
        session.final_stats().unwrap().clone()
    };
    assert_eq!(play(42), play(42));
}
