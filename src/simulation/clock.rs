//! Shift clock
//!
//! One tick per simulated second: count down, roll deterioration for everyone
//! still waiting, and close the shift when time runs out.

use rand::Rng;

use crate::core::config::ShiftConfig;
use crate::simulation::state::{FinalStats, ShiftState};
use crate::triage::Escalation;

/// What one clock tick did
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClockTick {
    /// False when paused or already at zero
    pub ticked: bool,
    pub escalations: Vec<Escalation>,
    /// Remaining time reached zero on this tick
    pub expired: bool,
}

/// Advance the clock by one second
pub fn tick_clock<R: Rng + ?Sized>(state: &mut ShiftState, rng: &mut R) -> ClockTick {
    if state.paused || state.game_over || state.remaining_secs == 0 {
        return ClockTick::default();
    }

    state.remaining_secs -= 1;
    let escalations = state.queue.deteriorate_all(rng);

    ClockTick {
        ticked: true,
        escalations,
        expired: state.remaining_secs == 0,
    }
}

/// Close the shift
///
/// Everyone still waiting counts as lost and costs the untriaged penalty.
/// Returns None if the shift was already closed.
pub fn finalize_shift(state: &mut ShiftState, config: &ShiftConfig) -> Option<FinalStats> {
    if state.game_over {
        return None;
    }

    let untriaged = state.queue.drain().len() as u32;
    state.lost_count += untriaged;
    state.score -= untriaged as i64 * config.untriaged_penalty;
    state.selected_patient = None;
    state.game_over = true;
    state.paused = true;

    Some(state.final_stats(untriaged))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::{Character, Difficulty};
    use crate::core::types::Priority;
    use crate::triage::{generate_patient, ConditionCatalog};
    use rand::rngs::mock::StepRng;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn state() -> (ShiftState, ShiftConfig, ChaCha8Rng) {
        let mut rng = ChaCha8Rng::seed_from_u64(81);
        let config = ShiftConfig::default();
        let state = ShiftState::new(Character::Veteran, Difficulty::Hard, &config, &mut rng);
        (state, config, rng)
    }

    #[test]
    fn test_tick_counts_down_to_expiry() {
        let (mut state, _, mut rng) = state();
        assert_eq!(state.remaining_secs, 60);

        for _ in 0..59 {
            let tick = tick_clock(&mut state, &mut rng);
            assert!(tick.ticked);
            assert!(!tick.expired);
        }
        let tick = tick_clock(&mut state, &mut rng);
        assert!(tick.expired);
        assert_eq!(state.remaining_secs, 0);

        // Nothing moves once at zero
        assert_eq!(tick_clock(&mut state, &mut rng), ClockTick::default());
    }

    #[test]
    fn test_paused_clock_does_not_move() {
        let (mut state, _, mut rng) = state();
        state.paused = true;
        let tick = tick_clock(&mut state, &mut rng);
        assert!(!tick.ticked);
        assert_eq!(state.remaining_secs, 60);
    }

    #[test]
    fn test_tick_deteriorates_waiting_patients() {
        let (mut state, _, mut rng) = state();
        let mut patient = generate_patient(&ConditionCatalog::with_defaults(), 0.0, 0, &mut rng);
        patient.actual_priority = Priority::STABLE;
        let id = state.queue.enqueue(patient);

        // A zero roll is always under the rate
        let mut zero = StepRng::new(0, 0);
        let tick = tick_clock(&mut state, &mut zero);
        assert_eq!(tick.escalations.len(), 1);
        assert_eq!(tick.escalations[0].to, Priority::SERIOUS);
        assert_eq!(state.queue.get(id).unwrap().actual_priority, Priority::SERIOUS);
    }

    #[test]
    fn test_finalize_charges_untriaged_once() {
        let (mut state, config, mut rng) = state();
        let catalog = ConditionCatalog::with_defaults();
        for _ in 0..2 {
            state.queue.enqueue(generate_patient(&catalog, 0.0, 0, &mut rng));
        }
        state.score = 500;
        state.lost_count = 1;

        let stats = finalize_shift(&mut state, &config).unwrap();
        assert_eq!(stats.untriaged, 2);
        assert_eq!(stats.lost, 3);
        assert_eq!(stats.score, 300);
        assert!(state.queue.is_empty());
        assert!(state.game_over);
        assert!(state.paused);

        assert!(finalize_shift(&mut state, &config).is_none());
        assert_eq!(state.score, 300);
        assert_eq!(state.lost_count, 3);
    }
}
