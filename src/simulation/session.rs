//! Shift session - the controller a front end talks to
//!
//! Owns the state, the timer queue and the random stream for one shift.
//! Player operations and timer tasks all run on the caller's thread; every
//! visible change is buffered as a `ShiftEvent` until drained.
//!
//! Time only moves through `advance`. While a dilemma is pending or after
//! the shift has ended it does not move at all, so no timer fires.

use ahash::AHashMap;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::core::config::{Character, Difficulty, ShiftConfig};
use crate::core::error::{Result, TriageError};
use crate::core::types::{BedId, PatientId, Priority, SimTime, StaffId, MILLIS_PER_SECOND};
use crate::hospital::BedStatus;
use crate::simulation::allocation::{assign_patient_to_bed, Assignment};
use crate::simulation::clock::{finalize_shift, tick_clock};
use crate::simulation::dilemma::{DilemmaDeck, DilemmaEngine, DilemmaOutcome, DilemmaScenario};
use crate::simulation::events::ShiftEvent;
use crate::simulation::outcome::resolve_treatment;
use crate::simulation::scheduler::{Scheduler, Task, TimerId};
use crate::simulation::state::{FinalStats, ShiftState};
use crate::triage::{generate_patient, ConditionCatalog, Patient};

pub struct ShiftSession {
    config: ShiftConfig,
    catalog: ConditionCatalog,
    dilemmas: DilemmaEngine,
    state: ShiftState,
    scheduler: Scheduler,
    rng: ChaCha8Rng,
    events: Vec<ShiftEvent>,
    /// Pending completion timer for each occupied bed
    treatment_timers: AHashMap<BedId, TimerId>,
    final_stats: Option<FinalStats>,
    started: bool,
}

impl ShiftSession {
    /// Build a fresh shift. Restarting means building another one.
    pub fn new(
        character: Character,
        difficulty: Difficulty,
        config: ShiftConfig,
        seed: u64,
    ) -> Result<Self> {
        config.validate()?;
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let state = ShiftState::new(character, difficulty, &config, &mut rng);

        Ok(Self {
            config,
            catalog: ConditionCatalog::with_defaults(),
            dilemmas: DilemmaEngine::default(),
            state,
            scheduler: Scheduler::new(),
            rng,
            events: Vec::new(),
            treatment_timers: AHashMap::new(),
            final_stats: None,
            started: false,
        })
    }

    pub fn with_catalog(mut self, catalog: ConditionCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn with_dilemmas(mut self, deck: DilemmaDeck) -> Self {
        self.dilemmas = DilemmaEngine::new(deck);
        self
    }

    /// Open the shift: seed the waiting room and start the periodic timers
    pub fn start(&mut self) {
        if self.started {
            return;
        }
        self.started = true;

        for _ in 0..self.config.initial_patients {
            self.generate_arrival();
        }

        self.scheduler.schedule_repeating(MILLIS_PER_SECOND, Task::ShiftTick);
        let period = self.config.generation_period_secs(self.state.difficulty) as SimTime;
        self.scheduler
            .schedule_repeating(period * MILLIS_PER_SECOND, Task::GeneratePatient);

        self.events.push(ShiftEvent::ShiftTick {
            remaining_secs: self.state.remaining_secs,
        });

        tracing::info!(
            "Shift started: {} on {} ({}s, {} beds, {} staff)",
            self.state.character.display_name(),
            self.state.difficulty,
            self.state.remaining_secs,
            self.state.ward.len(),
            self.state.staff.len()
        );
    }

    pub fn state(&self) -> &ShiftState {
        &self.state
    }

    pub fn config(&self) -> &ShiftConfig {
        &self.config
    }

    pub fn catalog(&self) -> &ConditionCatalog {
        &self.catalog
    }

    /// Simulated milliseconds since the shift opened
    pub fn now(&self) -> SimTime {
        self.scheduler.now()
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn is_over(&self) -> bool {
        self.state.game_over
    }

    pub fn is_paused(&self) -> bool {
        self.state.paused
    }

    pub fn final_stats(&self) -> Option<&FinalStats> {
        self.final_stats.as_ref()
    }

    /// Take every notification produced since the last drain
    pub fn drain_events(&mut self) -> Vec<ShiftEvent> {
        std::mem::take(&mut self.events)
    }

    // === WAITING ROOM ===

    pub fn patient(&self, id: PatientId) -> Option<&Patient> {
        self.state.queue.get(id)
    }

    /// Put a prepared patient in the waiting room
    ///
    /// Scripted arrivals are not limited by the queue capacity, which only
    /// throttles generation.
    pub fn admit(&mut self, patient: Patient) -> Result<PatientId> {
        if self.state.game_over {
            return Err(TriageError::ShiftOver);
        }
        let id = self.state.queue.enqueue(patient);
        self.push_queue_changed();
        Ok(id)
    }

    pub fn select_patient(&mut self, id: PatientId) -> Result<&Patient> {
        if self.state.game_over {
            return Err(TriageError::ShiftOver);
        }
        let patient = self
            .state
            .queue
            .get(id)
            .ok_or(TriageError::PatientNotFound(id))?;
        self.state.selected_patient = Some(id);
        Ok(patient)
    }

    pub fn selected_patient(&self) -> Option<&Patient> {
        self.state
            .selected_patient
            .and_then(|id| self.state.queue.get(id))
    }

    /// Record the player's triage level for a waiting patient
    pub fn assign_priority(&mut self, id: PatientId, level: u8) -> Result<()> {
        self.check_can_act()?;
        let priority = Priority::new(level).ok_or(TriageError::InvalidPriority(level))?;
        self.state.queue.assign_priority(id, priority)?;
        self.events.push(ShiftEvent::PriorityAssigned {
            patient: id,
            priority,
        });
        Ok(())
    }

    // === TREATMENT ===

    /// Move a triaged patient into the first empty bed with `staff`
    pub fn request_assignment(&mut self, patient: PatientId, staff: StaffId) -> Result<Assignment> {
        self.assign(Some(patient), Some(staff))
    }

    /// Assign the currently selected patient
    pub fn assign_selected(&mut self, staff: Option<StaffId>) -> Result<Assignment> {
        self.assign(self.state.selected_patient, staff)
    }

    fn assign(&mut self, patient: Option<PatientId>, staff: Option<StaffId>) -> Result<Assignment> {
        self.check_can_act()?;
        let now = self.now();
        let assignment =
            match assign_patient_to_bed(&mut self.state, &self.config, patient, staff, now) {
                Ok(assignment) => assignment,
                Err(e) => {
                    tracing::warn!("Assignment rejected: {}", e);
                    return Err(e);
                }
            };

        let timer = self.scheduler.schedule_after(
            assignment.treatment_ms,
            Task::TreatmentComplete {
                bed: assignment.bed,
            },
        );
        self.treatment_timers.insert(assignment.bed, timer);

        tracing::debug!(
            "Assigned {:?} to {} with {:?} ({} points, {}ms)",
            assignment.patient,
            assignment.bed,
            assignment.staff,
            assignment.points,
            assignment.treatment_ms
        );

        self.push_queue_changed();
        self.events.push(ShiftEvent::PatientAssigned {
            patient: assignment.patient,
            staff: assignment.staff,
            bed: assignment.bed,
            accurate: assignment.accurate,
            treatment_ms: assignment.treatment_ms,
        });
        self.push_bed_changed(assignment.bed);
        self.events.push(ShiftEvent::ScoreDelta {
            amount: assignment.points,
        });
        Ok(assignment)
    }

    // === DILEMMAS ===

    pub fn pending_dilemma(&self) -> Option<&DilemmaScenario> {
        self.dilemmas.pending()
    }

    /// Raise a dilemma now if one is allowed
    pub fn trigger_dilemma(&mut self) -> Option<&DilemmaScenario> {
        let raised = self
            .dilemmas
            .raise(&mut self.state, &self.config, &mut self.rng)
            .is_some();
        if raised {
            self.announce_dilemma();
        }
        self.dilemmas.pending()
    }

    fn announce_dilemma(&mut self) {
        if let Some(scenario) = self.dilemmas.pending() {
            tracing::info!(
                "Dilemma {} of {} raised: {}",
                self.state.dilemma_count,
                self.config.max_dilemmas,
                scenario.text
            );
            self.events.push(ShiftEvent::DilemmaRaised {
                text: scenario.text.clone(),
                choices: scenario.choice_texts(),
            });
        }
    }

    /// Apply the player's choice for the pending dilemma and resume
    pub fn resolve_dilemma(&mut self, choice: usize) -> Result<DilemmaOutcome> {
        if self.state.game_over {
            return Err(TriageError::ShiftOver);
        }
        let now = self.now();
        let outcome = self
            .dilemmas
            .resolve(&mut self.state, choice, now, &mut self.rng)?;

        for freed in &outcome.freed {
            if let Some(timer) = self.treatment_timers.remove(&freed.bed) {
                self.scheduler.cancel(timer);
            }
            if outcome.mark_deceased {
                let delay = self.config.deceased_clear_secs as SimTime * MILLIS_PER_SECOND;
                self.scheduler
                    .schedule_after(delay, Task::ClearDeceasedBed { bed: freed.bed });
            }
            self.push_bed_changed(freed.bed);
        }

        for &bed in &outcome.crisis_beds {
            let delay = self.config.crisis_victim_secs as SimTime * MILLIS_PER_SECOND;
            let timer = self
                .scheduler
                .schedule_after(delay, Task::CrisisVictimComplete { bed });
            self.treatment_timers.insert(bed, timer);
            // Freed and refilled in the same step; report the final state once
            if !outcome.freed.iter().any(|f| f.bed == bed) {
                self.push_bed_changed(bed);
            }
        }

        tracing::info!(
            "Dilemma resolved with \"{}\": {} beds freed, {} crisis victims, {:+} points",
            outcome.text,
            outcome.freed.len(),
            outcome.crisis_beds.len(),
            outcome.score_delta
        );

        if outcome.score_delta != 0 {
            self.events.push(ShiftEvent::ScoreDelta {
                amount: outcome.score_delta,
            });
        }
        self.events.push(ShiftEvent::DilemmaResolved {
            choice,
            text: outcome.text.clone(),
        });
        Ok(outcome)
    }

    // === TIME ===

    /// Run the shift forward by `ms` simulated milliseconds
    ///
    /// Stops early if a dilemma pauses the shift or the shift ends; the rest
    /// of the interval is dropped. Returns the time that actually elapsed.
    pub fn advance(&mut self, ms: SimTime) -> SimTime {
        if !self.started || self.state.game_over || self.state.paused {
            return 0;
        }
        let start = self.now();
        let target = start + ms;

        while let Some((_, task)) = self.scheduler.pop_due(target) {
            self.run_task(task);
            if self.state.game_over || self.state.paused {
                return self.now() - start;
            }
        }
        self.scheduler.advance_to(target);
        ms
    }

    pub fn advance_seconds(&mut self, secs: u32) -> SimTime {
        self.advance(secs as SimTime * MILLIS_PER_SECOND)
    }

    /// Advance until the shift ends or a dilemma pauses it
    pub fn run_to_end(&mut self) {
        while self.started && !self.state.game_over && !self.state.paused {
            let remaining = self.state.remaining_secs.max(1) as SimTime * MILLIS_PER_SECOND;
            if self.advance(remaining) == 0 {
                break;
            }
        }
    }

    /// End the shift now with the normal end-of-shift accounting
    pub fn give_up(&mut self) -> Result<FinalStats> {
        if self.state.game_over {
            return Err(TriageError::ShiftOver);
        }
        tracing::info!("Shift abandoned with {}s remaining", self.state.remaining_secs);
        self.finish();
        self.final_stats.clone().ok_or(TriageError::ShiftOver)
    }

    fn run_task(&mut self, task: Task) {
        match task {
            Task::ShiftTick => self.on_shift_tick(),
            Task::GeneratePatient => self.on_generate(),
            Task::TreatmentComplete { bed } | Task::CrisisVictimComplete { bed } => {
                self.on_treatment_complete(bed)
            }
            Task::ClearDeceasedBed { bed } => {
                if self.state.ward.clear(bed) {
                    self.push_bed_changed(bed);
                }
            }
        }
    }

    fn on_shift_tick(&mut self) {
        let tick = tick_clock(&mut self.state, &mut self.rng);
        if !tick.ticked {
            return;
        }
        for escalation in tick.escalations {
            tracing::debug!(
                "Patient {:?} deteriorated {} -> {}",
                escalation.patient,
                escalation.from,
                escalation.to
            );
            self.events.push(ShiftEvent::PatientDeteriorated {
                patient: escalation.patient,
                from: escalation.from,
                to: escalation.to,
            });
        }
        self.events.push(ShiftEvent::ShiftTick {
            remaining_secs: self.state.remaining_secs,
        });
        if tick.expired {
            tracing::info!("Shift time expired");
            self.finish();
        }
    }

    fn on_generate(&mut self) {
        if self.state.paused || self.state.game_over {
            return;
        }
        if self.generate_arrival().is_none() {
            return;
        }
        let raised = self
            .dilemmas
            .roll(&mut self.state, &self.config, &mut self.rng)
            .is_some();
        if raised {
            self.announce_dilemma();
        }
    }

    /// Generate one patient unless the waiting room is full
    fn generate_arrival(&mut self) -> Option<PatientId> {
        if self.state.queue.is_full() {
            return None;
        }
        let patient = generate_patient(
            &self.catalog,
            self.state.comfort_bonus,
            self.now(),
            &mut self.rng,
        );
        tracing::debug!(
            "{} arrived with {} (priority {})",
            patient.name,
            patient.condition,
            patient.actual_priority
        );
        let id = self.state.queue.enqueue(patient);
        self.push_queue_changed();
        Some(id)
    }

    fn on_treatment_complete(&mut self, bed: BedId) {
        self.treatment_timers.remove(&bed);
        let now = self.now();
        let Some(result) = resolve_treatment(&mut self.state, &self.config, bed, now, &mut self.rng)
        else {
            return;
        };

        tracing::debug!(
            "{} in {} {}",
            result.patient_name,
            bed,
            if result.survived { "survived" } else { "died" }
        );

        self.push_bed_changed(bed);
        self.events.push(ShiftEvent::TreatmentResolved {
            bed,
            patient_name: result.patient_name,
            survived: result.survived,
        });
        self.events.push(ShiftEvent::ScoreDelta {
            amount: result.points,
        });
    }

    /// Finalise exactly once and stop every timer
    fn finish(&mut self) {
        let had_waiting = !self.state.queue.is_empty();
        let Some(stats) = finalize_shift(&mut self.state, &self.config) else {
            return;
        };
        self.scheduler.cancel_all();
        self.treatment_timers.clear();
        self.dilemmas.abandon(&mut self.state);

        tracing::info!(
            "Shift over: score {}, saved {}, lost {} ({} untriaged), accuracy {}%",
            stats.score,
            stats.saved,
            stats.lost,
            stats.untriaged,
            stats.accuracy
        );

        if had_waiting {
            self.push_queue_changed();
        }
        self.events.push(ShiftEvent::GameOver {
            stats: stats.clone(),
        });
        self.final_stats = Some(stats);
    }

    fn check_can_act(&self) -> Result<()> {
        if self.state.game_over {
            return Err(TriageError::ShiftOver);
        }
        if self.state.dilemma_active {
            return Err(TriageError::DilemmaPending);
        }
        Ok(())
    }

    fn push_queue_changed(&mut self) {
        self.events.push(ShiftEvent::QueueChanged {
            patients: self.state.queue.ids(),
        });
    }

    fn push_bed_changed(&mut self, bed: BedId) {
        if let Some(b) = self.state.ward.get(bed) {
            let status: BedStatus = b.state.status();
            self.events.push(ShiftEvent::BedStateChanged {
                bed,
                status,
                patient_name: b.state.patient_name().map(str::to_string),
            });
        }
    }
}
