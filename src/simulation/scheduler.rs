//! Timer queue for the shift
//!
//! All timed work (clock ticks, patient arrivals, treatment completions and
//! dilemma bed recovery) is a task in one queue on one thread. Tasks fire in
//! (due time, scheduling order), so a seeded shift replays identically.
//! Handles allow any pending task to be cancelled.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::BinaryHeap;

use crate::core::types::{BedId, SimTime};

/// Handle to a scheduled task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimerId(pub u64);

/// Work the session performs when a timer fires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Task {
    /// One-second shift clock
    ShiftTick,
    /// Periodic patient arrival
    GeneratePatient,
    TreatmentComplete { bed: BedId },
    /// Synthetic dilemma patient finishes treatment
    CrisisVictimComplete { bed: BedId },
    /// Bed marked deceased by a dilemma returns to empty
    ClearDeceasedBed { bed: BedId },
}

#[derive(Debug, Clone)]
struct Entry {
    task: Task,
    /// Repeat period; None for one-shot tasks
    period: Option<SimTime>,
    /// Sequence of the live heap slot for this timer
    seq: u64,
}

#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    now: SimTime,
    /// (due, seq, id); slots whose seq no longer matches `live` are stale
    heap: BinaryHeap<Reverse<(SimTime, u64, u64)>>,
    live: AHashMap<u64, Entry>,
    next_id: u64,
    next_seq: u64,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> SimTime {
        self.now
    }

    /// Number of live (uncancelled) timers
    pub fn pending(&self) -> usize {
        self.live.len()
    }

    pub fn is_scheduled(&self, id: TimerId) -> bool {
        self.live.contains_key(&id.0)
    }

    /// Fire `task` once, `delay` ms from now
    pub fn schedule_after(&mut self, delay: SimTime, task: Task) -> TimerId {
        self.insert(delay, task, None)
    }

    /// Fire `task` every `period` ms, first after one period
    pub fn schedule_repeating(&mut self, period: SimTime, task: Task) -> TimerId {
        let period = period.max(1);
        self.insert(period, task, Some(period))
    }

    fn insert(&mut self, delay: SimTime, task: Task, period: Option<SimTime>) -> TimerId {
        let id = self.next_id;
        self.next_id += 1;
        let seq = self.push_slot(self.now + delay, id);
        self.live.insert(id, Entry { task, period, seq });
        TimerId(id)
    }

    fn push_slot(&mut self, due: SimTime, id: u64) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Reverse((due, seq, id)));
        seq
    }

    /// Cancel a pending timer; false if it already fired or was cancelled
    pub fn cancel(&mut self, id: TimerId) -> bool {
        self.live.remove(&id.0).is_some()
    }

    pub fn cancel_all(&mut self) {
        self.live.clear();
        self.heap.clear();
    }

    /// Due time of the earliest live timer
    pub fn next_due(&mut self) -> Option<SimTime> {
        self.discard_stale();
        self.heap.peek().map(|Reverse((due, _, _))| *due)
    }

    fn discard_stale(&mut self) {
        while let Some(&Reverse((_, seq, id))) = self.heap.peek() {
            match self.live.get(&id) {
                Some(entry) if entry.seq == seq => break,
                _ => {
                    self.heap.pop();
                }
            }
        }
    }

    /// Pop the earliest task due at or before `until`, moving the clock to it
    ///
    /// Repeating tasks are re-armed one period after their due time.
    pub fn pop_due(&mut self, until: SimTime) -> Option<(TimerId, Task)> {
        self.discard_stale();
        let Reverse((due, _, id)) = *self.heap.peek()?;
        if due > until {
            return None;
        }
        self.heap.pop();
        self.now = self.now.max(due);

        let entry = self.live.get(&id)?.clone();
        match entry.period {
            Some(period) => {
                let seq = self.push_slot(due + period, id);
                if let Some(live) = self.live.get_mut(&id) {
                    live.seq = seq;
                }
            }
            None => {
                self.live.remove(&id);
            }
        }
        Some((TimerId(id), entry.task))
    }

    /// Move the clock forward without firing anything
    pub fn advance_to(&mut self, time: SimTime) {
        self.now = self.now.max(time);
    }
}
