//! Persisted session snapshot and lifetime statistics

use serde::{Deserialize, Serialize};

use super::{RunState, TimerDuration};

/// Lifetime completion statistics, never decreased and never cleared by reset
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Statistics {
    pub rounds_completed: u64,
    /// Sum of every fully completed duration, in seconds
    pub total_elapsed_time: f64,
}

impl Statistics {
    pub fn new(rounds_completed: u64, total_elapsed_time: f64) -> Self {
        Self {
            rounds_completed,
            total_elapsed_time,
        }
    }

    /// Fold in totals recorded elsewhere
    pub fn absorb(&mut self, other: Statistics) {
        self.rounds_completed += other.rounds_completed;
        self.total_elapsed_time += other.total_elapsed_time;
    }

    /// Count one finished round of `seconds` length
    pub fn record_completion(&mut self, seconds: u64) {
        self.rounds_completed += 1;
        self.total_elapsed_time += seconds as f64;
    }
}

/// Snapshot of an in-flight session as handed to the store
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PersistedSession {
    pub hours: u32,
    pub minutes: u32,
    pub seconds: u32,
    pub accumulated_seconds: f64,
    pub run_state: RunState,
}

impl PersistedSession {
    pub fn new(duration: TimerDuration, accumulated_seconds: f64, run_state: RunState) -> Self {
        Self {
            hours: duration.hours,
            minutes: duration.minutes,
            seconds: duration.seconds,
            accumulated_seconds,
            run_state,
        }
    }

    pub fn duration(&self) -> TimerDuration {
        TimerDuration::new(self.hours, self.minutes, self.seconds)
    }

    /// State to resume in after a process restart.
    ///
    /// A running segment cannot be trusted across a restart, so it comes back paused.
    pub fn restored_state(&self) -> RunState {
        match self.run_state {
            RunState::Running => RunState::Paused,
            other => other,
        }
    }
}
