//! Timer state structures: run state, configured duration and time accounting

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle state of the countdown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunState {
    #[default]
    Idle,
    Running,
    Paused,
    Completed,
}

impl RunState {
    /// String form used by the persisted session
    pub fn as_str(&self) -> &'static str {
        match self {
            RunState::Idle => "idle",
            RunState::Running => "running",
            RunState::Paused => "paused",
            RunState::Completed => "completed",
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self, RunState::Running)
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RunState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "idle" => Ok(RunState::Idle),
            "running" => Ok(RunState::Running),
            "paused" => Ok(RunState::Paused),
            "completed" => Ok(RunState::Completed),
            other => Err(format!("Unknown timer state: {}", other)),
        }
    }
}

/// Configured countdown length, kept in the same units the user picks it in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TimerDuration {
    pub hours: u32,
    pub minutes: u32,
    pub seconds: u32,
}

impl TimerDuration {
    pub fn new(hours: u32, minutes: u32, seconds: u32) -> Self {
        Self {
            hours,
            minutes,
            seconds,
        }
    }

    /// Total length in whole seconds
    pub fn total_seconds(&self) -> u64 {
        u64::from(self.hours) * 3600 + u64::from(self.minutes) * 60 + u64::from(self.seconds)
    }

    pub fn is_zero(&self) -> bool {
        self.total_seconds() == 0
    }
}

/// Elapsed-time bookkeeping for the current session.
///
/// Time from finished run segments is banked in `accumulated_seconds`. While the
/// timer runs, `segment_start` marks the beginning of the unbanked segment; it is
/// `Some` exactly when the owning engine is in [`RunState::Running`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimeAccount {
    accumulated_seconds: f64,
    segment_start: Option<DateTime<Utc>>,
}

impl TimeAccount {
    /// Account holding banked time and no open segment
    pub fn banked(accumulated_seconds: f64) -> Self {
        Self {
            accumulated_seconds: accumulated_seconds.max(0.0),
            segment_start: None,
        }
    }

    pub fn accumulated_seconds(&self) -> f64 {
        self.accumulated_seconds
    }

    pub fn is_segment_open(&self) -> bool {
        self.segment_start.is_some()
    }

    /// Banked time plus the open segment measured up to `now`
    pub fn elapsed_seconds(&self, now: DateTime<Utc>) -> f64 {
        match self.segment_start {
            Some(start) => self.accumulated_seconds + segment_seconds(start, now),
            None => self.accumulated_seconds,
        }
    }

    /// Open a new segment at `now`, keeping banked time
    pub fn open_segment(&mut self, now: DateTime<Utc>) {
        self.segment_start = Some(now);
    }

    /// Close the open segment, banking everything elapsed up to `now`
    pub fn close_segment(&mut self, now: DateTime<Utc>) {
        self.accumulated_seconds = self.elapsed_seconds(now);
        self.segment_start = None;
    }

    /// Close any open segment and bank exactly `seconds`
    pub fn settle(&mut self, seconds: f64) {
        self.accumulated_seconds = seconds.max(0.0);
        self.segment_start = None;
    }

    pub fn clear(&mut self) {
        self.settle(0.0);
    }
}

/// Seconds between two wall-clock instants; a clock stepping backwards counts as zero
fn segment_seconds(start: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    let millis = now.signed_duration_since(start).num_milliseconds();
    if millis <= 0 {
        0.0
    } else {
        millis as f64 / 1000.0
    }
}
