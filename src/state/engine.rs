//! Countdown state machine and time accounting

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use super::{PersistedSession, RunState, Statistics, TimeAccount, TimerDuration};
use crate::{
    services::{CompletionEffect, SessionStore},
    utils::format_clock,
};

/// What caused a [`TimerEvent`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerAction {
    Configured,
    Started,
    Paused,
    Reset,
    Completed,
    Restored,
}

/// Notification sent to subscribers after every state-affecting transition
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimerEvent {
    pub action: TimerAction,
    pub state: RunState,
    pub at: DateTime<Utc>,
}

/// Point-in-time view of the engine, everything a presentation layer renders
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerSnapshot {
    pub state: RunState,
    pub hours: u32,
    pub minutes: u32,
    pub seconds: u32,
    pub total_seconds: u64,
    pub elapsed_seconds: f64,
    pub remaining_seconds: f64,
    pub progress: f64,
    pub progress_percent: u8,
    pub time_string: String,
    pub elapsed_string: String,
    pub rounds_completed: u64,
    pub total_elapsed_time: f64,
    pub formatted_total_elapsed_time: String,
    pub alarm: bool,
}

/// Single-session countdown timer.
///
/// All methods are synchronous and take the current wall-clock time explicitly,
/// so whatever drives the engine decides where "now" comes from. Commands that
/// the current state does not permit are ignored and report `false`.
pub struct TimerEngine {
    duration: TimerDuration,
    state: RunState,
    account: TimeAccount,
    statistics: Statistics,
    /// False while the durable statistics are unknown; `statistics` then only
    /// counts completions since startup
    statistics_loaded: bool,
    store: Box<dyn SessionStore>,
    effect: Box<dyn CompletionEffect>,
    events: broadcast::Sender<TimerEvent>,
}

impl std::fmt::Debug for TimerEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimerEngine")
            .field("duration", &self.duration)
            .field("state", &self.state)
            .field("account", &self.account)
            .field("statistics", &self.statistics)
            .finish_non_exhaustive()
    }
}

impl TimerEngine {
    /// Create an idle engine, reading lifetime statistics from the store
    pub fn new(store: Box<dyn SessionStore>, effect: Box<dyn CompletionEffect>) -> Self {
        let (statistics, statistics_loaded) = match store.load_statistics() {
            Ok(statistics) => (statistics, true),
            Err(e) => {
                warn!("Failed to load statistics, counting from zero until the store recovers: {}", e);
                (Statistics::default(), false)
            }
        };
        let (events, _) = broadcast::channel(64);

        Self {
            duration: TimerDuration::default(),
            state: RunState::Idle,
            account: TimeAccount::default(),
            statistics,
            statistics_loaded,
            store,
            effect,
            events,
        }
    }

    /// Create an engine and restore whatever session the store holds
    pub fn restore(store: Box<dyn SessionStore>, effect: Box<dyn CompletionEffect>) -> Self {
        let mut engine = Self::new(store, effect);
        engine.load(Utc::now());
        engine
    }

    /// Restore the persisted session, if any.
    ///
    /// A session saved while running comes back paused with only its banked time.
    pub fn load(&mut self, now: DateTime<Utc>) -> bool {
        let session = match self.store.load_session() {
            Ok(Some(session)) => session,
            Ok(None) => {
                debug!("No persisted session to restore");
                return false;
            }
            Err(e) => {
                warn!("Failed to load persisted session, starting idle: {}", e);
                return false;
            }
        };

        self.duration = session.duration();
        self.account = TimeAccount::banked(session.accumulated_seconds);
        self.state = session.restored_state();
        info!(
            "Restored {} session: {}s configured, {:.1}s elapsed",
            self.state,
            self.duration.total_seconds(),
            self.account.accumulated_seconds()
        );
        self.notify(TimerAction::Restored, now);
        true
    }

    /// Subscribe to transition notifications
    pub fn subscribe(&self) -> broadcast::Receiver<TimerEvent> {
        self.events.subscribe()
    }

    /// Change the configured duration; refused while running
    pub fn configure(&mut self, hours: u32, minutes: u32, seconds: u32, now: DateTime<Utc>) -> bool {
        if self.state.is_running() {
            debug!("Ignoring configure while running");
            return false;
        }

        self.duration = TimerDuration::new(hours, minutes, seconds);
        if self.state == RunState::Completed {
            // A finished countdown shows as finished under any duration
            self.account.settle(self.duration.total_seconds() as f64);
        }
        info!("Timer configured to {}", format_clock(self.duration.total_seconds() as f64));
        if self.has_session() {
            self.save_session();
        }
        self.notify(TimerAction::Configured, now);
        true
    }

    /// Start or resume the countdown
    pub fn start(&mut self, now: DateTime<Utc>) -> bool {
        if self.duration.is_zero() {
            debug!("Ignoring start with zero duration");
            return false;
        }

        match self.state {
            RunState::Idle | RunState::Completed => self.account.clear(),
            RunState::Paused => {}
            RunState::Running => {
                debug!("Ignoring start while already running");
                return false;
            }
        }

        self.account.open_segment(now);
        self.state = RunState::Running;
        info!(
            "Timer started: {:.1}s of {}s already elapsed",
            self.account.accumulated_seconds(),
            self.duration.total_seconds()
        );
        self.save_session();
        self.notify(TimerAction::Started, now);
        true
    }

    /// Pause a running countdown, banking the time elapsed so far
    pub fn pause(&mut self, now: DateTime<Utc>) -> bool {
        if !self.state.is_running() {
            debug!("Ignoring pause while {}", self.state);
            return false;
        }

        self.account.close_segment(now);
        self.state = RunState::Paused;
        info!("Timer paused at {:.1}s elapsed", self.account.accumulated_seconds());
        self.save_session();
        self.notify(TimerAction::Paused, now);
        true
    }

    /// Return to idle from any state; statistics are kept
    pub fn reset(&mut self, now: DateTime<Utc>) {
        self.account.clear();
        self.state = RunState::Idle;
        info!("Timer reset");
        self.clear_session();
        self.notify(TimerAction::Reset, now);
    }

    /// Periodic sample while running.
    ///
    /// Completion is detected by comparing wall-clock elapsed time against the
    /// total, so late or missed ticks still complete the countdown exactly once.
    /// Returns `true` only on the tick that completes it.
    pub fn tick(&mut self, now: DateTime<Utc>) -> bool {
        if !self.state.is_running() {
            return false;
        }

        let total = self.duration.total_seconds();
        if self.elapsed_seconds(now) < total as f64 {
            return false;
        }

        self.account.settle(total as f64);
        self.state = RunState::Completed;
        self.statistics.record_completion(total);
        info!(
            "Timer completed: round {} finished, {} total",
            self.statistics.rounds_completed,
            format_clock(self.statistics.total_elapsed_time)
        );

        self.effect.play();
        self.clear_session();
        self.save_statistics();
        self.notify(TimerAction::Completed, now);
        true
    }

    /// Persist the current session as-is; used on shutdown so a running
    /// countdown resumes paused at its latest elapsed time
    pub fn checkpoint(&mut self, now: DateTime<Utc>) {
        if !self.has_session() {
            return;
        }
        let accumulated = self.elapsed_seconds(now);
        self.persist(PersistedSession::new(self.duration, accumulated, self.state));
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn duration(&self) -> TimerDuration {
        self.duration
    }

    pub fn total_seconds(&self) -> u64 {
        self.duration.total_seconds()
    }

    pub fn elapsed_seconds(&self, now: DateTime<Utc>) -> f64 {
        self.account.elapsed_seconds(now)
    }

    pub fn remaining_seconds(&self, now: DateTime<Utc>) -> f64 {
        (self.total_seconds() as f64 - self.elapsed_seconds(now)).max(0.0)
    }

    /// Fraction of the duration elapsed, in `[0, 1]`; zero for a zero duration
    pub fn progress(&self, now: DateTime<Utc>) -> f64 {
        let total = self.total_seconds();
        if total == 0 {
            return 0.0;
        }
        (self.elapsed_seconds(now) / total as f64).clamp(0.0, 1.0)
    }

    /// Whole percent elapsed, computed on milliseconds so exact percentages
    /// are not lost to float rounding
    pub fn progress_percent(&self, now: DateTime<Utc>) -> u8 {
        let total_ms = self.total_seconds() * 1000;
        if total_ms == 0 {
            return 0;
        }
        let elapsed_ms = (self.elapsed_seconds(now) * 1000.0).round() as u64;
        (elapsed_ms.min(total_ms) * 100 / total_ms) as u8
    }

    pub fn time_string(&self, now: DateTime<Utc>) -> String {
        format_clock(self.remaining_seconds(now))
    }

    pub fn elapsed_string(&self, now: DateTime<Utc>) -> String {
        format_clock(self.elapsed_seconds(now))
    }

    pub fn rounds_completed(&self) -> u64 {
        self.statistics.rounds_completed
    }

    pub fn total_elapsed_time(&self) -> f64 {
        self.statistics.total_elapsed_time
    }

    pub fn formatted_total_elapsed_time(&self) -> String {
        format_clock(self.statistics.total_elapsed_time)
    }

    pub fn statistics(&self) -> Statistics {
        self.statistics
    }

    pub fn snapshot(&self, now: DateTime<Utc>) -> TimerSnapshot {
        let progress = self.progress(now);
        TimerSnapshot {
            state: self.state,
            hours: self.duration.hours,
            minutes: self.duration.minutes,
            seconds: self.duration.seconds,
            total_seconds: self.total_seconds(),
            elapsed_seconds: self.elapsed_seconds(now),
            remaining_seconds: self.remaining_seconds(now),
            progress,
            progress_percent: self.progress_percent(now),
            time_string: self.time_string(now),
            elapsed_string: self.elapsed_string(now),
            rounds_completed: self.statistics.rounds_completed,
            total_elapsed_time: self.statistics.total_elapsed_time,
            formatted_total_elapsed_time: self.formatted_total_elapsed_time(),
            alarm: self.state == RunState::Completed,
        }
    }

    /// Paused and running sessions are the ones worth restoring
    fn has_session(&self) -> bool {
        matches!(self.state, RunState::Running | RunState::Paused)
    }

    fn save_session(&mut self) {
        let session = PersistedSession::new(
            self.duration,
            self.account.accumulated_seconds(),
            self.state,
        );
        self.persist(session);
    }

    fn persist(&mut self, session: PersistedSession) {
        if let Err(e) = self.store.save_session(&session) {
            warn!("Failed to persist session: {}", e);
        }
    }

    /// Write statistics back, never over durable totals that were not read
    fn save_statistics(&mut self) {
        if !self.statistics_loaded {
            match self.store.load_statistics() {
                Ok(stored) => {
                    self.statistics.absorb(stored);
                    self.statistics_loaded = true;
                    info!(
                        "Statistics store recovered: {} rounds on record",
                        self.statistics.rounds_completed
                    );
                }
                Err(e) => {
                    warn!("Statistics still unreadable, not overwriting them: {}", e);
                    return;
                }
            }
        }

        if let Err(e) = self.store.save_statistics(&self.statistics) {
            warn!("Failed to persist statistics: {}", e);
        }
    }

    fn clear_session(&mut self) {
        if let Err(e) = self.store.clear_session() {
            warn!("Failed to clear persisted session: {}", e);
        }
    }

    fn notify(&self, action: TimerAction, at: DateTime<Utc>) {
        debug_assert_eq!(self.account.is_segment_open(), self.state.is_running());
        // No subscribers is fine
        let _ = self.events.send(TimerEvent {
            action,
            state: self.state,
            at,
        });
    }
}
