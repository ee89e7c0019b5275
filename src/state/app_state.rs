//! Shared application state wrapping the timer engine

use std::{
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};
use chrono::{DateTime, Utc};
use tokio::sync::{broadcast, watch};
use tracing::{info, warn};

use super::{TimerEngine, TimerEvent, TimerSnapshot};

/// Result of a command issued through [`AppState`]
#[derive(Debug, Clone)]
pub struct CommandOutcome {
    /// Whether the engine accepted the command or ignored it
    pub applied: bool,
    pub snapshot: TimerSnapshot,
}

/// Application state shared between the HTTP layer and the ticker task
#[derive(Debug)]
pub struct AppState {
    /// The countdown itself
    pub engine: Arc<Mutex<TimerEngine>>,
    /// Cadence of the sampling tick while running
    pub tick_interval: Duration,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last action tracking
    pub last_action: Arc<Mutex<Option<String>>>,
    pub last_action_time: Arc<Mutex<Option<DateTime<Utc>>>>,
    /// Latest snapshot, refreshed after every command and tick
    pub snapshot_tx: watch::Sender<TimerSnapshot>,
    /// Keep the receiver alive to prevent channel closure
    pub _snapshot_rx: watch::Receiver<TimerSnapshot>,
}

impl AppState {
    /// Wrap an engine for sharing
    pub fn new(engine: TimerEngine, tick_interval: Duration, port: u16, host: String) -> Self {
        let (snapshot_tx, snapshot_rx) = watch::channel(engine.snapshot(Utc::now()));

        Self {
            engine: Arc::new(Mutex::new(engine)),
            tick_interval,
            start_time: Instant::now(),
            port,
            host,
            last_action: Arc::new(Mutex::new(None)),
            last_action_time: Arc::new(Mutex::new(None)),
            snapshot_tx,
            _snapshot_rx: snapshot_rx,
        }
    }

    /// Run a command against the engine and publish the resulting snapshot
    pub fn run_command<F>(&self, action: &str, command: F) -> Result<CommandOutcome, String>
    where
        F: FnOnce(&mut TimerEngine, DateTime<Utc>) -> bool,
    {
        let mut engine = self.engine.lock()
            .map_err(|e| format!("Failed to lock timer engine: {}", e))?;
        let now = Utc::now();

        let applied = command(&mut *engine, now);
        let snapshot = engine.snapshot(now);
        // Publish under the lock so snapshots reach watchers in transition order
        self.publish(snapshot.clone());
        drop(engine);

        if applied {
            if let Ok(mut last_action) = self.last_action.lock() {
                *last_action = Some(action.to_string());
            }
            if let Ok(mut last_time) = self.last_action_time.lock() {
                *last_time = Some(now);
            }
        }

        Ok(CommandOutcome { applied, snapshot })
    }

    pub fn configure(&self, hours: u32, minutes: u32, seconds: u32) -> Result<CommandOutcome, String> {
        self.run_command("configure", |engine, now| engine.configure(hours, minutes, seconds, now))
    }

    pub fn start(&self) -> Result<CommandOutcome, String> {
        self.run_command("start", |engine, now| engine.start(now))
    }

    pub fn pause(&self) -> Result<CommandOutcome, String> {
        self.run_command("pause", |engine, now| engine.pause(now))
    }

    pub fn reset(&self) -> Result<CommandOutcome, String> {
        self.run_command("reset", |engine, now| {
            engine.reset(now);
            true
        })
    }

    /// Sample the running countdown; returns `true` when this tick completed it
    pub fn tick(&self) -> Result<bool, String> {
        let mut engine = self.engine.lock()
            .map_err(|e| format!("Failed to lock timer engine: {}", e))?;
        let now = Utc::now();

        let completed = engine.tick(now);
        self.publish(engine.snapshot(now));
        Ok(completed)
    }

    /// Subscribe to engine transitions
    pub fn subscribe(&self) -> Result<broadcast::Receiver<TimerEvent>, String> {
        self.engine.lock()
            .map(|engine| engine.subscribe())
            .map_err(|e| format!("Failed to lock timer engine: {}", e))
    }

    /// Subscribe to snapshot updates
    pub fn watch_snapshot(&self) -> watch::Receiver<TimerSnapshot> {
        self.snapshot_tx.subscribe()
    }

    /// Get the current timer snapshot
    pub fn get_snapshot(&self) -> Result<TimerSnapshot, String> {
        self.engine.lock()
            .map(|engine| engine.snapshot(Utc::now()))
            .map_err(|e| format!("Failed to lock timer engine: {}", e))
    }

    /// Persist the in-flight session before the process exits
    pub fn checkpoint(&self) -> Result<(), String> {
        let mut engine = self.engine.lock()
            .map_err(|e| format!("Failed to lock timer engine: {}", e))?;

        engine.checkpoint(Utc::now());
        info!("Timer session checkpointed ({})", engine.state());
        Ok(())
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_action = self.last_action.lock().ok().and_then(|a| a.clone());
        let last_action_time = self.last_action_time.lock().ok().and_then(|t| *t);
        (last_action, last_action_time)
    }

    fn publish(&self, snapshot: TimerSnapshot) {
        if let Err(e) = self.snapshot_tx.send(snapshot) {
            warn!("Failed to publish timer snapshot: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, thread};

    use super::*;
    use crate::{
        services::{MemoryStore, NoEffect},
        state::RunState,
    };

    fn app_state() -> Arc<AppState> {
        let engine = TimerEngine::new(Box::new(MemoryStore::new()), Box::new(NoEffect));
        Arc::new(AppState::new(engine, Duration::from_millis(10), 0, "127.0.0.1".to_string()))
    }

    #[test]
    fn test_watch_holds_latest_state_after_pause() {
        let state = app_state();
        let snapshots = state.watch_snapshot();

        state.configure(0, 5, 0).unwrap();
        state.start().unwrap();
        state.tick().unwrap();
        state.pause().unwrap();
        // Ticks after the pause are no-ops and must not bring back Running
        state.tick().unwrap();

        assert_eq!(snapshots.borrow().state, RunState::Paused);
    }

    #[test]
    fn test_concurrent_ticks_never_leave_watch_stale() {
        let state = app_state();
        let snapshots = state.watch_snapshot();
        state.configure(0, 5, 0).unwrap();
        state.start().unwrap();

        let ticker_state = Arc::clone(&state);
        let ticker = thread::spawn(move || {
            for _ in 0..2000 {
                ticker_state.tick().unwrap();
            }
        });
        thread::sleep(std::time::Duration::from_millis(1));
        state.pause().unwrap();
        ticker.join().unwrap();

        assert_eq!(snapshots.borrow().state, RunState::Paused);
        assert_eq!(state.get_snapshot().unwrap().state, RunState::Paused);
    }
}
