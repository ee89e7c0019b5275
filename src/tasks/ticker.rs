//! Countdown ticker background task

use std::{sync::Arc, time::Duration};
use tokio::{
    sync::broadcast::{error::RecvError, Receiver},
    time::{interval, sleep, MissedTickBehavior},
};
use tracing::{debug, error, info, warn};

use crate::state::{AppState, RunState, TimerEvent};

/// Background task that samples the engine at a fixed cadence while it runs.
///
/// The repeating interval only exists while the engine is running; it is
/// dropped as soon as a pause, reset or completion is observed.
pub async fn countdown_ticker_task(state: Arc<AppState>) {
    info!("Starting countdown ticker task ({:?} cadence)", state.tick_interval);

    let mut events = match state.subscribe() {
        Ok(rx) => rx,
        Err(e) => {
            error!("Countdown ticker cannot subscribe to timer events: {}", e);
            return;
        }
    };

    // A start issued before we subscribed would otherwise go unnoticed
    let mut running = current_state_is_running(&state);

    loop {
        if running {
            run_countdown(&state, &mut events).await;
            running = false;
            continue;
        }

        match events.recv().await {
            Ok(event) => {
                debug!("Ticker received {:?} -> {}", event.action, event.state);
                running = event.state.is_running();
            }
            Err(RecvError::Lagged(skipped)) => {
                warn!("Ticker lagged behind by {} events, resynchronising", skipped);
                running = current_state_is_running(&state);
            }
            Err(RecvError::Closed) => {
                info!("Timer event channel closed, stopping countdown ticker");
                return;
            }
        }
    }
}

/// Tick until the countdown leaves the running state.
///
/// A restart that follows the exit is still queued on `events`.
async fn run_countdown(state: &Arc<AppState>, events: &mut Receiver<TimerEvent>) {
    debug!("Countdown running, ticking every {:?}", state.tick_interval);
    let mut ticks = interval(state.tick_interval);
    ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticks.tick() => {
                match state.tick() {
                    Ok(true) => {
                        info!("Countdown finished, ticker idle");
                        return;
                    }
                    Ok(false) => {}
                    Err(e) => {
                        error!("Failed to tick timer: {}", e);
                        sleep(Duration::from_secs(1)).await;
                    }
                }
            }

            received = events.recv() => {
                match received {
                    Ok(event) if event.state == RunState::Running => {
                        // Started event for the segment we are already ticking
                    }
                    Ok(event) => {
                        debug!("Cancelling ticker on {:?}", event.action);
                        return;
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        warn!("Ticker lagged behind by {} events, resynchronising", skipped);
                        if !current_state_is_running(state) {
                            return;
                        }
                    }
                    Err(RecvError::Closed) => return,
                }
            }
        }
    }
}

fn current_state_is_running(state: &AppState) -> bool {
    match state.get_snapshot() {
        Ok(snapshot) => snapshot.state.is_running(),
        Err(e) => {
            error!("Failed to read timer state: {}", e);
            false
        }
    }
}
