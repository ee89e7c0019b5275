//! Kitchen Timer - A single-session countdown timer served over HTTP
//!
//! This library provides the countdown state machine, its persistence and
//! completion collaborators, the background ticker that drives it, and the
//! HTTP surface used to control it.

pub mod config;
pub mod state;
pub mod api;
pub mod services;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use state::{AppState, RunState, TimerEngine};
pub use api::create_router;
pub use utils::signals::shutdown_signal;
