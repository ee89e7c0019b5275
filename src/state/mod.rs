//! State management module
//!
//! The countdown state machine, its data model and the shared handle the
//! server and ticker use to reach it.

pub mod timer_state;
pub mod session;
pub mod engine;
pub mod app_state;

// Re-export main types
pub use timer_state::{RunState, TimeAccount, TimerDuration};
pub use session::{PersistedSession, Statistics};
pub use engine::{TimerAction, TimerEngine, TimerEvent, TimerSnapshot};
pub use app_state::{AppState, CommandOutcome};
