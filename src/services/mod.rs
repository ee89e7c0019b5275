//! External collaborator module
//!
//! The timer engine talks to the outside world through two seams: a store
//! for durable state and an effect played when a countdown completes.

pub mod completion;
pub mod store;

// Re-export main types
pub use completion::{CommandEffect, CompletionEffect, NoEffect, TerminalBell};
pub use store::{default_state_path, JsonFileStore, MemoryStore, SessionStore, StoreError};
