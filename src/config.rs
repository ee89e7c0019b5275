//! Configuration and CLI argument handling

use std::{path::PathBuf, time::Duration};

use clap::Parser;

use crate::services::{
    default_state_path, CommandEffect, CompletionEffect, JsonFileStore, MemoryStore, NoEffect,
    SessionStore, TerminalBell,
};

/// Shortest tick cadence accepted
pub const MIN_TICK_MS: u64 = 10;

/// CLI argument parsing structure
#[derive(Parser, Debug, Clone)]
#[command(name = "kitchen-timer")]
#[command(about = "A single-session countdown timer served over HTTP")]
#[command(version)]
pub struct Config {
    /// Port to bind the server to
    #[arg(short, long, default_value = "20554")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Milliseconds between progress samples while the timer runs
    #[arg(long, default_value = "100")]
    pub tick_ms: u64,

    /// File holding the saved session and statistics
    #[arg(long)]
    pub state_file: Option<PathBuf>,

    /// Keep all state in memory; nothing survives a restart
    #[arg(long)]
    pub ephemeral: bool,

    /// Shell command to run when a countdown completes
    #[arg(long)]
    pub alarm_command: Option<String>,

    /// Complete silently
    #[arg(long, conflicts_with = "alarm_command")]
    pub quiet_alarm: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }

    /// Tick cadence, never faster than [`MIN_TICK_MS`]
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_ms.max(MIN_TICK_MS))
    }

    /// Location of the state file
    pub fn state_path(&self) -> PathBuf {
        self.state_file.clone().unwrap_or_else(default_state_path)
    }

    /// Build the persistence collaborator selected by the flags
    pub fn build_store(&self) -> Box<dyn SessionStore> {
        if self.ephemeral {
            Box::new(MemoryStore::new())
        } else {
            Box::new(JsonFileStore::new(self.state_path()))
        }
    }

    /// Build the completion effect selected by the flags
    pub fn build_effect(&self) -> Box<dyn CompletionEffect> {
        match (&self.alarm_command, self.quiet_alarm) {
            (_, true) => Box::new(NoEffect),
            (Some(command), false) => Box::new(CommandEffect::new(command.clone())),
            (None, false) => Box::new(TerminalBell),
        }
    }
}
