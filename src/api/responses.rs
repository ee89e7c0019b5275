//! API request and response structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::state::{CommandOutcome, TimerSnapshot};

/// Body of POST /configure
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ConfigureRequest {
    #[serde(default)]
    pub hours: u32,
    #[serde(default)]
    pub minutes: u32,
    #[serde(default)]
    pub seconds: u32,
}

impl ConfigureRequest {
    /// Largest hour value the picker offers
    pub const MAX_HOURS: u32 = 24;
    /// Largest minute or second value the picker offers
    pub const MAX_MINUTES_SECONDS: u32 = 59;

    /// Check the request against the picker ranges
    pub fn validate(&self) -> Result<(), String> {
        if self.hours > Self::MAX_HOURS {
            return Err(format!("hours must be between 0 and {}", Self::MAX_HOURS));
        }
        if self.minutes > Self::MAX_MINUTES_SECONDS {
            return Err(format!("minutes must be between 0 and {}", Self::MAX_MINUTES_SECONDS));
        }
        if self.seconds > Self::MAX_MINUTES_SECONDS {
            return Err(format!("seconds must be between 0 and {}", Self::MAX_MINUTES_SECONDS));
        }
        Ok(())
    }
}

/// API response structure for command endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub timer: TimerSnapshot,
}

impl ApiResponse {
    /// Create a new API response
    pub fn new(status: String, message: String, timer: TimerSnapshot) -> Self {
        Self {
            status,
            message,
            timestamp: Utc::now(),
            timer,
        }
    }

    /// Build a response from a command outcome, with messages for both cases
    pub fn from_outcome(outcome: CommandOutcome, applied: &str, ignored: &str) -> Self {
        if outcome.applied {
            Self::applied(applied.to_string(), outcome.snapshot)
        } else {
            Self::ignored(ignored.to_string(), outcome.snapshot)
        }
    }

    /// Create a response for a command the timer accepted
    pub fn applied(message: String, timer: TimerSnapshot) -> Self {
        Self::new("applied".to_string(), message, timer)
    }

    /// Create a response for a command the current state did not allow
    pub fn ignored(message: String, timer: TimerSnapshot) -> Self {
        Self::new("ignored".to_string(), message, timer)
    }
}

/// Error body for rejected requests
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl ErrorResponse {
    pub fn new(message: String) -> Self {
        Self {
            status: "error".to_string(),
            message,
            timestamp: Utc::now(),
        }
    }
}

/// Status response with timer and server information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub timer: TimerSnapshot,
    pub uptime: String,
    pub port: u16,
    pub host: String,
    pub last_action: Option<String>,
    pub last_action_time: Option<DateTime<Utc>>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    /// Create a new health response
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
