//! Persistence collaborator: durable session and statistics storage

use std::{
    fs, io,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

use crate::state::{PersistedSession, RunState, Statistics};

const KEY_HOURS: &str = "savedHours";
const KEY_MINUTES: &str = "savedMinutes";
const KEY_SECONDS: &str = "savedSeconds";
const KEY_ACCUMULATED: &str = "accumulatedTime";
const KEY_STATE: &str = "timerState";
const KEY_ROUNDS: &str = "roundsCompleted";
const KEY_TOTAL_ELAPSED: &str = "totalElapsedTime";

const SESSION_KEYS: [&str; 5] = [KEY_HOURS, KEY_MINUTES, KEY_SECONDS, KEY_ACCUMULATED, KEY_STATE];

/// Errors raised by a [`SessionStore`]
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error("store contents are not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("store lock poisoned: {0}")]
    Poisoned(String),
}

/// Durable storage for the in-flight session and lifetime statistics.
///
/// Implementations hold no timer logic; the engine decides when each call happens.
pub trait SessionStore: Send {
    fn load_session(&self) -> Result<Option<PersistedSession>, StoreError>;
    fn save_session(&mut self, session: &PersistedSession) -> Result<(), StoreError>;
    fn clear_session(&mut self) -> Result<(), StoreError>;
    fn load_statistics(&self) -> Result<Statistics, StoreError>;
    fn save_statistics(&mut self, statistics: &Statistics) -> Result<(), StoreError>;
}

/// Default location of the state file inside the platform data directory
pub fn default_state_path() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("kitchen-timer").join("state.json"))
        .unwrap_or_else(|| PathBuf::from("kitchen-timer-state.json"))
}

/// Store backed by a flat JSON key-value document.
///
/// Missing keys read as zero (or `idle` for the state), and keys this store
/// does not know about survive a rewrite.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_document(&self) -> Result<Map<String, Value>, StoreError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => return Err(e.into()),
        };
        if contents.trim().is_empty() {
            return Ok(Map::new());
        }
        Ok(serde_json::from_str(&contents)?)
    }

    fn write_document(&self, document: &Map<String, Value>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(document)?)?;
        fs::rename(&tmp, &self.path)?;
        debug!("Wrote timer store to {}", self.path.display());
        Ok(())
    }

    fn update<F>(&self, updater: F) -> Result<(), StoreError>
    where
        F: FnOnce(&mut Map<String, Value>),
    {
        let mut document = self.read_document()?;
        updater(&mut document);
        self.write_document(&document)
    }
}

fn read_u32(document: &Map<String, Value>, key: &str) -> u32 {
    document
        .get(key)
        .and_then(Value::as_u64)
        .and_then(|v| u32::try_from(v).ok())
        .unwrap_or(0)
}

fn read_f64(document: &Map<String, Value>, key: &str) -> f64 {
    document.get(key).and_then(Value::as_f64).unwrap_or(0.0)
}

impl SessionStore for JsonFileStore {
    fn load_session(&self) -> Result<Option<PersistedSession>, StoreError> {
        let document = self.read_document()?;
        if !SESSION_KEYS.iter().any(|key| document.contains_key(*key)) {
            return Ok(None);
        }

        let run_state = document
            .get(KEY_STATE)
            .and_then(Value::as_str)
            .and_then(|raw| raw.parse::<RunState>().ok())
            .unwrap_or_default();

        Ok(Some(PersistedSession {
            hours: read_u32(&document, KEY_HOURS),
            minutes: read_u32(&document, KEY_MINUTES),
            seconds: read_u32(&document, KEY_SECONDS),
            accumulated_seconds: read_f64(&document, KEY_ACCUMULATED),
            run_state,
        }))
    }

    fn save_session(&mut self, session: &PersistedSession) -> Result<(), StoreError> {
        self.update(|document| {
            document.insert(KEY_HOURS.into(), session.hours.into());
            document.insert(KEY_MINUTES.into(), session.minutes.into());
            document.insert(KEY_SECONDS.into(), session.seconds.into());
            document.insert(KEY_ACCUMULATED.into(), session.accumulated_seconds.into());
            document.insert(KEY_STATE.into(), session.run_state.as_str().into());
        })
    }

    fn clear_session(&mut self) -> Result<(), StoreError> {
        self.update(|document| {
            for key in SESSION_KEYS {
                document.remove(key);
            }
        })
    }

    fn load_statistics(&self) -> Result<Statistics, StoreError> {
        let document = self.read_document()?;
        Ok(Statistics {
            rounds_completed: document.get(KEY_ROUNDS).and_then(Value::as_u64).unwrap_or(0),
            total_elapsed_time: read_f64(&document, KEY_TOTAL_ELAPSED),
        })
    }

    fn save_statistics(&mut self, statistics: &Statistics) -> Result<(), StoreError> {
        self.update(|document| {
            document.insert(KEY_ROUNDS.into(), statistics.rounds_completed.into());
            document.insert(KEY_TOTAL_ELAPSED.into(), statistics.total_elapsed_time.into());
        })
    }
}

#[derive(Debug, Default)]
struct MemoryContents {
    session: Option<PersistedSession>,
    statistics: Statistics,
}

/// In-memory store; clones share the same contents so a caller can keep a
/// handle and inspect what the engine wrote.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    contents: Arc<Mutex<MemoryContents>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded as if a previous process had written to it
    pub fn seeded(session: Option<PersistedSession>, statistics: Statistics) -> Self {
        Self {
            contents: Arc::new(Mutex::new(MemoryContents { session, statistics })),
        }
    }

    /// Currently stored session, if any
    pub fn session(&self) -> Option<PersistedSession> {
        self.contents.lock().ok().and_then(|c| c.session)
    }

    /// Currently stored statistics
    pub fn statistics(&self) -> Statistics {
        self.contents.lock().map(|c| c.statistics).unwrap_or_default()
    }

    fn with_contents<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&mut MemoryContents) -> T,
    {
        let mut contents = self
            .contents
            .lock()
            .map_err(|e| StoreError::Poisoned(e.to_string()))?;
        Ok(f(&mut contents))
    }
}

impl SessionStore for MemoryStore {
    fn load_session(&self) -> Result<Option<PersistedSession>, StoreError> {
        self.with_contents(|c| c.session)
    }

    fn save_session(&mut self, session: &PersistedSession) -> Result<(), StoreError> {
        self.with_contents(|c| c.session = Some(*session))
    }

    fn clear_session(&mut self) -> Result<(), StoreError> {
        self.with_contents(|c| c.session = None)
    }

    fn load_statistics(&self) -> Result<Statistics, StoreError> {
        self.with_contents(|c| c.statistics)
    }

    fn save_statistics(&mut self, statistics: &Statistics) -> Result<(), StoreError> {
        self.with_contents(|c| c.statistics = *statistics)
    }
}
