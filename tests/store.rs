#[cfg(test)]
mod tests {
    use std::fs;

    use chrono::{TimeZone, Utc};
    use kitchen_timer::services::{JsonFileStore, NoEffect, SessionStore, StoreError};
    use kitchen_timer::state::{PersistedSession, RunState, Statistics, TimerDuration, TimerEngine};
    use serde_json::Value;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> JsonFileStore {
        JsonFileStore::new(dir.path().join("nested").join("state.json"))
    }

    fn read_json(store: &JsonFileStore) -> Value {
        serde_json::from_str(&fs::read_to_string(store.path()).unwrap()).unwrap()
    }

    #[test]
    fn test_missing_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        assert!(store.load_session().unwrap().is_none());
        assert_eq!(store.load_statistics().unwrap(), Statistics::default());
    }

    #[test]
    fn test_session_written_as_flat_keys() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = store_in(&dir);

        let session = PersistedSession::new(TimerDuration::new(0, 12, 30), 61.5, RunState::Paused);
        store.save_session(&session).unwrap();

        let json = read_json(&store);
        assert_eq!(json["savedHours"], 0);
        assert_eq!(json["savedMinutes"], 12);
        assert_eq!(json["savedSeconds"], 30);
        assert_eq!(json["accumulatedTime"], 61.5);
        assert_eq!(json["timerState"], "paused");
        assert_eq!(store.load_session().unwrap(), Some(session));
    }

    #[test]
    fn test_clear_session_keeps_statistics() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = store_in(&dir);

        store.save_statistics(&Statistics::new(3, 450.0)).unwrap();
        store
            .save_session(&PersistedSession::new(TimerDuration::new(1, 0, 0), 10.0, RunState::Running))
            .unwrap();
        store.clear_session().unwrap();

        assert!(store.load_session().unwrap().is_none());
        assert_eq!(store.load_statistics().unwrap(), Statistics::new(3, 450.0));
        let json = read_json(&store);
        assert!(json.get("timerState").is_none());
        assert_eq!(json["roundsCompleted"], 3);
    }

    #[test]
    fn test_absent_keys_default_to_zero_and_idle() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("state.json"));
        fs::write(store.path(), r#"{"savedMinutes": 5, "timerState": "bogus"}"#).unwrap();

        let session = store.load_session().unwrap().unwrap();
        assert_eq!(session.duration(), TimerDuration::new(0, 5, 0));
        assert_eq!(session.accumulated_seconds, 0.0);
        assert_eq!(session.run_state, RunState::Idle);
        assert_eq!(store.load_statistics().unwrap(), Statistics::default());
    }

    #[test]
    fn test_unknown_keys_survive_rewrite() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = JsonFileStore::new(dir.path().join("state.json"));
        fs::write(store.path(), r#"{"theme": "dark"}"#).unwrap();

        store.save_statistics(&Statistics::new(1, 60.0)).unwrap();
        assert_eq!(read_json(&store)["theme"], "dark");
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("state.json"));
        fs::write(store.path(), "not json").unwrap();

        assert!(matches!(store.load_session(), Err(StoreError::Json(_))));
    }

    #[test]
    fn test_corrupt_file_restores_idle_engine() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("state.json"));
        fs::write(store.path(), "{{{").unwrap();

        let engine = TimerEngine::restore(Box::new(store), Box::new(NoEffect));
        assert_eq!(engine.state(), RunState::Idle);
        assert_eq!(engine.rounds_completed(), 0);
    }

    #[test]
    fn test_engine_survives_process_restart() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        let t0 = Utc.with_ymd_and_hms(2025, 6, 27, 8, 0, 0).unwrap();

        {
            let mut engine = TimerEngine::new(Box::new(JsonFileStore::new(&path)), Box::new(NoEffect));
            engine.configure(0, 0, 5, t0);
            engine.start(t0);
            engine.tick(t0 + chrono::Duration::seconds(5));
            engine.configure(0, 2, 0, t0);
            engine.start(t0);
            engine.pause(t0 + chrono::Duration::seconds(45));
            engine.start(t0 + chrono::Duration::seconds(50));
        }

        let engine = TimerEngine::restore(Box::new(JsonFileStore::new(&path)), Box::new(NoEffect));
        assert_eq!(engine.state(), RunState::Paused);
        assert_eq!(engine.duration(), TimerDuration::new(0, 2, 0));
        assert_eq!(engine.elapsed_seconds(Utc::now()), 45.0);
        assert_eq!(engine.rounds_completed(), 1);
        assert_eq!(engine.total_elapsed_time(), 5.0);
    }
}
