#[cfg(test)]
mod tests {
    use std::{sync::Arc, time::Duration};

    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
        Router,
    };
    use kitchen_timer::{
        create_router,
        services::{MemoryStore, NoEffect},
        state::{AppState, PersistedSession, RunState, Statistics, TimerDuration, TimerEngine},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn test_state(store: MemoryStore) -> Arc<AppState> {
        let engine = TimerEngine::restore(Box::new(store), Box::new(NoEffect));
        Arc::new(AppState::new(
            engine,
            Duration::from_millis(100),
            20554,
            "127.0.0.1".to_string(),
        ))
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let request = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => request
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => request.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_health() {
        let app = create_router(test_state(MemoryStore::new()));
        let (status, body) = send(&app, "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_configure_start_pause_reset_flow() {
        let store = MemoryStore::new();
        let app = create_router(test_state(store.clone()));

        let (status, body) = send(
            &app,
            "POST",
            "/configure",
            Some(json!({"hours": 1, "minutes": 23, "seconds": 45})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "applied");
        assert_eq!(body["timer"]["time_string"], "1:23:45");
        assert_eq!(body["timer"]["total_seconds"], 5025);

        let (_, body) = send(&app, "POST", "/start", None).await;
        assert_eq!(body["status"], "applied");
        assert_eq!(body["timer"]["state"], "running");
        assert_eq!(store.session().map(|s| s.run_state), Some(RunState::Running));

        let (_, body) = send(&app, "POST", "/start", None).await;
        assert_eq!(body["status"], "ignored");

        let (_, body) = send(&app, "POST", "/pause", None).await;
        assert_eq!(body["status"], "applied");
        assert_eq!(body["timer"]["state"], "paused");

        let (_, body) = send(&app, "POST", "/reset", None).await;
        assert_eq!(body["timer"]["state"], "idle");
        assert_eq!(body["timer"]["progress"], 0.0);
        assert!(store.session().is_none());

        let (_, body) = send(&app, "GET", "/status", None).await;
        assert_eq!(body["last_action"], "reset");
        assert_eq!(body["port"], 20554);
    }

    #[tokio::test]
    async fn test_zero_duration_start_is_ignored() {
        let app = create_router(test_state(MemoryStore::new()));

        let (status, body) = send(&app, "POST", "/start", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ignored");
        assert_eq!(body["timer"]["state"], "idle");
    }

    #[tokio::test]
    async fn test_configure_rejects_out_of_range_values() {
        let app = create_router(test_state(MemoryStore::new()));

        for request in [
            json!({"hours": 25}),
            json!({"minutes": 60}),
            json!({"seconds": 75}),
        ] {
            let (status, body) = send(&app, "POST", "/configure", Some(request)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body["status"], "error");
        }

        let (status, body) = send(&app, "POST", "/configure", Some(json!({"hours": 24, "minutes": 59}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["timer"]["total_seconds"], 24 * 3600 + 59 * 60);
    }

    #[tokio::test]
    async fn test_configure_rejects_malformed_values_as_json() {
        let app = create_router(test_state(MemoryStore::new()));

        for request in [
            json!({"minutes": -1}),
            json!({"seconds": 1.5}),
            json!({"hours": "two"}),
        ] {
            let (status, body) = send(&app, "POST", "/configure", Some(request)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body["status"], "error");
            assert!(body["message"].as_str().is_some_and(|m| !m.is_empty()));
        }

        let (_, body) = send(&app, "GET", "/status", None).await;
        assert_eq!(body["timer"]["total_seconds"], 0);
    }

    #[tokio::test]
    async fn test_configure_conflicts_while_running() {
        let app = create_router(test_state(MemoryStore::new()));

        send(&app, "POST", "/configure", Some(json!({"minutes": 5}))).await;
        send(&app, "POST", "/start", None).await;

        let (status, _) = send(&app, "POST", "/configure", Some(json!({"minutes": 1}))).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (_, body) = send(&app, "GET", "/status", None).await;
        assert_eq!(body["timer"]["minutes"], 5);
    }

    #[tokio::test]
    async fn test_status_reports_restored_session_and_statistics() {
        let session = PersistedSession::new(TimerDuration::new(0, 1, 5), 0.0, RunState::Running);
        let app = create_router(test_state(MemoryStore::seeded(
            Some(session),
            Statistics::new(7, 5025.0),
        )));

        let (status, body) = send(&app, "GET", "/status", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["timer"]["state"], "paused");
        assert_eq!(body["timer"]["time_string"], "01:05");
        assert_eq!(body["timer"]["rounds_completed"], 7);
        assert_eq!(body["timer"]["formatted_total_elapsed_time"], "1:23:45");
        assert_eq!(body["timer"]["alarm"], false);
        assert!(body["last_action"].is_null());
    }
}
