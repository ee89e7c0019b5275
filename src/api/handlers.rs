//! HTTP endpoint handlers

use std::sync::Arc;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::Json,
};
use tracing::{error, info, warn};

use crate::state::AppState;
use super::responses::{ApiResponse, ConfigureRequest, ErrorResponse, HealthResponse, StatusResponse};

type ErrorReply = (StatusCode, Json<ErrorResponse>);

fn internal_error(e: String) -> ErrorReply {
    error!("Timer command failed: {}", e);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse::new("Timer state unavailable".to_string())),
    )
}

/// Handle POST /configure - Set the countdown duration
pub async fn configure_handler(
    State(state): State<Arc<AppState>>,
    request: Result<Json<ConfigureRequest>, JsonRejection>,
) -> Result<Json<ApiResponse>, ErrorReply> {
    // Negative, fractional or malformed values never reach validation
    let Json(request) = request.map_err(|rejection| {
        let message = rejection.body_text();
        warn!("Rejected configure body: {}", message);
        (StatusCode::BAD_REQUEST, Json(ErrorResponse::new(message)))
    })?;

    if let Err(message) = request.validate() {
        warn!("Rejected configure request: {}", message);
        return Err((StatusCode::BAD_REQUEST, Json(ErrorResponse::new(message))));
    }

    let outcome = state
        .configure(request.hours, request.minutes, request.seconds)
        .map_err(internal_error)?;

    if !outcome.applied {
        return Err((
            StatusCode::CONFLICT,
            Json(ErrorResponse::new(
                "Duration cannot change while the timer is running".to_string(),
            )),
        ));
    }

    info!("Configure endpoint called - duration set to {}", outcome.snapshot.time_string);
    Ok(Json(ApiResponse::applied("Timer duration updated".to_string(), outcome.snapshot)))
}

/// Handle POST /start - Start or resume the countdown
pub async fn start_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, ErrorReply> {
    let outcome = state.start().map_err(internal_error)?;
    info!("Start endpoint called - applied={}", outcome.applied);
    Ok(Json(ApiResponse::from_outcome(
        outcome,
        "Timer running",
        "Timer not started: already running or no duration set",
    )))
}

/// Handle POST /pause - Pause the countdown
pub async fn pause_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, ErrorReply> {
    let outcome = state.pause().map_err(internal_error)?;
    info!("Pause endpoint called - applied={}", outcome.applied);
    Ok(Json(ApiResponse::from_outcome(
        outcome,
        "Timer paused",
        "Timer not running, nothing to pause",
    )))
}

/// Handle POST /reset - Return to idle, keeping statistics
pub async fn reset_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, ErrorReply> {
    let outcome = state.reset().map_err(internal_error)?;
    info!("Reset endpoint called");
    Ok(Json(ApiResponse::from_outcome(outcome, "Timer reset", "Timer reset")))
}

/// Handle GET /status - Return current timer and server status
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Result<Json<StatusResponse>, ErrorReply> {
    let timer = state.get_snapshot().map_err(internal_error)?;
    let (last_action, last_action_time) = state.get_last_action();

    Ok(Json(StatusResponse {
        timer,
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    }))
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
