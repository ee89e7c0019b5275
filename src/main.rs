//! Kitchen Timer - A single-session countdown timer served over HTTP
//!
//! This is the main entry point for the kitchen-timer application.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use kitchen_timer::{
    config::Config,
    state::{AppState, TimerEngine},
    api::create_router,
    tasks::countdown_ticker_task,
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("kitchen_timer={},tower_http=info", config.log_level()))
        .init();

    info!("Starting kitchen-timer server v{}", env!("CARGO_PKG_VERSION"));
    if config.ephemeral {
        info!("Configuration: host={}, port={}, tick={}ms, state=in-memory",
              config.host, config.port, config.tick_interval().as_millis());
    } else {
        info!("Configuration: host={}, port={}, tick={}ms, state={}",
              config.host, config.port, config.tick_interval().as_millis(),
              config.state_path().display());
    }

    // Restore any saved session before serving requests
    let engine = TimerEngine::restore(config.build_store(), config.build_effect());
    let state = Arc::new(AppState::new(
        engine,
        config.tick_interval(),
        config.port,
        config.host.clone(),
    ));

    // Start the countdown ticker background task
    let ticker_state = Arc::clone(&state);
    tokio::spawn(async move {
        countdown_ticker_task(ticker_state).await;
    });

    // Create HTTP router with all endpoints
    let app = create_router(Arc::clone(&state));

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  POST /configure - Set duration {{hours, minutes, seconds}}");
    info!("  POST /start     - Start or resume the countdown");
    info!("  POST /pause     - Pause the countdown");
    info!("  POST /reset     - Reset to idle");
    info!("  GET  /status    - Current timer and statistics");
    info!("  GET  /health    - Health check");

    // Setup graceful shutdown
    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
    }

    if let Err(e) = state.checkpoint() {
        tracing::warn!("Failed to save timer session on shutdown: {}", e);
    }

    info!("Server shutdown complete");
    Ok(())
}
