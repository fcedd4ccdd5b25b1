//! Focus Flow - background service for a focus timer and distracting-site control
//!
//! This is the main entry point for the focus-flow application.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use focus_flow::{
    config::Config,
    create_router,
    protocol::EventBus,
    services::{BusNotifier, Stores, TabRegistry},
    utils::shutdown_signal,
    AppState, Background,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("focus_flow={},tower_http=info", config.log_level()))
        .init();

    info!("Starting focus-flow v{}", env!("CARGO_PKG_VERSION"));

    let stores = if config.in_memory {
        info!("Keeping state in memory only");
        Stores::in_memory()
    } else {
        let dir = config.data_dir();
        info!("Data directory: {}", dir.display());
        Stores::open(&dir)?
    };

    let bus = EventBus::new();
    let registry = Arc::new(TabRegistry::new(bus.clone()));
    let notifier = Arc::new(BusNotifier::new(bus.clone()));
    let state = Arc::new(AppState::new(
        stores,
        bus,
        registry.clone(),
        notifier,
        config.block_page.clone(),
    ));

    let background = Background::start(state, registry);
    let app = create_router(Arc::clone(&background));

    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Bridge running on http://{}", addr);
    info!("Endpoints:");
    info!("  POST /message        - Protocol commands");
    info!("  GET  /events         - Broadcast stream (SSE)");
    info!("  POST /tabs/updated   - Tab navigated");
    info!("  POST /tabs/activated - Tab focused");
    info!("  POST /tabs/removed   - Tab closed");
    info!("  GET  /status         - Current state");
    info!("  GET  /site-timers    - Time per distracting site");
    info!("  GET  /badge          - Countdown text");
    info!("  GET  /health         - Health check");

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

    if let Err(e) = background.timer.flush() {
        tracing::warn!("Failed to flush timer state: {}", e);
    }
    info!("Shutdown complete");
    Ok(())
}
