mod config;
mod errors;
mod layout;
mod routes;
mod state;
mod sync;

use anyhow::Result;
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::layout::font_metrics::A4;
use crate::routes::build_router;
use crate::state::AppState;
use crate::sync::spawn_sync_pump;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Scribe v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Export geometry: {}x{} margin {} wrap {}",
        A4.width,
        A4.height,
        A4.margin,
        A4.wrap_width()
    );

    // Build app state
    let state = AppState::new(config);
    info!(
        rich_commit_ms = state.sync.rich_commit_delay.as_millis() as u64,
        raw_push_ms = state.sync.raw_push_delay.as_millis() as u64,
        "Sync debounce configured"
    );

    // Drive debounce deadlines for every live session
    let _pump = spawn_sync_pump(
        state.sessions.clone(),
        state.config.sync_pump_interval,
        state.config.session_idle_ttl,
    );

    let addr: SocketAddr = format!("0.0.0.0:{}", state.config.port).parse()?;

    // Build router
    // TODO: restrict origins once the editor client has a fixed host
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
