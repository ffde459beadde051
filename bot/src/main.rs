use std::sync::Arc;

use anyhow::Result;
use bot::services::{monitor, signal_service};
use bot::state::AppState;
use bot::http;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    info!("Starting Quorumtrade engine...");

    let state = Arc::new(AppState::new().await?);
    info!("AppState initialized");

    monitor::spawn_monitor(state.clone(), state.monitor_interval_secs);
    signal_service::spawn_sweeper(state.clone(), state.sweep_interval_secs);
    info!("Position monitor and pending-signal sweeper running");

    let app = http::router(state.clone());
    let listener = tokio::net::TcpListener::bind(&state.bind_addr).await?;
    info!("Engine listening on http://{}", state.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
