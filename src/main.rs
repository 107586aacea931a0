// Main entry point - Dependency injection and server setup
mod domain;
mod application;
mod infrastructure;
mod presentation;

use std::{net::SocketAddr, sync::Arc, time::Duration};
use tokio::sync::watch;
use tracing_subscriber::EnvFilter;

use crate::application::dashboard_service::{DashboardService, DashboardSession};
use crate::domain::annotation::PlotArea;
use crate::domain::time_range::TimeRangeSelector;
use crate::infrastructure::config::load_config;
use crate::infrastructure::http_telemetry_client::HttpTelemetryClient;
use crate::infrastructure::log_tooltip::LogTooltip;
use crate::presentation::app_state::AppState;
use crate::presentation::router;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load configuration
    let config = load_config()?;

    // Create client (infrastructure layer)
    let client = Arc::new(HttpTelemetryClient::new(
        config.api.url.clone(),
        Duration::from_secs(config.api.timeout_secs),
    )?);

    // Create the page view (application layer)
    let session = DashboardSession::new(
        TimeRangeSelector::starting_today(),
        PlotArea::new(config.chart.plot_left, config.chart.plot_right),
        config.theme.dark,
        Box::new(LogTooltip),
    );
    let dashboard_service = DashboardService::new(client, session);

    let (theme, theme_rx) = watch::channel(config.theme.dark);
    dashboard_service.spawn_theme_listener(theme_rx);

    // Load the default window before serving
    if let Err(e) = dashboard_service.refresh().await {
        tracing::warn!("Initial telemetry load failed: {}", e);
    }

    let state = Arc::new(AppState {
        dashboard_service,
        theme,
    });

    // Start server
    let addr: SocketAddr = config.server.bind.parse()?;
    tracing::info!(api = %config.api.url, "Starting printer-telemetry service on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router(state)).await?;

    Ok(())
}
