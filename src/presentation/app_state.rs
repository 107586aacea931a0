// Application state for HTTP handlers
use crate::application::dashboard_service::DashboardService;
use tokio::sync::watch;

pub struct AppState {
    pub dashboard_service: DashboardService,
    /// Host theme; the dashboard subscribes to changes.
    pub theme: watch::Sender<bool>,
}
