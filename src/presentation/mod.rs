pub mod app_state;
pub mod handlers;

use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    edit_range, get_dashboard, health_check, list_suggestions, pointer_leave, pointer_move,
    refresh, select_suggestion, set_theme,
};
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

// The dashboard view is brotli-encoded by hand in `json_response`, so no
// CompressionLayer here.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(health_check))
        .route("/dashboard", get(get_dashboard))
        .route("/range", post(edit_range))
        .route("/refresh", post(refresh))
        .route("/charts/:chart/pointer", post(pointer_move))
        .route("/charts/:chart/leave", post(pointer_leave))
        .route("/theme", post(set_theme))
        .route("/suggestions/:field", get(list_suggestions))
        .route("/suggestions/:field/select", post(select_suggestion))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
