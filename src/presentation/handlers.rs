// HTTP request handlers
use crate::application::dashboard_service::{RangeEdit, RefreshOutcome};
use crate::application::telemetry_client::QueryError;
use crate::domain::annotation::HoverState;
use crate::domain::chart::ChartId;
use crate::domain::suggestions::{SuggestionField, SuggestionList, TextField};
use crate::domain::time_range::RangeError;
use crate::infrastructure::http_response::{accepts_brotli, json_response};
use crate::presentation::app_state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug)]
pub enum ApiError {
    Query(QueryError),
    Range(RangeError),
    UnknownChart(String),
    UnknownField(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Query(e) if e.is_transport() => (StatusCode::BAD_GATEWAY, e.to_string()),
            ApiError::Query(e) => (StatusCode::UNPROCESSABLE_ENTITY, e.to_string()),
            ApiError::Range(e) => (StatusCode::BAD_REQUEST, e.to_string()),
            ApiError::UnknownChart(name) => (StatusCode::NOT_FOUND, format!("unknown chart {}", name)),
            ApiError::UnknownField(name) => (StatusCode::NOT_FOUND, format!("unknown field {}", name)),
        };
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

fn chart_id(name: &str) -> Result<ChartId, ApiError> {
    ChartId::from_key(name).ok_or_else(|| ApiError::UnknownChart(name.to_string()))
}

fn suggestion_field(name: &str) -> Result<SuggestionField, ApiError> {
    SuggestionField::from_key(name).ok_or_else(|| ApiError::UnknownField(name.to_string()))
}

#[derive(Serialize)]
pub struct RangeLabel {
    pub label: String,
}

#[derive(Deserialize)]
pub struct PointerEvent {
    pub x: f64,
    pub y: f64,
}

/// `state` is null while the chart shows no data.
#[derive(Serialize)]
pub struct HoverResponse {
    pub state: Option<HoverState>,
}

#[derive(Deserialize)]
pub struct ThemeChange {
    pub dark: bool,
}

#[derive(Deserialize)]
pub struct SuggestionQuery {
    #[serde(default)]
    pub q: String,
}

#[derive(Deserialize)]
pub struct SuggestionChoice {
    #[serde(default)]
    pub q: String,
    pub index: usize,
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Current page view: range, charts, tiles and tooltip
pub async fn get_dashboard(headers: HeaderMap, State(state): State<Arc<AppState>>) -> Response {
    let view = state.dashboard_service.view();
    match json_response(&view, accepts_brotli(&headers)).await {
        Ok(response) => response,
        Err(status) => status.into_response(),
    }
}

pub async fn edit_range(
    State(state): State<Arc<AppState>>,
    Json(edit): Json<RangeEdit>,
) -> Result<Json<RangeLabel>, ApiError> {
    let label = state.dashboard_service.edit_range(&edit).map_err(ApiError::Range)?;
    Ok(Json(RangeLabel { label }))
}

pub async fn refresh(State(state): State<Arc<AppState>>) -> Result<Json<RefreshOutcome>, ApiError> {
    let outcome = state.dashboard_service.refresh().await.map_err(ApiError::Query)?;
    Ok(Json(outcome))
}

pub async fn pointer_move(
    Path(chart): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(event): Json<PointerEvent>,
) -> Result<Json<HoverResponse>, ApiError> {
    let chart = chart_id(&chart)?;
    let hover = state.dashboard_service.pointer_move(chart, event.x, event.y);
    Ok(Json(HoverResponse { state: hover }))
}

pub async fn pointer_leave(
    Path(chart): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<HoverResponse>, ApiError> {
    let chart = chart_id(&chart)?;
    let hover = state.dashboard_service.pointer_leave(chart);
    Ok(Json(HoverResponse { state: hover }))
}

pub async fn set_theme(State(state): State<Arc<AppState>>, Json(change): Json<ThemeChange>) -> StatusCode {
    state.theme.send_replace(change.dark);
    StatusCode::NO_CONTENT
}

pub async fn list_suggestions(
    Path(field): Path<String>,
    Query(query): Query<SuggestionQuery>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<SuggestionList>, ApiError> {
    let field = suggestion_field(&field)?;
    Ok(Json(state.dashboard_service.suggestions(field, &query.q)))
}

pub async fn select_suggestion(
    Path(field): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(choice): Json<SuggestionChoice>,
) -> Result<Json<Option<TextField>>, ApiError> {
    let field = suggestion_field(&field)?;
    Ok(Json(state.dashboard_service.select_suggestion(field, &choice.q, choice.index)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::dashboard_service::{DashboardService, DashboardSession};
    use crate::application::telemetry_client::TelemetryClient;
    use crate::domain::annotation::PlotArea;
    use crate::domain::telemetry::TelemetryResponse;
    use crate::domain::time_range::{ResolvedWindow, TimeRangeSelector};
    use crate::infrastructure::log_tooltip::LogTooltip;
    use crate::presentation::router;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use serde_json::{json, Value};
    use tokio::sync::watch;

    struct FailingClient;

    #[async_trait]
    impl TelemetryClient for FailingClient {
        async fn fetch(&self, _window: &ResolvedWindow) -> Result<TelemetryResponse, QueryError> {
            Err(QueryError::Status {
                status: 503,
                message: "collector offline".into(),
            })
        }
    }

    async fn serve() -> String {
        let session = DashboardSession::new(
            TimeRangeSelector::new(NaiveDate::from_ymd_opt(2024, 6, 2).unwrap()),
            PlotArea::new(50.0, 850.0),
            false,
            Box::new(LogTooltip),
        );
        let dashboard_service = DashboardService::new(Arc::new(FailingClient), session);
        let (theme, theme_rx) = watch::channel(false);
        dashboard_service.spawn_theme_listener(theme_rx);

        let state = Arc::new(AppState {
            dashboard_service,
            theme,
        });

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router(state)).await.unwrap();
        });
        format!("http://{}", addr)
    }

    async fn dashboard(client: &reqwest::Client, base: &str) -> Value {
        client
            .get(format!("{}/dashboard", base))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_health_and_initial_view() {
        let base = serve().await;
        let client = reqwest::Client::new();

        let body = client.get(format!("{}/healthz", base)).send().await.unwrap().text().await.unwrap();
        assert_eq!(body, "ok");

        let view = dashboard(&client, &base).await;
        assert_eq!(view["title"], "(2024-06-01 to 2024-06-02)");
        assert_eq!(view["window"]["start_time"], "00:00");
        assert_eq!(view["charts"].as_array().unwrap().len(), 8);
        assert_eq!(view["charts"][0]["kind"], "pending");
    }

    #[tokio::test]
    async fn test_range_edit_and_bad_input() {
        let base = serve().await;
        let client = reqwest::Client::new();

        let response = client
            .post(format!("{}/range", base))
            .json(&json!({"start_date": "2024-05-20", "end_date": "2024-05-01"}))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 200);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["label"], "(2024-05-20)");

        let response = client
            .post(format!("{}/range", base))
            .json(&json!({"start_time": "7pm"}))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 400);
    }

    #[tokio::test]
    async fn test_refresh_failure_is_reported() {
        let base = serve().await;
        let client = reqwest::Client::new();

        let response = client.post(format!("{}/refresh", base)).send().await.unwrap();
        assert_eq!(response.status(), 502);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["error"], "telemetry server returned 503: collector offline");

        let view = dashboard(&client, &base).await;
        assert_eq!(view["charts"][0]["kind"], "pending");
    }

    #[tokio::test]
    async fn test_pointer_on_unknown_and_unloaded_charts() {
        let base = serve().await;
        let client = reqwest::Client::new();

        let response = client
            .post(format!("{}/charts/pressure/pointer", base))
            .json(&json!({"x": 1.0, "y": 2.0}))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 404);

        let body: Value = client
            .post(format!("{}/charts/fans/pointer", base))
            .json(&json!({"x": 1.0, "y": 2.0}))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body["state"], Value::Null);
    }

    #[tokio::test]
    async fn test_theme_change_reaches_charts() {
        let base = serve().await;
        let client = reqwest::Client::new();

        let response = client
            .post(format!("{}/theme", base))
            .json(&json!({"dark": true}))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 204);

        let mut dark = false;
        for _ in 0..50 {
            dark = dashboard(&client, &base).await["theme"]["dark"] == true;
            if dark {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        assert!(dark);
    }

    #[tokio::test]
    async fn test_suggestions_endpoint() {
        let base = serve().await;
        let client = reqwest::Client::new();

        let body: Value = client
            .get(format!("{}/suggestions/brand?q=bambu", base))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body["items"], json!(["Bambu Lab"]));

        let body: Value = client
            .post(format!("{}/suggestions/brand/select", base))
            .json(&json!({"q": "bambu", "index": 0}))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body["value"], "Bambu Lab");

        let response = client.get(format!("{}/suggestions/color", base)).send().await.unwrap();
        assert_eq!(response.status(), 404);
    }
}
