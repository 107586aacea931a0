// HTTP telemetry client implementation
use crate::application::telemetry_client::{QueryError, TelemetryClient};
use crate::domain::telemetry::TelemetryResponse;
use crate::domain::time_range::ResolvedWindow;
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct HttpTelemetryClient {
    api_url: String,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

impl HttpTelemetryClient {
    pub fn new(api_url: String, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { api_url, client })
    }

    fn build_query_url(&self, window: &ResolvedWindow) -> String {
        let query = window
            .query_params()
            .iter()
            .map(|(key, value)| format!("{}={}", key, urlencoding::encode(value)))
            .collect::<Vec<_>>()
            .join("&");
        let separator = if self.api_url.contains('?') { '&' } else { '?' };
        format!("{}{}{}", self.api_url, separator, query)
    }
}

#[async_trait]
impl TelemetryClient for HttpTelemetryClient {
    async fn fetch(&self, window: &ResolvedWindow) -> Result<TelemetryResponse, QueryError> {
        let url = self.build_query_url(window);
        tracing::debug!("Fetching telemetry from {}", url);

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| QueryError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| QueryError::Transport(e.to_string()))?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorBody>(&body)
                .map(|b| b.error)
                .unwrap_or(body);
            return Err(QueryError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let data: TelemetryResponse =
            serde_json::from_str(&body).map_err(|e| QueryError::Malformed(e.to_string()))?;

        if let Some(error) = data.error {
            return Err(QueryError::Application(error));
        }

        tracing::debug!("Received {} telemetry points", data.len());
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::time_range::{parse_date, parse_time};
    use axum::extract::{Query, State};
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use axum::routing::get;
    use axum::{Json, Router};
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    type Captured = Arc<Mutex<Vec<HashMap<String, String>>>>;

    fn window() -> ResolvedWindow {
        ResolvedWindow {
            start_date: parse_date("2024-01-01").unwrap(),
            end_date: parse_date("2024-01-01").unwrap(),
            start_time: parse_time("00:00").unwrap(),
            end_time: parse_time("23:59").unwrap(),
        }
    }

    async fn ok_handler(
        State(captured): State<Captured>,
        Query(params): Query<HashMap<String, String>>,
    ) -> impl IntoResponse {
        captured.lock().unwrap().push(params);
        Json(serde_json::json!({
            "timestamps": ["09:00", "09:01"],
            "bed_temp": [60.0, null],
            "filament_timeline": {},
            "project_markers": []
        }))
    }

    async fn empty_handler() -> impl IntoResponse {
        Json(serde_json::json!({"timestamps": [], "filament_timeline": {}, "project_markers": []}))
    }

    async fn app_error_handler() -> impl IntoResponse {
        Json(serde_json::json!({"error": "No printer device found"}))
    }

    async fn status_handler() -> impl IntoResponse {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({"error": "database is locked"})),
        )
    }

    async fn garbage_handler() -> impl IntoResponse {
        "<html>login</html>"
    }

    async fn serve() -> (String, Captured) {
        let captured: Captured = Arc::default();
        let router = Router::new()
            .route("/ok", get(ok_handler))
            .route("/empty", get(empty_handler))
            .route("/app-error", get(app_error_handler))
            .route("/status", get(status_handler))
            .route("/garbage", get(garbage_handler))
            .with_state(captured.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        (format!("http://{}", addr), captured)
    }

    fn client(url: String) -> HttpTelemetryClient {
        HttpTelemetryClient::new(url, Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_build_query_url() {
        let client = client("http://printer/api/data/".to_string());
        assert_eq!(
            client.build_query_url(&window()),
            "http://printer/api/data/?start_date=2024-01-01&end_date=2024-01-01&start_time=00%3A00&end_time=23%3A59"
        );

        let client = self::client("http://printer/api?printer=1".to_string());
        assert!(client.build_query_url(&window()).starts_with("http://printer/api?printer=1&start_date="));
    }

    #[tokio::test]
    async fn test_fetch_sends_window_params() {
        let (base, captured) = serve().await;
        let response = client(format!("{}/ok", base)).fetch(&window()).await.unwrap();

        assert_eq!(response.timestamps, vec!["09:00", "09:01"]);
        assert_eq!(response.bed_temp, vec![Some(60.0), None]);

        let captured = captured.lock().unwrap();
        let params = &captured[0];
        assert_eq!(params["start_date"], "2024-01-01");
        assert_eq!(params["end_date"], "2024-01-01");
        assert_eq!(params["start_time"], "00:00");
        assert_eq!(params["end_time"], "23:59");
    }

    #[tokio::test]
    async fn test_empty_window_is_not_an_error() {
        let (base, _) = serve().await;
        let response = client(format!("{}/empty", base)).fetch(&window()).await.unwrap();
        assert!(response.is_empty());
    }

    #[tokio::test]
    async fn test_error_field_is_application_error() {
        let (base, _) = serve().await;
        let err = client(format!("{}/app-error", base)).fetch(&window()).await.unwrap_err();
        assert!(matches!(&err, QueryError::Application(m) if m == "No printer device found"));
        assert!(!err.is_transport());
    }

    #[tokio::test]
    async fn test_non_success_status_is_transport_error() {
        let (base, _) = serve().await;
        let err = client(format!("{}/status", base)).fetch(&window()).await.unwrap_err();
        assert!(matches!(&err, QueryError::Status { status: 500, message } if message == "database is locked"));
        assert!(err.is_transport());

        let err = client(format!("{}/missing", base)).fetch(&window()).await.unwrap_err();
        assert!(matches!(err, QueryError::Status { status: 404, .. }));
    }

    #[tokio::test]
    async fn test_unparsable_body_is_malformed() {
        let (base, _) = serve().await;
        let err = client(format!("{}/garbage", base)).fetch(&window()).await.unwrap_err();
        assert!(matches!(err, QueryError::Malformed(_)));
    }

    #[tokio::test]
    async fn test_unreachable_server_is_transport_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = client(format!("http://{}/ok", addr)).fetch(&window()).await.unwrap_err();
        assert!(matches!(err, QueryError::Transport(_)));
    }
}
