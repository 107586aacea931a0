// Infrastructure layer - External dependencies and adapters
pub mod config;
pub mod http_response;
pub mod http_telemetry_client;
pub mod log_tooltip;
