// Application layer - Use cases and ports
pub mod dashboard_service;
pub mod telemetry_client;
