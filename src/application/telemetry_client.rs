// Client trait for fetching one telemetry window
use crate::domain::telemetry::TelemetryResponse;
use crate::domain::time_range::ResolvedWindow;
use async_trait::async_trait;

#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    #[error("telemetry request failed: {0}")]
    Transport(String),
    #[error("telemetry server returned {status}: {message}")]
    Status { status: u16, message: String },
    #[error("telemetry response could not be read: {0}")]
    Malformed(String),
    /// The server answered but reported an error of its own.
    #[error("{0}")]
    Application(String),
}

impl QueryError {
    /// Anything that went wrong before a well-formed answer arrived.
    pub fn is_transport(&self) -> bool {
        !matches!(self, QueryError::Application(_))
    }
}

#[async_trait]
pub trait TelemetryClient: Send + Sync {
    /// Issue exactly one request for `window`.
    ///
    /// An empty `timestamps` list is a successful answer meaning the window
    /// holds no samples.
    async fn fetch(&self, window: &ResolvedWindow) -> Result<TelemetryResponse, QueryError>;
}
