use thiserror::Error;

/// Failures of the sales funnel pipeline
#[derive(Debug, Error)]
pub enum DashboardError {
    /// Store unreachable, failed, or timed out. Never retried here.
    #[error("Data unavailable: {0}")]
    DataUnavailable(String),

    /// Rejected before any fetch
    #[error("Invalid range: {0}")]
    InvalidRange(String),
}

impl DashboardError {
    pub fn code(&self) -> &'static str {
        match self {
            DashboardError::DataUnavailable(_) => "data_unavailable",
            DashboardError::InvalidRange(_) => "invalid_range",
        }
    }
}
