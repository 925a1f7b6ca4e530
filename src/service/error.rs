//! Service error surface.

use crate::cache::CacheError;
use crate::config::ConfigError;
use crate::queue::{ComputeError, QueueError};
use std::time::Duration;
use thiserror::Error;

/// Errors constructing a [`ForecastService`](super::ForecastService).
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The cache directory could not be initialized.
    #[error("cache initialization failed: {0}")]
    Cache(#[from] CacheError),
}

/// Errors surfaced by [`submit_forecast_job`](super::ForecastService::submit_forecast_job).
///
/// Variants are distinct so the API layer can map them to differentiated
/// status codes (e.g., 503 for a full queue, 504 for a timeout, 500 for a
/// compute failure).
#[derive(Debug, Error)]
pub enum ForecastError {
    /// The admission queue is at capacity; retry later or shed load.
    #[error("forecast queue is at capacity ({capacity}); try again later")]
    QueueFull { capacity: usize },

    /// The request exceeded its combined wait + execution deadline.
    #[error("forecast request timed out after {timeout:?}")]
    Timeout { timeout: Duration },

    /// The forecast computation itself failed; the original cause is
    /// preserved for diagnostics.
    #[error("forecast computation failed: {0}")]
    Compute(#[source] ComputeError),

    /// The service is shutting down.
    #[error("forecast service is shutting down")]
    Shutdown,
}

impl From<QueueError> for ForecastError {
    fn from(error: QueueError) -> Self {
        match error {
            QueueError::Full { capacity } => Self::QueueFull { capacity },
            QueueError::Timeout { timeout } => Self::Timeout { timeout },
            QueueError::Compute(cause) => Self::Compute(cause),
            QueueError::Shutdown => Self::Shutdown,
        }
    }
}
