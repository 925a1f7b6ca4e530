//! Compute collaborator contract.

use crate::forecast::ForecastPayload;
use crate::queue::{ComputeError, Priority};
use futures::future::BoxFuture;

/// A forecast request as seen by this layer.
///
/// Validation (region bounds, horizon limits) belongs to the API layer;
/// by the time a request reaches the service it is assumed well-formed.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastRequest {
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
    /// Number of days to forecast.
    pub horizon_days: u32,
    /// Admission priority class.
    pub priority: Priority,
}

impl ForecastRequest {
    pub fn new(latitude: f64, longitude: f64, horizon_days: u32, priority: Priority) -> Self {
        Self {
            latitude,
            longitude,
            horizon_days,
            priority,
        }
    }
}

/// The expensive computation, owned by an external collaborator.
///
/// The returned future is pre-bound to the request and handed opaquely to
/// the admission queue; neither the queue nor the service inspects the
/// model, device, or data-retrieval details behind it.
pub trait ForecastCompute: Send + Sync {
    /// Builds the deferred computation for a request.
    fn forecast(
        &self,
        request: &ForecastRequest,
    ) -> BoxFuture<'static, Result<ForecastPayload, ComputeError>>;
}
