//! Service facade wiring cache and queue together.

use super::compute::{ForecastCompute, ForecastRequest};
use super::error::{ForecastError, ServiceError};
use crate::cache::{CacheStatistics, ForecastCache};
use crate::config::ServiceSettings;
use crate::forecast::ForecastPayload;
use crate::queue::{AdmissionQueue, QueueStatistics};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Handle over the admission queue and result cache.
///
/// Cheap to clone-by-Arc at the edges; owns nothing global.
pub struct ForecastService {
    cache: Arc<ForecastCache>,
    queue: Arc<AdmissionQueue<ForecastPayload>>,
    compute: Arc<dyn ForecastCompute>,
    request_counter: AtomicU64,
}

impl ForecastService {
    /// Builds a service from validated settings and a compute
    /// collaborator.
    pub fn new(
        settings: ServiceSettings,
        compute: Arc<dyn ForecastCompute>,
    ) -> Result<Self, ServiceError> {
        settings.validate()?;

        let cache = ForecastCache::new((&settings.cache).into())?;
        let queue = AdmissionQueue::new((&settings.queue).into());

        Ok(Self {
            cache: Arc::new(cache),
            queue: Arc::new(queue),
            compute,
            request_counter: AtomicU64::new(0),
        })
    }

    /// Starts the admission queue's dispatch loop. Idempotent.
    pub async fn start(&self) {
        self.queue.start().await;
    }

    /// Stops the dispatch loop; buffered requests fail with a shutdown
    /// error. Idempotent.
    pub async fn stop(&self) {
        self.queue.stop().await;
    }

    /// Serves a forecast request: cache first, then admission-controlled
    /// compute with best-effort write-back.
    pub async fn submit_forecast_job(
        &self,
        request: ForecastRequest,
    ) -> Result<ForecastPayload, ForecastError> {
        if let Some(mut payload) =
            self.cache
                .get(request.latitude, request.longitude, request.horizon_days)
        {
            payload.metadata.cache_hit = true;
            return Ok(payload);
        }

        let id = self.next_request_id(&request);
        debug!(
            request_id = %id,
            lat = request.latitude,
            lon = request.longitude,
            horizon_days = request.horizon_days,
            "cache miss, admitting compute"
        );

        let task = self.compute.forecast(&request);
        let payload = self.queue.enqueue(id, request.priority, task).await?;

        // Caching is an optimization: a write failure degrades to
        // "not cached" and is absorbed here.
        if let Err(error) = self.cache.set(
            request.latitude,
            request.longitude,
            request.horizon_days,
            &payload,
        ) {
            warn!(%error, "failed to cache forecast result");
        }

        Ok(payload)
    }

    /// Removes a cached forecast. Returns whether anything was removed.
    pub fn invalidate_forecast(&self, lat: f64, lon: f64, horizon_days: u32) -> bool {
        self.cache.invalidate(lat, lon, horizon_days)
    }

    /// Removes expired cache entries, returning how many were deleted.
    pub fn sweep_cache(&self) -> u64 {
        self.cache.sweep_expired()
    }

    /// Expected wait for a request submitted now.
    pub fn estimated_wait(&self) -> Duration {
        self.queue.estimated_wait()
    }

    /// Queue counters and current state for the monitoring surface.
    pub fn queue_stats(&self) -> QueueStatistics {
        self.queue.stats()
    }

    /// Cache contents and counters for the monitoring surface.
    pub fn cache_stats(&self) -> CacheStatistics {
        self.cache.stats()
    }

    fn next_request_id(&self, request: &ForecastRequest) -> String {
        let n = self.request_counter.fetch_add(1, Ordering::Relaxed);
        format!(
            "forecast-{:.2}-{:.2}-{}d-{}",
            request.latitude, request.longitude, request.horizon_days, n
        )
    }
}

impl std::fmt::Debug for ForecastService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ForecastService")
            .field("queue", &self.queue)
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}
