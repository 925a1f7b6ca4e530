//! End-to-end tests for the forecast service.
//!
//! These drive the composed cache + queue flow the API layer sees:
//! cache-first lookup, admission-controlled compute on miss, best-effort
//! write-back, and the differentiated error surface.

use agrocast::config::ServiceSettings;
use agrocast::forecast::{
    ForecastDay, ForecastMetadata, ForecastPayload, Location, RawWeather,
};
use agrocast::queue::{ComputeError, Priority};
use agrocast::service::{ForecastCompute, ForecastError, ForecastRequest, ForecastService};
use chrono::{TimeZone, Utc};
use futures::future::BoxFuture;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

// =============================================================================
// Test Helpers
// =============================================================================

fn sample_payload(lat: f64, lon: f64, horizon_days: u32) -> ForecastPayload {
    let day = ForecastDay {
        date: Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap(),
        rain_risk: 25.0,
        temp_extreme: 8.0,
        soil_moisture_proxy: 45.0,
        confidence_score: 0.92,
        raw_weather: RawWeather {
            precipitation_mm: 2.5,
            temp_max_c: 32.0,
            temp_min_c: 23.0,
            temp_mean_c: 27.0,
            humidity_percent: 68.0,
            wind_speed_ms: 3.0,
        },
    };

    ForecastPayload {
        location: Location {
            latitude: lat,
            longitude: lon,
            region: "Maharashtra, India".to_string(),
        },
        forecast_days: vec![day; horizon_days as usize],
        metadata: ForecastMetadata {
            model_version: "v0.1".to_string(),
            generated_at: Utc.with_ymd_and_hms(2025, 6, 1, 6, 0, 0).unwrap(),
            cache_hit: false,
            inference_time_ms: 100,
            era5_timestamp: None,
        },
    }
}

/// Compute stub: counts calls, optionally delays to simulate inference.
struct StubCompute {
    calls: AtomicUsize,
    delay: Duration,
}

impl StubCompute {
    fn new(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            delay,
        })
    }
}

impl ForecastCompute for StubCompute {
    fn forecast(
        &self,
        request: &ForecastRequest,
    ) -> BoxFuture<'static, Result<ForecastPayload, ComputeError>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let (lat, lon, horizon) = (request.latitude, request.longitude, request.horizon_days);
        let delay = self.delay;
        Box::pin(async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            Ok(sample_payload(lat, lon, horizon))
        })
    }
}

fn settings_for(temp: &TempDir) -> ServiceSettings {
    let mut settings = ServiceSettings::default();
    settings.cache.directory = temp.path().to_path_buf();
    settings.queue.timeout = Duration::from_secs(5);
    settings
}

// =============================================================================
// Integration Tests
// =============================================================================

#[tokio::test]
async fn burst_of_requests_runs_in_bounded_waves() {
    let temp = TempDir::new().unwrap();
    let mut settings = settings_for(&temp);
    settings.queue.max_concurrent = 2;
    settings.queue.max_queue_size = 10;

    let compute = StubCompute::new(Duration::from_millis(100));
    let service =
        Arc::new(ForecastService::new(settings, compute.clone()).unwrap());
    service.start().await;

    // Five distinct locations submitted at once: all complete, never more
    // than two computations in flight.
    let mut tasks = Vec::new();
    for i in 0..5 {
        let service = Arc::clone(&service);
        let lat = 18.0 + i as f64 * 0.5;
        tasks.push(tokio::spawn(async move {
            service
                .submit_forecast_job(ForecastRequest::new(lat, 73.86, 10, Priority::Normal))
                .await
        }));
    }

    for task in tasks {
        let payload = task.await.unwrap().unwrap();
        assert_eq!(payload.horizon_days(), 10);
    }

    let snapshot = service.queue_stats();
    assert_eq!(snapshot.stats.completed, 5);
    assert!(snapshot.peak_in_flight <= 2);
    assert_eq!(compute.calls.load(Ordering::SeqCst), 5);

    service.stop().await;
}

#[tokio::test]
async fn cached_results_survive_service_restarts() {
    let temp = TempDir::new().unwrap();
    let compute = StubCompute::new(Duration::ZERO);
    let request = ForecastRequest::new(18.52, 73.86, 10, Priority::Normal);

    {
        let service =
            ForecastService::new(settings_for(&temp), compute.clone()).unwrap();
        service.start().await;
        let payload = service.submit_forecast_job(request.clone()).await.unwrap();
        assert!(!payload.metadata.cache_hit);
        service.stop().await;
    }

    // A fresh service over the same cache directory serves from disk.
    let service = ForecastService::new(settings_for(&temp), compute.clone()).unwrap();
    service.start().await;

    let payload = service.submit_forecast_job(request).await.unwrap();
    assert!(payload.metadata.cache_hit);
    assert_eq!(compute.calls.load(Ordering::SeqCst), 1);

    service.stop().await;
}

#[tokio::test]
async fn nearby_coordinates_share_a_cached_forecast() {
    let temp = TempDir::new().unwrap();
    let compute = StubCompute::new(Duration::ZERO);
    let service = ForecastService::new(settings_for(&temp), compute.clone()).unwrap();
    service.start().await;

    service
        .submit_forecast_job(ForecastRequest::new(18.521, 73.857, 10, Priority::Normal))
        .await
        .unwrap();

    let nearby = service
        .submit_forecast_job(ForecastRequest::new(18.519, 73.858, 10, Priority::Normal))
        .await
        .unwrap();

    assert!(nearby.metadata.cache_hit);
    assert_eq!(compute.calls.load(Ordering::SeqCst), 1);

    service.stop().await;
}

#[tokio::test]
async fn expired_entries_are_swept_and_recomputed() {
    let temp = TempDir::new().unwrap();
    let mut settings = settings_for(&temp);
    settings.cache.ttl = Duration::from_millis(200);

    let compute = StubCompute::new(Duration::ZERO);
    let service = ForecastService::new(settings, compute.clone()).unwrap();
    service.start().await;

    let request = ForecastRequest::new(18.52, 73.86, 10, Priority::Normal);
    service.submit_forecast_job(request.clone()).await.unwrap();
    assert_eq!(service.cache_stats().valid_entries, 1);

    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(service.sweep_cache(), 1);
    assert_eq!(service.cache_stats().total_entries, 0);

    // The expired entry is gone, so the next request recomputes.
    let payload = service.submit_forecast_job(request).await.unwrap();
    assert!(!payload.metadata.cache_hit);
    assert_eq!(compute.calls.load(Ordering::SeqCst), 2);

    service.stop().await;
}

#[tokio::test]
async fn stopped_service_rejects_with_shutdown() {
    let temp = TempDir::new().unwrap();
    let compute = StubCompute::new(Duration::ZERO);
    let service = ForecastService::new(settings_for(&temp), compute).unwrap();
    service.start().await;
    service.stop().await;

    let result = service
        .submit_forecast_job(ForecastRequest::new(18.52, 73.86, 10, Priority::Normal))
        .await;
    assert!(matches!(result, Err(ForecastError::Shutdown)));
}

#[tokio::test]
async fn queue_timeout_surfaces_as_forecast_timeout() {
    let temp = TempDir::new().unwrap();
    let mut settings = settings_for(&temp);
    settings.queue.timeout = Duration::from_millis(100);

    let compute = StubCompute::new(Duration::from_millis(500));
    let service = ForecastService::new(settings, compute).unwrap();
    service.start().await;

    let result = service
        .submit_forecast_job(ForecastRequest::new(18.52, 73.86, 10, Priority::Normal))
        .await;
    assert!(matches!(result, Err(ForecastError::Timeout { .. })));
    assert_eq!(service.queue_stats().stats.timed_out, 1);

    service.stop().await;
}
