//! Forecast payload types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Geographic location a forecast was computed for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
    /// Human-readable region name (e.g., "Maharashtra, India").
    pub region: String,
}

/// Raw weather variables for a single forecast day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawWeather {
    pub precipitation_mm: f64,
    pub temp_max_c: f64,
    pub temp_min_c: f64,
    pub temp_mean_c: f64,
    pub humidity_percent: f64,
    pub wind_speed_ms: f64,
}

/// Single day of forecast output with derived agricultural risk scores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastDay {
    /// Forecast valid time (UTC).
    pub date: DateTime<Utc>,
    /// Rainfall risk score, 0-100.
    pub rain_risk: f64,
    /// Temperature extreme score, 0-100.
    pub temp_extreme: f64,
    /// Soil moisture proxy, 0-100.
    pub soil_moisture_proxy: f64,
    /// Model confidence for this lead time, 0-1.
    pub confidence_score: f64,
    /// Raw weather variables the scores were derived from.
    pub raw_weather: RawWeather,
}

/// Metadata about how a forecast was produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastMetadata {
    /// Version of the model that produced the forecast.
    pub model_version: String,
    /// Wall-clock time the forecast was generated (UTC).
    pub generated_at: DateTime<Utc>,
    /// Whether this payload was served from the result cache.
    #[serde(default)]
    pub cache_hit: bool,
    /// Inference duration in milliseconds.
    pub inference_time_ms: u64,
    /// Timestamp of the initial-conditions data, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub era5_timestamp: Option<DateTime<Utc>>,
}

/// Complete forecast result: location, per-day forecasts, and metadata.
///
/// This is the value the admission queue hands back to callers and the
/// result cache persists. Serialization is plain JSON via serde.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPayload {
    pub location: Location,
    pub forecast_days: Vec<ForecastDay>,
    pub metadata: ForecastMetadata,
}

impl ForecastPayload {
    /// Number of days covered by this forecast.
    pub fn horizon_days(&self) -> usize {
        self.forecast_days.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_payload() -> ForecastPayload {
        ForecastPayload {
            location: Location {
                latitude: 18.52,
                longitude: 73.86,
                region: "Maharashtra, India".to_string(),
            },
            forecast_days: vec![ForecastDay {
                date: Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap(),
                rain_risk: 42.0,
                temp_extreme: 10.0,
                soil_moisture_proxy: 55.0,
                confidence_score: 0.95,
                raw_weather: RawWeather {
                    precipitation_mm: 12.5,
                    temp_max_c: 34.0,
                    temp_min_c: 24.0,
                    temp_mean_c: 29.0,
                    humidity_percent: 70.0,
                    wind_speed_ms: 3.2,
                },
            }],
            metadata: ForecastMetadata {
                model_version: "v0.1".to_string(),
                generated_at: Utc.with_ymd_and_hms(2025, 6, 1, 6, 30, 0).unwrap(),
                cache_hit: false,
                inference_time_ms: 48_000,
                era5_timestamp: None,
            },
        }
    }

    #[test]
    fn payload_round_trips_through_json() {
        let payload = sample_payload();
        let json = serde_json::to_string_pretty(&payload).unwrap();
        let restored: ForecastPayload = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, payload);
    }

    #[test]
    fn unknown_fields_are_ignored_on_read() {
        let mut value = serde_json::to_value(sample_payload()).unwrap();
        value["future_field"] = serde_json::json!({"nested": true});
        value["metadata"]["another_new_field"] = serde_json::json!(17);

        let restored: ForecastPayload = serde_json::from_value(value).unwrap();
        assert_eq!(restored, sample_payload());
    }

    #[test]
    fn missing_optional_metadata_defaults() {
        let mut value = serde_json::to_value(sample_payload()).unwrap();
        let metadata = value["metadata"].as_object_mut().unwrap();
        metadata.remove("cache_hit");
        metadata.remove("era5_timestamp");

        let restored: ForecastPayload = serde_json::from_value(value).unwrap();
        assert!(!restored.metadata.cache_hit);
        assert!(restored.metadata.era5_timestamp.is_none());
    }

    #[test]
    fn horizon_days_matches_forecast_length() {
        let payload = sample_payload();
        assert_eq!(payload.horizon_days(), 1);
    }
}
