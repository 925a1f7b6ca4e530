//! Cache key derivation.
//!
//! Keys are derived from (latitude, longitude, forecast horizon) with
//! coordinates rounded to two decimal degrees, so near-duplicate requests
//! collapse to one entry. A short hash suffix keeps filenames stable and
//! free of pathological float formatting.

use sha2::{Digest, Sha256};

/// Length of the hex hash suffix in entry filenames.
const HASH_LEN: usize = 8;

/// Cache key uniquely identifying a cached forecast.
///
/// Coordinates are stored in centi-degrees so equality and hashing are
/// exact after rounding.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    lat_centi: i32,
    lon_centi: i32,
    horizon_days: u32,
}

impl CacheKey {
    /// Derives the key for a request, rounding coordinates to two
    /// decimal places.
    pub fn new(lat: f64, lon: f64, horizon_days: u32) -> Self {
        Self {
            lat_centi: (lat * 100.0).round() as i32,
            lon_centi: (lon * 100.0).round() as i32,
            horizon_days,
        }
    }

    /// Rounded latitude in degrees.
    pub fn latitude(&self) -> f64 {
        self.lat_centi as f64 / 100.0
    }

    /// Rounded longitude in degrees.
    pub fn longitude(&self) -> f64 {
        self.lon_centi as f64 / 100.0
    }

    /// Forecast horizon in days.
    pub fn horizon_days(&self) -> u32 {
        self.horizon_days
    }

    /// Canonical string the hash suffix is derived from.
    fn canonical(&self) -> String {
        format!(
            "{:.2}_{:.2}_{}",
            self.latitude(),
            self.longitude(),
            self.horizon_days
        )
    }

    /// Short stable hash of the canonical key string.
    pub fn fingerprint(&self) -> String {
        let digest = Sha256::digest(self.canonical().as_bytes());
        hex::encode(digest)[..HASH_LEN].to_string()
    }

    /// Entry filename within a day bucket.
    pub fn file_name(&self) -> String {
        format!(
            "forecast_{:.2}_{:.2}_{}_{}.json",
            self.latitude(),
            self.longitude(),
            self.horizon_days,
            self.fingerprint()
        )
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.canonical())
    }
}
