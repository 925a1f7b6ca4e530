//! Forecast result data model.
//!
//! Defines the structured payload produced by the compute collaborator and
//! stored by the result cache. The payload round-trips losslessly through
//! JSON; unknown fields are ignored on read so older readers tolerate newer
//! writers.

mod payload;

pub use payload::{ForecastDay, ForecastMetadata, ForecastPayload, Location, RawWeather};
