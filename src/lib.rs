//! Agrocast - admission control and result caching for expensive forecasts
//!
//! This library sits between an HTTP API surface and minutes-long model
//! inference: a bounded-concurrency priority queue limits how many
//! expensive computations run simultaneously, and a TTL-based file cache
//! lets repeat requests for the same (location, horizon) skip compute
//! entirely.
//!
//! # High-Level API
//!
//! For most use cases, the [`service`] module provides a composed facade:
//!
//! ```ignore
//! use agrocast::config::ServiceSettings;
//! use agrocast::queue::Priority;
//! use agrocast::service::{ForecastRequest, ForecastService};
//!
//! let service = ForecastService::new(ServiceSettings::default(), compute)?;
//! service.start().await;
//!
//! let payload = service
//!     .submit_forecast_job(ForecastRequest::new(18.52, 73.86, 10, Priority::Normal))
//!     .await?;
//! ```
//!
//! The [`queue`] and [`cache`] modules are usable on their own; the queue
//! in particular is generic over its task's output type and carries no
//! forecast-specific knowledge.

pub mod cache;
pub mod config;
pub mod forecast;
pub mod logging;
pub mod queue;
pub mod service;

/// Version of the agrocast library.
///
/// Defined in `Cargo.toml` and injected at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
