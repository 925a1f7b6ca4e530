//! Forecast service facade.
//!
//! Composes the result cache and the admission queue behind a single
//! handle the API layer calls. The handle is built once at process start
//! from validated settings and passed around explicitly. There is no
//! global state, so tests construct fresh instances freely.
//!
//! Request flow: cache lookup first; on a miss the expensive computation
//! is built by the [`ForecastCompute`] collaborator and admitted through
//! the queue; a successful result is written back to the cache on a
//! best-effort basis.

mod compute;
mod error;
mod facade;

pub use compute::{ForecastCompute, ForecastRequest};
pub use error::{ForecastError, ServiceError};
pub use facade::ForecastService;
