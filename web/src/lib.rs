//! HTTP API for the service desk.
//!
//! Exposes the request lifecycle engine and the availability calendar as JSON
//! endpoints. Caller identity is forwarded by an upstream gateway in the
//! `X-Actor-Id` and `X-Actor-Role` headers.
//!
//! # Request Flow
//!
//! 1. **Correlation id** is attached by the middleware
//! 2. **Extract** the caller ([`ActorContext`]) and the JSON body
//! 3. **Call** the [`LifecycleEngine`](servicedesk_core::LifecycleEngine) or
//!    the [`AvailabilityAggregator`](servicedesk_core::AvailabilityAggregator)
//! 4. **Map** the result, or the [`LifecycleError`](servicedesk_core::LifecycleError)
//!    through [`AppError`]
//!
//! # Example
//!
//! ```ignore
//! let config = Config::from_env()?;
//! let state = AppState::new(store, Arc::new(SystemClock), &config);
//! axum::serve(listener, router(state)).await?;
//! ```

#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod router;
pub mod state;

pub use config::{Config, ConfigError};
pub use error::AppError;
pub use extractors::{ACTOR_ID_HEADER, ACTOR_ROLE_HEADER, ActorContext, CorrelationId};
pub use middleware::CORRELATION_ID_HEADER;
pub use router::router;
pub use state::AppState;
