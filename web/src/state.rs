//! Application state for Axum handlers.

use crate::config::Config;
use servicedesk_core::{AvailabilityAggregator, Clock, LifecycleEngine, RequestStore};
use std::sync::Arc;

/// Application state shared across all HTTP handlers.
///
/// Both services read and write through the same [`RequestStore`].
#[derive(Clone)]
pub struct AppState {
    /// Request lifecycle operations
    pub engine: Arc<LifecycleEngine>,
    /// Busy calendar queries
    pub availability: Arc<AvailabilityAggregator>,
}

impl AppState {
    /// Wire the engine and the aggregator over `store`.
    #[must_use]
    pub fn new(store: Arc<dyn RequestStore>, clock: Arc<dyn Clock>, config: &Config) -> Self {
        Self {
            engine: Arc::new(LifecycleEngine::new(Arc::clone(&store), clock, config.engine)),
            availability: Arc::new(AvailabilityAggregator::new(store, config.availability)),
        }
    }
}
