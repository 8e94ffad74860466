//! HTTP router.
//!
//! Composes all handlers into a single Axum router.

use crate::handlers::{availability, health, requests};
use crate::middleware::correlation_id;
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

/// Service desk API routes, without state or layers.
///
/// # Routes
///
/// - `POST /requests` - Submit a request
/// - `GET /requests/:id` - Get request details
/// - `GET /requests/:id/timeline` - Get the status history
/// - `POST /requests/:id/transition` - Move to another status
/// - `POST /requests/:id/offer` - Send or revise a counter-offer
/// - `POST /requests/:id/respond` - Accept or reject the counter-offer
/// - `POST /requests/:id/cancel` - Cancel
/// - `GET /availability?start=&end=` - Busy calendar (staff only)
pub fn api_router() -> Router<AppState> {
    Router::new()
        .route("/requests", post(requests::submit_request))
        .route("/requests/:id", get(requests::get_request))
        .route("/requests/:id/timeline", get(requests::get_timeline))
        .route("/requests/:id/transition", post(requests::transition_request))
        .route("/requests/:id/offer", post(requests::send_offer))
        .route("/requests/:id/respond", post(requests::respond_to_offer))
        .route("/requests/:id/cancel", post(requests::cancel_request))
        .route("/availability", get(availability::get_availability))
}

/// Complete application: `/health`, the API under `/api/v1`, correlation ids
/// and request tracing.
///
/// # Example
///
/// ```rust,ignore
/// let app = router(AppState::new(store, Arc::new(SystemClock), &config));
/// axum::serve(listener, app).await?;
/// ```
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .nest("/api/v1", api_router())
        .layer(TraceLayer::new_for_http())
        .layer(axum::middleware::from_fn(correlation_id))
        .with_state(state)
}
