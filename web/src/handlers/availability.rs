//! Availability calendar endpoint.

use crate::error::AppError;
use crate::extractors::ActorContext;
use crate::state::AppState;
use axum::{
    Json,
    extract::{Query, State},
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use servicedesk_core::AvailabilityReport;

/// Query string of `GET /availability`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilityParams {
    /// First day, `YYYY-MM-DD`
    pub start: NaiveDate,
    /// Last day, inclusive
    pub end: NaiveDate,
}

/// Busy calendar for a date range.
///
/// Slot labels carry customer names and phone numbers, so only staff may
/// read the calendar.
///
/// # Example
///
/// ```bash
/// curl -H 'X-Actor-Id: ops-1' -H 'X-Actor-Role: admin' \
///     'http://localhost:8080/api/v1/availability?start=2025-06-02&end=2025-06-08'
/// ```
///
/// # Errors
///
/// 401 without identity, 403 for customers, 422 for an inverted or oversized
/// range, 503 when a kind query fails.
pub async fn get_availability(
    State(state): State<AppState>,
    ActorContext(actor): ActorContext,
    Query(params): Query<AvailabilityParams>,
) -> Result<Json<AvailabilityReport>, AppError> {
    if !actor.role.is_staff() {
        return Err(AppError::forbidden("The availability calendar is staff only"));
    }

    let report = state
        .availability
        .get_availability(params.start, params.end)
        .await?;
    Ok(Json(report))
}
