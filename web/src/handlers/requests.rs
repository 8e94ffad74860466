//! Service request endpoints.
//!
//! Thin adapters: parse the body, call the lifecycle engine with the caller's
//! identity, map the result.

use crate::error::AppError;
use crate::extractors::{ActorContext, CorrelationId};
use crate::state::AppState;
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use servicedesk_core::{
    HistoryEntry, Money, OfferResponse, RequestId, RequestNumber, RequestStatus, ServiceRequest,
    Submission,
};

/// Response after submitting a request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitResponse {
    /// New request id
    pub id: RequestId,
    /// Display code
    pub request_number: RequestNumber,
    /// Always `pending`
    pub status: RequestStatus,
}

/// Body of `POST /requests/:id/transition`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitionBody {
    /// Target status
    pub to: RequestStatus,
    /// Optional history note
    #[serde(default)]
    pub note: Option<String>,
}

/// Body of `POST /requests/:id/offer`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OfferBody {
    /// Proposed price
    pub counter_price: Money,
    /// Justification shown to the customer
    #[serde(default)]
    pub note: String,
}

/// Body of `POST /requests/:id/respond`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RespondBody {
    /// `accept` or `reject`
    pub response: OfferResponse,
    /// Offer revision the customer saw
    #[serde(default)]
    pub seen_revision: Option<u32>,
}

/// Body of `POST /requests/:id/cancel`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CancelBody {
    /// Why the customer cancels
    #[serde(default)]
    pub reason: Option<String>,
}

fn request_id(raw: &str) -> Result<RequestId, AppError> {
    raw.parse().map_err(|_| AppError::not_found("Request", raw))
}

/// Submit a new request.
///
/// ```text
/// POST /api/v1/requests
/// ```
///
/// # Errors
///
/// 422 on invalid input, 503 when the store is unavailable.
pub async fn submit_request(
    State(state): State<AppState>,
    ActorContext(actor): ActorContext,
    correlation_id: CorrelationId,
    Json(submission): Json<Submission>,
) -> Result<(StatusCode, Json<SubmitResponse>), AppError> {
    tracing::debug!(correlation_id = %correlation_id.0, kind = %submission.kind, "Submitting request");

    let id = state.engine.submit(submission, &actor).await?;
    let created = state.engine.get(id).await?;

    Ok((
        StatusCode::CREATED,
        Json(SubmitResponse {
            id,
            request_number: created.request_number,
            status: created.status,
        }),
    ))
}

/// Load one request.
///
/// ```text
/// GET /api/v1/requests/:id
/// ```
///
/// # Errors
///
/// 404 for unknown ids, and for requests owned by another customer.
pub async fn get_request(
    State(state): State<AppState>,
    ActorContext(actor): ActorContext,
    Path(id): Path<String>,
) -> Result<Json<ServiceRequest>, AppError> {
    let id = request_id(&id)?;
    let request = state.engine.get(id).await?;
    if !actor.role.is_staff() && !actor.is_customer(&request.customer) {
        return Err(AppError::not_found("Request", id));
    }
    Ok(Json(request))
}

/// History of one request, oldest first.
///
/// ```text
/// GET /api/v1/requests/:id/timeline
/// ```
///
/// # Errors
///
/// Same as [`get_request`].
pub async fn get_timeline(
    state: State<AppState>,
    actor: ActorContext,
    id: Path<String>,
) -> Result<Json<Vec<HistoryEntry>>, AppError> {
    let Json(request) = get_request(state, actor, id).await?;
    Ok(Json(request.status_history))
}

/// Generic status transition.
///
/// ```text
/// POST /api/v1/requests/:id/transition
/// { "to": "accepted", "note": "optional" }
/// ```
///
/// # Errors
///
/// 409 for transitions outside the table, 403 for the wrong role.
pub async fn transition_request(
    State(state): State<AppState>,
    ActorContext(actor): ActorContext,
    Path(id): Path<String>,
    Json(body): Json<TransitionBody>,
) -> Result<Json<ServiceRequest>, AppError> {
    let id = request_id(&id)?;
    let updated = state.engine.transition(id, body.to, &actor, body.note).await?;
    Ok(Json(updated))
}

/// Send or revise a counter-offer.
///
/// ```text
/// POST /api/v1/requests/:id/offer
/// { "counter_price": 8500, "note": "Scratches on the lid" }
/// ```
///
/// # Errors
///
/// 422 for a non-positive price, 409 when the request is past negotiation.
pub async fn send_offer(
    State(state): State<AppState>,
    ActorContext(actor): ActorContext,
    Path(id): Path<String>,
    Json(body): Json<OfferBody>,
) -> Result<Json<ServiceRequest>, AppError> {
    let id = request_id(&id)?;
    let updated = state
        .engine
        .send_offer(id, body.counter_price, body.note, &actor)
        .await?;
    Ok(Json(updated))
}

/// Customer answer to the open counter-offer.
///
/// ```text
/// POST /api/v1/requests/:id/respond
/// { "response": "accept", "seen_revision": 1 }
/// ```
///
/// # Errors
///
/// 409 when there is no open offer or it was revised since.
pub async fn respond_to_offer(
    State(state): State<AppState>,
    ActorContext(actor): ActorContext,
    Path(id): Path<String>,
    Json(body): Json<RespondBody>,
) -> Result<Json<ServiceRequest>, AppError> {
    let id = request_id(&id)?;
    let updated = state
        .engine
        .respond(id, body.response, &actor, body.seen_revision)
        .await?;
    Ok(Json(updated))
}

/// Customer cancellation. The body is optional.
///
/// ```text
/// POST /api/v1/requests/:id/cancel
/// { "reason": "Found another mover" }
/// ```
///
/// # Errors
///
/// 409 once a price has been agreed.
pub async fn cancel_request(
    State(state): State<AppState>,
    ActorContext(actor): ActorContext,
    Path(id): Path<String>,
    body: Option<Json<CancelBody>>,
) -> Result<Json<ServiceRequest>, AppError> {
    let id = request_id(&id)?;
    let reason = body.and_then(|Json(body)| body.reason);
    let updated = state.engine.cancel(id, &actor, reason).await?;
    Ok(Json(updated))
}
