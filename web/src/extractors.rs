//! Custom Axum extractors.
//!
//! - `ActorContext`: caller identity forwarded by the upstream gateway
//! - `CorrelationId`: request correlation id set by the middleware
//!
//! # Examples
//!
//! ```ignore
//! async fn handler(
//!     State(state): State<AppState>,
//!     ActorContext(actor): ActorContext,
//!     correlation_id: CorrelationId,
//! ) -> Result<Json<ServiceRequest>, AppError> {
//!     tracing::info!(correlation_id = %correlation_id.0, actor = %actor, "Cancelling");
//!     Ok(Json(state.engine.cancel(id, &actor, None).await?))
//! }
//! ```

use crate::error::AppError;
use crate::middleware::CORRELATION_ID_HEADER;
use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use servicedesk_core::{Actor, ActorRole};
use uuid::Uuid;

/// Header carrying the authenticated subject id
pub const ACTOR_ID_HEADER: &str = "X-Actor-Id";

/// Header carrying the caller role (`customer`, `admin`, `system`)
pub const ACTOR_ROLE_HEADER: &str = "X-Actor-Role";

/// Identity of the caller.
///
/// Authentication happens upstream; this only reads the forwarded headers.
/// Missing or unknown values are rejected with 401.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActorContext(pub Actor);

#[async_trait]
impl<S> FromRequestParts<S> for ActorContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let id = header(parts, ACTOR_ID_HEADER)
            .ok_or_else(|| AppError::unauthorized(format!("missing {ACTOR_ID_HEADER} header")))?;
        let role = header(parts, ACTOR_ROLE_HEADER)
            .ok_or_else(|| AppError::unauthorized(format!("missing {ACTOR_ROLE_HEADER} header")))?
            .parse::<ActorRole>()
            .map_err(|e| AppError::unauthorized(e.to_string()))?;

        Ok(Self(Actor {
            id: id.to_string(),
            role,
        }))
    }
}

fn header<'a>(parts: &'a Parts, name: &str) -> Option<&'a str> {
    parts
        .headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

/// Correlation ID for request tracing.
///
/// Reads the id stored by the correlation middleware, falling back to the
/// `X-Correlation-ID` header, or a fresh UUID v4.
#[derive(Debug, Clone, Copy)]
pub struct CorrelationId(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for CorrelationId
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let correlation_id = parts
            .extensions
            .get::<Self>()
            .map(|id| id.0)
            .or_else(|| header(parts, CORRELATION_ID_HEADER).and_then(|s| Uuid::parse_str(s).ok()))
            .unwrap_or_else(Uuid::new_v4);

        Ok(Self(correlation_id))
    }
}
