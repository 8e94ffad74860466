//! Customer cancellation policy.

use super::engine::LifecycleEngine;
use super::machine::Command;
use crate::error::LifecycleError;
use crate::types::{Actor, RequestId, RequestStatus, ServiceRequest};

/// Whether a customer may cancel a request in `status`.
///
/// Cancelling is possible until a price has been agreed. Once accepted, only
/// admin-side completion applies.
#[must_use]
pub const fn can_cancel(status: RequestStatus) -> bool {
    matches!(
        status,
        RequestStatus::Pending | RequestStatus::Reviewing | RequestStatus::OfferSent
    )
}

impl LifecycleEngine {
    /// Cancel a request on behalf of its customer.
    ///
    /// The policy is evaluated against the status read inside the atomic
    /// update, not against a possibly stale copy held by the caller.
    ///
    /// # Errors
    ///
    /// - `NotCancellable`: the request is past the point of cancelling
    /// - `ActorNotPermitted`: the actor is not the owning customer
    /// - `NotFound`, `StoreUnavailable`
    pub async fn cancel(
        &self,
        id: RequestId,
        actor: &Actor,
        reason: Option<String>,
    ) -> Result<ServiceRequest, LifecycleError> {
        let reason = reason.filter(|r| !r.trim().is_empty());
        self.execute(id, actor, reason, |_| Ok(Command::Cancel)).await
    }
}
