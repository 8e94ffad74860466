//! Price negotiation between admin and customer.
//!
//! The admin answers a requested price with a counter-offer; the customer
//! accepts or rejects it. Resending before the customer responds replaces the
//! offer payload without recording another `offer_sent` transition.

use super::engine::LifecycleEngine;
use super::machine::Command;
use crate::error::LifecycleError;
use crate::types::{Actor, Money, RequestId, ServiceRequest};
use serde::{Deserialize, Serialize};

/// Customer answer to an open counter-offer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OfferResponse {
    /// Agree to the counter price
    Accept,
    /// Decline; the request ends as rejected
    Reject,
}

impl LifecycleEngine {
    /// Send a counter-offer, or revise the open one.
    ///
    /// From `pending`/`reviewing` this moves the request to `offer_sent`.
    /// From `offer_sent` it replaces the payload and bumps the revision.
    ///
    /// # Errors
    ///
    /// - `Validation`: non-positive price
    /// - `InvalidTransition`: any other status (including `rejected`)
    /// - `ActorNotPermitted`: the actor is not staff
    /// - `NotFound`, `StoreUnavailable`
    pub async fn send_offer(
        &self,
        id: RequestId,
        counter_price: Money,
        note: impl Into<String>,
        actor: &Actor,
    ) -> Result<ServiceRequest, LifecycleError> {
        if !counter_price.is_positive() {
            return Err(LifecycleError::Validation(format!(
                "counter price must be positive, got {counter_price}"
            )));
        }

        let note = note.into().trim().to_string();
        self.execute(id, actor, None, move |_| {
            Ok(Command::SendOffer {
                price: counter_price,
                note,
            })
        })
        .await
    }

    /// Record the customer's answer to the open offer.
    ///
    /// `seen_revision` is the offer revision shown to the customer; when the
    /// admin has revised the offer since, the response is refused instead of
    /// silently accepting a different price.
    ///
    /// # Errors
    ///
    /// - `StaleOffer`: no open offer, or a newer revision exists
    /// - `ActorNotPermitted`: the actor is not the owning customer
    /// - `NotFound`, `StoreUnavailable`
    pub async fn respond(
        &self,
        id: RequestId,
        response: OfferResponse,
        actor: &Actor,
        seen_revision: Option<u32>,
    ) -> Result<ServiceRequest, LifecycleError> {
        let command = match response {
            OfferResponse::Accept => Command::Accept { seen_revision },
            OfferResponse::Reject => Command::Reject { seen_revision },
        };
        self.execute(id, actor, None, move |_| Ok(command)).await
    }
}
