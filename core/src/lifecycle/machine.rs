//! The request state machine.
//!
//! Pure functions only: the transition table, command validation
//! (`decide`), and event application (`apply_event`). The engine runs them
//! inside an atomic store update, so everything here sees a consistent
//! snapshot of one request.
//!
//! ```text
//! pending/reviewing ──► offer_sent ──► accepted ──► completed
//!        │    │             │  │
//!        │    └─► accepted  │  └─► rejected
//!        └──► cancelled ◄───┘
//! ```

use super::cancellation::can_cancel;
use crate::error::LifecycleError;
use crate::types::{
    Actor, ActorRole, CounterOffer, HistoryEntry, Money, RequestStatus, ServiceRequest,
};
use chrono::{DateTime, Utc};
use smallvec::{SmallVec, smallvec};

/// Whether the table has an edge from `from` to `to`.
///
/// Exhaustive over the source status so a new state cannot be added without
/// deciding its row.
#[must_use]
pub const fn is_allowed(from: RequestStatus, to: RequestStatus) -> bool {
    use RequestStatus::{Accepted, Cancelled, Completed, OfferSent, Pending, Rejected, Reviewing};

    match from {
        Pending | Reviewing => matches!(to, OfferSent | Accepted | Cancelled),
        OfferSent => matches!(to, Accepted | Rejected | Cancelled),
        Accepted => matches!(to, Completed),
        Rejected | Completed | Cancelled => false,
    }
}

/// The row of the table for `from`.
#[must_use]
pub fn allowed_targets(from: RequestStatus) -> SmallVec<[RequestStatus; 3]> {
    use RequestStatus::{Accepted, Cancelled, Completed, OfferSent, Pending, Rejected, Reviewing};

    match from {
        Pending | Reviewing => smallvec![OfferSent, Accepted, Cancelled],
        OfferSent => smallvec![Accepted, Rejected, Cancelled],
        Accepted => smallvec![Completed],
        Rejected | Completed | Cancelled => SmallVec::new(),
    }
}

/// Role allowed to trigger the edge `from → to`.
const fn permits(role: ActorRole, from: RequestStatus, to: RequestStatus) -> bool {
    use RequestStatus::{Accepted, Cancelled, Completed, OfferSent, Rejected};

    match to {
        OfferSent | Completed => role.is_staff(),
        Accepted if from.is_awaiting_review() => role.is_staff(),
        Accepted | Rejected | Cancelled => matches!(role, ActorRole::Customer),
        _ => false,
    }
}

/// Intent submitted to the state machine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Admin approves at the requested price without negotiating
    Approve,
    /// Admin sends (or revises) a counter-offer
    SendOffer {
        /// Proposed price
        price: Money,
        /// Justification shown to the customer
        note: String,
    },
    /// Customer accepts the open offer
    Accept {
        /// Offer revision the customer saw, if known
        seen_revision: Option<u32>,
    },
    /// Customer rejects the open offer
    Reject {
        /// Offer revision the customer saw, if known
        seen_revision: Option<u32>,
    },
    /// Admin marks the work as done
    Complete,
    /// Customer cancels
    Cancel,
}

impl Command {
    /// Command that realizes a bare status transition.
    ///
    /// `offer_sent` carries a price and has no bare form.
    ///
    /// # Errors
    ///
    /// `InvalidTransition` when the table has no such edge, `Validation`
    /// when the target needs a payload.
    pub fn for_target(request: &ServiceRequest, to: RequestStatus) -> Result<Self, LifecycleError> {
        let from = request.status;
        if !is_allowed(from, to) {
            return Err(LifecycleError::InvalidTransition {
                id: request.id,
                from,
                to,
            });
        }

        match to {
            RequestStatus::Accepted if from.is_awaiting_review() => Ok(Self::Approve),
            RequestStatus::Accepted => Ok(Self::Accept {
                seen_revision: None,
            }),
            RequestStatus::Rejected => Ok(Self::Reject {
                seen_revision: None,
            }),
            RequestStatus::Completed => Ok(Self::Complete),
            RequestStatus::Cancelled => Ok(Self::Cancel),
            RequestStatus::OfferSent => Err(LifecycleError::Validation(
                "a counter-offer needs a price; send it as an offer".to_string(),
            )),
            RequestStatus::Pending | RequestStatus::Reviewing => {
                Err(LifecycleError::InvalidTransition {
                    id: request.id,
                    from,
                    to,
                })
            },
        }
    }
}

/// Fact produced by a valid command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// First counter-offer sent
    OfferSent {
        /// Proposed price
        price: Money,
        /// Justification
        note: String,
    },
    /// Open offer replaced before the customer responded
    OfferRevised {
        /// New price
        price: Money,
        /// New justification
        note: String,
        /// Revision number after the change
        revision: u32,
    },
    /// Admin approved at the requested price
    Approved {
        /// Agreed price
        final_price: Money,
    },
    /// Customer accepted the counter-offer
    OfferAccepted {
        /// Agreed price
        final_price: Money,
    },
    /// Customer rejected the counter-offer
    OfferRejected,
    /// Work fulfilled
    Completed,
    /// Customer cancelled
    Cancelled,
}

impl LifecycleEvent {
    /// Status the request is in after the event
    #[must_use]
    pub const fn status(&self) -> RequestStatus {
        match self {
            Self::OfferSent { .. } | Self::OfferRevised { .. } => RequestStatus::OfferSent,
            Self::Approved { .. } | Self::OfferAccepted { .. } => RequestStatus::Accepted,
            Self::OfferRejected => RequestStatus::Rejected,
            Self::Completed => RequestStatus::Completed,
            Self::Cancelled => RequestStatus::Cancelled,
        }
    }

    /// Revisions change the offer payload, not the state, and leave no
    /// history entry.
    #[must_use]
    pub const fn changes_status(&self) -> bool {
        !matches!(self, Self::OfferRevised { .. })
    }

    /// Event name for logs and metrics
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::OfferSent { .. } => "offer_sent",
            Self::OfferRevised { .. } => "offer_revised",
            Self::Approved { .. } => "approved",
            Self::OfferAccepted { .. } => "offer_accepted",
            Self::OfferRejected => "offer_rejected",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }
}

/// Validate `command` against the current state and the actor.
///
/// Business rules are checked before the actor's role, so a request in the
/// wrong state reports the state problem regardless of who asked.
///
/// # Errors
///
/// `Validation`, `InvalidTransition`, `StaleOffer`, `NotCancellable` or
/// `ActorNotPermitted`.
pub fn decide(
    request: &ServiceRequest,
    command: Command,
    actor: &Actor,
) -> Result<LifecycleEvent, LifecycleError> {
    let from = request.status;
    let invalid = |to| LifecycleError::InvalidTransition {
        id: request.id,
        from,
        to,
    };

    let event = match command {
        Command::Approve => {
            if !from.is_awaiting_review() {
                return Err(invalid(RequestStatus::Accepted));
            }
            LifecycleEvent::Approved {
                final_price: request.requested_price,
            }
        },

        Command::SendOffer { price, note } => {
            if !price.is_positive() {
                return Err(LifecycleError::Validation(format!(
                    "counter price must be positive, got {price}"
                )));
            }
            match (from, &request.counter_offer) {
                (status, _) if status.is_awaiting_review() => {
                    LifecycleEvent::OfferSent { price, note }
                },
                (RequestStatus::OfferSent, Some(open)) => LifecycleEvent::OfferRevised {
                    price,
                    note,
                    revision: open.revision + 1,
                },
                _ => return Err(invalid(RequestStatus::OfferSent)),
            }
        },

        Command::Accept { seen_revision } => {
            let open = open_offer(request, seen_revision)?;
            LifecycleEvent::OfferAccepted {
                final_price: open.price,
            }
        },

        Command::Reject { seen_revision } => {
            open_offer(request, seen_revision)?;
            LifecycleEvent::OfferRejected
        },

        Command::Complete => {
            if !is_allowed(from, RequestStatus::Completed) {
                return Err(invalid(RequestStatus::Completed));
            }
            LifecycleEvent::Completed
        },

        Command::Cancel => {
            if !can_cancel(from) {
                return Err(LifecycleError::NotCancellable {
                    id: request.id,
                    status: from,
                });
            }
            LifecycleEvent::Cancelled
        },
    };

    authorize(request, &event, actor)?;
    Ok(event)
}

/// The offer a customer response applies to.
fn open_offer(
    request: &ServiceRequest,
    seen_revision: Option<u32>,
) -> Result<&CounterOffer, LifecycleError> {
    let stale = || LifecycleError::StaleOffer {
        id: request.id,
        status: request.status,
    };

    if request.status != RequestStatus::OfferSent {
        return Err(stale());
    }
    let open = request.counter_offer.as_ref().ok_or_else(stale)?;
    match seen_revision {
        Some(seen) if seen != open.revision => Err(stale()),
        _ => Ok(open),
    }
}

fn authorize(
    request: &ServiceRequest,
    event: &LifecycleEvent,
    actor: &Actor,
) -> Result<(), LifecycleError> {
    let target = event.status();
    let denied = || LifecycleError::ActorNotPermitted {
        id: request.id,
        role: actor.role,
        target,
    };

    if !permits(actor.role, request.status, target) {
        return Err(denied());
    }
    if actor.role == ActorRole::Customer && !actor.is_customer(&request.customer) {
        return Err(denied());
    }
    Ok(())
}

/// Apply a decided event to the request.
///
/// Status-changing events append exactly one history entry; revisions only
/// replace the offer payload.
pub fn apply_event(
    request: &mut ServiceRequest,
    event: &LifecycleEvent,
    actor: &Actor,
    at: DateTime<Utc>,
    history_note: Option<String>,
) {
    match event {
        LifecycleEvent::OfferSent { price, note } => {
            request.counter_offer = Some(CounterOffer {
                price: *price,
                note: note.clone(),
                revision: 1,
                issued_at: at,
            });
        },
        LifecycleEvent::OfferRevised {
            price,
            note,
            revision,
        } => {
            request.counter_offer = Some(CounterOffer {
                price: *price,
                note: note.clone(),
                revision: *revision,
                issued_at: at,
            });
        },
        LifecycleEvent::Approved { final_price } | LifecycleEvent::OfferAccepted { final_price } => {
            request.final_price = Some(*final_price);
        },
        LifecycleEvent::OfferRejected | LifecycleEvent::Completed | LifecycleEvent::Cancelled => {},
    }

    request.updated_at = at;
    if !event.changes_status() {
        return;
    }

    request.status = event.status();
    request.status_history.push(HistoryEntry {
        status: request.status,
        timestamp: at,
        note: history_note.or_else(|| default_note(event)),
        actor: actor.clone(),
    });
}

fn default_note(event: &LifecycleEvent) -> Option<String> {
    match event {
        LifecycleEvent::OfferSent { price, note } if note.trim().is_empty() => {
            Some(format!("Counter-offer: {price}"))
        },
        LifecycleEvent::OfferSent { price, note } => Some(format!("Counter-offer: {price} ({note})")),
        LifecycleEvent::Approved { final_price } => {
            Some(format!("Approved at requested price {final_price}"))
        },
        LifecycleEvent::OfferAccepted { final_price } => {
            Some(format!("Offer accepted at {final_price}"))
        },
        LifecycleEvent::Cancelled => Some("Cancelled by customer".to_string()),
        _ => None,
    }
}
