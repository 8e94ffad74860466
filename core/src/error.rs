//! Error taxonomy for the lifecycle engine and the availability aggregator.
//!
//! Business-rule violations are always returned as typed errors so callers
//! can render a specific message; nothing is swallowed or turned into a
//! boolean. Infrastructure failures from the request store propagate
//! unchanged and are never retried here.

use crate::types::{ActorRole, RequestId, RequestStatus};
use thiserror::Error;

/// Errors surfaced by every engine and aggregator operation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LifecycleError {
    /// Malformed input, surfaced to the caller verbatim.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The transition table has no edge from `from` to `to`.
    #[error("Request {id} cannot move from '{from}' to '{to}'")]
    InvalidTransition {
        /// Request the transition was attempted on
        id: RequestId,
        /// Current status
        from: RequestStatus,
        /// Attempted target
        to: RequestStatus,
    },

    /// A customer responded to an offer that is no longer open.
    #[error("Request {id} has no open offer to respond to (status '{status}')")]
    StaleOffer {
        /// Request the response was sent for
        id: RequestId,
        /// Current status
        status: RequestStatus,
    },

    /// The cancellation policy refused a customer cancel.
    #[error("Request {id} can no longer be cancelled (status '{status}')")]
    NotCancellable {
        /// Request the cancel was attempted on
        id: RequestId,
        /// Current status
        status: RequestStatus,
    },

    /// The actor's role may not trigger this transition.
    #[error("A {role} may not move request {id} to '{target}'")]
    ActorNotPermitted {
        /// Request the transition was attempted on
        id: RequestId,
        /// Role of the caller
        role: ActorRole,
        /// Attempted target
        target: RequestStatus,
    },

    /// No request with this id exists.
    #[error("Request {0} not found")]
    NotFound(RequestId),

    /// The request store failed or did not answer in time; retry later.
    #[error("Request store unavailable: {0}")]
    StoreUnavailable(String),
}

impl LifecycleError {
    /// Whether this is a business-rule refusal (as opposed to bad input,
    /// a missing record, or infrastructure)
    #[must_use]
    pub const fn is_rule_violation(&self) -> bool {
        matches!(
            self,
            Self::InvalidTransition { .. }
                | Self::StaleOffer { .. }
                | Self::NotCancellable { .. }
                | Self::ActorNotPermitted { .. }
        )
    }

    /// Whether the caller may retry the same call later
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::StoreUnavailable(_))
    }

    /// Short label used for metrics and logs
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::InvalidTransition { .. } => "invalid_transition",
            Self::StaleOffer { .. } => "stale_offer",
            Self::NotCancellable { .. } => "not_cancellable",
            Self::ActorNotPermitted { .. } => "actor_not_permitted",
            Self::NotFound(_) => "not_found",
            Self::StoreUnavailable(_) => "store_unavailable",
        }
    }
}

/// Errors reported by a [`RequestStore`](crate::store::RequestStore).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// No record with this id.
    #[error("Request {0} not found")]
    NotFound(RequestId),

    /// Connection, query or lock failure.
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// The update mutator refused the change; nothing was written.
    #[error("Update rejected: {0}")]
    Rejected(Box<LifecycleError>),
}

impl From<StoreError> for LifecycleError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::NotFound(id) => Self::NotFound(id),
            StoreError::Unavailable(message) => Self::StoreUnavailable(message),
            StoreError::Rejected(inner) => *inner,
        }
    }
}
