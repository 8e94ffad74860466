//! Request lifecycle: the status machine, negotiation and cancellation.
//!
//! [`machine`] holds the pure rules (transition table, command decision,
//! event application). [`LifecycleEngine`] runs them against a
//! [`RequestStore`](crate::store::RequestStore) with one atomic update per
//! operation.

mod cancellation;
mod engine;
pub mod machine;
mod negotiation;

pub use cancellation::can_cancel;
pub use engine::LifecycleEngine;
pub use machine::{Command, LifecycleEvent, allowed_targets, is_allowed};
pub use negotiation::OfferResponse;
