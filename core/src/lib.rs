//! # Service Desk Core
//!
//! Request lifecycle engine and availability aggregator shared by the four
//! transaction types of the service desk: sell-in, moving, technical service
//! and delivery orders.
//!
//! ## Core Concepts
//!
//! - **Status machine**: one closed transition table for every request kind
//! - **Command / Event**: operations are decided into a [`LifecycleEvent`]
//!   and applied to the record, appending exactly one history entry per
//!   status change
//! - **Request store**: persistence behind the [`RequestStore`] trait; each
//!   engine operation is a single atomic `update`
//! - **Environment**: time comes from an injected [`Clock`]
//!
//! ## Example
//!
//! ```ignore
//! use servicedesk_core::*;
//!
//! let engine = LifecycleEngine::new(store.clone(), Arc::new(SystemClock), EngineConfig::default());
//! let id = engine.submit(submission, &Actor::customer("cust-7")).await?;
//! engine.send_offer(id, Money::new(8_500), "condition is fair", &Actor::admin("ops")).await?;
//!
//! let calendar = AvailabilityAggregator::new(store, AvailabilityConfig::default());
//! let report = calendar.get_availability(start, end).await?;
//! ```

pub mod availability;
pub mod config;
pub mod environment;
pub mod error;
pub mod lifecycle;
pub mod store;
pub mod types;

pub use availability::{AvailabilityAggregator, AvailabilityReport, BusySlot, SkipReason, SkippedRecord};
pub use config::{AvailabilityConfig, EngineConfig, WorkingHours};
pub use environment::{Clock, SystemClock};
pub use error::{LifecycleError, StoreError};
pub use lifecycle::{LifecycleEngine, LifecycleEvent, OfferResponse, can_cancel};
pub use store::{Mutator, RequestStore, StoreFuture};
pub use types::{
    Actor, ActorRole, CounterOffer, CustomerId, CustomerRef, HistoryEntry, Money, NewRequest,
    RequestId, RequestKind, RequestNumber, RequestStatus, Schedule, ServiceRequest, Submission,
};
