//! # Service Desk Testing
//!
//! Test support for the service desk crates.
//!
//! This crate provides:
//! - [`InMemoryRequestStore`]: reference `RequestStore` with latency and
//!   outage injection
//! - Deterministic clocks
//! - Fixture builders for submissions and stored records
//! - proptest strategies for domain enums
//!
//! ## Example
//!
//! ```ignore
//! use servicedesk_testing::{harness, fixtures};
//!
//! #[tokio::test]
//! async fn offer_flow() {
//!     let (store, engine) = harness::engine();
//!     let id = engine.submit(fixtures::submission(RequestKind::Sell, 12_000), &fixtures::owner()).await?;
//!     engine.send_offer(id, Money::new(8_500), "", &fixtures::admin()).await?;
//!     assert_eq!(store.len().await, 1);
//! }
//! ```

pub mod fixtures;
mod request_store;

pub use request_store::InMemoryRequestStore;

use chrono::{DateTime, Utc};
use servicedesk_core::environment::Clock;

/// Mock implementations of environment traits.
pub mod mocks {
    use super::{Clock, DateTime, Utc};

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use servicedesk_testing::mocks::FixedClock;
    /// use servicedesk_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// assert_eq!(clock.now(), clock.now());
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Create a default fixed clock for tests (2025-06-01 08:00:00 UTC)
    ///
    /// # Panics
    ///
    /// Panics if the hardcoded timestamp fails to parse.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(
            DateTime::parse_from_rfc3339("2025-06-01T08:00:00Z")
                .expect("hardcoded timestamp should always parse")
                .with_timezone(&Utc),
        )
    }
}

/// Ready-made engine and aggregator wired to an in-memory store.
pub mod harness {
    use super::InMemoryRequestStore;
    use super::mocks::test_clock;
    use servicedesk_core::{AvailabilityAggregator, AvailabilityConfig, EngineConfig, LifecycleEngine};
    use std::sync::Arc;
    use std::time::Duration;

    /// Store timeout used by the harness; short so timeout tests stay fast
    pub const TEST_STORE_TIMEOUT: Duration = Duration::from_millis(200);

    /// A fresh store and an engine over it
    #[must_use]
    pub fn engine() -> (InMemoryRequestStore, LifecycleEngine) {
        let store = InMemoryRequestStore::new();
        let engine = engine_over(&store);
        (store, engine)
    }

    /// An engine over an existing store
    #[must_use]
    pub fn engine_over(store: &InMemoryRequestStore) -> LifecycleEngine {
        LifecycleEngine::new(
            Arc::new(store.clone()),
            Arc::new(test_clock()),
            EngineConfig {
                store_timeout: TEST_STORE_TIMEOUT,
            },
        )
    }

    /// An aggregator over an existing store with default calendar settings
    #[must_use]
    pub fn aggregator_over(store: &InMemoryRequestStore) -> AvailabilityAggregator {
        AvailabilityAggregator::new(
            Arc::new(store.clone()),
            AvailabilityConfig {
                store_timeout: TEST_STORE_TIMEOUT,
                ..AvailabilityConfig::default()
            },
        )
    }

    /// Install a test subscriber once; later calls are no-ops
    pub fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_test_writer()
            .with_env_filter("servicedesk_core=debug")
            .try_init();
    }
}

/// Property-based testing strategies.
pub mod properties {
    use proptest::prelude::*;
    use servicedesk_core::types::{RequestKind, RequestStatus};

    /// Any request status
    pub fn any_status() -> impl Strategy<Value = RequestStatus> {
        proptest::sample::select(RequestStatus::ALL.to_vec())
    }

    /// Any request kind
    pub fn any_kind() -> impl Strategy<Value = RequestKind> {
        proptest::sample::select(RequestKind::ALL.to_vec())
    }

    /// A status that is not in `targets`
    pub fn status_outside(targets: Vec<RequestStatus>) -> impl Strategy<Value = RequestStatus> {
        any_status().prop_filter("excluded target", move |status| !targets.contains(status))
    }
}

pub use mocks::{FixedClock, test_clock};
