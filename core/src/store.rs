//! Request store trait consumed by the engine and the aggregator.
//!
//! The store is an external collaborator: this crate defines the contract and
//! never implements persistence itself. `InMemoryRequestStore` in the
//! `servicedesk-testing` crate is the reference implementation used by tests
//! and the development server.
//!
//! # Atomicity
//!
//! [`RequestStore::update`] is the only write path after creation. An
//! implementation must run the mutator with at-most-one in-flight update per
//! id (a per-id lock, or compare-and-swap on `version`) and must publish the
//! result only if the mutator returns `Ok`. Updates on different ids must not
//! block each other.
//!
//! # Dyn Compatibility
//!
//! Methods return boxed futures instead of using `async fn` so the engine can
//! hold an `Arc<dyn RequestStore>`.

use crate::error::{LifecycleError, StoreError};
use crate::types::{NewRequest, RequestId, RequestKind, RequestStatus, ServiceRequest};
use chrono::NaiveDate;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

/// Boxed future returned by store methods.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + Send + 'a>>;

/// Change applied to a working copy of a record inside [`RequestStore::update`].
///
/// Returning an error aborts the update; the store reports it as
/// [`StoreError::Rejected`] and leaves the stored record untouched.
pub type Mutator = Box<dyn FnOnce(&mut ServiceRequest) -> Result<(), LifecycleError> + Send>;

/// Persistence and query capability for service requests of every kind.
pub trait RequestStore: Send + Sync {
    /// Persist a new request, assigning its id and request number.
    ///
    /// # Errors
    ///
    /// - `Unavailable`: the backend failed
    fn create(&self, request: NewRequest) -> StoreFuture<'_, RequestId>;

    /// Load one request.
    ///
    /// # Errors
    ///
    /// - `NotFound`: no record with this id
    /// - `Unavailable`: the backend failed
    fn get(&self, id: RequestId) -> StoreFuture<'_, ServiceRequest>;

    /// Atomically apply `mutator` to the record and return the committed
    /// result. The store bumps `version` on success.
    ///
    /// # Errors
    ///
    /// - `NotFound`: no record with this id
    /// - `Rejected`: the mutator refused the change
    /// - `Unavailable`: the backend failed
    fn update(&self, id: RequestId, mutator: Mutator) -> StoreFuture<'_, ServiceRequest>;

    /// Requests of `kind` whose schedule date falls in `[start, end]`.
    ///
    /// Backends that cannot index an unreadable schedule may also return
    /// such records; callers must re-check every schedule they receive.
    ///
    /// # Errors
    ///
    /// - `Unavailable`: the backend failed
    fn query_by_date_range(
        &self,
        kind: RequestKind,
        start: NaiveDate,
        end: NaiveDate,
    ) -> StoreFuture<'_, Vec<ServiceRequest>>;

    /// Requests of `kind` currently in any of `statuses`.
    ///
    /// # Errors
    ///
    /// - `Unavailable`: the backend failed
    fn list_by_status(
        &self,
        kind: RequestKind,
        statuses: Vec<RequestStatus>,
    ) -> StoreFuture<'_, Vec<ServiceRequest>>;
}

/// Run a store call under `timeout`, surfacing an elapsed deadline as
/// [`LifecycleError::StoreUnavailable`]. No retry is attempted.
///
/// # Errors
///
/// Returns the store error mapped into [`LifecycleError`], or
/// `StoreUnavailable` when the deadline passes first.
pub async fn bounded<T, F>(
    timeout: Duration,
    operation: &'static str,
    call: F,
) -> Result<T, LifecycleError>
where
    F: Future<Output = Result<T, StoreError>>,
{
    match tokio::time::timeout(timeout, call).await {
        Ok(result) => result.map_err(LifecycleError::from),
        Err(_) => {
            let timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
            tracing::warn!(operation, timeout_ms, "Request store call timed out");
            Err(LifecycleError::StoreUnavailable(format!(
                "{operation} did not complete within {timeout_ms} ms"
            )))
        },
    }
}
