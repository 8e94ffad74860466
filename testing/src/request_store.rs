//! In-memory request store
//!
//! A `HashMap`-backed [`RequestStore`] for tests and the development server.
//! Each record sits behind its own async mutex, so updates to one id are
//! serialized while updates to different ids proceed in parallel.

use servicedesk_core::error::StoreError;
use servicedesk_core::store::{Mutator, RequestStore, StoreFuture};
use servicedesk_core::types::{
    NewRequest, RequestId, RequestKind, RequestNumber, RequestStatus, ServiceRequest,
};
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};

type Record = Arc<Mutex<ServiceRequest>>;

#[derive(Debug, Default)]
struct Inner {
    records: RwLock<HashMap<RequestId, Record>>,
    sequence: AtomicU64,
    latency_ms: AtomicU64,
    unavailable: AtomicBool,
}

/// In-memory store with latency and outage injection.
///
/// Date-range queries behave like a loosely-indexed backend: besides records
/// dated inside the range they also return records whose schedule cannot be
/// read (no date, or no schedule on a time-bound kind), leaving it to the
/// caller to skip them.
///
/// # Example
///
/// ```
/// use servicedesk_testing::InMemoryRequestStore;
///
/// # async fn example() {
/// let store = InMemoryRequestStore::new();
/// assert_eq!(store.len().await, 0);
/// # }
/// ```
#[derive(Clone, Debug, Default)]
pub struct InMemoryRequestStore {
    inner: Arc<Inner>,
}

impl InMemoryRequestStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record exactly as given, bypassing validation.
    ///
    /// Used to seed imported or malformed data.
    pub async fn insert(&self, request: ServiceRequest) {
        self.inner
            .records
            .write()
            .await
            .insert(request.id, Arc::new(Mutex::new(request)));
    }

    /// Number of stored records
    pub async fn len(&self) -> usize {
        self.inner.records.read().await.len()
    }

    /// Whether the store holds no records
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Delay every subsequent call by `latency`
    pub fn set_latency(&self, latency: Duration) {
        let millis = u64::try_from(latency.as_millis()).unwrap_or(u64::MAX);
        self.inner.latency_ms.store(millis, Ordering::SeqCst);
    }

    /// Make every subsequent call fail with `Unavailable`
    pub fn set_unavailable(&self, unavailable: bool) {
        self.inner.unavailable.store(unavailable, Ordering::SeqCst);
    }

    async fn simulate(&self) -> Result<(), StoreError> {
        let latency = self.inner.latency_ms.load(Ordering::SeqCst);
        if latency > 0 {
            tokio::time::sleep(Duration::from_millis(latency)).await;
        }
        if self.inner.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("simulated outage".to_string()));
        }
        Ok(())
    }

    async fn record(&self, id: RequestId) -> Result<Record, StoreError> {
        self.inner
            .records
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound(id))
    }

    async fn snapshot<F>(&self, keep: F) -> Vec<ServiceRequest>
    where
        F: Fn(&ServiceRequest) -> bool,
    {
        let cells: Vec<Record> = self.inner.records.read().await.values().cloned().collect();
        let mut matching = Vec::new();
        for cell in cells {
            let request = cell.lock().await;
            if keep(&request) {
                matching.push(request.clone());
            }
        }
        matching.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.request_number.as_str().cmp(b.request_number.as_str()))
        });
        matching
    }
}

impl RequestStore for InMemoryRequestStore {
    fn create(&self, request: NewRequest) -> StoreFuture<'_, RequestId> {
        Box::pin(async move {
            self.simulate().await?;

            let sequence = self.inner.sequence.fetch_add(1, Ordering::SeqCst) + 1;
            let id = RequestId::new();
            let stored = ServiceRequest {
                id,
                request_number: RequestNumber::new(format!(
                    "{}-{sequence:05}",
                    request.kind.code()
                )),
                kind: request.kind,
                status: request.status,
                requested_price: request.requested_price,
                counter_offer: None,
                final_price: None,
                status_history: request.status_history,
                schedule: request.schedule,
                customer: request.customer,
                summary: request.summary,
                version: 1,
                created_at: request.created_at,
                updated_at: request.created_at,
            };
            self.insert(stored).await;
            Ok(id)
        })
    }

    fn get(&self, id: RequestId) -> StoreFuture<'_, ServiceRequest> {
        Box::pin(async move {
            self.simulate().await?;
            let cell = self.record(id).await?;
            let request = cell.lock().await.clone();
            Ok(request)
        })
    }

    fn update(&self, id: RequestId, mutator: Mutator) -> StoreFuture<'_, ServiceRequest> {
        Box::pin(async move {
            self.simulate().await?;
            let cell = self.record(id).await?;
            let mut stored = cell.lock().await;

            let mut working = stored.clone();
            mutator(&mut working).map_err(|error| StoreError::Rejected(Box::new(error)))?;
            working.version += 1;
            *stored = working.clone();
            Ok(working)
        })
    }

    fn query_by_date_range(
        &self,
        kind: RequestKind,
        start: NaiveDate,
        end: NaiveDate,
    ) -> StoreFuture<'_, Vec<ServiceRequest>> {
        Box::pin(async move {
            self.simulate().await?;
            Ok(self
                .snapshot(|request| {
                    request.kind == kind
                        && match &request.schedule {
                            Some(schedule) => {
                                schedule.date.is_none_or(|date| date >= start && date <= end)
                            },
                            None => kind.requires_schedule(),
                        }
                })
                .await)
        })
    }

    fn list_by_status(
        &self,
        kind: RequestKind,
        statuses: Vec<RequestStatus>,
    ) -> StoreFuture<'_, Vec<ServiceRequest>> {
        Box::pin(async move {
            self.simulate().await?;
            Ok(self
                .snapshot(|request| request.kind == kind && statuses.contains(&request.status))
                .await)
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::fixtures::{RequestBuilder, new_request};
    use servicedesk_core::error::LifecycleError;
    use servicedesk_core::types::Money;

    #[tokio::test]
    async fn create_assigns_numbers_per_sequence() {
        let store = InMemoryRequestStore::new();
        let first = store.create(new_request(RequestKind::Moving)).await.unwrap();
        let second = store.create(new_request(RequestKind::Sell)).await.unwrap();

        assert_eq!(store.get(first).await.unwrap().request_number.as_str(), "MV-00001");
        let stored = store.get(second).await.unwrap();
        assert_eq!(stored.request_number.as_str(), "SL-00002");
        assert_eq!(stored.version, 1);
    }

    #[tokio::test]
    async fn rejected_mutator_leaves_record_untouched() {
        let store = InMemoryRequestStore::new();
        let id = store.create(new_request(RequestKind::Service)).await.unwrap();

        let result = store
            .update(
                id,
                Box::new(|request: &mut ServiceRequest| {
                    request.requested_price = Money::new(1);
                    Err(LifecycleError::Validation("nope".to_string()))
                }),
            )
            .await;

        assert!(matches!(result, Err(StoreError::Rejected(_))));
        let stored = store.get(id).await.unwrap();
        assert_eq!(stored.version, 1);
        assert_ne!(stored.requested_price, Money::new(1));
    }

    #[tokio::test]
    async fn missing_id_is_not_found() {
        let store = InMemoryRequestStore::new();
        let id = RequestId::new();
        assert_eq!(store.get(id).await, Err(StoreError::NotFound(id)));
    }

    #[tokio::test]
    async fn outage_is_reported_as_unavailable() {
        let store = InMemoryRequestStore::new();
        store.set_unavailable(true);
        assert!(matches!(
            store.list_by_status(RequestKind::Sell, vec![RequestStatus::Pending]).await,
            Err(StoreError::Unavailable(_))
        ));
    }

    #[tokio::test]
    async fn date_query_includes_undated_records() {
        let store = InMemoryRequestStore::new();
        let day = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();
        store
            .insert(RequestBuilder::new(RequestKind::Order).scheduled(day, 9, 10).build())
            .await;
        store
            .insert(RequestBuilder::new(RequestKind::Order).without_date().build())
            .await;
        store
            .insert(
                RequestBuilder::new(RequestKind::Order)
                    .scheduled(day.succ_opt().unwrap(), 9, 10)
                    .build(),
            )
            .await;

        let found = store
            .query_by_date_range(RequestKind::Order, day, day)
            .await
            .unwrap();
        assert_eq!(found.len(), 2);
    }
}
