//! The lifecycle engine: validated, audited, atomic changes to one request.

use super::machine::{self, Command, LifecycleEvent};
use crate::config::EngineConfig;
use crate::environment::Clock;
use crate::error::LifecycleError;
use crate::store::{Mutator, RequestStore, bounded};
use crate::types::{
    Actor, ActorRole, HistoryEntry, NewRequest, RequestId, RequestKind, RequestStatus,
    ServiceRequest, Submission,
};
use std::sync::{Arc, OnceLock};

/// Drives every request kind through the shared state machine.
///
/// Each operation is one unit of work: read-validate-write happens inside a
/// single [`RequestStore::update`], which the store serializes per id, so two
/// concurrent changes to the same request can never interleave. Changes to
/// different requests share nothing.
///
/// # Example
///
/// ```ignore
/// let engine = LifecycleEngine::new(store, Arc::new(SystemClock), EngineConfig::default());
///
/// let id = engine.submit(submission, &Actor::customer("cust-7")).await?;
/// engine.send_offer(id, Money::new(8_500), "market price", &Actor::admin("ops")).await?;
/// engine.respond(id, OfferResponse::Accept, &Actor::customer("cust-7"), None).await?;
/// ```
#[derive(Clone)]
pub struct LifecycleEngine {
    store: Arc<dyn RequestStore>,
    clock: Arc<dyn Clock>,
    config: EngineConfig,
}

impl LifecycleEngine {
    /// Creates a new engine over `store`
    #[must_use]
    pub fn new(store: Arc<dyn RequestStore>, clock: Arc<dyn Clock>, config: EngineConfig) -> Self {
        Self {
            store,
            clock,
            config,
        }
    }

    /// Settings in use
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Create a request in `pending` with its first history entry.
    ///
    /// # Errors
    ///
    /// - `Validation`: non-positive price, missing customer data, or a
    ///   missing/incomplete schedule for a time-bound kind
    /// - `StoreUnavailable`
    pub async fn submit(
        &self,
        submission: Submission,
        actor: &Actor,
    ) -> Result<RequestId, LifecycleError> {
        if let Err(error) = Self::validate_submission(&submission, actor) {
            tracing::warn!(kind = %submission.kind, actor = %actor, "Submission rejected: {error}");
            metrics::counter!("servicedesk_rule_violations_total", "kind" => "validation")
                .increment(1);
            return Err(LifecycleError::Validation(error));
        }

        let now = self.clock.now();
        let Submission {
            kind,
            requested_price,
            customer,
            summary,
            schedule,
        } = submission;

        let request = NewRequest {
            kind,
            status: RequestStatus::Pending,
            requested_price,
            customer,
            summary: summary.trim().to_string(),
            schedule,
            status_history: vec![HistoryEntry {
                status: RequestStatus::Pending,
                timestamp: now,
                note: Some("Request submitted".to_string()),
                actor: actor.clone(),
            }],
            created_at: now,
        };

        let id = bounded(self.config.store_timeout, "create", self.store.create(request)).await?;

        tracing::info!(
            request_id = %id,
            kind = %kind,
            requested_price = %requested_price,
            "Request submitted"
        );
        metrics::counter!("servicedesk_submissions_total", "kind" => kind.as_str()).increment(1);
        Ok(id)
    }

    /// Move a request to `target` following the transition table.
    ///
    /// `accepted` from `pending`/`reviewing` approves at the requested
    /// price; from `offer_sent` it accepts the counter-offer. `offer_sent`
    /// needs a price and must go through [`send_offer`](Self::send_offer).
    ///
    /// # Errors
    ///
    /// - `InvalidTransition`: no such edge from the current status
    /// - `Validation`, `StaleOffer`, `NotCancellable`, `ActorNotPermitted`
    /// - `NotFound`, `StoreUnavailable`
    pub async fn transition(
        &self,
        id: RequestId,
        target: RequestStatus,
        actor: &Actor,
        note: Option<String>,
    ) -> Result<ServiceRequest, LifecycleError> {
        let note = note.filter(|n| !n.trim().is_empty());
        self.execute(id, actor, note, move |request| Command::for_target(request, target))
            .await
    }

    /// Load a request.
    ///
    /// # Errors
    ///
    /// `NotFound`, `StoreUnavailable`
    pub async fn get(&self, id: RequestId) -> Result<ServiceRequest, LifecycleError> {
        bounded(self.config.store_timeout, "get", self.store.get(id)).await
    }

    /// The audit trail of a request, oldest first.
    ///
    /// # Errors
    ///
    /// `NotFound`, `StoreUnavailable`
    pub async fn timeline(&self, id: RequestId) -> Result<Vec<HistoryEntry>, LifecycleError> {
        self.get(id).await.map(|request| request.status_history)
    }

    /// Requests of `kind` in any of `statuses`, for admin work queues.
    ///
    /// # Errors
    ///
    /// `StoreUnavailable`
    pub async fn list_by_status(
        &self,
        kind: RequestKind,
        statuses: &[RequestStatus],
    ) -> Result<Vec<ServiceRequest>, LifecycleError> {
        bounded(
            self.config.store_timeout,
            "list_by_status",
            self.store.list_by_status(kind, statuses.to_vec()),
        )
        .await
    }

    /// Run one state-machine step inside an atomic store update.
    ///
    /// `plan` picks the command from the freshly read record; the decided
    /// event is applied to a working copy that the store commits only when
    /// every check passed.
    pub(super) async fn execute<P>(
        &self,
        id: RequestId,
        actor: &Actor,
        note: Option<String>,
        plan: P,
    ) -> Result<ServiceRequest, LifecycleError>
    where
        P: FnOnce(&ServiceRequest) -> Result<Command, LifecycleError> + Send + 'static,
    {
        let at = self.clock.now();
        let acting = actor.clone();
        let decided: Arc<OnceLock<LifecycleEvent>> = Arc::new(OnceLock::new());
        let record = Arc::clone(&decided);

        let mutator: Mutator = Box::new(move |request: &mut ServiceRequest| {
            let command = plan(request)?;
            let event = machine::decide(request, command, &acting)?;
            machine::apply_event(request, &event, &acting, at, note);
            if record.set(event).is_err() {
                tracing::debug!(request_id = %id, "Decided event already recorded, keeping the first");
            }
            Ok(())
        });

        let result = bounded(self.config.store_timeout, "update", self.store.update(id, mutator)).await;

        match result {
            Ok(updated) => {
                let event = decided.get().map_or("unknown", LifecycleEvent::name);
                tracing::info!(
                    request_id = %id,
                    event,
                    status = %updated.status,
                    version = updated.version,
                    actor = %actor,
                    "Request updated"
                );
                metrics::counter!("servicedesk_transitions_total", "to" => updated.status.as_str())
                    .increment(1);
                Ok(updated)
            },
            Err(error) if error.is_rule_violation() || matches!(error, LifecycleError::Validation(_)) => {
                tracing::warn!(request_id = %id, actor = %actor, "Request change refused: {error}");
                metrics::counter!("servicedesk_rule_violations_total", "kind" => error.label())
                    .increment(1);
                Err(error)
            },
            Err(error) => {
                tracing::debug!(request_id = %id, "Request change failed: {error}");
                Err(error)
            },
        }
    }

    /// Validates a submission
    fn validate_submission(submission: &Submission, actor: &Actor) -> Result<(), String> {
        if !submission.requested_price.is_positive() {
            return Err(format!(
                "requested price must be positive, got {}",
                submission.requested_price
            ));
        }

        let customer = &submission.customer;
        if customer.id.as_str().trim().is_empty() {
            return Err("customer id is required".to_string());
        }
        if customer.name.trim().is_empty() {
            return Err("customer name is required".to_string());
        }
        if !customer.has_contact() {
            return Err("a phone number or e-mail address is required".to_string());
        }
        if actor.role == ActorRole::Customer && !actor.is_customer(customer) {
            return Err("customer does not match the submitting account".to_string());
        }

        match &submission.schedule {
            Some(schedule) if !schedule.is_complete() => {
                Err("schedule needs a date and a start time before the end time".to_string())
            },
            None if submission.kind.requires_schedule() => {
                Err(format!("{} requests need a schedule", submission.kind))
            },
            _ => Ok(()),
        }
    }
}
