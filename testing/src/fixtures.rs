//! Test data builders.

#![allow(clippy::unwrap_used)] // Fixture constants are known-valid
#![allow(clippy::missing_panics_doc)]

use crate::mocks::test_clock;
use servicedesk_core::environment::Clock;
use servicedesk_core::types::{
    Actor, CounterOffer, CustomerId, CustomerRef, HistoryEntry, Money, NewRequest, RequestId,
    RequestKind, RequestNumber, RequestStatus, Schedule, ServiceRequest, Submission,
};
use chrono::{NaiveDate, NaiveTime};

/// Customer id used by default in fixtures
pub const CUSTOMER_ID: &str = "cust-001";

/// A customer with name, phone and e-mail
#[must_use]
pub fn customer(id: &str) -> CustomerRef {
    CustomerRef {
        id: CustomerId::new(id),
        name: "Oksana Petrenko".to_string(),
        phone: Some("+380 67 123 4567".to_string()),
        email: Some("oksana@example.com".to_string()),
    }
}

/// Actor for the default fixture customer
#[must_use]
pub fn owner() -> Actor {
    Actor::customer(CUSTOMER_ID)
}

/// An admin actor
#[must_use]
pub fn admin() -> Actor {
    Actor::admin("admin-1")
}

/// `hour:00` as a wall-clock time
#[must_use]
pub fn hour(h: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, 0, 0).unwrap()
}

/// A calendar date
#[must_use]
pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

/// A valid submission from the default customer.
///
/// Time-bound kinds get a two-hour slot on 2025-06-02 (a Monday).
#[must_use]
pub fn submission(kind: RequestKind, price: i64) -> Submission {
    Submission {
        kind,
        requested_price: Money::new(price),
        customer: customer(CUSTOMER_ID),
        summary: format!("{} fixture", kind.label()),
        schedule: kind
            .requires_schedule()
            .then(|| Schedule::new(date(2025, 6, 2), hour(10), hour(12))),
    }
}

/// A submission booked at `day` from `start` to `end` o'clock
#[must_use]
pub fn scheduled_submission(kind: RequestKind, day: NaiveDate, start: u32, end: u32) -> Submission {
    Submission {
        schedule: Some(Schedule::new(day, hour(start), hour(end))),
        ..submission(kind, 1_000)
    }
}

/// A store-ready `pending` request
#[must_use]
pub fn new_request(kind: RequestKind) -> NewRequest {
    let now = test_clock().now();
    let input = submission(kind, 1_000);
    NewRequest {
        kind,
        status: RequestStatus::Pending,
        requested_price: input.requested_price,
        customer: input.customer,
        summary: input.summary,
        schedule: input.schedule,
        status_history: vec![HistoryEntry {
            status: RequestStatus::Pending,
            timestamp: now,
            note: None,
            actor: owner(),
        }],
        created_at: now,
    }
}

/// Fluent builder for stored records, including malformed ones.
///
/// # Example
///
/// ```
/// use servicedesk_testing::fixtures::{RequestBuilder, date};
/// use servicedesk_core::types::{RequestKind, RequestStatus};
///
/// let record = RequestBuilder::new(RequestKind::Moving)
///     .status(RequestStatus::Accepted)
///     .scheduled(date(2025, 6, 2), 9, 11)
///     .build();
/// assert!(record.schedule.is_some());
/// ```
#[derive(Clone, Debug)]
pub struct RequestBuilder {
    request: ServiceRequest,
}

impl RequestBuilder {
    /// A `pending` request of `kind` with no schedule
    #[must_use]
    pub fn new(kind: RequestKind) -> Self {
        let now = test_clock().now();
        Self {
            request: ServiceRequest {
                id: RequestId::new(),
                request_number: RequestNumber::new(format!("{}-90001", kind.code())),
                kind,
                status: RequestStatus::Pending,
                requested_price: Money::new(1_000),
                counter_offer: None,
                final_price: None,
                status_history: vec![HistoryEntry {
                    status: RequestStatus::Pending,
                    timestamp: now,
                    note: None,
                    actor: owner(),
                }],
                schedule: None,
                customer: customer(CUSTOMER_ID),
                summary: format!("{} record", kind.label()),
                version: 1,
                created_at: now,
                updated_at: now,
            },
        }
    }

    /// Set the id
    #[must_use]
    pub fn id(mut self, id: RequestId) -> Self {
        self.request.id = id;
        self
    }

    /// Set the request number
    #[must_use]
    pub fn number(mut self, number: &str) -> Self {
        self.request.request_number = RequestNumber::new(number);
        self
    }

    /// Set the status, recording it in history
    #[must_use]
    pub fn status(mut self, status: RequestStatus) -> Self {
        self.request.status = status;
        if status != RequestStatus::Pending {
            self.request.status_history.push(HistoryEntry {
                status,
                timestamp: self.request.updated_at,
                note: None,
                actor: admin(),
            });
        }
        self
    }

    /// Attach an open counter-offer at `price`
    #[must_use]
    pub fn offered(self, price: i64) -> Self {
        let mut builder = self.status(RequestStatus::OfferSent);
        builder.request.counter_offer = Some(CounterOffer {
            price: Money::new(price),
            note: String::new(),
            revision: 1,
            issued_at: builder.request.updated_at,
        });
        builder
    }

    /// Book `day` from `start` to `end` o'clock
    #[must_use]
    pub fn scheduled(mut self, day: NaiveDate, start: u32, end: u32) -> Self {
        self.request.schedule = Some(Schedule::new(day, hour(start), hour(end)));
        self
    }

    /// Replace the schedule verbatim
    #[must_use]
    pub fn schedule(mut self, schedule: Option<Schedule>) -> Self {
        self.request.schedule = schedule;
        self
    }

    /// A schedule whose date is missing
    #[must_use]
    pub fn without_date(mut self) -> Self {
        self.request.schedule = Some(Schedule {
            date: None,
            start_time: Some(hour(9)),
            end_time: Some(hour(10)),
        });
        self
    }

    /// Set the customer name shown on the calendar
    #[must_use]
    pub fn customer_name(mut self, name: &str) -> Self {
        self.request.customer.name = name.to_string();
        self
    }

    /// Finish
    #[must_use]
    pub fn build(self) -> ServiceRequest {
        self.request
    }
}
