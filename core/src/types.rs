//! Domain types for service requests.
//!
//! Every customer-facing transaction handled by the service desk (sell-in,
//! moving, technical service, order) is one [`ServiceRequest`], specialized
//! only by its [`RequestKind`]. Kind-specific data such as the calendar
//! [`Schedule`] is carried as optional attributes instead of per-kind types.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

// ============================================================================
// Identifiers
// ============================================================================

/// Unique identifier for a service request.
///
/// Assigned by the request store at creation and never reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Creates a new random `RequestId`
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a `RequestId` from a `Uuid`
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the inner UUID
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RequestId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Human-facing display code of a request (e.g. `MV-00042`).
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestNumber(String);

impl RequestNumber {
    /// Creates a new `RequestNumber`
    #[must_use]
    pub fn new(number: impl Into<String>) -> Self {
        Self(number.into())
    }

    /// Returns the inner string value
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RequestNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of a customer account owned by the identity provider.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CustomerId(String);

impl CustomerId {
    /// Creates a new `CustomerId`
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the inner string value
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CustomerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// Value objects
// ============================================================================

/// Price in whole currency units.
///
/// The service desk records negotiated numbers only; it never computes
/// prices, so no fractional arithmetic is needed.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// Creates a new money amount
    #[must_use]
    pub const fn new(amount: i64) -> Self {
        Self(amount)
    }

    /// Returns the amount in whole currency units
    #[must_use]
    pub const fn amount(&self) -> i64 {
        self.0
    }

    /// Whether the amount is strictly greater than zero
    #[must_use]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The four transaction types that share the request lifecycle.
///
/// Declaration order is the tie-breaker used when sorting calendar slots.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestKind {
    /// Customer offers a used item to the dealer
    Sell,
    /// Moving / relocation booking
    Moving,
    /// Technical-service ticket
    Service,
    /// Order with delivery
    Order,
}

impl RequestKind {
    /// Every kind, in sort order
    pub const ALL: [Self; 4] = [Self::Sell, Self::Moving, Self::Service, Self::Order];

    /// Wire name of the kind
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Sell => "sell",
            Self::Moving => "moving",
            Self::Service => "service",
            Self::Order => "order",
        }
    }

    /// Prefix used for request numbers
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Sell => "SL",
            Self::Moving => "MV",
            Self::Service => "SV",
            Self::Order => "OR",
        }
    }

    /// Label shown on the admin calendar
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Sell => "Sell-in appointment",
            Self::Moving => "Moving",
            Self::Service => "Service visit",
            Self::Order => "Delivery",
        }
    }

    /// Whether every request of this kind is time-bound.
    ///
    /// Sell-in requests only occupy the calendar once an appointment has been
    /// attached, so a missing schedule is normal for them.
    #[must_use]
    pub const fn requires_schedule(&self) -> bool {
        !matches!(self, Self::Sell)
    }
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown kind or status name.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown {what}: {value}")]
pub struct ParseNameError {
    what: &'static str,
    value: String,
}

impl FromStr for RequestKind {
    type Err = ParseNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ParseNameError {
                what: "request kind",
                value: s.to_string(),
            })
    }
}

/// Lifecycle state of a request.
///
/// `Pending` and `Reviewing` are aliases: both mean "submitted, awaiting an
/// admin decision". New requests always start in `Pending`; `Reviewing`
/// appears on records imported from older sell-in data.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    /// Submitted, awaiting admin review
    Pending,
    /// Alias of `Pending`
    Reviewing,
    /// Admin sent a counter-offer, awaiting the customer
    OfferSent,
    /// Price agreed, work scheduled
    Accepted,
    /// Customer rejected the counter-offer
    Rejected,
    /// Work fulfilled
    Completed,
    /// Cancelled by the customer
    Cancelled,
}

impl RequestStatus {
    /// Every status
    pub const ALL: [Self; 7] = [
        Self::Pending,
        Self::Reviewing,
        Self::OfferSent,
        Self::Accepted,
        Self::Rejected,
        Self::Completed,
        Self::Cancelled,
    ];

    /// Wire name of the status
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Reviewing => "reviewing",
            Self::OfferSent => "offer_sent",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Whether the request still waits for its first admin decision
    #[must_use]
    pub const fn is_awaiting_review(&self) -> bool {
        matches!(self, Self::Pending | Self::Reviewing)
    }

    /// Terminal states never lead anywhere else
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Rejected | Self::Completed | Self::Cancelled)
    }

    /// States in which `final_price` must be set
    #[must_use]
    pub const fn holds_final_price(&self) -> bool {
        matches!(self, Self::Accepted | Self::Completed)
    }

    /// Cancelled and rejected requests free their calendar slot
    #[must_use]
    pub const fn occupies_calendar(&self) -> bool {
        !matches!(self, Self::Rejected | Self::Cancelled)
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequestStatus {
    type Err = ParseNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| ParseNameError {
                what: "request status",
                value: s.to_string(),
            })
    }
}

// ============================================================================
// Actors
// ============================================================================

/// Role under which an actor performs an operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActorRole {
    /// The customer who owns the request
    Customer,
    /// Dealer staff working the admin console
    Admin,
    /// Background jobs acting on the admin side
    System,
}

impl ActorRole {
    /// Admin-side roles
    #[must_use]
    pub const fn is_staff(&self) -> bool {
        matches!(self, Self::Admin | Self::System)
    }
}

impl fmt::Display for ActorRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Customer => f.write_str("customer"),
            Self::Admin => f.write_str("admin"),
            Self::System => f.write_str("system"),
        }
    }
}

impl FromStr for ActorRole {
    type Err = ParseNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "customer" => Ok(Self::Customer),
            "admin" => Ok(Self::Admin),
            "system" => Ok(Self::System),
            other => Err(ParseNameError {
                what: "actor role",
                value: other.to_string(),
            }),
        }
    }
}

/// Identity on whose behalf an engine call runs.
///
/// Supplied by the caller on every operation; the engine keeps no ambient
/// session state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// Identity-provider subject
    pub id: String,
    /// Role for this call
    pub role: ActorRole,
}

impl Actor {
    /// A customer actor
    #[must_use]
    pub fn customer(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            role: ActorRole::Customer,
        }
    }

    /// An admin actor
    #[must_use]
    pub fn admin(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            role: ActorRole::Admin,
        }
    }

    /// The system actor used by background jobs
    #[must_use]
    pub fn system() -> Self {
        Self {
            id: "system".to_string(),
            role: ActorRole::System,
        }
    }

    /// Whether this actor is the customer referenced by `customer`
    #[must_use]
    pub fn is_customer(&self, customer: &CustomerRef) -> bool {
        self.role == ActorRole::Customer && self.id == customer.id.as_str()
    }
}

impl fmt::Display for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.role, self.id)
    }
}

// ============================================================================
// Request entity
// ============================================================================

/// Reference to the customer who submitted a request.
///
/// A snapshot of contact data taken at submission; the engine never writes
/// back to the customer record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerRef {
    /// Customer identity
    pub id: CustomerId,
    /// Display name
    pub name: String,
    /// Contact phone
    pub phone: Option<String>,
    /// Contact e-mail
    pub email: Option<String>,
}

impl CustomerRef {
    /// Label used on calendar slots: the name, plus the phone when known
    #[must_use]
    pub fn label(&self) -> String {
        match self.phone.as_deref().map(str::trim) {
            Some(phone) if !phone.is_empty() => format!("{} ({phone})", self.name.trim()),
            _ => self.name.trim().to_string(),
        }
    }

    /// Whether at least one way to reach the customer is present
    #[must_use]
    pub fn has_contact(&self) -> bool {
        let present = |value: &Option<String>| value.as_deref().is_some_and(|v| !v.trim().is_empty());
        present(&self.phone) || present(&self.email)
    }
}

/// Price proposed by the admin in response to the requested price.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterOffer {
    /// Proposed price
    pub price: Money,
    /// Free-text justification shown to the customer
    pub note: String,
    /// Starts at 1, incremented by every resend before the customer responds
    pub revision: u32,
    /// When this revision was issued
    pub issued_at: DateTime<Utc>,
}

/// One line of the audit trail.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Status entered
    pub status: RequestStatus,
    /// When it was entered
    pub timestamp: DateTime<Utc>,
    /// Optional note (offer justification, cancellation reason, ...)
    pub note: Option<String>,
    /// Who caused the change
    pub actor: Actor,
}

/// Calendar footprint of a time-bound request.
///
/// Every part is optional because records come from loosely-validated
/// storage; the availability aggregator decides what is usable.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    /// Day of the appointment
    pub date: Option<NaiveDate>,
    /// Wall-clock start
    pub start_time: Option<NaiveTime>,
    /// Wall-clock end
    pub end_time: Option<NaiveTime>,
}

impl Schedule {
    /// A fully specified schedule
    #[must_use]
    pub const fn new(date: NaiveDate, start_time: NaiveTime, end_time: NaiveTime) -> Self {
        Self {
            date: Some(date),
            start_time: Some(start_time),
            end_time: Some(end_time),
        }
    }

    /// Whether date and both times are present and the interval is non-empty
    #[must_use]
    pub fn is_complete(&self) -> bool {
        matches!(
            (self.date, self.start_time, self.end_time),
            (Some(_), Some(start), Some(end)) if start < end
        )
    }
}

/// A service request as persisted by the request store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceRequest {
    /// Store-assigned identifier
    pub id: RequestId,
    /// Store-assigned display code
    pub request_number: RequestNumber,
    /// Transaction type, fixed for the lifetime of the request
    pub kind: RequestKind,
    /// Current lifecycle state
    pub status: RequestStatus,
    /// Price proposed by the customer
    pub requested_price: Money,
    /// Latest admin counter-offer, if one was ever sent
    pub counter_offer: Option<CounterOffer>,
    /// Agreed price, set on acceptance
    pub final_price: Option<Money>,
    /// Append-only audit trail; the last entry matches `status`
    pub status_history: Vec<HistoryEntry>,
    /// Calendar footprint for time-bound requests
    pub schedule: Option<Schedule>,
    /// Submitting customer
    pub customer: CustomerRef,
    /// Short description (item, service type, moving route)
    pub summary: String,
    /// Incremented by the store on every committed update
    pub version: u64,
    /// Submission time
    pub created_at: DateTime<Utc>,
    /// Time of the last committed update
    pub updated_at: DateTime<Utc>,
}

impl ServiceRequest {
    /// Most recent history entry
    #[must_use]
    pub fn latest_entry(&self) -> Option<&HistoryEntry> {
        self.status_history.last()
    }

    /// Whether an offer was ever sent on this request
    #[must_use]
    pub fn has_been_offered(&self) -> bool {
        self.status_history
            .iter()
            .any(|entry| entry.status == RequestStatus::OfferSent)
    }

    /// Statuses in history order
    #[must_use]
    pub fn status_trail(&self) -> Vec<RequestStatus> {
        self.status_history.iter().map(|entry| entry.status).collect()
    }
}

/// Everything the store needs to create a request; it fills in the id,
/// request number and version.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewRequest {
    /// Transaction type
    pub kind: RequestKind,
    /// Initial status
    pub status: RequestStatus,
    /// Customer-proposed price
    pub requested_price: Money,
    /// Submitting customer
    pub customer: CustomerRef,
    /// Short description
    pub summary: String,
    /// Calendar footprint
    pub schedule: Option<Schedule>,
    /// Initial history (exactly one entry)
    pub status_history: Vec<HistoryEntry>,
    /// Submission time
    pub created_at: DateTime<Utc>,
}

/// Customer input for a new request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    /// Transaction type
    pub kind: RequestKind,
    /// Customer-proposed price
    pub requested_price: Money,
    /// Submitting customer
    pub customer: CustomerRef,
    /// Short description
    #[serde(default)]
    pub summary: String,
    /// Calendar footprint, required for time-bound kinds
    #[serde(default)]
    pub schedule: Option<Schedule>,
}
