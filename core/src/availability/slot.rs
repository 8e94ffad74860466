//! Normalization of stored requests into calendar slots.

use crate::types::{RequestId, RequestKind, RequestNumber, ServiceRequest};
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One occupied interval on the admin calendar.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusySlot {
    /// Start of the commitment
    pub start_time: NaiveTime,
    /// End of the commitment, always after `start_time`
    pub end_time: NaiveTime,
    /// Which kind of request occupies the slot
    pub kind: RequestKind,
    /// Source request
    pub id: RequestId,
    /// Human-readable request code
    pub request_number: RequestNumber,
    /// Customer name and phone
    pub customer_label: String,
    /// Kind label plus the request summary
    pub details_label: String,
}

impl BusySlot {
    /// Sort key inside one day: start time, then kind, then id
    #[must_use]
    pub fn sort_key(&self) -> (NaiveTime, RequestKind, RequestId) {
        (self.start_time, self.kind, self.id)
    }
}

/// Why a record could not be placed on the calendar.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// A time-bound request carries no schedule at all
    MissingSchedule,
    /// The schedule has no date
    MissingDate,
    /// Start or end time is missing
    MissingTime,
    /// The end time is not after the start time
    EndNotAfterStart,
    /// The store returned a record dated outside the queried range
    OutsideRange,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::MissingSchedule => "missing schedule",
            Self::MissingDate => "missing date",
            Self::MissingTime => "missing start or end time",
            Self::EndNotAfterStart => "end time not after start time",
            Self::OutsideRange => "date outside the requested range",
        };
        f.write_str(text)
    }
}

/// A malformed record left off the calendar. A warning, not an error.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedRecord {
    /// Offending request
    pub id: RequestId,
    /// Its kind
    pub kind: RequestKind,
    /// What was wrong with it
    pub reason: SkipReason,
}

/// Outcome of normalizing one stored record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Normalized {
    /// Occupies `date`
    Busy(NaiveDate, BusySlot),
    /// Does not belong on the calendar (released status, unscheduled sell-in)
    Ignored,
    /// Malformed
    Skipped(SkippedRecord),
}

/// Turn a stored request into a calendar slot.
#[must_use]
pub fn normalize(request: &ServiceRequest, start: NaiveDate, end: NaiveDate) -> Normalized {
    if !request.status.occupies_calendar() {
        return Normalized::Ignored;
    }

    let skip = |reason| {
        Normalized::Skipped(SkippedRecord {
            id: request.id,
            kind: request.kind,
            reason,
        })
    };

    let Some(schedule) = &request.schedule else {
        return if request.kind.requires_schedule() {
            skip(SkipReason::MissingSchedule)
        } else {
            Normalized::Ignored
        };
    };

    let Some(date) = schedule.date else {
        return skip(SkipReason::MissingDate);
    };
    let (Some(start_time), Some(end_time)) = (schedule.start_time, schedule.end_time) else {
        return skip(SkipReason::MissingTime);
    };
    if end_time <= start_time {
        return skip(SkipReason::EndNotAfterStart);
    }
    if date < start || date > end {
        return skip(SkipReason::OutsideRange);
    }

    Normalized::Busy(
        date,
        BusySlot {
            start_time,
            end_time,
            kind: request.kind,
            id: request.id,
            request_number: request.request_number.clone(),
            customer_label: request.customer.label(),
            details_label: details_label(request),
        },
    )
}

/// Stable day key used in the report map
#[must_use]
pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn details_label(request: &ServiceRequest) -> String {
    let summary = request.summary.trim();
    if summary.is_empty() {
        format!("{} {}", request.kind.label(), request.request_number)
    } else {
        format!("{} {}: {summary}", request.kind.label(), request.request_number)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::types::{
        Actor, CustomerId, CustomerRef, HistoryEntry, Money, RequestStatus, Schedule,
    };
    use chrono::{TimeZone, Utc};

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, d).unwrap()
    }

    fn at(h: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, 0, 0).unwrap()
    }

    fn request(kind: RequestKind, status: RequestStatus, schedule: Option<Schedule>) -> ServiceRequest {
        let now = Utc.with_ymd_and_hms(2025, 3, 1, 8, 0, 0).unwrap();
        ServiceRequest {
            id: RequestId::new(),
            request_number: RequestNumber::new("MV-00042"),
            kind,
            status,
            requested_price: Money::new(900),
            counter_offer: None,
            final_price: None,
            status_history: vec![HistoryEntry {
                status,
                timestamp: now,
                note: None,
                actor: Actor::customer("c-1"),
            }],
            schedule,
            customer: CustomerRef {
                id: CustomerId::new("c-1"),
                name: "Ahmed".to_string(),
                phone: Some("+48 600 100 200".to_string()),
                email: None,
            },
            summary: "Two-room flat".to_string(),
            version: 1,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn complete_schedule_becomes_a_slot() {
        let record = request(
            RequestKind::Moving,
            RequestStatus::Accepted,
            Some(Schedule::new(day(4), at(9), at(13))),
        );
        let Normalized::Busy(date, slot) = normalize(&record, day(1), day(31)) else {
            panic!("expected a busy slot");
        };
        assert_eq!(date, day(4));
        assert_eq!(slot.customer_label, "Ahmed (+48 600 100 200)");
        assert_eq!(slot.details_label, "Moving MV-00042: Two-room flat");
    }

    #[test]
    fn released_statuses_are_ignored() {
        for status in [RequestStatus::Cancelled, RequestStatus::Rejected] {
            let record = request(
                RequestKind::Service,
                status,
                Some(Schedule::new(day(4), at(9), at(10))),
            );
            assert_eq!(normalize(&record, day(1), day(31)), Normalized::Ignored);
        }
    }

    #[test]
    fn unscheduled_sell_in_is_ignored_but_moving_is_skipped() {
        let sell = request(RequestKind::Sell, RequestStatus::Pending, None);
        assert_eq!(normalize(&sell, day(1), day(31)), Normalized::Ignored);

        let moving = request(RequestKind::Moving, RequestStatus::Pending, None);
        assert!(matches!(
            normalize(&moving, day(1), day(31)),
            Normalized::Skipped(SkippedRecord { reason: SkipReason::MissingSchedule, .. })
        ));
    }

    #[test]
    fn malformed_schedules_are_skipped_with_a_reason() {
        let cases = [
            (
                Schedule {
                    date: None,
                    ..Schedule::new(day(4), at(9), at(10))
                },
                SkipReason::MissingDate,
            ),
            (
                Schedule {
                    end_time: None,
                    ..Schedule::new(day(4), at(9), at(10))
                },
                SkipReason::MissingTime,
            ),
            (Schedule::new(day(4), at(10), at(10)), SkipReason::EndNotAfterStart),
            (Schedule::new(day(4), at(9), at(10)), SkipReason::OutsideRange),
        ];

        for (schedule, expected) in cases {
            let record = request(RequestKind::Order, RequestStatus::Accepted, Some(schedule));
            let outcome = normalize(&record, day(5), day(31));
            assert!(
                matches!(outcome, Normalized::Skipped(ref s) if s.reason == expected),
                "{expected}: {outcome:?}"
            );
        }
    }

    #[test]
    fn date_keys_are_zero_padded() {
        assert_eq!(date_key(day(4)), "2025-03-04");
    }
}
