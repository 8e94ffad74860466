//! Availability aggregator: a read-only busy calendar across all request kinds.
//!
//! Every kind is queried for the date range, records are normalized into
//! [`BusySlot`]s and grouped by day. Overlapping slots are all reported;
//! resolving double bookings is left to the admin. Malformed records are
//! skipped with a warning and never abort the query.

mod slot;

pub use slot::{BusySlot, Normalized, SkipReason, SkippedRecord, date_key, normalize};

use crate::config::{AvailabilityConfig, WorkingHours};
use crate::error::LifecycleError;
use crate::store::{RequestStore, bounded};
use crate::types::RequestKind;
use chrono::{Datelike, NaiveDate, Weekday};
use futures::future::try_join_all;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Calendar data for one date range.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityReport {
    /// Busy slots keyed by `YYYY-MM-DD`, each day sorted by start time
    pub busy_slots: BTreeMap<String, Vec<BusySlot>>,
    /// Company working hours
    pub working_hours: WorkingHours,
    /// Whether weekends are closed
    pub weekend_closed: bool,
    /// Saturdays and Sundays inside the range
    pub weekend_dates: Vec<String>,
    /// Records left off the calendar
    pub skipped: Vec<SkippedRecord>,
}

impl AvailabilityReport {
    /// Whether `date` has at least one busy slot
    #[must_use]
    pub fn is_busy(&self, date: NaiveDate) -> bool {
        !self.slots_on(date).is_empty()
    }

    /// Slots on `date`, empty when the day is free
    #[must_use]
    pub fn slots_on(&self, date: NaiveDate) -> &[BusySlot] {
        self.busy_slots
            .get(&date_key(date))
            .map_or(&[], Vec::as_slice)
    }

    /// Number of slots across the whole range
    #[must_use]
    pub fn total_slots(&self) -> usize {
        self.busy_slots.values().map(Vec::len).sum()
    }
}

/// Builds [`AvailabilityReport`]s from a [`RequestStore`].
///
/// Stateless; every call reads a fresh snapshot.
#[derive(Clone)]
pub struct AvailabilityAggregator {
    store: Arc<dyn RequestStore>,
    config: AvailabilityConfig,
}

impl AvailabilityAggregator {
    /// Creates a new aggregator
    #[must_use]
    pub fn new(store: Arc<dyn RequestStore>, config: AvailabilityConfig) -> Self {
        Self { store, config }
    }

    /// Settings in use
    #[must_use]
    pub const fn config(&self) -> &AvailabilityConfig {
        &self.config
    }

    /// Busy calendar for `start..=end`.
    ///
    /// # Errors
    ///
    /// - `Validation`: `start` after `end`, or a range longer than the
    ///   configured maximum
    /// - `StoreUnavailable`: any kind query failed or timed out
    pub async fn get_availability(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<AvailabilityReport, LifecycleError> {
        self.validate_range(start, end)?;

        let queries = RequestKind::ALL.into_iter().map(|kind| {
            bounded(
                self.config.store_timeout,
                "query_by_date_range",
                self.store.query_by_date_range(kind, start, end),
            )
        });
        let per_kind = try_join_all(queries).await?;

        let mut report = AvailabilityReport {
            working_hours: self.config.working_hours,
            weekend_closed: self.config.weekend_closed,
            weekend_dates: weekend_dates(start, end),
            ..AvailabilityReport::default()
        };

        for request in per_kind.iter().flatten() {
            match normalize(request, start, end) {
                Normalized::Busy(date, slot) => {
                    report.busy_slots.entry(date_key(date)).or_default().push(slot);
                },
                Normalized::Skipped(skipped) => {
                    tracing::warn!(
                        request_id = %skipped.id,
                        kind = %skipped.kind,
                        reason = %skipped.reason,
                        "Skipping malformed calendar record"
                    );
                    metrics::counter!("servicedesk_calendar_skipped_total").increment(1);
                    report.skipped.push(skipped);
                },
                Normalized::Ignored => {},
            }
        }

        for slots in report.busy_slots.values_mut() {
            slots.sort_by_key(BusySlot::sort_key);
        }

        tracing::debug!(
            %start,
            %end,
            days = report.busy_slots.len(),
            slots = report.total_slots(),
            skipped = report.skipped.len(),
            "Availability computed"
        );
        Ok(report)
    }

    fn validate_range(&self, start: NaiveDate, end: NaiveDate) -> Result<(), LifecycleError> {
        if start > end {
            return Err(LifecycleError::Validation(format!(
                "start date {start} is after end date {end}"
            )));
        }
        let days = (end - start).num_days() + 1;
        if days > i64::from(self.config.max_range_days) {
            return Err(LifecycleError::Validation(format!(
                "range of {days} days exceeds the maximum of {}",
                self.config.max_range_days
            )));
        }
        Ok(())
    }
}

/// Saturdays and Sundays in `start..=end`, as day keys
fn weekend_dates(start: NaiveDate, end: NaiveDate) -> Vec<String> {
    start
        .iter_days()
        .take_while(|day| *day <= end)
        .filter(|day| matches!(day.weekday(), Weekday::Sat | Weekday::Sun))
        .map(date_key)
        .collect()
}
