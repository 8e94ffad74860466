//! Runtime settings for the engine and the aggregator.
//!
//! Values are plain data with sensible defaults; loading them from the
//! environment is the job of the hosting application.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default bound on every request-store call
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(5);

/// Default longest calendar range accepted by one availability query
pub const DEFAULT_MAX_RANGE_DAYS: u32 = 92;

/// Settings for [`LifecycleEngine`](crate::lifecycle::LifecycleEngine).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Deadline for each request-store call
    pub store_timeout: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            store_timeout: DEFAULT_STORE_TIMEOUT,
        }
    }
}

/// Company working hours reported alongside the calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkingHours {
    /// Opening time
    pub start: NaiveTime,
    /// Closing time
    pub end: NaiveTime,
}

impl Default for WorkingHours {
    fn default() -> Self {
        Self {
            start: NaiveTime::MIN + chrono::Duration::hours(9),
            end: NaiveTime::MIN + chrono::Duration::hours(18),
        }
    }
}

/// Settings for [`AvailabilityAggregator`](crate::availability::AvailabilityAggregator).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AvailabilityConfig {
    /// Working hours reported to the calendar
    pub working_hours: WorkingHours,
    /// Whether the company is closed on Saturdays and Sundays
    pub weekend_closed: bool,
    /// Longest accepted range, both ends inclusive
    pub max_range_days: u32,
    /// Deadline for each request-store query
    pub store_timeout: Duration,
}

impl Default for AvailabilityConfig {
    fn default() -> Self {
        Self {
            working_hours: WorkingHours::default(),
            weekend_closed: true,
            max_range_days: DEFAULT_MAX_RANGE_DAYS,
            store_timeout: DEFAULT_STORE_TIMEOUT,
        }
    }
}
