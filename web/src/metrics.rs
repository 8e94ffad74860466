//! Prometheus metrics for the service desk.
//!
//! # Exported Metrics
//!
//! - `servicedesk_submissions_total{kind}` - Requests submitted
//! - `servicedesk_transitions_total{to}` - Committed lifecycle events, by resulting status
//! - `servicedesk_rule_violations_total{kind}` - Refused operations by error kind
//! - `servicedesk_calendar_skipped_total` - Malformed records left off the calendar

use metrics::describe_counter;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use thiserror::Error;

/// Errors from metrics setup.
#[derive(Error, Debug)]
pub enum MetricsError {
    /// Failed to install the exporter
    #[error("Failed to install metrics exporter: {0}")]
    Install(String),
}

/// Register descriptions for every counter the service emits.
pub fn register_metrics() {
    describe_counter!("servicedesk_submissions_total", "Requests submitted, by kind");
    describe_counter!(
        "servicedesk_transitions_total",
        "Committed lifecycle events (status changes and offer revisions), by resulting status"
    );
    describe_counter!(
        "servicedesk_rule_violations_total",
        "Operations refused by lifecycle rules or validation, by error kind"
    );
    describe_counter!(
        "servicedesk_calendar_skipped_total",
        "Malformed records skipped by the availability aggregator"
    );
}

/// Install the Prometheus recorder with a scrape endpoint on `addr`.
///
/// Must run inside a Tokio runtime.
///
/// # Errors
///
/// Returns [`MetricsError::Install`] when a recorder is already installed or
/// the listener cannot be bound.
pub fn install_exporter(addr: SocketAddr) -> Result<(), MetricsError> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| MetricsError::Install(e.to_string()))?;
    register_metrics();
    tracing::info!(%addr, "Metrics available at http://{addr}/metrics");
    Ok(())
}
