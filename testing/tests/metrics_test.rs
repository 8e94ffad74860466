//! Counters emitted by the lifecycle engine.
//!
//! Uses a thread-local recorder, so every test drives the engine on a
//! current-thread runtime.

#![allow(clippy::expect_used, clippy::unwrap_used)] // Test code can use unwrap/expect

use metrics::{
    Counter, Gauge, Histogram, Key, KeyName, Metadata, Recorder, SharedString, Unit,
};
use servicedesk_core::{RequestKind, RequestStatus};
use servicedesk_testing::fixtures::{self, admin, owner};
use servicedesk_testing::harness;
use std::sync::Mutex;

/// Records every counter key as `name{label=value,...}`.
#[derive(Default)]
struct CapturingRecorder {
    counters: Mutex<Vec<String>>,
}

impl CapturingRecorder {
    fn counters(&self) -> Vec<String> {
        self.counters.lock().unwrap().clone()
    }
}

impl Recorder for CapturingRecorder {
    fn describe_counter(&self, _: KeyName, _: Option<Unit>, _: SharedString) {}
    fn describe_gauge(&self, _: KeyName, _: Option<Unit>, _: SharedString) {}
    fn describe_histogram(&self, _: KeyName, _: Option<Unit>, _: SharedString) {}

    fn register_counter(&self, key: &Key, _: &Metadata<'_>) -> Counter {
        let labels: Vec<_> = key
            .labels()
            .map(|label| format!("{}={}", label.key(), label.value()))
            .collect();
        self.counters
            .lock()
            .unwrap()
            .push(format!("{}{{{}}}", key.name(), labels.join(",")));
        Counter::noop()
    }

    fn register_gauge(&self, _: &Key, _: &Metadata<'_>) -> Gauge {
        Gauge::noop()
    }

    fn register_histogram(&self, _: &Key, _: &Metadata<'_>) -> Histogram {
        Histogram::noop()
    }
}

fn run<F: std::future::Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
        .block_on(future)
}

#[test]
fn transitions_are_counted_by_resulting_status() {
    let recorder = CapturingRecorder::default();

    metrics::with_local_recorder(&recorder, || {
        run(async {
            let (_, engine) = harness::engine();
            let id = engine
                .submit(fixtures::submission(RequestKind::Service, 2_000), &owner())
                .await
                .unwrap();
            engine
                .transition(id, RequestStatus::Accepted, &admin(), None)
                .await
                .unwrap();
            engine
                .transition(id, RequestStatus::Completed, &admin(), None)
                .await
                .unwrap();
        });
    });

    let counters = recorder.counters();
    assert!(counters.contains(&"servicedesk_submissions_total{kind=service}".to_string()));
    assert!(counters.contains(&"servicedesk_transitions_total{to=accepted}".to_string()));
    assert!(counters.contains(&"servicedesk_transitions_total{to=completed}".to_string()));
}

#[test]
fn refused_changes_count_as_rule_violations() {
    let recorder = CapturingRecorder::default();

    metrics::with_local_recorder(&recorder, || {
        run(async {
            let (_, engine) = harness::engine();
            let id = engine
                .submit(fixtures::submission(RequestKind::Sell, 500), &owner())
                .await
                .unwrap();
            engine
                .transition(id, RequestStatus::Completed, &admin(), None)
                .await
                .unwrap_err();
        });
    });

    let counters = recorder.counters();
    assert!(counters.contains(&"servicedesk_rule_violations_total{kind=invalid_transition}".to_string()));
    assert!(!counters.iter().any(|c| c.starts_with("servicedesk_transitions_total")));
}
