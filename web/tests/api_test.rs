//! HTTP API integration tests.
//!
//! Drives the full router (middleware, extractors, handlers) against the
//! in-memory store with `tower::ServiceExt::oneshot`.

#![allow(clippy::expect_used, clippy::unwrap_used)] // Integration tests can use expect for setup

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use serde_json::{Value, json};
use servicedesk_core::{AvailabilityReport, ServiceRequest};
use servicedesk_testing::{InMemoryRequestStore, test_clock};
use servicedesk_web::error::ErrorResponse;
use servicedesk_web::handlers::requests::SubmitResponse;
use servicedesk_web::{ACTOR_ID_HEADER, ACTOR_ROLE_HEADER, AppState, CORRELATION_ID_HEADER, Config, router};
use std::sync::Arc;
use tower::ServiceExt;

const CUSTOMER: (&str, &str) = ("cust-42", "customer");
const ADMIN: (&str, &str) = ("ops-1", "admin");

fn app_with(store: &InMemoryRequestStore) -> Router {
    let config = Config::from_lookup(|_| None).expect("defaults are valid");
    router(AppState::new(
        Arc::new(store.clone()),
        Arc::new(test_clock()),
        &config,
    ))
}

async fn call(
    app: &Router,
    method: &str,
    uri: &str,
    actor: Option<(&str, &str)>,
    body: Option<Value>,
) -> (StatusCode, axum::http::HeaderMap, Vec<u8>) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some((id, role)) = actor {
        builder = builder.header(ACTOR_ID_HEADER, id).header(ACTOR_ROLE_HEADER, role);
    }
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), 1 << 20).await.unwrap();
    (status, headers, bytes.to_vec())
}

fn sell_submission(price: i64) -> Value {
    json!({
        "kind": "sell",
        "requested_price": price,
        "customer": {
            "id": CUSTOMER.0,
            "name": "Dmytro",
            "phone": "+380 50 111 2233",
            "email": null
        },
        "summary": "Fridge, two years old"
    })
}

async fn submit(app: &Router, body: Value) -> SubmitResponse {
    let (status, _, bytes) = call(app, "POST", "/api/v1/requests", Some(CUSTOMER), Some(body)).await;
    assert_eq!(status, StatusCode::CREATED, "{}", String::from_utf8_lossy(&bytes));
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_is_ok_and_carries_correlation_id() {
    let app = app_with(&InMemoryRequestStore::new());

    let (status, headers, _) = call(&app, "GET", "/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert!(headers.contains_key(CORRELATION_ID_HEADER));
}

#[tokio::test]
async fn negotiation_over_http() {
    let app = app_with(&InMemoryRequestStore::new());
    let created = submit(&app, sell_submission(12_000)).await;
    assert_eq!(created.request_number.as_str(), "SL-00001");

    let offer_uri = format!("/api/v1/requests/{}/offer", created.id);
    let (status, _, _) = call(
        &app,
        "POST",
        &offer_uri,
        Some(ADMIN),
        Some(json!({ "counter_price": 8500, "note": "Dent on the door" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let respond_uri = format!("/api/v1/requests/{}/respond", created.id);
    let (status, _, bytes) = call(
        &app,
        "POST",
        &respond_uri,
        Some(CUSTOMER),
        Some(json!({ "response": "accept", "seen_revision": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let accepted: ServiceRequest = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(accepted.final_price.map(|p| p.amount()), Some(8_500));

    let cancel_uri = format!("/api/v1/requests/{}/cancel", created.id);
    let (status, _, bytes) = call(&app, "POST", &cancel_uri, Some(CUSTOMER), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    let error: ErrorResponse = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(error.code, "NOT_CANCELLABLE");

    let timeline_uri = format!("/api/v1/requests/{}/timeline", created.id);
    let (status, _, bytes) = call(&app, "GET", &timeline_uri, Some(CUSTOMER), None).await;
    assert_eq!(status, StatusCode::OK);
    let timeline: Vec<Value> = serde_json::from_slice(&bytes).unwrap();
    let statuses: Vec<_> = timeline.iter().map(|entry| entry["status"].clone()).collect();
    assert_eq!(statuses, [json!("pending"), json!("offer_sent"), json!("accepted")]);
}

#[tokio::test]
async fn missing_identity_is_unauthorized() {
    let app = app_with(&InMemoryRequestStore::new());

    let (status, _, _) = call(&app, "POST", "/api/v1/requests", None, Some(sell_submission(100))).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn invalid_submission_is_unprocessable() {
    let app = app_with(&InMemoryRequestStore::new());

    let (status, _, bytes) = call(
        &app,
        "POST",
        "/api/v1/requests",
        Some(CUSTOMER),
        Some(sell_submission(0)),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let error: ErrorResponse = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(error.code, "VALIDATION_ERROR");
}

#[tokio::test]
async fn wrong_role_is_forbidden_and_bad_edge_conflicts() {
    let app = app_with(&InMemoryRequestStore::new());
    let created = submit(&app, sell_submission(500)).await;
    let uri = format!("/api/v1/requests/{}/transition", created.id);

    let (status, _, _) = call(&app, "POST", &uri, Some(CUSTOMER), Some(json!({ "to": "accepted" }))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _, bytes) = call(&app, "POST", &uri, Some(ADMIN), Some(json!({ "to": "completed" }))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    let error: ErrorResponse = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(error.code, "INVALID_TRANSITION");
}

#[tokio::test]
async fn other_customers_cannot_read_a_request() {
    let app = app_with(&InMemoryRequestStore::new());
    let created = submit(&app, sell_submission(500)).await;
    let uri = format!("/api/v1/requests/{}", created.id);

    let (status, _, _) = call(&app, "GET", &uri, Some(("cust-7", "customer")), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _, _) = call(&app, "GET", &uri, Some(ADMIN), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn unknown_or_malformed_ids_are_not_found() {
    let app = app_with(&InMemoryRequestStore::new());

    let (status, _, _) = call(&app, "GET", "/api/v1/requests/not-a-uuid", Some(ADMIN), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let uri = format!("/api/v1/requests/{}", uuid::Uuid::new_v4());
    let (status, _, _) = call(&app, "GET", &uri, Some(ADMIN), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn store_outage_is_service_unavailable_with_retry_after() {
    let store = InMemoryRequestStore::new();
    let app = app_with(&store);
    store.set_unavailable(true);

    let (status, headers, _) = call(
        &app,
        "POST",
        "/api/v1/requests",
        Some(CUSTOMER),
        Some(sell_submission(100)),
    )
    .await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(headers.contains_key(header::RETRY_AFTER));
}

#[tokio::test]
async fn availability_lists_booked_moves() {
    let app = app_with(&InMemoryRequestStore::new());
    submit(
        &app,
        json!({
            "kind": "moving",
            "requested_price": 3000,
            "customer": { "id": CUSTOMER.0, "name": "Dmytro", "phone": null, "email": "d@example.com" },
            "summary": "Kyiv to Lviv",
            "schedule": { "date": "2025-06-03", "start_time": "09:00:00", "end_time": "13:00:00" }
        }),
    )
    .await;

    let (status, _, bytes) = call(
        &app,
        "GET",
        "/api/v1/availability?start=2025-06-02&end=2025-06-08",
        Some(ADMIN),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let report: AvailabilityReport = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(report.total_slots(), 1);
    let slot = &report.busy_slots["2025-06-03"][0];
    assert_eq!(slot.customer_label, "Dmytro");
    assert_eq!(slot.details_label, "Moving MV-00001: Kyiv to Lviv");
    assert_eq!(report.weekend_dates, ["2025-06-07", "2025-06-08"]);
}

#[tokio::test]
async fn inverted_availability_range_is_unprocessable() {
    let app = app_with(&InMemoryRequestStore::new());

    let (status, _, _) = call(
        &app,
        "GET",
        "/api/v1/availability?start=2025-06-08&end=2025-06-02",
        Some(ADMIN),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn availability_is_staff_only() {
    let app = app_with(&InMemoryRequestStore::new());
    let uri = "/api/v1/availability?start=2025-06-02&end=2025-06-08";

    let (status, _, _) = call(&app, "GET", uri, None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _, bytes) = call(&app, "GET", uri, Some(CUSTOMER), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let error: ErrorResponse = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(error.code, "FORBIDDEN");
}
