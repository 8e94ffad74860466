//! Axum middleware for request tracking.
//!
//! Every request gets a correlation id: taken from `X-Correlation-ID` when
//! the caller sent a valid UUID, generated otherwise. The id is stored in
//! request extensions (read it with [`CorrelationId`]), recorded on the
//! request span, and echoed in the response header.
//!
//! # Example
//!
//! ```ignore
//! let app = Router::new()
//!     .route("/api/v1/requests", post(submit_request))
//!     .layer(axum::middleware::from_fn(correlation_id));
//! ```

use crate::extractors::CorrelationId;
use axum::{
    extract::Request,
    http::HeaderValue,
    middleware::Next,
    response::Response,
};
use tracing::Instrument;
use uuid::Uuid;

/// Header name for correlation ID.
pub const CORRELATION_ID_HEADER: &str = "X-Correlation-ID";

/// Attach a correlation id to the request, its span and its response.
pub async fn correlation_id(mut request: Request, next: Next) -> Response {
    let id = request
        .headers()
        .get(CORRELATION_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| Uuid::parse_str(s.trim()).ok())
        .unwrap_or_else(Uuid::new_v4);

    request.extensions_mut().insert(CorrelationId(id));

    let span = tracing::info_span!(
        "http_request",
        correlation_id = %id,
        method = %request.method(),
        uri = %request.uri(),
    );

    let mut response = next.run(request).instrument(span).await;

    if let Ok(value) = HeaderValue::from_str(&id.to_string()) {
        response.headers_mut().insert(CORRELATION_ID_HEADER, value);
    }
    response
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)] // Test code can use unwrap/expect
mod tests {
    use super::*;
    use axum::{Router, body::Body, routing::get};
    use tower::ServiceExt;

    fn app() -> Router {
        Router::new()
            .route("/echo", get(|CorrelationId(id): CorrelationId| async move { id.to_string() }))
            .layer(axum::middleware::from_fn(correlation_id))
    }

    async fn response_id(request: axum::http::Request<Body>) -> (String, String) {
        let response = app().oneshot(request).await.unwrap();
        let header = response
            .headers()
            .get(CORRELATION_ID_HEADER)
            .expect("Correlation ID header should be present")
            .to_str()
            .unwrap()
            .to_string();
        let body = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        (header, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn generated_when_missing() {
        let request = axum::http::Request::builder()
            .uri("/echo")
            .body(Body::empty())
            .unwrap();

        let (header, seen_by_handler) = response_id(request).await;

        assert!(Uuid::parse_str(&header).is_ok());
        assert_eq!(header, seen_by_handler);
    }

    #[tokio::test]
    async fn preserved_from_request() {
        let sent = Uuid::new_v4();
        let request = axum::http::Request::builder()
            .uri("/echo")
            .header(CORRELATION_ID_HEADER, sent.to_string())
            .body(Body::empty())
            .unwrap();

        let (header, _) = response_id(request).await;

        assert_eq!(header, sent.to_string());
    }

    #[tokio::test]
    async fn invalid_value_is_replaced() {
        let request = axum::http::Request::builder()
            .uri("/echo")
            .header(CORRELATION_ID_HEADER, "not-a-uuid")
            .body(Body::empty())
            .unwrap();

        let (header, _) = response_id(request).await;

        assert_ne!(header, "not-a-uuid");
        assert!(Uuid::parse_str(&header).is_ok());
    }
}
