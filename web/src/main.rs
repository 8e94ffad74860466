//! Service desk HTTP API server.
//!
//! Runs with the in-memory request store; requests live as long as the
//! process.
//!
//! # Usage
//!
//! ```bash
//! SERVICEDESK_PORT=8080 SERVICEDESK_METRICS_PORT=9090 cargo run --bin servicedesk
//! ```
//!
//! # Example Requests
//!
//! ```bash
//! # Submit a sell-in request
//! curl -X POST http://localhost:8080/api/v1/requests \
//!   -H "Content-Type: application/json" \
//!   -H "X-Actor-Id: cust-1" -H "X-Actor-Role: customer" \
//!   -d '{
//!     "kind": "sell",
//!     "requested_price": 12000,
//!     "customer": {"id": "cust-1", "name": "Oksana", "phone": "+380671234567", "email": null},
//!     "summary": "Washing machine"
//!   }'
//!
//! # Counter-offer as admin
//! curl -X POST http://localhost:8080/api/v1/requests/<id>/offer \
//!   -H "Content-Type: application/json" \
//!   -H "X-Actor-Id: ops-1" -H "X-Actor-Role: admin" \
//!   -d '{"counter_price": 8500, "note": "Scratches on the lid"}'
//!
//! # Calendar for a week
//! curl 'http://localhost:8080/api/v1/availability?start=2025-06-02&end=2025-06-08'
//! ```

use servicedesk_core::SystemClock;
use servicedesk_testing::InMemoryRequestStore;
use servicedesk_web::{AppState, Config, router};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    let _ = dotenvy::dotenv();

    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.server.log_level.as_str().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        bind = %config.server.bind_address(),
        store_timeout_ms = u64::try_from(config.engine.store_timeout.as_millis()).unwrap_or(u64::MAX),
        max_range_days = config.availability.max_range_days,
        "Configuration loaded"
    );

    if let Some(port) = config.server.metrics_port {
        let addr = SocketAddr::from(([0, 0, 0, 0], port));
        servicedesk_web::metrics::install_exporter(addr)?;
    }

    let store = Arc::new(InMemoryRequestStore::new());
    tracing::info!("Using in-memory request store");

    let state = AppState::new(store, Arc::new(SystemClock), &config);
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(config.server.bind_address()).await?;
    tracing::info!("Server listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {error}");
    }
}
