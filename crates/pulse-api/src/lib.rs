//! # pulse-api: Activity Leaderboard Service
//!
//! Axum HTTP service over the scan pipeline. Each `GET /top` request scans
//! the most recent blocks for the configured event, counts participation
//! per address, and returns the top K.
//!
//! ## API Surface
//!
//! | Route                | Purpose                                       |
//! |----------------------|-----------------------------------------------|
//! | `GET /top`           | One scan-and-rank cycle, JSON leaderboard     |
//! | `GET /health/liveness`  | Process is up                              |
//! | `GET /health/readiness` | Ledger source answers a head lookup        |
//! | `GET /metrics`       | Prometheus text exposition (when enabled)     |
//!
//! ## Middleware Stack (execution order)
//!
//! ```text
//! TraceLayer → MetricsMiddleware → Handler
//! ```

pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod state;

use axum::extract::State;
use axum::http::StatusCode;
use axum::middleware::from_fn;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Assemble the application router with all routes and middleware.
pub fn app(state: AppState) -> Router {
    let metrics_on = state.config.metrics_enabled;

    let mut router = Router::new()
        .merge(routes::top::router())
        .route("/health/liveness", get(liveness))
        .route("/health/readiness", get(readiness));

    if metrics_on {
        router = router
            .route("/metrics", get(prometheus_metrics))
            .layer(from_fn(middleware::metrics::metrics_middleware))
            .layer(axum::Extension(state.metrics.clone()));
    }

    router.layer(TraceLayer::new_for_http()).with_state(state)
}

/// GET /metrics: Prometheus metrics scrape endpoint.
async fn prometheus_metrics(State(state): State<AppState>) -> impl IntoResponse {
    match state.metrics.gather_and_encode() {
        Ok(body) => (
            StatusCode::OK,
            [(
                axum::http::header::CONTENT_TYPE,
                "text/plain; version=0.0.4; charset=utf-8",
            )],
            body,
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Failed to encode Prometheus metrics: {e}");
            (StatusCode::INTERNAL_SERVER_ERROR, e).into_response()
        }
    }
}

/// Liveness probe: always returns 200 if the process is running.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness probe: the ledger source must answer a head lookup.
///
/// Returns 200 "ready" or 503 with a diagnostic message.
async fn readiness(State(state): State<AppState>) -> impl IntoResponse {
    match state.source.head_block().await {
        Ok(head) => {
            tracing::debug!(head = %head, source = state.source.name(), "readiness probe passed");
            (StatusCode::OK, "ready").into_response()
        }
        Err(e) => {
            tracing::warn!(error = %e, source = state.source.name(), "readiness probe failed");
            (StatusCode::SERVICE_UNAVAILABLE, "ledger source unreachable").into_response()
        }
    }
}
