//! # Top Participants
//!
//! `GET /top` runs one scan-and-rank cycle synchronously and returns the
//! leaderboard. The cycle is bound to the request: if the client
//! disconnects, axum drops the handler future and the worker pool's tasks
//! are aborted with it.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use pulse_core::RankedEntry;
use pulse_scan::{run_cycle, CancelSignal};
use tokio::time::Instant;

use crate::error::AppError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/top", get(top_participants))
}

/// GET /top: JSON array of `{address, score}`, highest score first.
async fn top_participants(State(state): State<AppState>) -> Result<Json<Vec<RankedEntry>>, AppError> {
    let started = Instant::now();
    let result = run_cycle(
        state.source.clone(),
        &state.config.scan,
        CancelSignal::never(),
    )
    .await;

    match result {
        Ok(report) => {
            state.metrics.record_cycle(&report);
            if report.blocks_failed > 0 {
                tracing::warn!(
                    failed = report.blocks_failed,
                    processed = report.blocks_processed,
                    "ranking excludes blocks whose log query failed"
                );
            }
            Ok(Json(report.ranking))
        }
        Err(e) => {
            state.metrics.record_cycle_failure(started.elapsed());
            Err(AppError::from(e))
        }
    }
}
