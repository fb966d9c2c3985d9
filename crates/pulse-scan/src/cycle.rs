//! # Scan Cycle
//!
//! One complete request: look up the head, derive the window, run the pool
//! against a ledger created for this cycle only, and rank the snapshot.
//!
//! Each call owns its ledger, so concurrent cycles never share counts and
//! nothing accumulates across calls.

use std::sync::Arc;
use std::time::Duration;

use pulse_core::{
    rank_top_k, ActivityLedger, BlockNumber, BlockRange, RankedEntry, ScanConfig, ValidationError,
};
use thiserror::Error;
use tokio::time::Instant;

use crate::cancel::CancelSignal;
use crate::pool::WorkerPool;
use crate::source::{LogSource, SourceError};

/// A cycle that produced no ranking.
#[derive(Error, Debug)]
pub enum ScanError {
    /// The head block could not be determined.
    #[error("head block lookup failed: {0}")]
    HeadLookup(#[source] SourceError),

    /// The cycle was cancelled before the head block was known.
    #[error("scan cancelled before the head block was resolved")]
    Cancelled,

    /// The scan parameters were rejected.
    #[error(transparent)]
    InvalidConfig(#[from] ValidationError),
}

/// Result of one scan-and-rank cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanReport {
    pub head: BlockNumber,
    pub range_start: BlockNumber,
    /// Top-K leaderboard, highest score first.
    pub ranking: Vec<RankedEntry>,
    pub blocks_enqueued: u64,
    pub blocks_processed: u64,
    pub blocks_failed: u64,
    pub transfers: u64,
    pub malformed_logs: u64,
    pub distinct_participants: usize,
    /// Cancelled or deadline hit: the ranking covers only processed blocks.
    pub partial: bool,
    /// The window was clamped at genesis.
    pub clamped: bool,
    pub elapsed: Duration,
}

/// Run one scan-and-rank cycle.
///
/// A configured `timeout` is added to `cancel` and measured from the start
/// of this call.
pub async fn run_cycle(
    source: Arc<dyn LogSource>,
    config: &ScanConfig,
    cancel: CancelSignal,
) -> Result<ScanReport, ScanError> {
    config.validate()?;
    let started = Instant::now();
    let cancel = match config.timeout {
        Some(timeout) => cancel.with_deadline(started + timeout),
        None => cancel,
    };

    let head = tokio::select! {
        biased;
        _ = cancel.triggered() => return Err(ScanError::Cancelled),
        head = source.head_block() => head.map_err(ScanError::HeadLookup)?,
    };

    let range = BlockRange::window(head, config.window_size);
    let range_start = range.start();
    let clamped = range.is_clamped();
    if clamped {
        tracing::info!(
            head = %head,
            window = config.window_size,
            "scan window reaches below genesis; starting at block 0"
        );
    }

    let ledger = Arc::new(ActivityLedger::new());
    let pool = WorkerPool::from_config(config);
    let pool_report = pool
        .run(source, range, config.topic, Arc::clone(&ledger), &cancel)
        .await;

    let snapshot = ledger.snapshot();
    let ranking = rank_top_k(&snapshot, config.top_k);
    let partial = !pool_report.is_complete();

    let report = ScanReport {
        head,
        range_start,
        ranking,
        blocks_enqueued: pool_report.blocks_enqueued,
        blocks_processed: pool_report.blocks_processed,
        blocks_failed: pool_report.blocks_failed,
        transfers: pool_report.transfers,
        malformed_logs: pool_report.malformed_logs,
        distinct_participants: snapshot.len(),
        partial,
        clamped,
        elapsed: started.elapsed(),
    };

    if partial {
        tracing::warn!(
            head = %head,
            processed = report.blocks_processed,
            enqueued = report.blocks_enqueued,
            "scan cycle stopped early; ranking covers processed blocks only"
        );
    }
    tracing::info!(
        head = %head,
        from = %range_start,
        blocks = report.blocks_processed,
        failed = report.blocks_failed,
        transfers = report.transfers,
        participants = report.distinct_participants,
        elapsed_ms = report.elapsed.as_millis() as u64,
        "scan cycle complete"
    );
    Ok(report)
}
