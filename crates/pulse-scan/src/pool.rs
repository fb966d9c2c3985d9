//! # Bounded Worker Pool
//!
//! One producer and `P` workers joined by a bounded FIFO of capacity `Q`.
//!
//! - The producer (the task calling [`WorkerPool::run`]) pushes block
//!   numbers into a `tokio::sync::mpsc` channel and blocks when it is full.
//! - Exactly `P` workers, spawned into a `JoinSet`, share the receiver. Each
//!   `recv` hands a block to exactly one worker.
//! - `run` returns only after every worker has been joined. That join is
//!   the barrier that makes every ledger increment visible to the caller.
//!
//! At most `P` queries are ever in flight against the source, and at most
//! `Q` block numbers are buffered ahead of them.
//!
//! Dropping the `run` future drops the `JoinSet`, which aborts every worker.

use std::sync::Arc;

use pulse_core::{ActivityLedger, BlockNumber, ScanConfig, B256};
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinSet;

use crate::cancel::CancelSignal;
use crate::extract::scan_block;
use crate::source::LogSource;

/// Fixed-size pool of per-block query workers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerPool {
    workers: usize,
    queue_depth: usize,
}

/// Outcome of one [`WorkerPool::run`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolReport {
    /// Block numbers handed to the queue.
    pub blocks_enqueued: u64,
    /// Blocks a worker finished, successfully or not.
    pub blocks_processed: u64,
    /// Blocks whose query failed and were skipped.
    pub blocks_failed: u64,
    /// Transfers credited to the ledger.
    pub transfers: u64,
    /// Logs skipped for missing topics.
    pub malformed_logs: u64,
    /// Workers that panicked or were aborted.
    pub workers_lost: u64,
    /// The cancel signal stopped the run before the input was exhausted.
    pub cancelled: bool,
}

impl PoolReport {
    /// Every enqueued block was processed and nothing was cut short.
    pub fn is_complete(&self) -> bool {
        !self.cancelled && self.workers_lost == 0 && self.blocks_processed == self.blocks_enqueued
    }

    fn absorb(&mut self, stats: WorkerStats) {
        self.blocks_processed += stats.processed;
        self.blocks_failed += stats.failed;
        self.transfers += stats.transfers;
        self.malformed_logs += stats.malformed;
    }
}

#[derive(Debug, Default)]
struct WorkerStats {
    processed: u64,
    failed: u64,
    transfers: u64,
    malformed: u64,
}

impl WorkerPool {
    /// A pool of `workers` tasks over a queue of `queue_depth` slots.
    ///
    /// Both values are raised to at least 1.
    pub fn new(workers: usize, queue_depth: usize) -> Self {
        Self {
            workers: workers.max(1),
            queue_depth: queue_depth.max(1),
        }
    }

    /// Pool sized from a scan configuration.
    pub fn from_config(config: &ScanConfig) -> Self {
        Self::new(config.workers, config.queue_depth)
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn queue_depth(&self) -> usize {
        self.queue_depth
    }

    /// Query every block in `blocks` and fold the results into `ledger`.
    ///
    /// Returns once all workers have exited. Per-block failures are logged
    /// and counted, never propagated.
    pub async fn run<I>(
        &self,
        source: Arc<dyn LogSource>,
        blocks: I,
        topic: B256,
        ledger: Arc<ActivityLedger>,
        cancel: &CancelSignal,
    ) -> PoolReport
    where
        I: IntoIterator<Item = BlockNumber>,
    {
        let (tx, rx) = mpsc::channel::<BlockNumber>(self.queue_depth);
        let rx = Arc::new(Mutex::new(rx));

        let mut workers = JoinSet::new();
        for worker in 0..self.workers {
            workers.spawn(worker_loop(
                worker,
                Arc::clone(&rx),
                Arc::clone(&source),
                topic,
                Arc::clone(&ledger),
                cancel.clone(),
            ));
        }

        let mut report = PoolReport::default();
        for block in blocks {
            if cancel.is_triggered() {
                report.cancelled = true;
                break;
            }
            tokio::select! {
                biased;
                _ = cancel.triggered() => {
                    report.cancelled = true;
                    break;
                }
                sent = tx.send(block) => {
                    if sent.is_err() {
                        tracing::error!(block = %block, "all scan workers exited early");
                        break;
                    }
                    report.blocks_enqueued += 1;
                }
            }
        }
        // Closing the channel lets idle workers observe end-of-input.
        drop(tx);

        while let Some(joined) = workers.join_next().await {
            match joined {
                Ok(stats) => report.absorb(stats),
                Err(e) => {
                    tracing::error!(error = %e, "scan worker terminated abnormally");
                    report.workers_lost += 1;
                }
            }
        }
        if cancel.is_triggered() && report.blocks_processed < report.blocks_enqueued {
            report.cancelled = true;
        }

        tracing::debug!(
            workers = self.workers,
            queue_depth = self.queue_depth,
            enqueued = report.blocks_enqueued,
            processed = report.blocks_processed,
            failed = report.blocks_failed,
            cancelled = report.cancelled,
            "worker pool drained"
        );
        report
    }
}

async fn worker_loop(
    worker: usize,
    queue: Arc<Mutex<mpsc::Receiver<BlockNumber>>>,
    source: Arc<dyn LogSource>,
    topic: B256,
    ledger: Arc<ActivityLedger>,
    cancel: CancelSignal,
) -> WorkerStats {
    let mut stats = WorkerStats::default();
    loop {
        if cancel.is_triggered() {
            break;
        }
        let next = {
            let mut rx = queue.lock().await;
            tokio::select! {
                biased;
                _ = cancel.triggered() => None,
                block = rx.recv() => block,
            }
        };
        let Some(block) = next else {
            break;
        };

        match scan_block(source.as_ref(), block, topic).await {
            Ok(activity) => {
                activity.apply(&ledger);
                stats.transfers += activity.transfers.len() as u64;
                stats.malformed += activity.malformed;
            }
            Err(e) => {
                tracing::warn!(worker, block = %block, error = %e, "skipping block after failed log query");
                stats.failed += 1;
            }
        }
        stats.processed += 1;
    }
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cancel::cancel_pair;
    use crate::mock::MockLogSource;
    use pulse_core::{Address, BlockRange, EventLog, ParticipantId, TRANSFER_EVENT_SIGNATURE};
    use std::time::Duration;

    fn participant(byte: u8) -> ParticipantId {
        ParticipantId::new(Address::repeat_byte(byte))
    }

    #[test]
    fn sizes_are_at_least_one() {
        let pool = WorkerPool::new(0, 0);
        assert_eq!(pool.workers(), 1);
        assert_eq!(pool.queue_depth(), 1);
    }

    #[tokio::test]
    async fn every_block_queried_exactly_once() {
        let source = Arc::new(MockLogSource::new(BlockNumber::from(50)));
        let ledger = Arc::new(ActivityLedger::new());
        let range = BlockRange::window(BlockNumber::from(50), 20);

        let report = WorkerPool::new(3, 2)
            .run(
                source.clone(),
                range,
                TRANSFER_EVENT_SIGNATURE,
                ledger,
                &CancelSignal::never(),
            )
            .await;

        assert!(report.is_complete());
        assert_eq!(report.blocks_enqueued, 21);
        assert_eq!(report.blocks_processed, 21);
        let mut queried = source.queried_blocks();
        queried.sort();
        let expected: Vec<_> = (30..=50u64).map(BlockNumber::from).collect();
        assert_eq!(queried, expected, "no duplicates, no gaps");
    }

    #[tokio::test]
    async fn concurrency_never_exceeds_worker_count() {
        let mut source = MockLogSource::new(BlockNumber::from(40));
        for b in 0..=40u64 {
            source = source.with_delay(BlockNumber::from(b), Duration::from_millis(5));
        }
        let source = Arc::new(source);

        WorkerPool::new(2, 6)
            .run(
                source.clone(),
                BlockRange::window(BlockNumber::from(40), 40),
                TRANSFER_EVENT_SIGNATURE,
                Arc::new(ActivityLedger::new()),
                &CancelSignal::never(),
            )
            .await;

        assert!(source.max_in_flight() <= 2);
        assert_eq!(source.queried_blocks().len(), 41);
    }

    #[tokio::test]
    async fn failed_block_is_counted_and_skipped() {
        let source = Arc::new(
            MockLogSource::new(BlockNumber::from(3))
                .with_logs(BlockNumber::from(1), vec![EventLog::transfer(participant(1), participant(2))])
                .with_failure(BlockNumber::from(2))
                .with_logs(BlockNumber::from(3), vec![EventLog::transfer(participant(1), participant(3))]),
        );
        let ledger = Arc::new(ActivityLedger::new());

        let report = WorkerPool::new(2, 1)
            .run(
                source,
                BlockRange::window(BlockNumber::from(3), 2),
                TRANSFER_EVENT_SIGNATURE,
                ledger.clone(),
                &CancelSignal::never(),
            )
            .await;

        assert_eq!(report.blocks_processed, 3);
        assert_eq!(report.blocks_failed, 1);
        assert_eq!(report.transfers, 2);
        assert_eq!(ledger.get(&participant(1)), 2);
    }

    #[tokio::test]
    async fn pre_cancelled_run_enqueues_nothing() {
        let (canceller, signal) = cancel_pair();
        canceller.cancel();
        let source = Arc::new(MockLogSource::new(BlockNumber::from(10)));

        let report = WorkerPool::new(2, 6)
            .run(
                source.clone(),
                BlockRange::window(BlockNumber::from(10), 10),
                TRANSFER_EVENT_SIGNATURE,
                Arc::new(ActivityLedger::new()),
                &signal,
            )
            .await;

        assert!(report.cancelled);
        assert_eq!(report.blocks_enqueued, 0);
        assert!(source.queried_blocks().is_empty());
    }
}
