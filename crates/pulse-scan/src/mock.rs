//! # Mock Log Source
//!
//! In-memory [`LogSource`] for tests and local development. Returns
//! deterministic data configured up front:
//!
//! - per-block logs (blocks without logs return an empty list)
//! - per-block injected failures
//! - per-block artificial latency
//! - a failing head lookup
//!
//! It also records every filter it receives and the peak number of
//! concurrent `logs` calls, so tests can assert on the pool's bounds.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use pulse_core::{BlockNumber, EventLog};

use crate::source::{LogFilter, LogSource, SourceError};

/// Deterministic, configurable ledger.
#[derive(Debug, Default)]
pub struct MockLogSource {
    head: Option<BlockNumber>,
    logs: HashMap<BlockNumber, Vec<EventLog>>,
    failing: HashSet<BlockNumber>,
    delays: HashMap<BlockNumber, Duration>,
    filters: Mutex<Vec<LogFilter>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MockLogSource {
    /// A ledger whose head is `head` and whose blocks are all empty.
    pub fn new(head: BlockNumber) -> Self {
        Self {
            head: Some(head),
            ..Self::default()
        }
    }

    /// A ledger whose head lookup always fails.
    pub fn unreachable() -> Self {
        Self::default()
    }

    /// Serve `logs` for `block`.
    pub fn with_logs(mut self, block: BlockNumber, logs: Vec<EventLog>) -> Self {
        self.logs.insert(block, logs);
        self
    }

    /// Fail every query for `block`.
    pub fn with_failure(mut self, block: BlockNumber) -> Self {
        self.failing.insert(block);
        self
    }

    /// Sleep `delay` before answering for `block`.
    pub fn with_delay(mut self, block: BlockNumber, delay: Duration) -> Self {
        self.delays.insert(block, delay);
        self
    }

    /// Every filter received so far, in arrival order.
    pub fn filters(&self) -> Vec<LogFilter> {
        self.filters.lock().clone()
    }

    /// Blocks queried so far, in arrival order.
    pub fn queried_blocks(&self) -> Vec<BlockNumber> {
        self.filters.lock().iter().map(|f| f.from_block).collect()
    }

    /// Highest number of `logs` calls observed running at once.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl LogSource for MockLogSource {
    async fn head_block(&self) -> Result<BlockNumber, SourceError> {
        self.head
            .ok_or_else(|| SourceError::Transport("mock head lookup unavailable".into()))
    }

    async fn logs(&self, filter: &LogFilter) -> Result<Vec<EventLog>, SourceError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        let _guard = InFlight(&self.in_flight);
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        self.filters.lock().push(*filter);

        if !filter.is_single_block() {
            return Err(SourceError::Rejected {
                code: -32602,
                message: "mock serves single-block queries only".into(),
            });
        }
        let block = filter.from_block;
        if let Some(delay) = self.delays.get(&block) {
            tokio::time::sleep(*delay).await;
        }
        if self.failing.contains(&block) {
            return Err(SourceError::Transport(format!(
                "injected failure for block {block}"
            )));
        }
        Ok(self.logs.get(&block).cloned().unwrap_or_default())
    }

    fn name(&self) -> &str {
        "mock"
    }
}
