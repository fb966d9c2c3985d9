//! # Scan Configuration
//!
//! Tunables for one scan cycle. The worker count and queue depth exist to
//! stay under the upstream provider's rate limit, whose threshold this
//! system does not control, so they are configuration rather than
//! constants. Defaults match a typical public RPC endpoint: more than two
//! concurrent `eth_getLogs` calls or more than six buffered blocks were
//! observed to trip rate limiting.

use std::time::Duration;

use alloy_primitives::B256;

use crate::error::ValidationError;
use crate::event::TRANSFER_EVENT_SIGNATURE;

/// Default number of concurrent per-block queries.
pub const DEFAULT_WORKERS: usize = 2;
/// Default number of block identifiers buffered ahead of the workers.
pub const DEFAULT_QUEUE_DEPTH: usize = 6;
/// Default number of blocks behind the head to scan.
pub const DEFAULT_WINDOW_SIZE: u64 = 100;
/// Default leaderboard length.
pub const DEFAULT_TOP_K: usize = 5;

/// Parameters for one scan-and-rank cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanConfig {
    /// Degree of parallelism `P`.
    pub workers: usize,
    /// Queue capacity `Q`.
    pub queue_depth: usize,
    /// Blocks behind the head; the window covers `window_size + 1` blocks.
    pub window_size: u64,
    /// Leaderboard length `K`.
    pub top_k: usize,
    /// Event signature filter (topic 0).
    pub topic: B256,
    /// Deadline for the pool phase. `None` waits for the full window.
    pub timeout: Option<Duration>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            queue_depth: DEFAULT_QUEUE_DEPTH,
            window_size: DEFAULT_WINDOW_SIZE,
            top_k: DEFAULT_TOP_K,
            topic: TRANSFER_EVENT_SIGNATURE,
            timeout: None,
        }
    }
}

impl ScanConfig {
    /// Reject parameters that would make a cycle meaningless or hang.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let positive = |field: &'static str, value: u64| {
            if value == 0 {
                Err(ValidationError::InvalidConfig {
                    field,
                    reason: "must be greater than zero".to_string(),
                })
            } else {
                Ok(())
            }
        };
        positive("workers", self.workers as u64)?;
        positive("queue_depth", self.queue_depth as u64)?;
        positive("window_size", self.window_size)?;
        positive("top_k", self.top_k as u64)?;
        if self.timeout == Some(Duration::ZERO) {
            return Err(ValidationError::InvalidConfig {
                field: "timeout",
                reason: "must be greater than zero when set".to_string(),
            });
        }
        Ok(())
    }
}

/// Parse a topic hash given as `0x` + 64 hex digits.
pub fn parse_topic(raw: &str) -> Result<B256, ValidationError> {
    raw.trim()
        .parse::<B256>()
        .map_err(|e| ValidationError::InvalidTopic {
            value: raw.to_string(),
            reason: e.to_string(),
        })
}
