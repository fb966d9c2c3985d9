//! # Ledger Log Source
//!
//! The interface the scan pipeline consumes. Production wires in the
//! JSON-RPC client from `pulse-rpc`; tests use [`MockLogSource`](crate::MockLogSource).
//!
//! Implementations must be `Send + Sync` so they can be shared across
//! worker tasks behind an `Arc`. The trait is object-safe to support
//! runtime source selection.

use async_trait::async_trait;
use pulse_core::{BlockNumber, EventLog, B256};
use thiserror::Error;

/// Query for logs matching one event signature over a block interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogFilter {
    pub from_block: BlockNumber,
    pub to_block: BlockNumber,
    /// Required value of topic 0.
    pub topic: B256,
}

impl LogFilter {
    /// A filter scoped to exactly one block.
    pub fn single_block(block: BlockNumber, topic: B256) -> Self {
        Self {
            from_block: block,
            to_block: block,
            topic,
        }
    }

    /// Whether `from_block == to_block`.
    pub fn is_single_block(&self) -> bool {
        self.from_block == self.to_block
    }
}

/// Failure reported by a [`LogSource`].
#[derive(Error, Debug)]
pub enum SourceError {
    /// The source could not be reached or timed out.
    #[error("transport error: {0}")]
    Transport(String),

    /// The source answered with an error.
    #[error("source rejected request (code {code}): {message}")]
    Rejected {
        /// Source-specific error code.
        code: i64,
        /// Human-readable message from the source.
        message: String,
    },

    /// The source answered, but the payload was unusable.
    #[error("malformed response: {0}")]
    Malformed(String),
}

/// A queryable view of the ledger.
#[async_trait]
pub trait LogSource: Send + Sync {
    /// The newest block the source knows about.
    async fn head_block(&self) -> Result<BlockNumber, SourceError>;

    /// Logs matching `filter`, in ledger order.
    async fn logs(&self, filter: &LogFilter) -> Result<Vec<EventLog>, SourceError>;

    /// Human-readable name of this source (e.g. `"json-rpc"`, `"mock"`).
    fn name(&self) -> &str;
}
