//! # pulse-scan: Scan-and-Aggregate Pipeline
//!
//! Answers "which participants were most active in the last N blocks?".
//!
//! ## Data Flow
//!
//! ```text
//! head_block() ─► BlockRange ─► bounded mpsc (Q) ─► P workers ─► ActivityLedger
//!                                                    │ logs(block, topic)
//!                                                    ▼
//!                                               LogSource
//! join barrier ─► snapshot ─► rank_top_k ─► ScanReport
//! ```
//!
//! - [`source`]: the consumed ledger interface ([`LogSource`]).
//! - [`extract`]: one block's query and participant extraction.
//! - [`pool`]: the bounded worker pool and its join barrier.
//! - [`cancel`]: deadline / cancellation signal.
//! - [`cycle`]: one complete scan-and-rank cycle.
//! - [`mock`]: in-memory `LogSource` for tests and local runs.
//!
//! A failed block is logged and skipped; it never aborts the cycle. Only a
//! failed head lookup fails a cycle.

pub mod cancel;
pub mod cycle;
pub mod extract;
pub mod mock;
pub mod pool;
pub mod source;

pub use cancel::{cancel_pair, CancelSignal, Canceller};
pub use cycle::{run_cycle, ScanError, ScanReport};
pub use extract::{scan_block, BlockActivity, BlockScanError};
pub use mock::MockLogSource;
pub use pool::{PoolReport, WorkerPool};
pub use source::{LogFilter, LogSource, SourceError};
