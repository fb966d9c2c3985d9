//! # pulse-rpc: Ethereum JSON-RPC Log Source
//!
//! Typed client for the two JSON-RPC methods the scan pipeline needs:
//!
//! | Method            | Used for                                   |
//! |-------------------|--------------------------------------------|
//! | `eth_blockNumber` | Head block lookup (upper bound of window)  |
//! | `eth_getLogs`     | Logs of one block for one event signature  |
//!
//! [`RpcClient`] implements [`pulse_scan::LogSource`], so the API server and
//! CLI hand it to the pipeline as an `Arc<dyn LogSource>`.
//!
//! No retries are attempted: a failed block is skipped by the pipeline, and
//! a failed head lookup is reported to the caller.

pub mod client;
pub mod config;
pub mod error;

pub use client::RpcClient;
pub use config::{ConfigError, RpcConfig};
pub use error::RpcError;
