//! # pulse-core: Foundational Types for ledger-pulse
//!
//! This crate defines the data model shared by every other crate in the
//! workspace: how blocks are numbered, how a scan window is enumerated,
//! how participants are identified, and how their activity is tallied and
//! ranked. It performs no I/O and depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Exact block arithmetic.** `BlockNumber` wraps a 256-bit unsigned
//!    integer. Window arithmetic never wraps; underflow below genesis is
//!    clamped and reported.
//!
//! 2. **Normalize on extraction.** `ParticipantId` wraps the fixed 20-byte
//!    address, so two textual encodings of the same address are the same key
//!    by construction. Text is produced only at the edge, in EIP-55 form.
//!
//! 3. **One ledger per cycle.** `ActivityLedger` is a plain value that callers
//!    construct per scan and share by `Arc`. There is no global counter map.
//!
//! 4. **Deterministic ranking.** Equal scores are ordered by address.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `pulse-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod block;
pub mod config;
pub mod error;
pub mod event;
pub mod ledger;
pub mod participant;
pub mod rank;

// Re-export primary types for ergonomic imports.
pub use block::{BlockNumber, BlockRange};
pub use config::{parse_topic, ScanConfig};
pub use error::ValidationError;
pub use event::{EventLog, TRANSFER_EVENT_SIGNATURE};
pub use ledger::ActivityLedger;
pub use participant::ParticipantId;
pub use rank::{rank_top_k, RankedEntry};

pub use alloy_primitives::{Address, B256, U256};
