//! # Top-K Ranking
//!
//! Materializes a ledger snapshot into a deterministic leaderboard.
//!
//! Order: score descending, then address ascending. The address tie-break
//! keeps output reproducible across runs regardless of hash-map iteration
//! order or worker scheduling.

use std::cmp::Ordering;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::participant::ParticipantId;

/// One row of the leaderboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedEntry {
    pub address: ParticipantId,
    pub score: u64,
}

impl RankedEntry {
    fn rank_order(a: &Self, b: &Self) -> Ordering {
        b.score
            .cmp(&a.score)
            .then_with(|| a.address.cmp(&b.address))
    }
}

/// The `k` most active participants, highest score first.
///
/// Returns `min(k, snapshot.len())` entries.
pub fn rank_top_k(snapshot: &HashMap<ParticipantId, u64>, k: usize) -> Vec<RankedEntry> {
    if k == 0 {
        return Vec::new();
    }
    let mut entries: Vec<RankedEntry> = snapshot
        .iter()
        .map(|(address, score)| RankedEntry {
            address: *address,
            score: *score,
        })
        .collect();

    // Partition first so large snapshots only fully sort the survivors.
    if entries.len() > k {
        entries.select_nth_unstable_by(k - 1, RankedEntry::rank_order);
        entries.truncate(k);
    }
    entries.sort_unstable_by(RankedEntry::rank_order);
    entries
}
