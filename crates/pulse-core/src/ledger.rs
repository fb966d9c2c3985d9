//! # Activity Ledger
//!
//! A concurrency-safe counter keyed by [`ParticipantId`]. Workers share one
//! ledger per scan cycle through an `Arc` and increment it concurrently;
//! the cycle reads a [`snapshot`](ActivityLedger::snapshot) only after the
//! worker pool has joined.
//!
//! ## Invariants
//!
//! - Entries are created lazily at 0 and only ever increase.
//! - The sum of all counts equals the number of increments applied.
//!
//! All operations are synchronous. The lock is `parking_lot`, not
//! `tokio::sync`, and is never held across an `.await`.

use std::collections::HashMap;

use parking_lot::Mutex;

use crate::participant::ParticipantId;

/// Mutex-guarded map from participant to activity count.
#[derive(Debug, Default)]
pub struct ActivityLedger {
    counts: Mutex<HashMap<ParticipantId, u64>>,
}

impl ActivityLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one to `id`'s count.
    pub fn increment(&self, id: &ParticipantId) {
        *self.counts.lock().entry(*id).or_insert(0) += 1;
    }

    /// Credit both sides of a transfer under a single lock acquisition.
    ///
    /// A self-transfer (`from == to`) counts twice, once per side.
    pub fn record_transfer(&self, from: &ParticipantId, to: &ParticipantId) {
        let mut counts = self.counts.lock();
        *counts.entry(*from).or_insert(0) += 1;
        *counts.entry(*to).or_insert(0) += 1;
    }

    /// Copy of the current counts.
    ///
    /// Consistent once no more increments are in flight.
    pub fn snapshot(&self) -> HashMap<ParticipantId, u64> {
        self.counts.lock().clone()
    }

    /// Count for a single participant (0 when absent).
    pub fn get(&self, id: &ParticipantId) -> u64 {
        self.counts.lock().get(id).copied().unwrap_or(0)
    }

    /// Sum of all counts.
    pub fn total(&self) -> u64 {
        self.counts.lock().values().sum()
    }

    /// Number of distinct participants seen.
    pub fn len(&self) -> usize {
        self.counts.lock().len()
    }

    /// Whether no increment has been applied yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Consume the ledger and return its counts without copying.
    pub fn into_counts(self) -> HashMap<ParticipantId, u64> {
        self.counts.into_inner()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::Address;
    use std::sync::Arc;

    fn participant(byte: u8) -> ParticipantId {
        ParticipantId::new(Address::repeat_byte(byte))
    }

    #[test]
    fn new_ledger_is_empty() {
        let ledger = ActivityLedger::new();
        assert!(ledger.is_empty());
        assert_eq!(ledger.total(), 0);
        assert_eq!(ledger.get(&participant(1)), 0);
    }

    #[test]
    fn increment_creates_entry_lazily() {
        let ledger = ActivityLedger::new();
        ledger.increment(&participant(1));
        ledger.increment(&participant(1));
        ledger.increment(&participant(2));
        assert_eq!(ledger.get(&participant(1)), 2);
        assert_eq!(ledger.get(&participant(2)), 1);
        assert_eq!(ledger.len(), 2);
        assert_eq!(ledger.total(), 3);
    }

    #[test]
    fn record_transfer_credits_both_sides() {
        let ledger = ActivityLedger::new();
        ledger.record_transfer(&participant(1), &participant(2));
        assert_eq!(ledger.get(&participant(1)), 1);
        assert_eq!(ledger.get(&participant(2)), 1);
    }

    #[test]
    fn self_transfer_counts_twice() {
        let ledger = ActivityLedger::new();
        ledger.record_transfer(&participant(7), &participant(7));
        assert_eq!(ledger.get(&participant(7)), 2);
        assert_eq!(ledger.total(), 2);
    }

    #[test]
    fn snapshot_is_detached_from_ledger() {
        let ledger = ActivityLedger::new();
        ledger.increment(&participant(1));
        let snap = ledger.snapshot();
        ledger.increment(&participant(1));
        assert_eq!(snap[&participant(1)], 1);
        assert_eq!(ledger.get(&participant(1)), 2);
    }

    #[test]
    fn concurrent_increments_are_not_lost() {
        const THREADS: usize = 16;
        const PER_THREAD: u64 = 5_000;
        let keys = [participant(1), participant(2), participant(3)];
        let ledger = Arc::new(ActivityLedger::new());

        let handles: Vec<_> = (0..THREADS)
            .map(|t| {
                let ledger = Arc::clone(&ledger);
                std::thread::spawn(move || {
                    for i in 0..PER_THREAD {
                        let key = keys[(t + i as usize) % keys.len()];
                        ledger.increment(&key);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let mut expected = HashMap::new();
        for t in 0..THREADS {
            for i in 0..PER_THREAD {
                *expected.entry(keys[(t + i as usize) % keys.len()]).or_insert(0u64) += 1;
            }
        }
        assert_eq!(ledger.snapshot(), expected);
        assert_eq!(ledger.total(), THREADS as u64 * PER_THREAD);
    }

    #[test]
    fn concurrent_transfers_preserve_sum() {
        let ledger = Arc::new(ActivityLedger::new());
        let handles: Vec<_> = (0..8u8)
            .map(|t| {
                let ledger = Arc::clone(&ledger);
                std::thread::spawn(move || {
                    for _ in 0..1_000 {
                        ledger.record_transfer(&participant(t % 2), &participant(9));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(ledger.total(), 16_000);
        assert_eq!(ledger.get(&participant(9)), 8_000);
        assert_eq!(ledger.get(&participant(0)), 4_000);
        assert_eq!(ledger.get(&participant(1)), 4_000);
    }

    #[test]
    fn into_counts_returns_all_entries() {
        let ledger = ActivityLedger::new();
        ledger.record_transfer(&participant(1), &participant(2));
        let counts = ledger.into_counts();
        assert_eq!(counts.len(), 2);
    }
}
