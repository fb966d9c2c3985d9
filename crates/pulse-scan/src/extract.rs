//! # Per-Block Query and Extraction
//!
//! Queries one block for the configured event signature and turns each
//! returned log into a (sender, receiver) pair. Logs with fewer than three
//! topics cannot carry both participants; they are skipped and counted.

use pulse_core::{ActivityLedger, BlockNumber, ParticipantId, B256};
use thiserror::Error;

use crate::source::{LogFilter, LogSource, SourceError};

/// Everything extracted from one block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockActivity {
    /// (from, to) per well-formed log, in log order.
    pub transfers: Vec<(ParticipantId, ParticipantId)>,
    /// Logs skipped for having fewer than three topics.
    pub malformed: u64,
}

impl BlockActivity {
    /// Credit every extracted transfer to `ledger`.
    pub fn apply(&self, ledger: &ActivityLedger) {
        for (from, to) in &self.transfers {
            ledger.record_transfer(from, to);
        }
    }
}

/// A single block could not be scanned.
#[derive(Error, Debug)]
pub enum BlockScanError {
    #[error("log query for block {block} failed: {source}")]
    Query {
        block: BlockNumber,
        #[source]
        source: SourceError,
    },
}

/// Fetch and extract the logs of exactly one block.
pub async fn scan_block(
    source: &dyn LogSource,
    block: BlockNumber,
    topic: B256,
) -> Result<BlockActivity, BlockScanError> {
    let filter = LogFilter::single_block(block, topic);
    let logs = source
        .logs(&filter)
        .await
        .map_err(|source| BlockScanError::Query { block, source })?;

    let mut activity = BlockActivity {
        transfers: Vec::with_capacity(logs.len()),
        malformed: 0,
    };
    for log in &logs {
        match log.sender_and_receiver() {
            Some(pair) => activity.transfers.push(pair),
            None => {
                activity.malformed += 1;
                tracing::debug!(
                    block = %block,
                    topics = log.topics.len(),
                    tx = ?log.transaction_hash,
                    "skipping log with fewer than 3 topics"
                );
            }
        }
    }
    Ok(activity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockLogSource;
    use pulse_core::{Address, EventLog, TRANSFER_EVENT_SIGNATURE};

    fn participant(byte: u8) -> ParticipantId {
        ParticipantId::new(Address::repeat_byte(byte))
    }

    #[tokio::test]
    async fn extracts_sender_and_receiver() {
        let source = MockLogSource::new(BlockNumber::from(10)).with_logs(
            BlockNumber::from(10),
            vec![
                EventLog::transfer(participant(1), participant(2)),
                EventLog::transfer(participant(3), participant(1)),
            ],
        );
        let activity = scan_block(&source, BlockNumber::from(10), TRANSFER_EVENT_SIGNATURE)
            .await
            .unwrap();
        assert_eq!(
            activity.transfers,
            vec![
                (participant(1), participant(2)),
                (participant(3), participant(1))
            ]
        );
        assert_eq!(activity.malformed, 0);
    }

    #[tokio::test]
    async fn queries_exactly_one_block_with_topic() {
        let source = MockLogSource::new(BlockNumber::from(10));
        scan_block(&source, BlockNumber::from(7), TRANSFER_EVENT_SIGNATURE)
            .await
            .unwrap();
        let filters = source.filters();
        assert_eq!(filters.len(), 1);
        assert_eq!(filters[0].from_block, BlockNumber::from(7));
        assert_eq!(filters[0].to_block, BlockNumber::from(7));
        assert_eq!(filters[0].topic, TRANSFER_EVENT_SIGNATURE);
    }

    #[tokio::test]
    async fn short_logs_are_skipped_not_fatal() {
        let source = MockLogSource::new(BlockNumber::from(10)).with_logs(
            BlockNumber::from(10),
            vec![
                EventLog::with_topics(vec![TRANSFER_EVENT_SIGNATURE]),
                EventLog::transfer(participant(1), participant(2)),
                EventLog::with_topics(vec![]),
            ],
        );
        let activity = scan_block(&source, BlockNumber::from(10), TRANSFER_EVENT_SIGNATURE)
            .await
            .unwrap();
        assert_eq!(activity.transfers.len(), 1);
        assert_eq!(activity.malformed, 2);
    }

    #[tokio::test]
    async fn source_failure_is_reported_with_block() {
        let source = MockLogSource::new(BlockNumber::from(10)).with_failure(BlockNumber::from(9));
        let err = scan_block(&source, BlockNumber::from(9), TRANSFER_EVENT_SIGNATURE)
            .await
            .unwrap_err();
        let BlockScanError::Query { block, .. } = err;
        assert_eq!(block, BlockNumber::from(9));
    }

    #[test]
    fn apply_credits_both_sides() {
        let ledger = ActivityLedger::new();
        let activity = BlockActivity {
            transfers: vec![(participant(1), participant(2)), (participant(1), participant(3))],
            malformed: 0,
        };
        activity.apply(&ledger);
        assert_eq!(ledger.get(&participant(1)), 2);
        assert_eq!(ledger.total(), 4);
    }
}
