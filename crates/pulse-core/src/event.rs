//! # Event Logs
//!
//! An `EventLog` is one log entry returned by the ledger for a block. Only
//! `topics` drives aggregation; the remaining fields are carried for
//! diagnostics.

use alloy_primitives::{b256, Address, B256, U256};
use serde::{Deserialize, Serialize};

use crate::block::BlockNumber;
use crate::participant::ParticipantId;

/// `keccak256("Transfer(address,address,uint256)")`, the ERC-20 transfer
/// event signature.
pub const TRANSFER_EVENT_SIGNATURE: B256 =
    b256!("ddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef");

/// A log emitted while executing a block.
///
/// Field names follow the `eth_getLogs` response schema. Unknown fields in
/// upstream responses are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventLog {
    /// Contract that emitted the log.
    #[serde(default)]
    pub address: Option<Address>,
    /// Topic 0 is the event signature; the rest are indexed parameters.
    #[serde(default)]
    pub topics: Vec<B256>,
    #[serde(default)]
    pub block_number: Option<BlockNumber>,
    #[serde(default)]
    pub transaction_hash: Option<B256>,
    /// Position of the log within its block.
    #[serde(default)]
    pub log_index: Option<U256>,
}

impl EventLog {
    /// A log carrying only topics, as used by test fixtures.
    pub fn with_topics(topics: Vec<B256>) -> Self {
        Self {
            address: None,
            topics,
            block_number: None,
            transaction_hash: None,
            log_index: None,
        }
    }

    /// Build a `Transfer(from, to, _)` log.
    pub fn transfer(from: ParticipantId, to: ParticipantId) -> Self {
        Self::with_topics(vec![
            TRANSFER_EVENT_SIGNATURE,
            from.address().into_word(),
            to.address().into_word(),
        ])
    }

    /// The (from, to) participants of a transfer-shaped log.
    ///
    /// Returns `None` when fewer than three topics are present.
    pub fn sender_and_receiver(&self) -> Option<(ParticipantId, ParticipantId)> {
        match self.topics.as_slice() {
            [_, from, to, ..] => Some((
                ParticipantId::from_topic(*from),
                ParticipantId::from_topic(*to),
            )),
            _ => None,
        }
    }
}
