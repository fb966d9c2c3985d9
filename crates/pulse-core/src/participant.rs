//! # Participant Identifiers
//!
//! The aggregation key for activity counting. A `ParticipantId` holds the
//! raw 20-byte address, never a string, so normalization happens once at
//! extraction and any two spellings of one address compare equal.
//!
//! Indexed `address` parameters of an event are left-padded to 32 bytes
//! in the topic; [`ParticipantId::from_topic`] keeps the low 20 bytes.

use std::fmt;
use std::str::FromStr;

use alloy_primitives::{Address, B256};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ValidationError;

/// Canonical identifier of an account or contract.
///
/// Ordering is by address bytes, which matches ordering of the lowercase
/// hex rendering. Text output is the EIP-55 checksum form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ParticipantId(Address);

impl ParticipantId {
    /// Wrap an address.
    pub const fn new(address: Address) -> Self {
        Self(address)
    }

    /// Extract the participant encoded in an indexed topic.
    pub fn from_topic(topic: B256) -> Self {
        Self(Address::from_word(topic))
    }

    /// Parse a `0x`-prefixed, 40-hex-digit address in any letter case.
    ///
    /// Mixed-case input is not checksum-verified; the ledger is trusted.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        Address::from_str(raw.trim())
            .map(Self)
            .map_err(|e| ValidationError::InvalidAddress {
                value: raw.to_string(),
                reason: e.to_string(),
            })
    }

    /// Access the underlying address.
    pub fn address(&self) -> &Address {
        &self.0
    }

    /// EIP-55 checksummed rendering.
    pub fn to_checksum(&self) -> String {
        self.0.to_checksum(None)
    }
}

impl From<Address> for ParticipantId {
    fn from(address: Address) -> Self {
        Self(address)
    }
}

impl FromStr for ParticipantId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_checksum())
    }
}

impl Serialize for ParticipantId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_checksum())
    }
}

impl<'de> Deserialize<'de> for ParticipantId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}
