//! # Error Types
//!
//! Validation failures raised while constructing core values from untrusted
//! text or configuration. All errors use `thiserror`.

use thiserror::Error;

/// A value could not be accepted into the core data model.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A JSON-RPC hex quantity (e.g. `"0x3e8"`) was malformed.
    #[error("invalid hex quantity {value:?}: {reason}")]
    InvalidQuantity {
        /// The rejected input.
        value: String,
        /// Why it was rejected.
        reason: String,
    },

    /// An address string was not 20 bytes of hex.
    #[error("invalid address {value:?}: {reason}")]
    InvalidAddress {
        /// The rejected input.
        value: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A 32-byte topic hash was malformed.
    #[error("invalid topic {value:?}: {reason}")]
    InvalidTopic {
        /// The rejected input.
        value: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A scan parameter was out of range.
    #[error("invalid scan config: {field} {reason}")]
    InvalidConfig {
        /// The offending parameter.
        field: &'static str,
        /// Why it was rejected.
        reason: String,
    },
}
