//! JSON-RPC client error types.

use pulse_core::ValidationError;
use pulse_scan::SourceError;

/// Errors from JSON-RPC calls.
#[derive(Debug, thiserror::Error)]
pub enum RpcError {
    /// HTTP transport error (connect, timeout, TLS).
    #[error("HTTP error calling {method}: {source}")]
    Http {
        method: &'static str,
        source: reqwest::Error,
    },
    /// The endpoint returned a non-2xx status.
    #[error("{method} returned HTTP {status}: {body}")]
    Status {
        method: &'static str,
        status: u16,
        body: String,
    },
    /// The endpoint returned a JSON-RPC error object.
    #[error("{method} failed with JSON-RPC error {code}: {message}")]
    Rpc {
        method: &'static str,
        code: i64,
        message: String,
    },
    /// Response body was not a JSON-RPC envelope of the expected shape.
    #[error("failed to deserialize response from {method}: {source}")]
    Deserialization {
        method: &'static str,
        source: reqwest::Error,
    },
    /// The envelope carried neither `result` nor `error`.
    #[error("{method} response carried no result")]
    MissingResult { method: &'static str },
    /// A hex quantity in the response was malformed.
    #[error("invalid quantity in response: {0}")]
    InvalidQuantity(#[from] ValidationError),
}

impl From<RpcError> for SourceError {
    fn from(err: RpcError) -> Self {
        match err {
            RpcError::Http { .. } => SourceError::Transport(err.to_string()),
            RpcError::Status { status, body, .. } => SourceError::Rejected {
                code: i64::from(status),
                message: body,
            },
            RpcError::Rpc { code, message, .. } => SourceError::Rejected { code, message },
            RpcError::Deserialization { .. }
            | RpcError::MissingResult { .. }
            | RpcError::InvalidQuantity(_) => SourceError::Malformed(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rpc_error_maps_to_rejected() {
        let err = RpcError::Rpc {
            method: "eth_getLogs",
            code: -32005,
            message: "query returned more than 10000 results".into(),
        };
        match SourceError::from(err) {
            SourceError::Rejected { code, message } => {
                assert_eq!(code, -32005);
                assert!(message.contains("10000"));
            }
            other => panic!("expected Rejected, got {other:?}"),
        }
    }

    #[test]
    fn status_maps_to_rejected_with_http_code() {
        let err = RpcError::Status {
            method: "eth_blockNumber",
            status: 429,
            body: "Too Many Requests".into(),
        };
        assert!(matches!(
            SourceError::from(err),
            SourceError::Rejected { code: 429, .. }
        ));
    }

    #[test]
    fn missing_result_maps_to_malformed() {
        let err = RpcError::MissingResult {
            method: "eth_blockNumber",
        };
        assert!(matches!(SourceError::from(err), SourceError::Malformed(_)));
    }

    #[test]
    fn invalid_quantity_maps_to_malformed() {
        let err = RpcError::from(pulse_core::BlockNumber::from_quantity("0xzz").unwrap_err());
        match SourceError::from(err) {
            SourceError::Malformed(message) => assert!(message.contains("invalid quantity")),
            other => panic!("expected Malformed, got {other:?}"),
        }
    }
}
