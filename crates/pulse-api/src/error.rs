//! # API Error Types
//!
//! [`AppError`] is the request-level error, rendered as a JSON body with a
//! machine-readable code. Internal details are logged, never returned.
//!
//! [`StartupError`] covers everything that stops the process from serving:
//! bad configuration, an unreachable data source, a port already in use.

use std::net::SocketAddr;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use pulse_scan::ScanError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured JSON error response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

/// Inner error detail.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g. "INTERNAL_ERROR").
    pub code: String,
    /// Human-readable error message.
    pub message: String,
}

/// Application-level error type that implements [`IntoResponse`] for Axum.
#[derive(Error, Debug)]
pub enum AppError {
    /// Internal server error (500). Message is logged but not returned to client.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Return the HTTP status code and machine-readable error code for this error.
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        // Never expose internal error messages to clients.
        let message = match &self {
            Self::Internal(_) => "An internal error occurred".to_string(),
        };
        tracing::error!(error = %self, "internal server error");

        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message,
            },
        };

        (status, Json(body)).into_response()
    }
}

/// Every failed cycle is a 500: the head lookup is the only failure a
/// caller can observe, and it carries no detail worth exposing.
impl From<ScanError> for AppError {
    fn from(err: ScanError) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Fatal errors raised before the server accepts connections.
#[derive(Error, Debug)]
pub enum StartupError {
    #[error("configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    #[error("RPC configuration error: {0}")]
    RpcConfig(#[from] pulse_rpc::ConfigError),

    #[error("failed to build RPC client: {0}")]
    RpcClient(#[source] pulse_rpc::RpcError),

    #[error("ledger source unreachable: {0}")]
    SourceUnreachable(#[source] pulse_rpc::RpcError),

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),
}
