//! Typed JSON-RPC client.
//!
//! Every call is one HTTP POST carrying a JSON-RPC 2.0 envelope. Request IDs
//! come from a counter shared by clones of the client.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use pulse_core::{BlockNumber, EventLog, B256};
use pulse_scan::{LogFilter, LogSource, SourceError};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::RpcConfig;
use crate::error::RpcError;

const ETH_BLOCK_NUMBER: &str = "eth_blockNumber";
const ETH_GET_LOGS: &str = "eth_getLogs";

/// Client for an Ethereum JSON-RPC endpoint.
#[derive(Debug, Clone)]
pub struct RpcClient {
    http: reqwest::Client,
    endpoint: Url,
    next_id: Arc<AtomicU64>,
}

#[derive(Serialize)]
struct Request<'a, P> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: P,
}

#[derive(Deserialize)]
struct Response<R> {
    result: Option<R>,
    #[serde(default)]
    error: Option<ErrorObject>,
}

#[derive(Deserialize)]
struct ErrorObject {
    code: i64,
    message: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GetLogsParams {
    from_block: String,
    to_block: String,
    topics: [[B256; 1]; 1],
}

impl RpcClient {
    /// Create a new client from configuration.
    pub fn new(config: RpcConfig) -> Result<Self, RpcError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| RpcError::Http {
                method: "client_init",
                source: e,
            })?;
        tracing::debug!(endpoint = %config.redacted_url(), "JSON-RPC client created");
        Ok(Self {
            http,
            endpoint: config.url,
            next_id: Arc::new(AtomicU64::new(1)),
        })
    }

    /// Current head block (`eth_blockNumber`).
    pub async fn block_number(&self) -> Result<BlockNumber, RpcError> {
        let quantity: String = self.call(ETH_BLOCK_NUMBER, [(); 0]).await?;
        Ok(BlockNumber::from_quantity(&quantity)?)
    }

    /// Logs matching `filter` (`eth_getLogs`).
    ///
    /// The event signature is sent as the sole alternative for topic 0.
    pub async fn get_logs(&self, filter: &LogFilter) -> Result<Vec<EventLog>, RpcError> {
        let params = GetLogsParams {
            from_block: filter.from_block.to_quantity(),
            to_block: filter.to_block.to_quantity(),
            topics: [[filter.topic]],
        };
        self.call(ETH_GET_LOGS, [params]).await
    }

    async fn call<P, R>(&self, method: &'static str, params: P) -> Result<R, RpcError>
    where
        P: Serialize,
        R: DeserializeOwned,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let request = Request {
            jsonrpc: "2.0",
            id,
            method,
            params,
        };
        tracing::trace!(method, id, "JSON-RPC request");

        let resp = self
            .http
            .post(self.endpoint.clone())
            .json(&request)
            .send()
            .await
            .map_err(|e| RpcError::Http { method, source: e })?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(RpcError::Status {
                method,
                status,
                body,
            });
        }

        let envelope: Response<R> = resp
            .json()
            .await
            .map_err(|e| RpcError::Deserialization { method, source: e })?;

        if let Some(err) = envelope.error {
            return Err(RpcError::Rpc {
                method,
                code: err.code,
                message: err.message,
            });
        }
        envelope.result.ok_or(RpcError::MissingResult { method })
    }
}

#[async_trait]
impl LogSource for RpcClient {
    async fn head_block(&self) -> Result<BlockNumber, SourceError> {
        Ok(self.block_number().await?)
    }

    async fn logs(&self, filter: &LogFilter) -> Result<Vec<EventLog>, SourceError> {
        Ok(self.get_logs(filter).await?)
    }

    fn name(&self) -> &str {
        "json-rpc"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pulse_core::TRANSFER_EVENT_SIGNATURE;

    #[test]
    fn get_logs_params_use_hex_quantities_and_nested_topic() {
        let filter = LogFilter::single_block(BlockNumber::from(255), TRANSFER_EVENT_SIGNATURE);
        let params = GetLogsParams {
            from_block: filter.from_block.to_quantity(),
            to_block: filter.to_block.to_quantity(),
            topics: [[filter.topic]],
        };
        let json = serde_json::to_value(params).unwrap();
        assert_eq!(json["fromBlock"], "0xff");
        assert_eq!(json["toBlock"], "0xff");
        assert_eq!(
            json["topics"][0][0],
            "0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef"
        );
    }

    #[test]
    fn envelope_without_result_or_error_deserializes() {
        let envelope: Response<String> =
            serde_json::from_str(r#"{"jsonrpc":"2.0","id":1}"#).unwrap();
        assert!(envelope.result.is_none());
        assert!(envelope.error.is_none());
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct Quantity(String);

    #[test]
    fn envelope_decodes_result_types_without_default() {
        let envelope: Response<Quantity> =
            serde_json::from_str(r#"{"jsonrpc":"2.0","id":1,"result":"0x10"}"#).unwrap();
        assert_eq!(envelope.result, Some(Quantity("0x10".into())));

        let missing: Response<Quantity> =
            serde_json::from_str(r#"{"jsonrpc":"2.0","id":2}"#).unwrap();
        assert!(missing.result.is_none());
    }

    #[test]
    fn empty_params_serialize_as_empty_array() {
        let request = Request {
            jsonrpc: "2.0",
            id: 7,
            method: ETH_BLOCK_NUMBER,
            params: [(); 0],
        };
        let json = serde_json::to_value(request).unwrap();
        assert_eq!(json["params"], serde_json::json!([]));
        assert_eq!(json["id"], 7);
    }
}
