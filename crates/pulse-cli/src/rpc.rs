//! Endpoint arguments shared by every subcommand.

use anyhow::{Context, Result};
use clap::Args;
use pulse_rpc::{RpcClient, RpcConfig};

/// JSON-RPC endpoint selection.
#[derive(Args, Debug, Clone)]
pub struct RpcArgs {
    /// JSON-RPC endpoint URL.
    #[arg(long, env = "ETH_RPC_URL", hide_env_values = true)]
    pub rpc_url: String,

    /// Per-request timeout in seconds.
    #[arg(long, env = "ETH_RPC_TIMEOUT_SECS", default_value_t = pulse_rpc::config::DEFAULT_TIMEOUT_SECS)]
    pub rpc_timeout_secs: u64,
}

impl RpcArgs {
    /// Build a client for the selected endpoint.
    pub fn client(&self) -> Result<RpcClient> {
        let mut config = RpcConfig::new(&self.rpc_url).context("invalid --rpc-url")?;
        config.timeout_secs = self.rpc_timeout_secs;
        tracing::debug!(endpoint = %config.redacted_url(), timeout_secs = config.timeout_secs, "using RPC endpoint");
        RpcClient::new(config).context("failed to build RPC client")
    }
}
