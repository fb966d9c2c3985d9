//! # Head Subcommand
//!
//! Prints the current head block in decimal, which doubles as a
//! connectivity check for the configured endpoint.

use anyhow::{Context, Result};
use clap::Args;

use crate::rpc::RpcArgs;

/// Arguments for the `pulse head` subcommand.
#[derive(Args, Debug)]
pub struct HeadArgs {
    #[command(flatten)]
    pub rpc: RpcArgs,

    /// Print the JSON-RPC hex quantity instead of decimal.
    #[arg(long)]
    pub hex: bool,
}

/// Execute the head subcommand.
pub async fn run_head(args: &HeadArgs) -> Result<u8> {
    let client = args.rpc.client()?;
    let head = client
        .block_number()
        .await
        .context("head block lookup failed")?;
    if args.hex {
        println!("{}", head.to_quantity());
    } else {
        println!("{head}");
    }
    Ok(0)
}
