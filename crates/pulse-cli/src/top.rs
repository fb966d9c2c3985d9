//! # Top Subcommand
//!
//! Runs one scan-and-rank cycle against the endpoint and prints the
//! leaderboard as pretty JSON. Ctrl-C stops the scan early and prints the
//! partial ranking accumulated so far.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use pulse_core::{config as defaults, parse_topic, ScanConfig, B256, TRANSFER_EVENT_SIGNATURE};
use pulse_scan::{cancel_pair, run_cycle, LogSource, ScanReport};
use serde_json::json;

use crate::rpc::RpcArgs;

/// Arguments for the `pulse top` subcommand.
#[derive(Args, Debug)]
pub struct TopArgs {
    #[command(flatten)]
    pub rpc: RpcArgs,

    /// Concurrent per-block queries.
    #[arg(long, env = "PULSE_WORKERS", default_value_t = defaults::DEFAULT_WORKERS)]
    pub workers: usize,

    /// Block numbers buffered ahead of the workers.
    #[arg(long, env = "PULSE_QUEUE_DEPTH", default_value_t = defaults::DEFAULT_QUEUE_DEPTH)]
    pub queue_depth: usize,

    /// Blocks behind the head to scan (the head itself is always included).
    #[arg(long, env = "PULSE_WINDOW", default_value_t = defaults::DEFAULT_WINDOW_SIZE)]
    pub window: u64,

    /// Leaderboard length.
    #[arg(long = "top", env = "PULSE_TOP_K", default_value_t = defaults::DEFAULT_TOP_K)]
    pub top_k: usize,

    /// Stop after this many seconds and print a partial ranking.
    #[arg(long, env = "PULSE_SCAN_TIMEOUT_SECS")]
    pub timeout_secs: Option<u64>,

    /// Event signature (topic 0) to count.
    #[arg(long, env = "PULSE_EVENT_TOPIC", default_value_t = TRANSFER_EVENT_SIGNATURE, value_parser = parse_topic)]
    pub topic: B256,

    /// Print scan statistics alongside the ranking.
    #[arg(long)]
    pub report: bool,
}

impl TopArgs {
    /// Scan parameters from the flags, validated.
    pub fn scan_config(&self) -> Result<ScanConfig> {
        let config = ScanConfig {
            workers: self.workers,
            queue_depth: self.queue_depth,
            window_size: self.window,
            top_k: self.top_k,
            topic: self.topic,
            timeout: self.timeout_secs.map(Duration::from_secs),
        };
        config.validate().context("invalid scan parameters")?;
        Ok(config)
    }
}

/// Execute the top subcommand.
pub async fn run_top(args: &TopArgs) -> Result<u8> {
    let config = args.scan_config()?;
    let client = args.rpc.client()?;
    let report = scan(Arc::new(client), &config).await?;
    println!("{}", render(&report, args.report)?);
    Ok(0)
}

/// One cycle against `source`, cancelled by Ctrl-C.
pub async fn scan(source: Arc<dyn LogSource>, config: &ScanConfig) -> Result<ScanReport> {
    let (canceller, signal) = cancel_pair();
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupted; finishing blocks in flight");
            canceller.cancel();
        }
    });

    let result = run_cycle(source, config, signal).await;
    interrupt.abort();

    let report = result.context("scan failed")?;
    if report.partial {
        tracing::warn!(
            processed = report.blocks_processed,
            "scan stopped early; ranking is partial"
        );
    }
    Ok(report)
}

/// Pretty JSON for `report`: the bare ranking, or the ranking with scan
/// statistics when `detailed`.
pub fn render(report: &ScanReport, detailed: bool) -> Result<String> {
    let value = if detailed {
        json!({
            "head": report.head.to_string(),
            "from": report.range_start.to_string(),
            "clamped": report.clamped,
            "partial": report.partial,
            "blocks": {
                "enqueued": report.blocks_enqueued,
                "processed": report.blocks_processed,
                "failed": report.blocks_failed,
            },
            "transfers": report.transfers,
            "malformed_logs": report.malformed_logs,
            "participants": report.distinct_participants,
            "elapsed_ms": report.elapsed.as_millis() as u64,
            "ranking": report.ranking,
        })
    } else {
        serde_json::to_value(&report.ranking)?
    };
    Ok(serde_json::to_string_pretty(&value)?)
}
