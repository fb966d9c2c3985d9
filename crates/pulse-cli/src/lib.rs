//! # pulse-cli: Command-Line Tool for ledger-pulse
//!
//! Provides the `pulse` binary for ad-hoc scans without running the HTTP
//! service.
//!
//! ## Subcommands
//!
//! - `pulse top`: Scan the most recent blocks and print the leaderboard.
//! - `pulse head`: Print the current head block.
//!
//! ```bash
//! ETH_RPC_URL=https://rpc.example.org pulse top --window 50 --top 10
//! pulse -v top --rpc-url http://127.0.0.1:8545 --report
//! ```

pub mod head;
pub mod rpc;
pub mod top;
