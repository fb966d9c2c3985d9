//! # HTTP Middleware
//!
//! - `metrics`: Prometheus request counters and latency histogram.

pub mod metrics;
