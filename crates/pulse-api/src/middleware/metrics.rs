//! # Prometheus Metrics
//!
//! HTTP-level metrics (request counts, latency, errors) are recorded in
//! middleware. Scan metrics are recorded by the `/top` handler once per
//! cycle.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::{MatchedPath, Request};
use axum::middleware::Next;
use axum::response::Response;
use prometheus::core::Collector;
use prometheus::{
    Encoder, Histogram, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry,
    TextEncoder,
};
use pulse_scan::ScanReport;

/// Outcome label for `pulse_scan_cycles_total`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    Complete,
    Partial,
    Failed,
}

impl CycleOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Complete => "complete",
            Self::Partial => "partial",
            Self::Failed => "failed",
        }
    }
}

/// Shared metrics state backed by a Prometheus registry.
#[derive(Clone)]
pub struct ApiMetrics {
    inner: Arc<Inner>,
}

struct Inner {
    registry: Registry,

    http_requests_total: IntCounterVec,
    http_request_duration_seconds: HistogramVec,
    http_errors_total: IntCounterVec,

    scan_cycles_total: IntCounterVec,
    blocks_scanned_total: IntCounter,
    block_failures_total: IntCounter,
    scan_duration_seconds: Histogram,
}

impl std::fmt::Debug for ApiMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiMetrics")
            .field("requests", &self.requests())
            .field("errors", &self.errors())
            .field("blocks_scanned", &self.blocks_scanned())
            .finish()
    }
}

impl ApiMetrics {
    /// Create a new metrics instance with a fresh Prometheus registry.
    pub fn new() -> Self {
        let registry = Registry::new();

        let http_requests_total = IntCounterVec::new(
            Opts::new("pulse_http_requests_total", "Total HTTP requests"),
            &["method", "path", "status"],
        )
        .expect("metric can be created");

        let http_request_duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                "pulse_http_request_duration_seconds",
                "HTTP request duration in seconds",
            )
            .buckets(vec![
                0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0,
            ]),
            &["method", "path"],
        )
        .expect("metric can be created");

        let http_errors_total = IntCounterVec::new(
            Opts::new("pulse_http_errors_total", "Total HTTP errors (4xx and 5xx)"),
            &["method", "path", "status"],
        )
        .expect("metric can be created");

        let scan_cycles_total = IntCounterVec::new(
            Opts::new("pulse_scan_cycles_total", "Scan cycles by outcome"),
            &["outcome"],
        )
        .expect("metric can be created");

        let blocks_scanned_total = IntCounter::new(
            "pulse_blocks_scanned_total",
            "Blocks processed by scan workers, including failed ones",
        )
        .expect("metric can be created");

        let block_failures_total = IntCounter::new(
            "pulse_block_failures_total",
            "Blocks skipped because their log query failed",
        )
        .expect("metric can be created");

        let scan_duration_seconds = Histogram::with_opts(
            HistogramOpts::new("pulse_scan_duration_seconds", "Scan cycle duration in seconds")
                .buckets(vec![0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 120.0]),
        )
        .expect("metric can be created");

        registry
            .register(Box::new(http_requests_total.clone()))
            .expect("metric can be registered");
        registry
            .register(Box::new(http_request_duration_seconds.clone()))
            .expect("metric can be registered");
        registry
            .register(Box::new(http_errors_total.clone()))
            .expect("metric can be registered");
        registry
            .register(Box::new(scan_cycles_total.clone()))
            .expect("metric can be registered");
        registry
            .register(Box::new(blocks_scanned_total.clone()))
            .expect("metric can be registered");
        registry
            .register(Box::new(block_failures_total.clone()))
            .expect("metric can be registered");
        registry
            .register(Box::new(scan_duration_seconds.clone()))
            .expect("metric can be registered");

        Self {
            inner: Arc::new(Inner {
                registry,
                http_requests_total,
                http_request_duration_seconds,
                http_errors_total,
                scan_cycles_total,
                blocks_scanned_total,
                block_failures_total,
                scan_duration_seconds,
            }),
        }
    }

    /// Total request count (sum across all labels).
    pub fn requests(&self) -> u64 {
        sum_counters(&self.inner.http_requests_total)
    }

    /// Total error count (sum across all labels).
    pub fn errors(&self) -> u64 {
        sum_counters(&self.inner.http_errors_total)
    }

    /// Cycles recorded with `outcome`.
    pub fn cycles(&self, outcome: CycleOutcome) -> u64 {
        self.inner
            .scan_cycles_total
            .with_label_values(&[outcome.as_str()])
            .get()
    }

    pub fn blocks_scanned(&self) -> u64 {
        self.inner.blocks_scanned_total.get()
    }

    pub fn block_failures(&self) -> u64 {
        self.inner.block_failures_total.get()
    }

    /// Record a cycle that produced a ranking.
    pub fn record_cycle(&self, report: &ScanReport) {
        let outcome = if report.partial {
            CycleOutcome::Partial
        } else {
            CycleOutcome::Complete
        };
        self.inner
            .scan_cycles_total
            .with_label_values(&[outcome.as_str()])
            .inc();
        self.inner
            .blocks_scanned_total
            .inc_by(report.blocks_processed);
        self.inner
            .block_failures_total
            .inc_by(report.blocks_failed);
        self.inner
            .scan_duration_seconds
            .observe(report.elapsed.as_secs_f64());
    }

    /// Record a cycle that failed before producing a ranking.
    pub fn record_cycle_failure(&self, elapsed: Duration) {
        self.inner
            .scan_cycles_total
            .with_label_values(&[CycleOutcome::Failed.as_str()])
            .inc();
        self.inner
            .scan_duration_seconds
            .observe(elapsed.as_secs_f64());
    }

    /// Record an HTTP request (called by the middleware).
    fn record_request(&self, method: &str, path: &str, status: u16, duration_secs: f64) {
        let status_str = status.to_string();
        self.inner
            .http_requests_total
            .with_label_values(&[method, path, &status_str])
            .inc();

        self.inner
            .http_request_duration_seconds
            .with_label_values(&[method, path])
            .observe(duration_secs);

        if status >= 400 {
            self.inner
                .http_errors_total
                .with_label_values(&[method, path, &status_str])
                .inc();
        }
    }

    /// Gather all metrics and encode to Prometheus text format.
    pub fn gather_and_encode(&self) -> Result<String, String> {
        let encoder = TextEncoder::new();
        let metric_families = self.inner.registry.gather();
        let mut buffer = Vec::new();
        encoder
            .encode(&metric_families, &mut buffer)
            .map_err(|e| format!("failed to encode metrics: {e}"))?;
        String::from_utf8(buffer).map_err(|e| format!("metrics encoding produced invalid UTF-8: {e}"))
    }
}

impl Default for ApiMetrics {
    fn default() -> Self {
        Self::new()
    }
}

fn sum_counters(vec: &IntCounterVec) -> u64 {
    let mut total = 0u64;
    for mf in &vec.collect() {
        for m in mf.get_metric() {
            total += m.get_counter().get_value() as u64;
        }
    }
    total
}

/// Middleware that records HTTP request metrics via Prometheus.
///
/// Paths are labelled by their route template; unrouted requests share one
/// label so scanners probing random URLs cannot grow the label set.
pub async fn metrics_middleware(request: Request, next: Next) -> Response {
    let metrics = request.extensions().get::<ApiMetrics>().cloned();
    let method = request.method().to_string();
    let path = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());
    let start = Instant::now();

    let response = next.run(request).await;

    if let Some(m) = metrics {
        let duration = start.elapsed().as_secs_f64();
        let status = response.status().as_u16();
        m.record_request(&method, &path, status, duration);
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use pulse_core::BlockNumber;

    fn report(partial: bool, processed: u64, failed: u64) -> ScanReport {
        ScanReport {
            head: BlockNumber::from(100),
            range_start: BlockNumber::GENESIS,
            ranking: Vec::new(),
            blocks_enqueued: processed,
            blocks_processed: processed,
            blocks_failed: failed,
            transfers: 0,
            malformed_logs: 0,
            distinct_participants: 0,
            partial,
            clamped: true,
            elapsed: Duration::from_millis(250),
        }
    }

    #[test]
    fn api_metrics_new_starts_at_zero() {
        let m = ApiMetrics::new();
        assert_eq!(m.requests(), 0);
        assert_eq!(m.errors(), 0);
        assert_eq!(m.blocks_scanned(), 0);
    }

    #[test]
    fn errors_only_count_4xx_and_5xx() {
        let m = ApiMetrics::new();
        m.record_request("GET", "/top", 200, 0.5);
        m.record_request("GET", "/top", 500, 0.1);
        m.record_request("GET", "unmatched", 404, 0.001);
        assert_eq!(m.requests(), 3);
        assert_eq!(m.errors(), 2);
    }

    #[test]
    fn cycles_are_counted_by_outcome() {
        let m = ApiMetrics::new();
        m.record_cycle(&report(false, 101, 2));
        m.record_cycle(&report(true, 40, 0));
        m.record_cycle_failure(Duration::from_millis(5));

        assert_eq!(m.cycles(CycleOutcome::Complete), 1);
        assert_eq!(m.cycles(CycleOutcome::Partial), 1);
        assert_eq!(m.cycles(CycleOutcome::Failed), 1);
        assert_eq!(m.blocks_scanned(), 141);
        assert_eq!(m.block_failures(), 2);
    }

    #[test]
    fn encoded_output_names_scan_metrics() {
        let m = ApiMetrics::new();
        m.record_cycle(&report(false, 3, 0));
        let text = m.gather_and_encode().unwrap();
        assert!(text.contains("pulse_scan_cycles_total{outcome=\"complete\"} 1"));
        assert!(text.contains("pulse_blocks_scanned_total 3"));
        assert!(text.contains("pulse_scan_duration_seconds_count 1"));
    }
}
