//! # Application State
//!
//! Shared across handlers. Holds no per-request data: every `/top` cycle
//! builds its own ledger, so concurrent requests never see each other's
//! counts.

use std::sync::Arc;

use pulse_scan::LogSource;

use crate::config::AppConfig;
use crate::middleware::metrics::ApiMetrics;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Ledger data source queried by every cycle.
    pub source: Arc<dyn LogSource>,
    pub config: Arc<AppConfig>,
    pub metrics: ApiMetrics,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("source", &self.source.name())
            .field("config", &self.config)
            .field("metrics", &self.metrics)
            .finish()
    }
}

impl AppState {
    pub fn new(source: Arc<dyn LogSource>, config: AppConfig) -> Self {
        Self {
            source,
            config: Arc::new(config),
            metrics: ApiMetrics::new(),
        }
    }
}
