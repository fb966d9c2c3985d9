//! # Service Configuration
//!
//! Read once at startup. Malformed values abort startup instead of falling
//! back to defaults, so a typo in `PULSE_WORKERS` cannot silently exceed
//! the provider's rate limit.
//!
//! | Variable                  | Default    |
//! |---------------------------|------------|
//! | `PORT`                    | `8080`     |
//! | `PULSE_WORKERS`           | `2`        |
//! | `PULSE_QUEUE_DEPTH`       | `6`        |
//! | `PULSE_WINDOW`            | `100`      |
//! | `PULSE_TOP_K`             | `5`        |
//! | `PULSE_EVENT_TOPIC`       | Transfer   |
//! | `PULSE_SCAN_TIMEOUT_SECS` | unset      |
//! | `PULSE_METRICS_ENABLED`   | `true`     |

use std::str::FromStr;
use std::time::Duration;

use pulse_core::{parse_topic, ScanConfig, ValidationError};
use thiserror::Error;

/// Default listen port.
pub const DEFAULT_PORT: u16 = 8080;

/// Service configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub port: u16,
    /// Parameters applied to every `/top` cycle.
    pub scan: ScanConfig,
    /// Mount `/metrics` and record request metrics.
    pub metrics_enabled: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            scan: ScanConfig::default(),
            metrics_enabled: true,
        }
    }
}

/// A configuration value was present but unusable.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {var}: {reason}")]
    InvalidVar {
        var: &'static str,
        value: String,
        reason: String,
    },
    #[error("invalid scan configuration: {0}")]
    Scan(#[from] ValidationError),
}

impl AppConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    /// Load configuration through `lookup`, which returns a variable's value
    /// or `None` when unset.
    pub fn from_vars<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = ScanConfig::default();
        let topic = match lookup("PULSE_EVENT_TOPIC") {
            Some(raw) => parse_topic(&raw)?,
            None => defaults.topic,
        };
        let timeout = parse_var::<u64>(&lookup, "PULSE_SCAN_TIMEOUT_SECS")?.map(Duration::from_secs);

        let scan = ScanConfig {
            workers: parse_var(&lookup, "PULSE_WORKERS")?.unwrap_or(defaults.workers),
            queue_depth: parse_var(&lookup, "PULSE_QUEUE_DEPTH")?.unwrap_or(defaults.queue_depth),
            window_size: parse_var(&lookup, "PULSE_WINDOW")?.unwrap_or(defaults.window_size),
            top_k: parse_var(&lookup, "PULSE_TOP_K")?.unwrap_or(defaults.top_k),
            topic,
            timeout,
        };
        scan.validate()?;

        let metrics_enabled = parse_flag(&lookup, "PULSE_METRICS_ENABLED")?.unwrap_or(true);

        Ok(Self {
            port: parse_var(&lookup, "PORT")?.unwrap_or(DEFAULT_PORT),
            scan,
            metrics_enabled,
        })
    }
}

fn parse_var<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let Some(raw) = lookup(var) else {
        return Ok(None);
    };
    raw.trim()
        .parse::<T>()
        .map(Some)
        .map_err(|e| ConfigError::InvalidVar {
            var,
            value: raw.clone(),
            reason: e.to_string(),
        })
}

fn parse_flag(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
) -> Result<Option<bool>, ConfigError> {
    let Some(raw) = lookup(var) else {
        return Ok(None);
    };
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(Some(true)),
        "0" | "false" | "no" | "off" => Ok(Some(false)),
        _ => Err(ConfigError::InvalidVar {
            var,
            value: raw,
            reason: "expected one of true/false, 1/0, yes/no, on/off".to_string(),
        }),
    }
}
