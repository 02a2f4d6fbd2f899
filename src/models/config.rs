//! Configuration module for Qubic Pulse
//!
//! Defaults come from utils/constants.rs; every value can be overridden from
//! the environment. No hardcoded timings in other modules.

use alloy_primitives::U256;
use std::time::Duration;
use tracing::warn;

use crate::models::errors::{AppError, AppResult};
use crate::utils::constants::*;

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    match std::env::var(key) {
        Ok(raw) => match raw.trim().parse() {
            Ok(v) => v,
            Err(_) => {
                warn!("⚠️ Ignoring unparsable {}={:?}, using default", key, raw);
                default
            }
        },
        Err(_) => default,
    }
}

/// Request pipeline configuration (transport, limiter, cache)
#[derive(Debug, Clone)]
pub struct PulseConfig {
    /// Base URL for the ledger RPC
    pub rpc_url: String,
    /// Base URL for the event decoding service
    pub events_url: String,
    /// Minimum spacing between dispatch starts
    pub min_interval: Duration,
    /// Response cache TTL
    pub cache_ttl: Duration,
    /// Single cooldown after HTTP 429
    pub rate_limit_cooldown: Duration,
    /// reqwest request timeout
    pub request_timeout: Duration,
    /// Upper bound for one queued task
    pub queue_task_timeout: Duration,
    /// Tick poller cadence
    pub tick_poll_interval: Duration,
    /// Aggregation knobs
    pub analytics: AnalyticsPolicy,
}

impl Default for PulseConfig {
    fn default() -> Self {
        Self {
            rpc_url: std::env::var("QUBIC_RPC_URL").unwrap_or_else(|_| DEFAULT_RPC_URL.to_string()),
            events_url: std::env::var("QUBIC_EVENTS_URL")
                .unwrap_or_else(|_| DEFAULT_EVENTS_URL.to_string()),
            min_interval: Duration::from_millis(env_or("PULSE_MIN_INTERVAL_MS", DEFAULT_MIN_INTERVAL_MS)),
            cache_ttl: Duration::from_secs(env_or("PULSE_CACHE_TTL_SECS", DEFAULT_CACHE_TTL_SECS)),
            rate_limit_cooldown: Duration::from_millis(env_or(
                "PULSE_RATE_LIMIT_COOLDOWN_MS",
                DEFAULT_RATE_LIMIT_COOLDOWN_MS,
            )),
            request_timeout: Duration::from_secs(env_or(
                "PULSE_REQUEST_TIMEOUT_SECS",
                DEFAULT_REQUEST_TIMEOUT_SECS,
            )),
            queue_task_timeout: Duration::from_secs(env_or(
                "PULSE_QUEUE_TASK_TIMEOUT_SECS",
                DEFAULT_QUEUE_TASK_TIMEOUT_SECS,
            )),
            tick_poll_interval: Duration::from_secs(env_or("PULSE_TICK_POLL_SECS", DEFAULT_TICK_POLL_SECS)),
            analytics: AnalyticsPolicy::default(),
        }
    }
}

impl PulseConfig {
    /// Config without reading the environment (tests, embedding)
    pub fn builtin() -> Self {
        Self {
            rpc_url: DEFAULT_RPC_URL.to_string(),
            events_url: DEFAULT_EVENTS_URL.to_string(),
            min_interval: Duration::from_millis(DEFAULT_MIN_INTERVAL_MS),
            cache_ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
            rate_limit_cooldown: Duration::from_millis(DEFAULT_RATE_LIMIT_COOLDOWN_MS),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            queue_task_timeout: Duration::from_secs(DEFAULT_QUEUE_TASK_TIMEOUT_SECS),
            tick_poll_interval: Duration::from_secs(DEFAULT_TICK_POLL_SECS),
            analytics: AnalyticsPolicy::builtin(),
        }
    }

    pub fn validate(&self) -> AppResult<()> {
        for (name, url) in [("QUBIC_RPC_URL", &self.rpc_url), ("QUBIC_EVENTS_URL", &self.events_url)] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(AppError::invalid_config(format!("{} must be an http(s) URL, got {:?}", name, url)));
            }
        }
        if self.queue_task_timeout.is_zero() {
            return Err(AppError::invalid_config("queue task timeout must be > 0"));
        }
        if self.tick_poll_interval.is_zero() {
            return Err(AppError::invalid_config("tick poll interval must be > 0"));
        }
        self.analytics.validate()
    }
}

/// Magnitude bands for the buy/sell heuristic.
///
/// Transfers at or above `buy_min` count as buys, at or below `sell_max` as
/// sells, everything in between is neutral. The cutoffs are tunable policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowBands {
    pub buy_min: U256,
    pub sell_max: U256,
}

impl Default for FlowBands {
    fn default() -> Self {
        Self {
            buy_min: U256::from(100_000_000u64),
            sell_max: U256::from(10_000_000u64),
        }
    }
}

/// Aggregation policy
#[derive(Debug, Clone)]
pub struct AnalyticsPolicy {
    /// Ticks subtracted from the reported tick before querying
    pub tick_lag: u64,
    /// Window for whales, alerts, heatmap and pressure
    pub scan_window_ticks: u64,
    /// Window for balance replay
    pub distribution_window_ticks: u64,
    pub whale_top_n: usize,
    /// Raw units per display unit for whale volumes
    pub display_divisor: u64,
    /// Alert threshold in QU
    pub alert_threshold: U256,
    pub max_alerts: usize,
    pub holder_sample_points: usize,
    pub holder_sample_stride: u64,
    pub heatmap_sample_points: usize,
    pub heatmap_sample_stride: u64,
    pub millis_per_tick: i64,
    pub flow_bands: FlowBands,
}

impl Default for AnalyticsPolicy {
    fn default() -> Self {
        Self {
            tick_lag: env_or("PULSE_TICK_LAG", DEFAULT_TICK_LAG),
            alert_threshold: U256::from(env_or("PULSE_WHALE_THRESHOLD_QU", DEFAULT_WHALE_THRESHOLD_QU)),
            ..Self::builtin()
        }
    }
}

impl AnalyticsPolicy {
    pub fn builtin() -> Self {
        Self {
            tick_lag: DEFAULT_TICK_LAG,
            scan_window_ticks: DEFAULT_SCAN_WINDOW_TICKS,
            distribution_window_ticks: DEFAULT_DISTRIBUTION_WINDOW_TICKS,
            whale_top_n: DEFAULT_WHALE_TOP_N,
            display_divisor: DEFAULT_DISPLAY_DIVISOR,
            alert_threshold: U256::from(DEFAULT_WHALE_THRESHOLD_QU),
            max_alerts: MAX_ALERTS,
            holder_sample_points: DEFAULT_HOLDER_SAMPLE_POINTS,
            holder_sample_stride: DEFAULT_HOLDER_SAMPLE_STRIDE,
            heatmap_sample_points: DEFAULT_HEATMAP_SAMPLE_POINTS,
            heatmap_sample_stride: DEFAULT_HEATMAP_SAMPLE_STRIDE,
            millis_per_tick: DEFAULT_MILLIS_PER_TICK,
            flow_bands: FlowBands::default(),
        }
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.display_divisor == 0 {
            return Err(AppError::invalid_config("display divisor must be > 0"));
        }
        if self.holder_sample_stride == 0 || self.heatmap_sample_stride == 0 {
            return Err(AppError::invalid_config("sample strides must be > 0"));
        }
        if self.millis_per_tick <= 0 {
            return Err(AppError::invalid_config("millis per tick must be > 0"));
        }
        if self.flow_bands.sell_max >= self.flow_bands.buy_min {
            return Err(AppError::invalid_config("flow bands overlap: sell_max must be < buy_min"));
        }
        for (name, width) in [
            ("scan window", self.scan_window_ticks),
            ("distribution window", self.distribution_window_ticks),
        ] {
            if width == 0 || width > MAX_WINDOW_TICKS {
                return Err(AppError::invalid_config(format!(
                    "{} must be within 1..={} ticks",
                    name, MAX_WINDOW_TICKS
                )));
            }
        }
        Ok(())
    }
}

/// HTTP server settings for the API binary
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: std::env::var("PULSE_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            // PORT wins so container platforms can inject it
            port: std::env::var("PORT")
                .or_else(|_| std::env::var("PULSE_PORT"))
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_is_valid() {
        assert!(PulseConfig::builtin().validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_url() {
        let mut cfg = PulseConfig::builtin();
        cfg.rpc_url = "rpc.qubic.org".to_string();
        let err = cfg.validate().unwrap_err();
        assert_eq!(err.code_str(), "CFG_INVALID_VALUE");
    }

    #[test]
    fn test_rejects_overlapping_bands() {
        let mut policy = AnalyticsPolicy::builtin();
        policy.flow_bands.sell_max = policy.flow_bands.buy_min;
        assert!(policy.validate().is_err());
    }

    #[test]
    fn test_rejects_oversized_window() {
        let mut policy = AnalyticsPolicy::builtin();
        policy.scan_window_ticks = MAX_WINDOW_TICKS + 1;
        assert!(policy.validate().is_err());
    }
}
