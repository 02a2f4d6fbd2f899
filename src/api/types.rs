//! API Request/Response Types

use serde::{Deserialize, Serialize};

use crate::models::errors::AppError;

/// API Response wrapper
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,
    /// Data source failed and `data` is the empty fallback
    pub degraded: bool,
    pub latency_ms: f64,
    pub timestamp: i64,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T, latency_ms: f64) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            degraded: false,
            latency_ms,
            timestamp: chrono::Utc::now().timestamp(),
        }
    }

    /// Empty fallback after a failed data source; still a 200 so the widget
    /// renders "no data" instead of an error banner
    pub fn degraded(data: T, latency_ms: f64) -> Self {
        Self {
            degraded: true,
            ..Self::success(data, latency_ms)
        }
    }
}

impl ApiResponse<()> {
    pub fn error(error: ApiError, latency_ms: f64) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error),
            degraded: false,
            latency_ms,
            timestamp: chrono::Utc::now().timestamp(),
        }
    }
}

/// API Error
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
    pub retryable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upstream_status: Option<u16>,
}

impl From<&AppError> for ApiError {
    fn from(err: &AppError) -> Self {
        Self {
            code: err.code_str().to_string(),
            message: err.message.clone(),
            retryable: err.is_retryable(),
            upstream_status: err.upstream_status,
        }
    }
}

// ============================================
// Queries
// ============================================

/// `?window=&top=` for whale / pressure / distribution
#[derive(Debug, Default, Deserialize)]
pub struct WindowQuery {
    pub window: Option<u64>,
    pub top: Option<usize>,
}

/// `?window=&threshold=` for alerts; threshold in QU
#[derive(Debug, Default, Deserialize)]
pub struct AlertQuery {
    pub window: Option<u64>,
    pub threshold: Option<u64>,
}

// ============================================
// Responses
// ============================================

#[derive(Debug, Serialize)]
pub struct HealthData {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    /// 0 until the first successful tick poll
    pub current_tick: u64,
    pub requests_dispatched: u64,
}
