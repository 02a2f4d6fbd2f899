//! Centralized Error Handling Module
//!
//! Every failure carries a unique code so degraded widgets and log lines can be
//! traced back to the data source that failed.
//!
//! Error codes follow pattern: CATEGORY_SPECIFIC_ERROR
//! - VALIDATION_xxx: rejected before reaching the network
//! - RPC_xxx: transport / upstream failures
//! - QUEUE_xxx / TICK_xxx: request pipeline state
//! - CFG_xxx: configuration errors

use std::fmt;
use tracing::warn;

/// Application-wide error type
#[derive(Debug)]
pub struct AppError {
    /// Unique error code for logging/monitoring
    pub code: ErrorCode,
    /// Human-readable message (upstream body text for `RpcUpstream`)
    pub message: String,
    /// HTTP status returned by the ledger service, if any
    pub upstream_status: Option<u16>,
    /// Optional underlying error
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new AppError
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            upstream_status: None,
            source: None,
        }
    }

    /// Create AppError with source error
    pub fn with_source(
        code: ErrorCode,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            code,
            message: message.into(),
            upstream_status: None,
            source: Some(Box::new(source)),
        }
    }

    /// Get error code as string (for logging)
    pub fn code_str(&self) -> &'static str {
        self.code.as_str()
    }

    pub fn is_retryable(&self) -> bool {
        self.code.is_retryable()
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.upstream_status {
            Some(status) => write!(f, "[{}] HTTP {}: {}", self.code.as_str(), status, self.message),
            None => write!(f, "[{}] {}", self.code.as_str(), self.message),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_ref().map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Unique error codes for monitoring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // ============================================
    // Validation Errors (never reach the network)
    // ============================================
    /// Required identifier (wallet id, tick, contract index) missing or empty
    MissingIdentifier,
    /// Argument present but out of range
    InvalidArgument,

    // ============================================
    // RPC Errors
    // ============================================
    /// Upstream answered HTTP 429 twice in a row (after one cooldown)
    RpcRateLimited,
    /// Upstream returned a non-2xx status
    RpcUpstream,
    /// Body was not the JSON we expected
    RpcInvalidResponse,
    /// Connection could not be established
    RpcConnectionFailed,
    /// reqwest-level request timeout
    RpcTimeout,

    // ============================================
    // Pipeline Errors
    // ============================================
    /// Task exceeded its slot in the serial queue
    QueueTimeout,
    /// Current tick not yet known (zero / never polled)
    TickNotReady,

    // ============================================
    // Configuration Errors
    // ============================================
    ConfigInvalidValue,

    // ============================================
    // Generic Errors
    // ============================================
    Unknown,
}

impl ErrorCode {
    /// Get string representation of error code
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MissingIdentifier => "VALIDATION_MISSING_ID",
            Self::InvalidArgument => "VALIDATION_INVALID_VALUE",

            Self::RpcRateLimited => "RPC_RATE_LIMITED",
            Self::RpcUpstream => "RPC_UPSTREAM",
            Self::RpcInvalidResponse => "RPC_INVALID_RESPONSE",
            Self::RpcConnectionFailed => "RPC_CONNECTION_FAILED",
            Self::RpcTimeout => "RPC_TIMEOUT",

            Self::QueueTimeout => "QUEUE_TIMEOUT",
            Self::TickNotReady => "TICK_NOT_READY",

            Self::ConfigInvalidValue => "CFG_INVALID_VALUE",

            Self::Unknown => "UNKNOWN_ERROR",
        }
    }

    /// Get HTTP status code for API responses
    pub fn http_status(&self) -> u16 {
        match self {
            Self::MissingIdentifier | Self::InvalidArgument | Self::ConfigInvalidValue => 400,
            Self::RpcRateLimited => 429,
            Self::TickNotReady => 503,
            Self::RpcUpstream | Self::RpcInvalidResponse | Self::RpcConnectionFailed => 502,
            Self::RpcTimeout | Self::QueueTimeout => 504,
            Self::Unknown => 500,
        }
    }

    /// Check if error is retryable
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::RpcRateLimited
                | Self::RpcTimeout
                | Self::RpcConnectionFailed
                | Self::QueueTimeout
                | Self::TickNotReady
        )
    }
}

// ============================================
// Convenience constructors
// ============================================

impl AppError {
    /// Required identifier missing
    pub fn missing_identifier(what: &str) -> Self {
        Self::new(
            ErrorCode::MissingIdentifier,
            format!("{} is required and must not be empty", what),
        )
    }

    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidArgument, msg)
    }

    /// Rate limited (HTTP 429)
    pub fn rate_limited() -> Self {
        Self {
            upstream_status: Some(429),
            ..Self::new(ErrorCode::RpcRateLimited, "Rate limited by ledger service, back off")
        }
    }

    /// Non-2xx upstream response, keeps status and body text
    pub fn upstream(status: u16, body: impl Into<String>) -> Self {
        Self {
            upstream_status: Some(status),
            ..Self::new(ErrorCode::RpcUpstream, body)
        }
    }

    pub fn invalid_response(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::RpcInvalidResponse, msg)
    }

    pub fn queue_timeout(timeout_ms: u128) -> Self {
        Self::new(
            ErrorCode::QueueTimeout,
            format!("Request exceeded {}ms in the serial queue", timeout_ms),
        )
    }

    pub fn tick_not_ready() -> Self {
        Self::new(ErrorCode::TickNotReady, "Current tick not known yet")
    }

    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigInvalidValue, msg)
    }
}

// ============================================
// Result type alias
// ============================================

/// Application Result type
pub type AppResult<T> = Result<T, AppError>;

/// Explicit "fall back to empty" for aggregate data sources.
///
/// Foundational accessors propagate; callers that render independent widgets
/// call `.degrade(source)` to keep the page alive when one source fails.
pub trait Degrade<T> {
    fn degrade(self, source: &str) -> T;

    /// Like `degrade` but also reports whether the fallback was taken.
    fn degrade_flagged(self, source: &str) -> (T, bool);
}

impl<T: Default> Degrade<T> for AppResult<T> {
    fn degrade(self, source: &str) -> T {
        self.degrade_flagged(source).0
    }

    fn degrade_flagged(self, source: &str) -> (T, bool) {
        match self {
            Ok(value) => (value, false),
            Err(e) => {
                warn!(source = source, code = e.code_str(), "⚠️ Degrading to empty result: {}", e);
                (T::default(), true)
            }
        }
    }
}

// ============================================
// Conversion from common error types
// ============================================

impl From<eyre::Report> for AppError {
    fn from(err: eyre::Report) -> Self {
        Self::new(ErrorCode::Unknown, err.to_string())
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::new(ErrorCode::RpcTimeout, "Request timeout")
        } else if err.is_connect() {
            Self::new(ErrorCode::RpcConnectionFailed, "Connection failed")
        } else if err.is_decode() {
            Self::with_source(ErrorCode::RpcInvalidResponse, "Malformed response body", err)
        } else {
            Self::new(ErrorCode::Unknown, err.to_string())
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(ErrorCode::RpcInvalidResponse, "JSON parse error", err)
    }
}
