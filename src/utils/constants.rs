//! Constants Module - Single Source of Truth
//!
//! All endpoint paths, default timings and aggregation constants live here.
//! Other modules reference these instead of repeating literals.

// ============================================
// APPLICATION CONSTANTS
// ============================================

/// Application name
pub const APP_NAME: &str = "QubicPulse";

/// Application version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// User-Agent for HTTP requests
pub const USER_AGENT: &str = "QubicPulse/0.1.0";

// ============================================
// UPSTREAM SERVICES
// ============================================

/// Public Qubic RPC (archive + live)
pub const DEFAULT_RPC_URL: &str = "https://rpc.qubic.org";

/// Auxiliary service used for event decoding
pub const DEFAULT_EVENTS_URL: &str = "https://api.qubic.org";

pub const PATH_TICK_INFO: &str = "/v1/tick-info";
pub const PATH_STATUS: &str = "/v1/status";
pub const PATH_QUERY_SMART_CONTRACT: &str = "/v1/querySmartContract";
pub const PATH_DECODE_EVENTS: &str = "/v1/events/decode";

pub fn path_balance(identity: &str) -> String {
    format!("/v1/balances/{}", identity)
}

pub fn path_owned_assets(identity: &str) -> String {
    format!("/v1/assets/{}/owned", identity)
}

pub fn path_tick_transactions(tick: u64) -> String {
    format!("/v2/ticks/{}/transactions?approved=true", tick)
}

pub fn path_identity_transfers(identity: &str, start_tick: u64, end_tick: u64) -> String {
    format!(
        "/v2/identities/{}/transfers?startTick={}&endTick={}",
        identity, start_tick, end_tick
    )
}

pub fn path_chain_hash(tick: u64) -> String {
    format!("/v2/ticks/{}/hash", tick)
}

pub fn path_store_hash(tick: u64) -> String {
    format!("/v2/ticks/{}/store-hash", tick)
}

pub fn path_quorum_tick_data(tick: u64) -> String {
    format!("/v1/ticks/{}/quorum-tick-data", tick)
}

// ============================================
// PIPELINE DEFAULTS
// ============================================

/// Minimum spacing between two transport dispatch starts
pub const DEFAULT_MIN_INTERVAL_MS: u64 = 500;

/// Response cache TTL (seconds)
pub const DEFAULT_CACHE_TTL_SECS: u64 = 15;

/// Single cooldown after an HTTP 429 before the one retry
pub const DEFAULT_RATE_LIMIT_COOLDOWN_MS: u64 = 2_000;

/// reqwest request timeout (seconds)
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Upper bound for one task in the serial queue (seconds)
pub const DEFAULT_QUEUE_TASK_TIMEOUT_SECS: u64 = 20;

/// Tick poller refresh cadence (seconds)
pub const DEFAULT_TICK_POLL_SECS: u64 = 60;

// ============================================
// LEDGER / AGGREGATION CONSTANTS
// ============================================

/// Freshest ticks are not guaranteed indexed upstream yet
pub const DEFAULT_TICK_LAG: u64 = 100;

/// Approximate wall-clock duration of one tick
pub const DEFAULT_MILLIS_PER_TICK: i64 = 1_000;

/// Raw QU -> display units for whale volumes (millions of QU)
pub const DEFAULT_DISPLAY_DIVISOR: u64 = 1_000_000;

/// Whale ranking size
pub const DEFAULT_WHALE_TOP_N: usize = 6;

/// Alert threshold in QU
pub const DEFAULT_WHALE_THRESHOLD_QU: u64 = 1_000_000_000;

/// Alerts returned per scan, in scan order
pub const MAX_ALERTS: usize = 8;

/// Default tick window for whale/alert/heatmap scans
pub const DEFAULT_SCAN_WINDOW_TICKS: u64 = 10;

/// Default tick window for balance replay
pub const DEFAULT_DISTRIBUTION_WINDOW_TICKS: u64 = 20;

pub const DEFAULT_HOLDER_SAMPLE_POINTS: usize = 12;
pub const DEFAULT_HOLDER_SAMPLE_STRIDE: u64 = 50;

/// One heatmap sample per 4-hour window across a week
pub const DEFAULT_HEATMAP_SAMPLE_POINTS: usize = 42;
pub const DEFAULT_HEATMAP_SAMPLE_STRIDE: u64 = 14_400;

/// Upper bound on any window so a single request cannot fan out unbounded
pub const MAX_WINDOW_TICKS: u64 = 500;

/// Distribution tier boundaries (inclusive rank ranges, 1-based)
pub const TIER_BOUNDS: [(usize, usize); 3] = [(1, 3), (4, 10), (11, 50)];

/// Day labels for heatmap rows (Monday first)
pub const WEEKDAY_LABELS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

/// Four-hour windows per day
pub const HEATMAP_WINDOWS: usize = 6;
