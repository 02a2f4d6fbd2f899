//! Qubic Pulse Library
//!
//! Data-access core for a Qubic ledger dashboard:
//! - Serial request queue with minimum spacing between upstream calls
//! - TTL response cache keyed by method, URL and body
//! - Typed endpoint client for the tick ledger and event services
//! - Aggregation engine (whales, alerts, holders, distribution, heatmap, pressure)

pub mod analytics;
pub mod api;
pub mod core;
pub mod models;
pub mod providers;
pub mod utils;

pub use analytics::AnalyticsService;
pub use models::config::{AnalyticsPolicy, FlowBands, PulseConfig, ServerConfig};
pub use models::errors::{AppError, AppResult, Degrade, ErrorCode};
pub use models::types::{Balance, TickInfo, TickRange, Transaction};
pub use providers::gateway::RpcGateway;
pub use providers::rpc::EndpointClient;
pub use providers::ticker::{TickPoller, TickWatch};
pub use providers::transport::{ApiRequest, CachePolicy, HttpMethod, HttpTransport, Transport};
pub use utils::cache::{CacheStats, ResponseCache};
pub use utils::rate_limiter::RateLimiter;
