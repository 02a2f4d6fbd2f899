//! API Request Handlers
//!
//! Foundational reads (tick, balance) propagate errors as HTTP errors.
//! Aggregate widgets degrade to an empty payload flagged `degraded: true`.

use alloy_primitives::U256;
use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::info;

use super::types::*;
use crate::analytics::AnalyticsService;
use crate::core::{Alert, DistributionReport, HeatmapCell, HolderPoint, TradePressure, WhaleRecord};
use crate::models::errors::{AppError, AppResult, Degrade};
use crate::models::types::{Balance, TickInfo};
use crate::providers::ticker::TickWatch;
use crate::providers::transport::{HttpTransport, Transport};
use crate::utils::cache::CacheStats;
use crate::utils::constants::MAX_WINDOW_TICKS;

/// Shared application state
pub struct AppState<T: Transport = HttpTransport> {
    pub analytics: Arc<AnalyticsService<T>>,
    pub ticks: TickWatch,
    pub start_time: Instant,
}

impl<T: Transport> AppState<T> {
    pub fn new(analytics: Arc<AnalyticsService<T>>, ticks: TickWatch) -> Self {
        Self {
            analytics,
            ticks,
            start_time: Instant::now(),
        }
    }

    /// Background sweep of expired cache entries
    pub fn spawn_cache_cleanup(&self, every: Duration) -> tokio::task::JoinHandle<()> {
        let cache = self.analytics.client().gateway().cache().clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            loop {
                interval.tick().await;
                cache.cleanup_expired();
            }
        })
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    fn current_tick(&self) -> u64 {
        self.ticks.current().tick
    }
}

type ApiResult<T> = Result<Json<ApiResponse<T>>, (StatusCode, Json<ApiResponse<()>>)>;

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}

fn failure(err: &AppError, start: Instant) -> (StatusCode, Json<ApiResponse<()>>) {
    let status = StatusCode::from_u16(err.code.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(ApiResponse::error(ApiError::from(err), elapsed_ms(start))))
}

fn propagate<T: serde::Serialize>(result: AppResult<T>, start: Instant) -> ApiResult<T> {
    match result {
        Ok(data) => Ok(Json(ApiResponse::success(data, elapsed_ms(start)))),
        Err(e) => Err(failure(&e, start)),
    }
}

fn degrade<T: serde::Serialize + Default>(result: AppResult<T>, source: &str, start: Instant) -> Json<ApiResponse<T>> {
    let (data, degraded) = result.degrade_flagged(source);
    if degraded {
        Json(ApiResponse::degraded(data, elapsed_ms(start)))
    } else {
        Json(ApiResponse::success(data, elapsed_ms(start)))
    }
}

fn clamp_window(requested: Option<u64>, default: u64) -> u64 {
    requested.unwrap_or(default).clamp(1, MAX_WINDOW_TICKS)
}

// ============================================
// Health & foundational reads
// ============================================

pub async fn health_check<T: Transport>(State(state): State<Arc<AppState<T>>>) -> Json<ApiResponse<HealthData>> {
    let start = Instant::now();

    let data = HealthData {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.uptime_seconds(),
        current_tick: state.current_tick(),
        requests_dispatched: state.analytics.client().gateway().dispatched(),
    };

    Json(ApiResponse::success(data, elapsed_ms(start)))
}

pub async fn get_tick<T: Transport>(State(state): State<Arc<AppState<T>>>) -> ApiResult<TickInfo> {
    let start = Instant::now();
    let info = state.ticks.current();
    let result = if info.tick == 0 {
        Err(AppError::tick_not_ready())
    } else {
        Ok(info)
    };
    propagate(result, start)
}

pub async fn get_balance<T: Transport>(
    State(state): State<Arc<AppState<T>>>,
    Path(identity): Path<String>,
) -> ApiResult<Balance> {
    let start = Instant::now();
    info!("💰 balance lookup");
    propagate(state.analytics.client().balance(&identity).await, start)
}

pub async fn get_cache_stats<T: Transport>(State(state): State<Arc<AppState<T>>>) -> Json<ApiResponse<CacheStats>> {
    let start = Instant::now();
    let stats = state.analytics.client().gateway().cache_stats();
    Json(ApiResponse::success(stats, elapsed_ms(start)))
}

// ============================================
// Aggregate widgets (degrade to empty)
// ============================================

pub async fn get_whales<T: Transport>(
    State(state): State<Arc<AppState<T>>>,
    Query(q): Query<WindowQuery>,
) -> Json<ApiResponse<Vec<WhaleRecord>>> {
    let start = Instant::now();
    let policy = state.analytics.policy();
    let width = clamp_window(q.window, policy.scan_window_ticks);
    let top = q.top.unwrap_or(policy.whale_top_n).max(1);

    let result = state.analytics.whale_activity(state.current_tick(), width, top).await;
    degrade(result, "whales", start)
}

pub async fn get_alerts<T: Transport>(
    State(state): State<Arc<AppState<T>>>,
    Query(q): Query<AlertQuery>,
) -> Json<ApiResponse<Vec<Alert>>> {
    let start = Instant::now();
    let width = clamp_window(q.window, state.analytics.policy().scan_window_ticks);
    let mut policy = state.analytics.alert_policy();
    if let Some(threshold) = q.threshold {
        policy.threshold = U256::from(threshold);
    }

    let result = state.analytics.whale_alerts(state.current_tick(), width, &policy).await;
    degrade(result, "alerts", start)
}

pub async fn get_holders<T: Transport>(State(state): State<Arc<AppState<T>>>) -> Json<ApiResponse<Vec<HolderPoint>>> {
    let start = Instant::now();
    let result = state.analytics.holder_growth(state.current_tick()).await;
    degrade(result, "holders", start)
}

pub async fn get_distribution<T: Transport>(
    State(state): State<Arc<AppState<T>>>,
    Query(q): Query<WindowQuery>,
) -> Json<ApiResponse<DistributionReport>> {
    let start = Instant::now();
    let width = clamp_window(q.window, state.analytics.policy().distribution_window_ticks);
    let result = state.analytics.distribution(state.current_tick(), width).await;
    degrade(result, "distribution", start)
}

pub async fn get_heatmap<T: Transport>(State(state): State<Arc<AppState<T>>>) -> Json<ApiResponse<Vec<HeatmapCell>>> {
    let start = Instant::now();
    let result = state.analytics.activity_heatmap(state.current_tick()).await;
    degrade(result, "heatmap", start)
}

pub async fn get_pressure<T: Transport>(
    State(state): State<Arc<AppState<T>>>,
    Query(q): Query<WindowQuery>,
) -> Json<ApiResponse<TradePressure>> {
    let start = Instant::now();
    let width = clamp_window(q.window, state.analytics.policy().scan_window_ticks);
    let result = state.analytics.trade_pressure(state.current_tick(), width).await;
    degrade(result, "pressure", start)
}
