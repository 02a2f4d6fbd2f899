//! API Route Configuration

use axum::{middleware, routing::get, Router};
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{self, AppState};
use super::middleware::logging_middleware;
use crate::providers::transport::Transport;

/// Create the API router with all routes and middleware
pub fn create_router<T: Transport>(state: Arc<AppState<T>>) -> Router {
    // dashboard is served from another origin
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_v1 = Router::new()
        .route("/health", get(handlers::health_check::<T>))
        .route("/tick", get(handlers::get_tick::<T>))
        .route("/balances/:identity", get(handlers::get_balance::<T>))
        .route("/cache/stats", get(handlers::get_cache_stats::<T>))
        // Aggregate widgets
        .route("/whales", get(handlers::get_whales::<T>))
        .route("/alerts", get(handlers::get_alerts::<T>))
        .route("/holders", get(handlers::get_holders::<T>))
        .route("/distribution", get(handlers::get_distribution::<T>))
        .route("/heatmap", get(handlers::get_heatmap::<T>))
        .route("/pressure", get(handlers::get_pressure::<T>));

    Router::new()
        .nest("/v1", api_v1)
        .route("/health", get(handlers::health_check::<T>))
        .with_state(state)
        // Middleware (order matters - bottom runs first)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(middleware::from_fn(logging_middleware))
}
