//! Qubic Pulse Dashboard API Server
//!
//! Plain JSON endpoints backing the dashboard widgets.
//!
//! Usage:
//!   cargo run --bin pulse_api
//!
//! Environment:
//!   PORT / PULSE_PORT - Server port (default: 8080)
//!   PULSE_HOST        - Server host (default: 0.0.0.0)
//!   QUBIC_RPC_URL     - Ledger RPC base URL
//!   RUST_LOG          - Log filter (default: info)
//!   plus every PULSE_* knob read by `PulseConfig`

use qubic_pulse::api::{create_router, AppState};
use qubic_pulse::{AnalyticsService, EndpointClient, PulseConfig, RpcGateway, ServerConfig, TickPoller};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // Initialize logging
    FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    let config = PulseConfig::default();
    config.validate()?;
    let server = ServerConfig::default();

    // Data layer: one gateway (one queue, one cache) for the whole process
    let gateway = Arc::new(RpcGateway::from_config(&config)?);
    let client = Arc::new(EndpointClient::new(gateway.clone(), &config.rpc_url, &config.events_url));
    let analytics = Arc::new(AnalyticsService::new(client.clone(), config.analytics.clone()));

    let (ticks, poller) = TickPoller::spawn(client, config.tick_poll_interval);
    info!("🕒 Tick poller started (every {:?})", config.tick_poll_interval);

    let state = Arc::new(AppState::new(analytics, ticks));
    let cleanup = state.spawn_cache_cleanup(config.cache_ttl * 4);
    info!("🧹 Background cache cleanup task started");

    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", server.host, server.port).parse()?;

    info!("🚀 Qubic Pulse API starting on http://{}", addr);
    info!("📡 Ledger: {}", config.rpc_url);
    info!("");
    info!("Endpoints:");
    info!("  GET  /v1/tick              - Latest tick");
    info!("  GET  /v1/balances/:id      - Wallet balance");
    info!("  GET  /v1/whales            - Top wallets by volume");
    info!("  GET  /v1/alerts            - Whale / new wallet alerts");
    info!("  GET  /v1/holders           - Active wallet samples");
    info!("  GET  /v1/distribution      - Holder tiers (approx.)");
    info!("  GET  /v1/heatmap           - Weekly activity grid");
    info!("  GET  /v1/pressure          - Buy/sell pressure");
    info!("  GET  /v1/cache/stats       - Cache statistics");
    info!("  GET  /v1/health            - Health check");
    info!("");
    info!("Press Ctrl+C for graceful shutdown");

    let listener = TcpListener::bind(addr).await?;

    let shutdown_signal = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("⚠️ Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    info!("🛑 Shutdown signal received, cleaning up...");
    poller.abort();
    cleanup.abort();

    let stats = gateway.cache_stats();
    info!("   Requests dispatched: {}", gateway.dispatched());
    info!("   Cache hit rate: {:.1}%", stats.hit_rate);
    info!("👋 Qubic Pulse API shutdown complete");

    Ok(())
}
