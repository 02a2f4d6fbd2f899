//! Qubic Pulse - one-shot dashboard report
//!
//! Waits for the first tick, then prints the whale board, the alert feed and
//! the holder tiers for the configured windows. Each section degrades on its
//! own, so a failing source prints "no data" instead of aborting the report.
//!
//! Environment: see `PulseConfig` (QUBIC_RPC_URL, PULSE_MIN_INTERVAL_MS, ...)

use qubic_pulse::{AnalyticsService, Degrade, EndpointClient, PulseConfig, RpcGateway, TickPoller};

use eyre::Result;
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();

    println!("\n    Q U B I C   P U L S E   v{}\n", env!("CARGO_PKG_VERSION"));

    let config = PulseConfig::default();
    config.validate()?;

    let gateway = Arc::new(RpcGateway::from_config(&config)?);
    let client = Arc::new(EndpointClient::new(gateway.clone(), &config.rpc_url, &config.events_url));
    let analytics = AnalyticsService::new(client.clone(), config.analytics.clone());

    info!("📡 Ledger: {}", config.rpc_url);
    let (mut ticks, poller) = TickPoller::spawn(client, config.tick_poll_interval);

    let tick = tokio::select! {
        tick = ticks.wait_for_tick() => tick,
        _ = tokio::signal::ctrl_c() => {
            println!("\n🛑 Interrupted before first tick");
            None
        }
    };
    let Some(tick) = tick else {
        poller.abort();
        return Ok(());
    };
    info!("🕒 Current tick {} (epoch {})", tick.tick, tick.epoch);

    let policy = analytics.policy().clone();

    // Whale board
    let whales = analytics
        .whale_activity(tick.tick, policy.scan_window_ticks, policy.whale_top_n)
        .await
        .degrade("whales");
    println!("\n🐋 Whale Activity (last {} ticks)", policy.scan_window_ticks);
    if whales.is_empty() {
        println!("   no data");
    }
    for w in &whales {
        println!(
            "   {:<10} buys {:>14.2}  sells {:>14.2}  net {:>+14.2}  vol {:>14.2}",
            w.label, w.buys, w.sells, w.net, w.volume
        );
    }

    // Alert feed
    let alerts = analytics
        .whale_alerts(tick.tick, policy.scan_window_ticks, &analytics.alert_policy())
        .await
        .degrade("alerts");
    println!("\n🚨 Alerts");
    if alerts.is_empty() {
        println!("   none");
    }
    for a in &alerts {
        println!("   [{}] tick {}  {}", a.impact.as_str(), a.tick, a.message);
    }

    // Holder tiers
    let report = analytics
        .distribution(tick.tick, policy.distribution_window_ticks)
        .await
        .degrade("distribution");
    println!("\n📊 Holder Distribution ({} holders, approx.)", report.holders);
    for tier in &report.tiers {
        println!("   {:<10} {:>5} holders  {:>6.2}%", tier.label, tier.holders, tier.percentage);
    }

    let stats = gateway.cache_stats();
    println!("\n📈 Requests dispatched: {}", gateway.dispatched());
    println!("   Cache: {} hits / {} misses ({} entries)", stats.hits, stats.misses, stats.entries);

    poller.abort();
    Ok(())
}
