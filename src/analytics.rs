//! Analytics Service - aggregate data sources for the dashboard
//!
//! Fetches transaction batches through the `EndpointClient` and folds them
//! with the pure functions in `core`. Every accessor returns `AppResult`;
//! callers decide to propagate or `.degrade()` to an empty result.
//!
//! All windows end at the safe tick (current tick minus the configured lag),
//! because the freshest ticks may not be fully indexed upstream yet.

use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info};

use crate::core::{
    activity_heatmap, aggregate_wallets, distribution_tiers, generate_alerts, holder_growth,
    rank_whales, replay_balances, safe_tick, sample_ticks, tick_window, trade_pressure, Alert,
    AlertPolicy, DistributionReport, HeatmapCell, HolderPoint, TickClock, TradePressure,
    WhaleRecord,
};
use crate::models::config::AnalyticsPolicy;
use crate::models::errors::{AppError, AppResult, ErrorCode};
use crate::models::types::{TickRange, Transaction};
use crate::providers::rpc::EndpointClient;
use crate::providers::transport::{HttpTransport, Transport};
use crate::utils::constants::MAX_WINDOW_TICKS;

pub struct AnalyticsService<T: Transport = HttpTransport> {
    client: Arc<EndpointClient<T>>,
    policy: AnalyticsPolicy,
}

impl<T: Transport> AnalyticsService<T> {
    pub fn new(client: Arc<EndpointClient<T>>, policy: AnalyticsPolicy) -> Self {
        Self { client, policy }
    }

    pub fn client(&self) -> &Arc<EndpointClient<T>> {
        &self.client
    }

    pub fn policy(&self) -> &AnalyticsPolicy {
        &self.policy
    }

    pub fn alert_policy(&self) -> AlertPolicy {
        AlertPolicy::new(self.policy.alert_threshold, self.policy.max_alerts)
    }

    /// Window of `width` ticks ending at the safe tick
    pub fn window(&self, current_tick: u64, width: u64) -> AppResult<TickRange> {
        if width == 0 || width > MAX_WINDOW_TICKS {
            return Err(AppError::invalid_argument(format!(
                "window must be within 1..={} ticks, got {}",
                MAX_WINDOW_TICKS, width
            )));
        }
        tick_window(current_tick, self.policy.tick_lag, width).ok_or_else(AppError::tick_not_ready)
    }

    fn safe(&self, current_tick: u64) -> AppResult<u64> {
        safe_tick(current_tick, self.policy.tick_lag).ok_or_else(AppError::tick_not_ready)
    }

    fn clock(&self, reference_tick: u64) -> TickClock {
        TickClock::new(reference_tick, Utc::now(), self.policy.millis_per_tick)
    }

    /// Transactions of one tick; a 404 means the archive has nothing for it
    async fn tick_batch(&self, tick: u64) -> AppResult<Vec<Transaction>> {
        match self.client.tick_transactions(tick).await {
            Err(e) if e.code == ErrorCode::RpcUpstream && e.upstream_status == Some(404) => {
                debug!("tick {} not in archive, treating as empty", tick);
                Ok(Vec::new())
            }
            other => other,
        }
    }

    /// All transactions in `range`, in tick order. Requests are serialized
    /// by the gateway's queue anyway, so they are issued one by one.
    pub async fn collect_window(&self, range: TickRange) -> AppResult<Vec<Transaction>> {
        let mut all = Vec::new();
        for tick in range.ticks() {
            all.extend(self.tick_batch(tick).await?);
        }
        debug!("📦 collected {} txs over ticks {}..={}", all.len(), range.start, range.end);
        Ok(all)
    }

    // ============================================
    // Aggregate accessors
    // ============================================

    pub async fn whale_activity(&self, current_tick: u64, width: u64, top_n: usize) -> AppResult<Vec<WhaleRecord>> {
        let range = self.window(current_tick, width)?;
        let txs = self.collect_window(range).await?;
        let agg = aggregate_wallets(&txs);
        let whales = rank_whales(&agg, top_n, self.policy.display_divisor);
        info!("🐋 {} whales from {} wallets ({}..={})", whales.len(), agg.len(), range.start, range.end);
        Ok(whales)
    }

    pub async fn whale_alerts(&self, current_tick: u64, width: u64, policy: &AlertPolicy) -> AppResult<Vec<Alert>> {
        let range = self.window(current_tick, width)?;
        let txs = self.collect_window(range).await?;
        Ok(generate_alerts(&txs, policy))
    }

    /// Point samples of distinct active wallets, see `core::holders`
    pub async fn holder_growth(&self, current_tick: u64) -> AppResult<Vec<HolderPoint>> {
        let end = self.safe(current_tick)?;
        let ticks = sample_ticks(end, self.policy.holder_sample_points, self.policy.holder_sample_stride);

        let mut samples = Vec::with_capacity(ticks.len());
        for tick in ticks {
            samples.push((tick, self.tick_batch(tick).await?));
        }
        Ok(holder_growth(&samples, &self.clock(end)))
    }

    /// Approximate tiers from balance replay, see `core::distribution`
    pub async fn distribution(&self, current_tick: u64, width: u64) -> AppResult<DistributionReport> {
        let range = self.window(current_tick, width)?;
        let txs = self.collect_window(range).await?;
        Ok(distribution_tiers(&replay_balances(&txs)))
    }

    pub async fn activity_heatmap(&self, current_tick: u64) -> AppResult<Vec<HeatmapCell>> {
        let end = self.safe(current_tick)?;
        let ticks = sample_ticks(end, self.policy.heatmap_sample_points, self.policy.heatmap_sample_stride);

        let mut counts = Vec::with_capacity(ticks.len());
        for tick in ticks {
            counts.push((tick, self.tick_batch(tick).await?.len()));
        }
        Ok(activity_heatmap(&counts, &self.clock(end)))
    }

    pub async fn trade_pressure(&self, current_tick: u64, width: u64) -> AppResult<TradePressure> {
        let range = self.window(current_tick, width)?;
        let txs = self.collect_window(range).await?;
        Ok(trade_pressure(&txs, &self.policy.flow_bands, self.policy.display_divisor))
    }
}
