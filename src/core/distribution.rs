//! Holder distribution tiers from replayed balances
//!
//! LIMITATION: balances are reconstructed by replaying transfers over a short
//! tick window starting from zero. Sources that would go negative are clamped
//! to zero, so the result is an approximation of relative weight inside the
//! window, not a balance ledger. Exact balances need an indexed snapshot.

use alloy_primitives::U256;
use serde::Serialize;
use std::collections::HashMap;

use crate::models::types::Transaction;
use crate::utils::constants::TIER_BOUNDS;
use crate::utils::decoder::serialize_amount;

/// Replayed balances, first-seen order for deterministic tie handling
#[derive(Debug, Clone, Default)]
pub struct ReplayedBalances {
    order: Vec<String>,
    balances: HashMap<String, U256>,
}

impl ReplayedBalances {
    fn slot(&mut self, wallet: &str) -> &mut U256 {
        if !self.balances.contains_key(wallet) {
            self.order.push(wallet.to_string());
        }
        self.balances.entry(wallet.to_string()).or_default()
    }

    pub fn get(&self, wallet: &str) -> U256 {
        self.balances.get(wallet).copied().unwrap_or(U256::ZERO)
    }

    pub fn total(&self) -> U256 {
        self.balances.values().fold(U256::ZERO, |acc, b| acc.saturating_add(*b))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, U256)> {
        self.order
            .iter()
            .map(move |id| (id.as_str(), self.balances.get(id).copied().unwrap_or(U256::ZERO)))
    }

    /// Seed a balance directly (snapshots, tests)
    pub fn set(&mut self, wallet: &str, balance: U256) {
        *self.slot(wallet) = balance;
    }
}

/// Replay settled transfers in order: credit destination, debit source only
/// if it can cover the amount, otherwise clamp the source to zero.
pub fn replay_balances(transactions: &[Transaction]) -> ReplayedBalances {
    let mut replay = ReplayedBalances::default();
    for tx in transactions {
        let Some(amount) = tx.settled_amount() else {
            continue;
        };
        let src = replay.slot(&tx.source_id);
        *src = src.checked_sub(amount).unwrap_or(U256::ZERO);
        let dst = replay.slot(&tx.dest_id);
        *dst = dst.saturating_add(amount);
    }
    replay
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DistributionTier {
    /// "Top 1-3", "Top 4-10", "Top 11-50", "Others"
    pub label: String,
    pub holders: usize,
    #[serde(serialize_with = "serialize_amount")]
    pub amount: U256,
    /// Share of total, 2 decimal places
    pub percentage: f64,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct DistributionReport {
    #[serde(serialize_with = "serialize_amount")]
    pub total_supply: U256,
    pub holders: usize,
    pub tiers: Vec<DistributionTier>,
}

/// Bucket wallets ranked by balance into fixed tiers.
///
/// Zero balances are left out. Tier amounts always sum to `total_supply`.
/// Percentages are computed in basis points at integer precision and only
/// then turned into a 2-decimal figure.
pub fn distribution_tiers(balances: &ReplayedBalances) -> DistributionReport {
    let mut ranked: Vec<U256> = balances.iter().map(|(_, b)| b).filter(|b| !b.is_zero()).collect();
    ranked.sort_by(|a, b| b.cmp(a));

    let total = ranked.iter().fold(U256::ZERO, |acc, b| acc.saturating_add(*b));
    let mut tiers = Vec::with_capacity(TIER_BOUNDS.len() + 1);

    let mut bounds: Vec<(String, usize, usize)> = TIER_BOUNDS
        .iter()
        .map(|(lo, hi)| (format!("Top {}-{}", lo, hi), *lo, *hi))
        .collect();
    let last_hi = TIER_BOUNDS.last().map(|(_, hi)| *hi).unwrap_or(0);
    bounds.push(("Others".to_string(), last_hi + 1, usize::MAX));

    for (label, lo, hi) in bounds {
        let start = (lo - 1).min(ranked.len());
        let end = hi.min(ranked.len());
        let slice = &ranked[start..end];
        let amount = slice.iter().fold(U256::ZERO, |acc, b| acc.saturating_add(*b));
        tiers.push(DistributionTier {
            label,
            holders: slice.len(),
            amount,
            percentage: percentage_2dp(amount, total),
        });
    }

    DistributionReport {
        total_supply: total,
        holders: ranked.len(),
        tiers,
    }
}

/// part / total as a percentage rounded half-up to 2 decimals
fn percentage_2dp(part: U256, total: U256) -> f64 {
    if total.is_zero() {
        return 0.0;
    }
    // basis points x 10 for rounding
    let scaled = part.saturating_mul(U256::from(100_000u64)) / total;
    let bps = (scaled + U256::from(5u8)) / U256::from(10u8);
    let bps: u64 = bps.try_into().unwrap_or(u64::MAX);
    bps as f64 / 100.0
}
