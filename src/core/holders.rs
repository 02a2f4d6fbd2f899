//! Holder growth sampling
//!
//! Each point counts the distinct wallets on either side of a settled
//! transfer *within that sampled tick only*. It is a point sample per tick,
//! not a cumulative count of holders over history; the series shows activity
//! breadth over time and should be read as an approximation.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashSet;

use crate::core::ticks::TickClock;
use crate::models::types::Transaction;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct HolderPoint {
    pub tick: u64,
    /// Approximated from the tick offset, see `TickClock`
    pub timestamp: DateTime<Utc>,
    pub holders: usize,
}

/// Distinct wallets touched by settled transfers
pub fn distinct_wallets(transactions: &[Transaction]) -> usize {
    let mut wallets: HashSet<&str> = HashSet::new();
    for tx in transactions.iter().filter(|tx| tx.settled_amount().is_some()) {
        wallets.insert(tx.source_id.as_str());
        wallets.insert(tx.dest_id.as_str());
    }
    wallets.len()
}

/// One point per sampled tick, in the order given
pub fn holder_growth(samples: &[(u64, Vec<Transaction>)], clock: &TickClock) -> Vec<HolderPoint> {
    samples
        .iter()
        .map(|(tick, txs)| HolderPoint {
            tick: *tick,
            timestamp: clock.timestamp_of(*tick),
            holders: distinct_wallets(txs),
        })
        .collect()
}
