//! Wallet aggregation and whale ranking
//!
//! Per-wallet in/out totals are accumulated in `U256` and only converted to
//! display units after all additions are done.

use alloy_primitives::U256;
use serde::Serialize;
use std::collections::HashMap;

use crate::models::types::Transaction;
use crate::utils::decoder::to_display_units;

/// Outgoing and incoming totals of one wallet over one pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalletFlow {
    pub outgoing: U256,
    pub incoming: U256,
}

impl WalletFlow {
    pub fn volume(&self) -> U256 {
        self.incoming.saturating_add(self.outgoing)
    }
}

/// Wallet id -> flow, kept in first-seen order.
///
/// Iteration order is the order wallets first appear in the input, which is
/// what whale ranking uses to break volume ties. Different input orders can
/// therefore produce different tie orders.
#[derive(Debug, Clone, Default)]
pub struct WalletAggregate {
    order: Vec<String>,
    flows: HashMap<String, WalletFlow>,
}

impl WalletAggregate {
    fn entry(&mut self, wallet: &str) -> &mut WalletFlow {
        if !self.flows.contains_key(wallet) {
            self.order.push(wallet.to_string());
        }
        self.flows.entry(wallet.to_string()).or_default()
    }

    pub fn get(&self, wallet: &str) -> Option<&WalletFlow> {
        self.flows.get(wallet)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &WalletFlow)> {
        self.order
            .iter()
            .filter_map(move |id| self.flows.get(id).map(|flow| (id.as_str(), flow)))
    }
}

/// Fold settled transfers into per-wallet totals.
///
/// Skips `moneyFlew == false` and transactions without an amount. Both sides
/// get a zeroed entry before accumulation.
pub fn aggregate_wallets<'a, I>(transactions: I) -> WalletAggregate
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let mut agg = WalletAggregate::default();
    for tx in transactions {
        let Some(amount) = tx.settled_amount() else {
            continue;
        };
        let src = agg.entry(&tx.source_id);
        src.outgoing = src.outgoing.saturating_add(amount);
        let dst = agg.entry(&tx.dest_id);
        dst.incoming = dst.incoming.saturating_add(amount);
    }
    agg
}

/// One ranked whale. The wallet id is replaced by its rank label.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct WhaleRecord {
    /// "Whale #1", "Whale #2", ...
    pub label: String,
    pub rank: usize,
    /// Incoming, display units
    pub buys: f64,
    /// Outgoing, display units
    pub sells: f64,
    /// incoming - outgoing, display units
    pub net: f64,
    /// |buys| + |sells|, display units
    pub volume: f64,
}

/// Top-N wallets by total volume, descending.
///
/// Ties keep aggregate iteration order (stable sort). Identities are dropped;
/// only rank labels leave this function.
pub fn rank_whales(agg: &WalletAggregate, top_n: usize, divisor: u64) -> Vec<WhaleRecord> {
    let mut ranked: Vec<(U256, &WalletFlow)> = agg.iter().map(|(_, flow)| (flow.volume(), flow)).collect();
    ranked.sort_by(|a, b| b.0.cmp(&a.0));

    ranked
        .into_iter()
        .take(top_n)
        .enumerate()
        .map(|(i, (volume, flow))| {
            let buys = to_display_units(flow.incoming, divisor);
            let sells = to_display_units(flow.outgoing, divisor);
            let net = if flow.incoming >= flow.outgoing {
                to_display_units(flow.incoming - flow.outgoing, divisor)
            } else {
                -to_display_units(flow.outgoing - flow.incoming, divisor)
            };
            WhaleRecord {
                label: format!("Whale #{}", i + 1),
                rank: i + 1,
                buys,
                sells,
                net,
                volume: to_display_units(volume, divisor),
            }
        })
        .collect()
}
