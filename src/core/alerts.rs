//! Alert generation over a transaction window
//!
//! Scan order is the output order. Severity never reorders alerts, and the
//! scan stops once `max_alerts` have been collected.

use alloy_primitives::U256;
use serde::Serialize;
use std::collections::HashSet;

use crate::models::types::Transaction;
use crate::utils::decoder::{short_identity, to_display_units};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    /// Transfer above the threshold
    Whale,
    /// First sighting of a source wallet moving more than half the threshold
    NewWallet,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Impact {
    High,
    Medium,
    Low,
}

impl Impact {
    pub fn as_str(&self) -> &'static str {
        match self {
            Impact::High => "High impact",
            Impact::Medium => "Medium impact",
            Impact::Low => "Low impact",
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Alert {
    pub id: String,
    pub kind: AlertKind,
    pub impact: Impact,
    pub tick: u64,
    /// Amount in QU (display only)
    pub amount_qu: f64,
    pub source: String,
    pub message: String,
}

/// Threshold policy. `threshold` is in QU; `unit_divisor` converts raw
/// amounts into QU (1 when the ledger already reports QU).
#[derive(Debug, Clone)]
pub struct AlertPolicy {
    pub threshold: U256,
    pub unit_divisor: u64,
    pub max_alerts: usize,
}

impl AlertPolicy {
    pub fn new(threshold: U256, max_alerts: usize) -> Self {
        Self {
            threshold,
            unit_divisor: 1,
            max_alerts,
        }
    }

    /// Threshold in raw units, compared at integer precision
    fn raw_threshold(&self) -> U256 {
        self.threshold.saturating_mul(U256::from(self.unit_divisor.max(1)))
    }
}

/// Flag whale transfers and first-seen large senders.
///
/// - amount > 2 x threshold -> Whale / High
/// - amount > threshold     -> Whale / Medium
/// - otherwise, amount > threshold / 2 from a source not seen above that
///   level before -> NewWallet / Low
///
/// A source is remembered once it moves more than half the threshold,
/// including via a whale transfer. Unsettled transfers are ignored.
pub fn generate_alerts(transactions: &[Transaction], policy: &AlertPolicy) -> Vec<Alert> {
    let raw = policy.raw_threshold();
    let double = raw.saturating_mul(U256::from(2u8));
    let mut seen_sources: HashSet<&str> = HashSet::new();
    let mut alerts = Vec::new();

    for tx in transactions {
        if alerts.len() >= policy.max_alerts {
            break;
        }
        let Some(amount) = tx.settled_amount() else {
            continue;
        };
        // amount > threshold / 2, without integer truncation
        let above_half = amount.saturating_mul(U256::from(2u8)) > raw;
        let first_sighting = above_half && seen_sources.insert(tx.source_id.as_str());
        let qu = to_display_units(amount, policy.unit_divisor);

        let (kind, impact) = if amount > double {
            (AlertKind::Whale, Impact::High)
        } else if amount > raw {
            (AlertKind::Whale, Impact::Medium)
        } else if first_sighting {
            (AlertKind::NewWallet, Impact::Low)
        } else {
            continue;
        };

        let source = short_identity(&tx.source_id);
        let message = match kind {
            AlertKind::Whale => format!(
                "{}: {:.0} QU moved {} -> {}",
                impact.as_str(),
                qu,
                source,
                short_identity(&tx.dest_id)
            ),
            AlertKind::NewWallet => format!("New wallet {} moved {:.0} QU", source, qu),
        };
        let id = if tx.tx_id.is_empty() {
            format!("{}-{}", tx.tick_number, alerts.len())
        } else {
            tx.tx_id.clone()
        };

        alerts.push(Alert {
            id,
            kind,
            impact,
            tick: tx.tick_number,
            amount_qu: qu,
            source,
            message,
        });
    }

    alerts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(threshold: u64) -> AlertPolicy {
        AlertPolicy::new(U256::from(threshold), 8)
    }

    #[test]
    fn test_high_and_medium_impact() {
        let high = generate_alerts(&[Transaction::transfer("A", "B", 2500, 1)], &policy(1000));
        assert_eq!(high.len(), 1);
        assert_eq!((high[0].kind, high[0].impact), (AlertKind::Whale, Impact::High));

        let medium = generate_alerts(&[Transaction::transfer("A", "B", 1200, 1)], &policy(1000));
        assert_eq!(medium.len(), 1);
        assert_eq!((medium[0].kind, medium[0].impact), (AlertKind::Whale, Impact::Medium));
    }

    #[test]
    fn test_boundaries_are_strict() {
        let at_double = generate_alerts(&[Transaction::transfer("A", "B", 2000, 1)], &policy(1000));
        assert_eq!(at_double[0].impact, Impact::Medium);
        // exactly half the threshold is not "above half"
        assert!(generate_alerts(&[Transaction::transfer("A", "B", 500, 1)], &policy(1000)).is_empty());
    }

    #[test]
    fn test_new_wallet_only_first_time() {
        let txs = vec![
            Transaction::transfer("N", "B", 600, 1),
            Transaction::transfer("N", "C", 700, 2),
            Transaction::transfer("M", "C", 100, 2),
        ];
        let alerts = generate_alerts(&txs, &policy(1000));
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].kind, AlertKind::NewWallet);
        assert_eq!(alerts[0].tick, 1);
    }

    #[test]
    fn test_whale_source_not_reported_as_new_later() {
        let txs = vec![
            Transaction::transfer("W", "B", 5000, 1),
            Transaction::transfer("W", "C", 600, 2),
        ];
        let alerts = generate_alerts(&txs, &policy(1000));
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].kind, AlertKind::Whale);
    }

    #[test]
    fn test_cap_keeps_scan_order() {
        let mut txs: Vec<Transaction> = (0..12)
            .map(|i| Transaction::transfer(&format!("S{}", i), "D", 1500, i))
            .collect();
        // a high-impact transfer past the cap must not displace earlier ones
        txs.push(Transaction::transfer("BIG", "D", 1_000_000, 99));

        let alerts = generate_alerts(&txs, &policy(1000));
        assert_eq!(alerts.len(), 8);
        let ticks: Vec<u64> = alerts.iter().map(|a| a.tick).collect();
        assert_eq!(ticks, (0..8).collect::<Vec<u64>>());
    }

    #[test]
    fn test_unsettled_ignored() {
        let tx = Transaction::transfer("A", "B", 9999, 1).with_money_flew(Some(false));
        assert!(generate_alerts(&[tx], &policy(1000)).is_empty());
    }

    #[test]
    fn test_unit_divisor_converts_before_compare() {
        let mut p = policy(1000);
        p.unit_divisor = 1_000;
        let alerts = generate_alerts(&[Transaction::transfer("A", "B", 2_500_000, 1)], &p);
        assert_eq!(alerts[0].impact, Impact::High);
        assert_eq!(alerts[0].amount_qu, 2500.0);
    }
}
