//! Buy/sell pressure by amount magnitude
//!
//! Heuristic only: a transfer is called a buy or a sell purely from its size
//! relative to configurable `FlowBands`; the ledger carries no trade side.

use alloy_primitives::U256;
use serde::Serialize;

use crate::models::config::FlowBands;
use crate::models::types::Transaction;
use crate::utils::decoder::to_display_units;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowSide {
    Buy,
    Sell,
    Neutral,
}

pub fn classify_flow(amount: U256, bands: &FlowBands) -> FlowSide {
    if amount >= bands.buy_min {
        FlowSide::Buy
    } else if amount <= bands.sell_max {
        FlowSide::Sell
    } else {
        FlowSide::Neutral
    }
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct TradePressure {
    pub buys: usize,
    pub sells: usize,
    pub neutral: usize,
    /// display units
    pub buy_volume: f64,
    pub sell_volume: f64,
    /// buys / (buys + sells), 0.5 when there is nothing to compare
    pub buy_ratio: f64,
}

/// Count settled transfers per side; volumes are summed in U256 first
pub fn trade_pressure(transactions: &[Transaction], bands: &FlowBands, divisor: u64) -> TradePressure {
    let (mut buys, mut sells, mut neutral) = (0usize, 0usize, 0usize);
    let (mut buy_raw, mut sell_raw) = (U256::ZERO, U256::ZERO);

    for amount in transactions.iter().filter_map(Transaction::settled_amount) {
        match classify_flow(amount, bands) {
            FlowSide::Buy => {
                buys += 1;
                buy_raw = buy_raw.saturating_add(amount);
            }
            FlowSide::Sell => {
                sells += 1;
                sell_raw = sell_raw.saturating_add(amount);
            }
            FlowSide::Neutral => neutral += 1,
        }
    }

    let sided = buys + sells;
    TradePressure {
        buys,
        sells,
        neutral,
        buy_volume: to_display_units(buy_raw, divisor),
        sell_volume: to_display_units(sell_raw, divisor),
        buy_ratio: if sided == 0 { 0.5 } else { buys as f64 / sided as f64 },
    }
}
