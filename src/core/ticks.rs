//! Tick arithmetic: safe tick, query windows, tick -> wall-clock approximation

use chrono::{DateTime, Duration as ChronoDuration, Utc};

use crate::models::types::TickRange;

/// Most recent tick considered reliably indexed.
///
/// `None` while the current tick is unknown (zero) or not past the lag.
pub fn safe_tick(current_tick: u64, lag: u64) -> Option<u64> {
    if current_tick == 0 {
        return None;
    }
    current_tick.checked_sub(lag).filter(|t| *t > 0)
}

/// Inclusive window of `width` ticks ending at the safe tick.
///
/// current 5000, lag 100, width 10 -> 4891..=4900
pub fn tick_window(current_tick: u64, lag: u64, width: u64) -> Option<TickRange> {
    let end = safe_tick(current_tick, lag)?;
    if width == 0 {
        return None;
    }
    let start = end.saturating_sub(width - 1).max(1);
    Some(TickRange { start, end })
}

/// Sample ticks going back from `end` at a fixed stride, oldest first
pub fn sample_ticks(end: u64, points: usize, stride: u64) -> Vec<u64> {
    let mut ticks: Vec<u64> = (0..points as u64)
        .map_while(|i| end.checked_sub(i * stride))
        .filter(|t| *t > 0)
        .collect();
    ticks.reverse();
    ticks
}

/// Maps ticks to approximate timestamps: `reference_time` is assumed to be
/// the wall-clock time of `reference_tick`, and every tick lasts
/// `millis_per_tick`. This is an estimate, not the ledger's own timestamp.
#[derive(Debug, Clone, Copy)]
pub struct TickClock {
    pub reference_tick: u64,
    pub reference_time: DateTime<Utc>,
    pub millis_per_tick: i64,
}

impl TickClock {
    pub fn new(reference_tick: u64, reference_time: DateTime<Utc>, millis_per_tick: i64) -> Self {
        Self {
            reference_tick,
            reference_time,
            millis_per_tick,
        }
    }

    pub fn timestamp_of(&self, tick: u64) -> DateTime<Utc> {
        let offset = tick as i64 - self.reference_tick as i64;
        self.reference_time + ChronoDuration::milliseconds(offset.saturating_mul(self.millis_per_tick))
    }
}
