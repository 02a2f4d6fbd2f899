//! Activity heatmap: transaction counts by (weekday, 4-hour window)

use chrono::{Datelike, Timelike};
use serde::Serialize;

use crate::core::ticks::TickClock;
use crate::utils::constants::{HEATMAP_WINDOWS, WEEKDAY_LABELS};

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct HeatmapCell {
    /// "Mon".."Sun"
    pub day: String,
    /// "00-04", "04-08", ...
    pub window: String,
    pub count: u64,
}

/// Full 7 x 6 grid, Monday first, windows ascending; empty cells stay at 0.
///
/// `tick_counts` holds (tick, number of transactions in that tick); each tick
/// is placed using the same tick -> time approximation as holder growth.
pub fn activity_heatmap(tick_counts: &[(u64, usize)], clock: &TickClock) -> Vec<HeatmapCell> {
    let mut grid = [[0u64; HEATMAP_WINDOWS]; 7];

    for (tick, count) in tick_counts {
        let ts = clock.timestamp_of(*tick);
        let day = ts.weekday().num_days_from_monday() as usize;
        let window = (ts.hour() / 4) as usize;
        grid[day][window] += *count as u64;
    }

    let mut cells = Vec::with_capacity(7 * HEATMAP_WINDOWS);
    for (day, row) in grid.iter().enumerate() {
        for (window, count) in row.iter().enumerate() {
            cells.push(HeatmapCell {
                day: WEEKDAY_LABELS[day].to_string(),
                window: format!("{:02}-{:02}", window * 4, window * 4 + 4),
                count: *count,
            });
        }
    }
    cells
}
