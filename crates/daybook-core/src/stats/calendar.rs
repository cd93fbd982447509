//! Trailing day-presence window for heatmap display

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::clock::DayKey;

pub const DEFAULT_WINDOW_DAYS: u32 = 30;
/// Largest window a dashboard may ask for
pub const MAX_WINDOW_DAYS: u32 = 366;

/// One day in the calendar window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayCell {
    pub date: DayKey,
    pub has_entry: bool,
    pub is_today: bool,
    /// 0 = Sunday
    pub weekday: u8,
}

/// `window` cells running from `today - (window - 1)` up to `today`, oldest first.
///
/// The cell count depends only on `window`, never on how many days are present.
pub fn calendar_window(days: &BTreeSet<DayKey>, today: DayKey, window: u32) -> Vec<DayCell> {
    (0..u64::from(window))
        .rev()
        .filter_map(|back| today.minus_days(back))
        .map(|date| DayCell {
            date,
            has_entry: days.contains(&date),
            is_today: date == today,
            weekday: date.weekday_index(),
        })
        .collect()
}

/// Blank cells needed before the first cell so a 7-column grid starts on Sunday
#[must_use]
pub fn leading_padding(cells: &[DayCell]) -> u8 {
    cells.first().map_or(0, |cell| cell.weekday)
}
