//! Writing statistics.
//!
//! Everything here is synchronous and side-effect free: callers fetch the
//! records first, then hand them over together with a [`LocalClock`] that
//! fixes "now" and the zone days are counted in.

mod aggregate;
mod calendar;
mod clock;
mod mood;
mod streak;
mod todos;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub use aggregate::{aggregate_stats, rounded_average, AggregateStats, StatRecord};
pub use calendar::{calendar_window, leading_padding, DayCell, DEFAULT_WINDOW_DAYS, MAX_WINDOW_DAYS};
pub use clock::{normalize_days, DayKey, LocalClock, MAX_OFFSET_MINUTES, MIN_OFFSET_MINUTES};
pub use mood::{mood_report, mood_trend, MoodCount, MoodRange, MoodReport, MoodTrend};
pub use streak::{
    current_streak, longest_streak, summarize_streaks, weekly_progress, StreakSummary, WeeklyProgress,
    DEFAULT_WEEKLY_GOAL,
};
pub use todos::TodoSummary;

/// Tunables for [`build_dashboard`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardOptions {
    pub weekly_goal: u32,
    pub window_days: u32,
}

impl Default for DashboardOptions {
    fn default() -> Self {
        Self {
            weekly_goal: DEFAULT_WEEKLY_GOAL,
            window_days: DEFAULT_WINDOW_DAYS,
        }
    }
}

impl DashboardOptions {
    /// Reject windows larger than [`MAX_WINDOW_DAYS`].
    pub fn validate(self) -> Result<Self> {
        if self.window_days > MAX_WINDOW_DAYS {
            return Err(Error::InvalidInput(format!(
                "window_days must be at most {MAX_WINDOW_DAYS}, got {}",
                self.window_days
            )));
        }
        Ok(self)
    }
}

/// Everything the overview screen shows, computed from one snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dashboard {
    pub today: DayKey,
    pub totals: AggregateStats,
    pub streaks: StreakSummary,
    pub weekly: WeeklyProgress,
    pub calendar: Vec<DayCell>,
}

pub fn build_dashboard(records: &[StatRecord], clock: &LocalClock, options: DashboardOptions) -> Dashboard {
    let today = clock.today();
    let days = normalize_days(records.iter().map(|record| record.created_at), clock);

    Dashboard {
        today,
        totals: aggregate_stats(records, clock),
        streaks: summarize_streaks(&days, today),
        weekly: weekly_progress(&days, clock.start_of_week(), options.weekly_goal),
        calendar: calendar_window(&days, today, options.window_days),
    }
}

/// Saturating `usize` to `u32` for counters
pub(crate) fn count_u32(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}
