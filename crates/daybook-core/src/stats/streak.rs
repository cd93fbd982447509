//! Consecutive-day streaks and the weekly writing goal

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::clock::DayKey;
use super::count_u32;

/// Distinct writing days wanted per week unless configured otherwise
pub const DEFAULT_WEEKLY_GOAL: u32 = 3;

/// Streak figures for one user
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakSummary {
    /// Run of consecutive days ending today (or yesterday)
    pub current_streak: u32,
    /// Longest run of consecutive days ever
    pub longest_streak: u32,
    /// Distinct days with at least one entry
    pub total_days: u32,
}

/// Length of the run of written days ending today, or yesterday if today is
/// still blank.
///
/// Yesterday acts as a one-day grace period: a streak is only broken once a
/// full day has passed without an entry.
pub fn current_streak(days: &BTreeSet<DayKey>, today: DayKey) -> u32 {
    let anchor = if days.contains(&today) {
        Some(today)
    } else {
        today.pred().filter(|yesterday| days.contains(yesterday))
    };
    let Some(mut cursor) = anchor else {
        return 0;
    };

    let mut streak = 1;
    while let Some(previous) = cursor.pred() {
        if !days.contains(&previous) {
            break;
        }
        streak += 1;
        cursor = previous;
    }
    streak
}

/// Longest run of consecutive days anywhere in `days`
pub fn longest_streak(days: &BTreeSet<DayKey>) -> u32 {
    let mut longest = 0;
    let mut run = 0;
    let mut previous: Option<DayKey> = None;

    for &day in days {
        run = match previous {
            Some(prev) if prev.succ() == Some(day) => run + 1,
            _ => 1,
        };
        longest = longest.max(run);
        previous = Some(day);
    }
    longest
}

/// Current, longest and total figures in one pass over the day set
pub fn summarize_streaks(days: &BTreeSet<DayKey>, today: DayKey) -> StreakSummary {
    let current = current_streak(days, today);
    StreakSummary {
        current_streak: current,
        longest_streak: longest_streak(days).max(current),
        total_days: count_u32(days.len()),
    }
}

/// Progress toward the weekly writing goal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyProgress {
    pub goal: u32,
    /// Distinct days written since the start of the week
    pub days_written: u32,
    /// 0..=100
    pub percent: u32,
    pub remaining: u32,
    pub is_met: bool,
}

/// Count distinct written days from `week_start` onward against `goal`
pub fn weekly_progress(days: &BTreeSet<DayKey>, week_start: DayKey, goal: u32) -> WeeklyProgress {
    let days_written = count_u32(days.range(week_start..).count());
    let percent = if goal == 0 {
        100
    } else {
        (u64::from(days_written) * 100 / u64::from(goal)).min(100)
    };

    WeeklyProgress {
        goal,
        days_written,
        percent: u32::try_from(percent).unwrap_or(100),
        remaining: goal.saturating_sub(days_written),
        is_met: days_written >= goal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn day(y: i32, m: u32, d: u32) -> DayKey {
        DayKey::new(NaiveDate::from_ymd_opt(y, m, d).unwrap())
    }

    fn set(days: &[DayKey]) -> BTreeSet<DayKey> {
        days.iter().copied().collect()
    }

    const fn summary(current: u32, longest: u32, total: u32) -> StreakSummary {
        StreakSummary {
            current_streak: current,
            longest_streak: longest,
            total_days: total,
        }
    }

    #[test]
    fn empty_set_has_no_streaks() {
        assert_eq!(summarize_streaks(&BTreeSet::new(), day(2024, 1, 3)), summary(0, 0, 0));
    }

    #[test]
    fn single_entry_today() {
        let today = day(2024, 1, 3);
        assert_eq!(summarize_streaks(&set(&[today]), today), summary(1, 1, 1));
    }

    #[test]
    fn three_consecutive_days_ending_today() {
        let days = set(&[day(2024, 1, 1), day(2024, 1, 2), day(2024, 1, 3)]);
        assert_eq!(summarize_streaks(&days, day(2024, 1, 3)), summary(3, 3, 3));
    }

    #[test]
    fn gap_before_today_breaks_current_run() {
        let days = set(&[day(2024, 1, 1), day(2024, 1, 3)]);
        assert_eq!(summarize_streaks(&days, day(2024, 1, 3)), summary(1, 1, 2));
    }

    #[test]
    fn today_and_three_days_ago() {
        let days = set(&[day(2024, 1, 7), day(2024, 1, 10)]);
        assert_eq!(summarize_streaks(&days, day(2024, 1, 10)), summary(1, 1, 2));
    }

    #[test]
    fn yesterday_keeps_streak_alive() {
        let days = set(&[day(2024, 1, 1), day(2024, 1, 2)]);
        assert_eq!(current_streak(&days, day(2024, 1, 3)), 2);
    }

    #[test]
    fn two_blank_days_end_the_streak() {
        let days = set(&[day(2024, 1, 1), day(2024, 1, 2)]);
        assert_eq!(current_streak(&days, day(2024, 1, 4)), 0);
        assert_eq!(longest_streak(&days), 2);
    }

    #[test]
    fn longest_run_in_the_past() {
        let days = set(&[
            day(2023, 12, 1),
            day(2023, 12, 2),
            day(2023, 12, 3),
            day(2023, 12, 4),
            day(2024, 1, 2),
            day(2024, 1, 3),
        ]);
        assert_eq!(summarize_streaks(&days, day(2024, 1, 3)), summary(2, 4, 6));
    }

    #[test]
    fn runs_cross_month_and_year_boundaries() {
        let days = set(&[day(2023, 12, 30), day(2023, 12, 31), day(2024, 1, 1)]);
        assert_eq!(summarize_streaks(&days, day(2024, 1, 1)), summary(3, 3, 3));
    }

    #[test]
    fn longest_never_below_current() {
        let today = day(2024, 3, 1);
        for len in 0..10u64 {
            let days: BTreeSet<DayKey> = (0..len).filter_map(|n| today.minus_days(n)).collect();
            let summary = summarize_streaks(&days, today);
            assert!(summary.longest_streak >= summary.current_streak);
            assert_eq!(u64::from(summary.current_streak), len);
        }
    }

    #[test]
    fn weekly_progress_counts_days_since_sunday() {
        let days = set(&[day(2024, 1, 13), day(2024, 1, 14), day(2024, 1, 16)]);
        let progress = weekly_progress(&days, day(2024, 1, 14), 3);
        assert_eq!(progress.days_written, 2);
        assert_eq!(progress.percent, 66);
        assert_eq!(progress.remaining, 1);
        assert!(!progress.is_met);
    }

    #[test]
    fn weekly_progress_caps_at_hundred() {
        let days = set(&[day(2024, 1, 14), day(2024, 1, 15), day(2024, 1, 16), day(2024, 1, 17)]);
        let progress = weekly_progress(&days, day(2024, 1, 14), 3);
        assert_eq!(progress.percent, 100);
        assert_eq!(progress.remaining, 0);
        assert!(progress.is_met);
    }
}
