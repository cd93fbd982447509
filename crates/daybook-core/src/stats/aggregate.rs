//! Totals and averages over a user's entries

use serde::{Deserialize, Serialize};

use super::clock::LocalClock;
use super::count_u32;
use crate::models::JournalEntry;

/// The slice of an entry the statistics need.
///
/// Every field is optional so partially loaded rows still aggregate: missing
/// numbers count as zero, a missing timestamp drops the row from date-based
/// figures only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatRecord {
    /// Unix ms
    pub created_at: Option<i64>,
    pub word_count: Option<u32>,
    pub is_favorite: Option<bool>,
    pub mood: Option<String>,
}

impl From<&JournalEntry> for StatRecord {
    fn from(entry: &JournalEntry) -> Self {
        Self {
            created_at: Some(entry.created_at),
            word_count: Some(entry.word_count),
            is_favorite: Some(entry.is_favorite),
            mood: entry.mood.map(|mood| mood.as_str().to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateStats {
    pub total_entries: u32,
    pub total_words: u64,
    /// Rounded to the nearest integer, 0 with no entries
    pub average_words: u32,
    pub favorite_count: u32,
    /// Entries created since local midnight on the first of this month
    pub entries_this_month: u32,
}

/// Fold the records into totals. Order of `records` does not matter.
pub fn aggregate_stats(records: &[StatRecord], clock: &LocalClock) -> AggregateStats {
    let month_start = clock.start_of_month_ms();

    let total_words: u64 = records
        .iter()
        .map(|record| u64::from(record.word_count.unwrap_or(0)))
        .sum();
    let favorite_count = records
        .iter()
        .filter(|record| record.is_favorite.unwrap_or(false))
        .count();
    let entries_this_month = records
        .iter()
        .filter(|record| record.created_at.is_some_and(|ts| ts >= month_start))
        .count();

    AggregateStats {
        total_entries: count_u32(records.len()),
        total_words,
        average_words: rounded_average(total_words, records.len() as u64),
        favorite_count: count_u32(favorite_count),
        entries_this_month: count_u32(entries_this_month),
    }
}

/// `total / count` rounded half up; 0 when `count` is 0
#[must_use]
pub fn rounded_average(total: u64, count: u64) -> u32 {
    if count == 0 {
        return 0;
    }
    let average = (total.saturating_mul(2) + count) / count.saturating_mul(2);
    u32::try_from(average).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;

    fn clock() -> LocalClock {
        LocalClock::utc(Utc.with_ymd_and_hms(2024, 1, 17, 12, 0, 0).unwrap())
    }

    fn record(day: (i32, u32, u32), words: Option<u32>, favorite: Option<bool>) -> StatRecord {
        let (y, m, d) = day;
        StatRecord {
            created_at: Some(Utc.with_ymd_and_hms(y, m, d, 9, 0, 0).unwrap().timestamp_millis()),
            word_count: words,
            is_favorite: favorite,
            mood: None,
        }
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(aggregate_stats(&[], &clock()), AggregateStats::default());
    }

    #[test]
    fn test_totals_and_month_boundary() {
        let records = vec![
            record((2023, 12, 31), Some(100), Some(true)),
            record((2024, 1, 1), Some(51), Some(false)),
            record((2024, 1, 16), None, None),
        ];
        let stats = aggregate_stats(&records, &clock());
        assert_eq!(
            stats,
            AggregateStats {
                total_entries: 3,
                total_words: 151,
                average_words: 50,
                favorite_count: 1,
                entries_this_month: 2,
            }
        );
    }

    #[test]
    fn test_missing_timestamp_still_counted() {
        let records = vec![StatRecord {
            word_count: Some(10),
            ..StatRecord::default()
        }];
        let stats = aggregate_stats(&records, &clock());
        assert_eq!(stats.total_entries, 1);
        assert_eq!(stats.total_words, 10);
        assert_eq!(stats.entries_this_month, 0);
    }

    #[test]
    fn test_order_invariance() {
        let mut records = vec![
            record((2024, 1, 2), Some(7), Some(true)),
            record((2024, 1, 5), Some(300), None),
            record((2023, 6, 1), Some(42), Some(false)),
        ];
        let forward = aggregate_stats(&records, &clock());
        records.reverse();
        assert_eq!(aggregate_stats(&records, &clock()), forward);
    }

    #[test]
    fn test_rounded_average() {
        assert_eq!(rounded_average(0, 0), 0);
        assert_eq!(rounded_average(5, 2), 3);
        assert_eq!(rounded_average(4, 3), 1);
        assert_eq!(rounded_average(5, 3), 2);
        assert_eq!(rounded_average(100, 1), 100);
    }

    #[test]
    fn test_average_reconstructs_total() {
        for count in 1..20u64 {
            for total in [0u64, 1, 17, 199, 1000, 12_345] {
                let avg = u64::from(rounded_average(total, count));
                let rebuilt = avg * count;
                assert!(rebuilt.abs_diff(total) * 2 <= count, "total={total} count={count}");
            }
        }
    }
}
