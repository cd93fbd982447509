//! Mood distribution and trend over a trailing range

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::{Days, Months};
use serde::{Deserialize, Serialize};

use super::aggregate::StatRecord;
use super::clock::LocalClock;
use super::count_u32;
use crate::error::Error;
use crate::models::Mood;

/// How far back a mood report looks
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoodRange {
    #[default]
    Week,
    Month,
    Year,
}

impl MoodRange {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Week => "week",
            Self::Month => "month",
            Self::Year => "year",
        }
    }

    /// Unix ms the range starts at, measured back from the clock's local time
    #[must_use]
    pub fn start_ms(self, clock: &LocalClock) -> i64 {
        let now = clock.local_now();
        let start = match self {
            Self::Week => now.checked_sub_days(Days::new(7)),
            Self::Month => now.checked_sub_months(Months::new(1)),
            Self::Year => now.checked_sub_months(Months::new(12)),
        };
        start.map_or(i64::MIN, |start| start.timestamp_millis())
    }
}

impl fmt::Display for MoodRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MoodRange {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "week" => Ok(Self::Week),
            "month" => Ok(Self::Month),
            "year" => Ok(Self::Year),
            other => Err(Error::InvalidInput(format!("Unknown mood range: {other}"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoodCount {
    pub mood: Mood,
    pub count: u32,
    /// Share of mood-tagged entries in range, rounded
    pub percentage: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoodTrend {
    Improving,
    Declining,
    Stable,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoodReport {
    pub range: MoodRange,
    /// Entries in range that carry a mood
    pub total: u32,
    /// Moods that occur at least once, in enum order
    pub counts: Vec<MoodCount>,
    pub most_frequent: Option<Mood>,
    /// `None` with fewer than two entries
    pub trend: Option<MoodTrend>,
}

/// Summarize the moods of records created within `range`.
///
/// Records without a timestamp or with an unrecognised mood are ignored.
pub fn mood_report(records: &[StatRecord], range: MoodRange, clock: &LocalClock) -> MoodReport {
    let start = range.start_ms(clock);
    let mut in_range: Vec<(i64, Mood)> = records
        .iter()
        .filter_map(|record| {
            let created_at = record.created_at.filter(|ts| *ts >= start)?;
            let mood = record.mood.as_deref()?.parse::<Mood>().ok()?;
            Some((created_at, mood))
        })
        .collect();
    // Newest first
    in_range.sort_by(|a, b| b.0.cmp(&a.0));

    let moods: Vec<Mood> = in_range.into_iter().map(|(_, mood)| mood).collect();
    let total = moods.len();

    let counts: Vec<MoodCount> = Mood::ALL
        .iter()
        .filter_map(|&mood| {
            let count = moods.iter().filter(|&&m| m == mood).count();
            (count > 0).then(|| MoodCount {
                mood,
                count: count_u32(count),
                percentage: percentage(count, total),
            })
        })
        .collect();

    // Strictly greater keeps the earliest mood in enum order on ties
    let most_frequent = counts
        .iter()
        .fold(None::<&MoodCount>, |best, candidate| match best {
            Some(best) if best.count >= candidate.count => Some(best),
            _ => Some(candidate),
        })
        .map(|count| count.mood);

    MoodReport {
        range,
        total: count_u32(total),
        counts,
        most_frequent,
        trend: mood_trend(&moods),
    }
}

/// Compare the positive share of the newer half against the older half.
///
/// `moods` must be ordered newest first. The newer half takes the middle
/// element when the length is odd.
#[must_use]
pub fn mood_trend(moods: &[Mood]) -> Option<MoodTrend> {
    if moods.len() < 2 {
        return None;
    }
    let (recent, older) = moods.split_at(moods.len().div_ceil(2));
    let positive = |half: &[Mood]| half.iter().filter(|mood| mood.is_positive()).count();

    // recent_pos / recent_len vs older_pos / older_len, without floats
    let recent_side = positive(recent) * older.len();
    let older_side = positive(older) * recent.len();

    Some(match recent_side.cmp(&older_side) {
        Ordering::Greater => MoodTrend::Improving,
        Ordering::Less => MoodTrend::Declining,
        Ordering::Equal => MoodTrend::Stable,
    })
}

fn percentage(part: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    let rounded = (part * 200 + total) / (total * 2);
    count_u32(rounded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};
    use pretty_assertions::assert_eq;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap()
    }

    fn at(days_ago: u64, mood: &str) -> StatRecord {
        StatRecord {
            created_at: Some((now() - Days::new(days_ago)).timestamp_millis()),
            mood: Some(mood.to_string()),
            ..StatRecord::default()
        }
    }

    #[test]
    fn test_counts_and_percentages() {
        let records = vec![
            at(0, "happy"),
            at(1, "happy"),
            at(2, "sad"),
            at(20, "angry"),
            StatRecord {
                created_at: Some(now().timestamp_millis()),
                ..StatRecord::default()
            },
        ];
        let report = mood_report(&records, MoodRange::Week, &LocalClock::utc(now()));
        assert_eq!(report.total, 3);
        assert_eq!(
            report.counts,
            vec![
                MoodCount {
                    mood: Mood::Happy,
                    count: 2,
                    percentage: 67,
                },
                MoodCount {
                    mood: Mood::Sad,
                    count: 1,
                    percentage: 33,
                },
            ]
        );
        assert_eq!(report.most_frequent, Some(Mood::Happy));
    }

    #[test]
    fn test_range_widens() {
        let records = vec![at(3, "calm"), at(20, "calm"), at(200, "calm"), at(400, "calm")];
        let clock = LocalClock::utc(now());
        assert_eq!(mood_report(&records, MoodRange::Week, &clock).total, 1);
        assert_eq!(mood_report(&records, MoodRange::Month, &clock).total, 2);
        assert_eq!(mood_report(&records, MoodRange::Year, &clock).total, 3);
    }

    #[test]
    fn test_tie_prefers_enum_order() {
        let records = vec![at(0, "grateful"), at(1, "sad")];
        let report = mood_report(&records, MoodRange::Week, &LocalClock::utc(now()));
        assert_eq!(report.most_frequent, Some(Mood::Sad));
    }

    #[test]
    fn test_trend() {
        use Mood::{Anxious, Happy, Sad};
        assert_eq!(mood_trend(&[]), None);
        assert_eq!(mood_trend(&[Happy]), None);
        assert_eq!(mood_trend(&[Happy, Sad]), Some(MoodTrend::Improving));
        assert_eq!(mood_trend(&[Sad, Happy]), Some(MoodTrend::Declining));
        assert_eq!(mood_trend(&[Happy, Happy]), Some(MoodTrend::Stable));
        // recent = [Happy, Sad] (1/2), older = [Anxious] (0/1)
        assert_eq!(mood_trend(&[Happy, Sad, Anxious]), Some(MoodTrend::Improving));
    }

    #[test]
    fn test_trend_uses_newest_first_order() {
        let records = vec![at(5, "sad"), at(0, "happy")];
        let report = mood_report(&records, MoodRange::Week, &LocalClock::utc(now()));
        assert_eq!(report.trend, Some(MoodTrend::Improving));
    }

    #[test]
    fn test_empty_report() {
        let report = mood_report(&[], MoodRange::Month, &LocalClock::utc(now()));
        assert_eq!(report.total, 0);
        assert!(report.counts.is_empty());
        assert_eq!(report.most_frequent, None);
        assert_eq!(report.trend, None);
    }

    #[test]
    fn test_parse_range() {
        assert_eq!("Month".parse::<MoodRange>().unwrap(), MoodRange::Month);
        assert!("decade".parse::<MoodRange>().is_err());
    }
}
