//! Viewer clock and calendar-day keys

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Datelike, Days, FixedOffset, Local, NaiveDate, NaiveTime, Offset, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A calendar day in the viewer's zone, with no time component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DayKey(NaiveDate);

impl DayKey {
    #[must_use]
    pub const fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    #[must_use]
    pub const fn date(self) -> NaiveDate {
        self.0
    }

    /// The previous calendar day
    #[must_use]
    pub fn pred(self) -> Option<Self> {
        self.0.pred_opt().map(Self)
    }

    /// The next calendar day
    #[must_use]
    pub fn succ(self) -> Option<Self> {
        self.0.succ_opt().map(Self)
    }

    /// The day `n` days earlier
    #[must_use]
    pub fn minus_days(self, n: u64) -> Option<Self> {
        self.0.checked_sub_days(Days::new(n)).map(Self)
    }

    /// 0 = Sunday .. 6 = Saturday
    #[must_use]
    pub fn weekday_index(self) -> u8 {
        u8::try_from(self.0.weekday().num_days_from_sunday()).unwrap_or(0)
    }
}

impl From<NaiveDate> for DayKey {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

impl fmt::Display for DayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

/// The instant a computation runs at, plus the zone its days are counted in.
///
/// Every statistic takes one of these instead of reading the system clock, so
/// results are reproducible for a given snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalClock {
    now: DateTime<Utc>,
    offset: FixedOffset,
}

/// Offsets accepted from clients, in minutes east of UTC
pub const MIN_OFFSET_MINUTES: i32 = -12 * 60;
pub const MAX_OFFSET_MINUTES: i32 = 14 * 60;

impl LocalClock {
    #[must_use]
    pub const fn new(now: DateTime<Utc>, offset: FixedOffset) -> Self {
        Self { now, offset }
    }

    /// A clock that counts days in UTC
    #[must_use]
    pub fn utc(now: DateTime<Utc>) -> Self {
        Self::new(now, Utc.fix())
    }

    /// The system clock in the machine's current local zone
    #[must_use]
    pub fn system() -> Self {
        let local = Local::now();
        Self::new(local.with_timezone(&Utc), *local.offset())
    }

    /// Build a clock from an offset in minutes east of UTC
    pub fn with_offset_minutes(now: DateTime<Utc>, minutes: i32) -> Result<Self> {
        if !(MIN_OFFSET_MINUTES..=MAX_OFFSET_MINUTES).contains(&minutes) {
            return Err(Error::InvalidInput(format!(
                "UTC offset must be within [{MIN_OFFSET_MINUTES}, {MAX_OFFSET_MINUTES}] minutes"
            )));
        }
        let offset = FixedOffset::east_opt(minutes * 60)
            .ok_or_else(|| Error::InvalidInput(format!("Invalid UTC offset: {minutes}")))?;
        Ok(Self::new(now, offset))
    }

    #[must_use]
    pub const fn now(&self) -> DateTime<Utc> {
        self.now
    }

    #[must_use]
    pub const fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Current wall-clock time in the viewer's zone
    #[must_use]
    pub fn local_now(&self) -> DateTime<FixedOffset> {
        self.now.with_timezone(&self.offset)
    }

    #[must_use]
    pub fn today(&self) -> DayKey {
        DayKey(self.local_now().date_naive())
    }

    /// Calendar day of a Unix-ms timestamp; `None` when out of range
    #[must_use]
    pub fn day_key(&self, timestamp_ms: i64) -> Option<DayKey> {
        DateTime::from_timestamp_millis(timestamp_ms)
            .map(|instant| DayKey(instant.with_timezone(&self.offset).date_naive()))
    }

    /// Local wall-clock time of a Unix-ms timestamp
    #[must_use]
    pub fn local_time(&self, timestamp_ms: i64) -> Option<DateTime<FixedOffset>> {
        DateTime::from_timestamp_millis(timestamp_ms).map(|instant| instant.with_timezone(&self.offset))
    }

    /// Unix ms of local midnight starting `day`
    #[must_use]
    pub fn start_of_day_ms(&self, day: NaiveDate) -> i64 {
        let local_midnight = day.and_time(NaiveTime::MIN).and_utc().timestamp_millis();
        local_midnight - i64::from(self.offset.local_minus_utc()) * 1000
    }

    /// Unix ms of local midnight on the first of the current month
    #[must_use]
    pub fn start_of_month_ms(&self) -> i64 {
        let today = self.today().date();
        let first = today - Days::new(u64::from(today.day0()));
        self.start_of_day_ms(first)
    }

    /// The Sunday that starts the current week
    #[must_use]
    pub fn start_of_week(&self) -> DayKey {
        let today = self.today();
        today
            .minus_days(u64::from(today.weekday_index()))
            .unwrap_or(today)
    }
}

/// Collapse entry timestamps into the set of distinct local days they fall on.
///
/// Missing or out-of-range timestamps are skipped.
pub fn normalize_days<I>(timestamps: I, clock: &LocalClock) -> BTreeSet<DayKey>
where
    I: IntoIterator<Item = Option<i64>>,
{
    timestamps
        .into_iter()
        .flatten()
        .filter_map(|timestamp| clock.day_key(timestamp))
        .collect()
}
