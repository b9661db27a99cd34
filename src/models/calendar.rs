//! Calendar and time window models.
//!
//! Defines the time primitives used throughout rostering: wall-clock
//! times of day, half-open instant intervals, and a local clock that maps
//! UTC instants onto the organization's day-of-week and calendar dates.
//!
//! # Time Model
//! Shift instants are UTC (`DateTime<Utc>`). Availability is expressed as
//! local wall-clock time (`HH:MM`) on a day of week, so every comparison
//! between the two goes through [`LocalClock`].
//!
//! # Intervals
//! All intervals are half-open `[start, end)`: two intervals that touch
//! at a boundary do not overlap.

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Timelike, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// Minutes in one day.
pub const MINUTES_PER_DAY: u32 = 24 * 60;

const DAY_NAMES: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

/// A wall-clock time of day, stored as minutes since midnight.
///
/// Serialized as `HH:MM`. `24:00` is accepted so that a window can run to
/// the end of the day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeOfDay(u32);

impl TimeOfDay {
    /// Midnight (`00:00`).
    pub const MIDNIGHT: Self = Self(0);
    /// End of day (`24:00`).
    pub const END_OF_DAY: Self = Self(MINUTES_PER_DAY);

    /// Creates a time from hours and minutes.
    ///
    /// Returns `None` for anything past `24:00`.
    pub fn hm(hours: u32, minutes: u32) -> Option<Self> {
        if minutes >= 60 {
            return None;
        }
        let total = hours * 60 + minutes;
        (total <= MINUTES_PER_DAY).then_some(Self(total))
    }

    /// Parses an `HH:MM` string.
    pub fn parse(s: &str) -> Result<Self, String> {
        let (h, m) = s
            .trim()
            .split_once(':')
            .ok_or_else(|| format!("invalid time '{s}': expected HH:MM"))?;
        let hours: u32 = h
            .parse()
            .map_err(|_| format!("invalid hour in time '{s}'"))?;
        let minutes: u32 = m
            .parse()
            .map_err(|_| format!("invalid minute in time '{s}'"))?;
        Self::hm(hours, minutes).ok_or_else(|| format!("time '{s}' is out of range"))
    }

    /// Minutes since midnight.
    #[inline]
    pub fn minutes(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.0 / 60, self.0 % 60)
    }
}

impl TryFrom<String> for TimeOfDay {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<TimeOfDay> for String {
    fn from(value: TimeOfDay) -> Self {
        value.to_string()
    }
}

/// A time interval [start, end).
///
/// Half-open interval: includes start, excludes end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    /// Interval start (inclusive).
    pub start: DateTime<Utc>,
    /// Interval end (exclusive).
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    /// Creates a new time window.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Duration of this window in hours.
    #[inline]
    pub fn duration_hours(&self) -> f64 {
        (self.end - self.start).num_minutes() as f64 / 60.0
    }

    /// Whether an instant falls within this window.
    #[inline]
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.start && instant < self.end
    }

    /// Whether two windows overlap.
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Hours of rest between two non-overlapping windows.
    ///
    /// Measured between the nearer boundaries; zero when they overlap.
    pub fn rest_hours_between(&self, other: &Self) -> f64 {
        let gap = if other.end <= self.start {
            self.start - other.end
        } else if self.end <= other.start {
            other.start - self.end
        } else {
            return 0.0;
        };
        gap.num_minutes() as f64 / 60.0
    }
}

/// Maps UTC instants onto local wall-clock time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalClock {
    tz: Tz,
}

impl LocalClock {
    /// A clock reading UTC.
    pub fn utc() -> Self {
        Self { tz: Tz::UTC }
    }

    /// A clock for an IANA timezone name (e.g. `America/Chicago`).
    pub fn from_name(name: &str) -> Result<Self, String> {
        let tz: Tz = name
            .parse()
            .map_err(|_| format!("invalid timezone: {name}"))?;
        Ok(Self { tz })
    }

    /// The timezone of this clock.
    pub fn timezone(&self) -> Tz {
        self.tz
    }

    /// Converts an instant to local time.
    pub fn local(&self, instant: DateTime<Utc>) -> DateTime<Tz> {
        self.tz.from_utc_datetime(&instant.naive_utc())
    }

    /// Local day of week, 0 = Sunday … 6 = Saturday.
    pub fn day_of_week(&self, instant: DateTime<Utc>) -> u8 {
        self.local(instant).weekday().num_days_from_sunday() as u8
    }

    /// Local calendar date.
    pub fn date(&self, instant: DateTime<Utc>) -> NaiveDate {
        self.local(instant).date_naive()
    }

    /// Local minutes since midnight.
    pub fn minute_of_day(&self, instant: DateTime<Utc>) -> u32 {
        let local = self.local(instant);
        local.hour() * 60 + local.minute()
    }

    /// Local `[start, end)` minutes of a window, measured from midnight of
    /// the start date. An interval crossing midnight ends past 1440.
    pub fn minute_span(&self, window: &TimeWindow) -> (u32, u32) {
        let start_date = self.date(window.start);
        let end_date = self.date(window.end);
        let day_offset = (end_date - start_date).num_days().max(0) as u32;
        (
            self.minute_of_day(window.start),
            self.minute_of_day(window.end) + day_offset * MINUTES_PER_DAY,
        )
    }

    /// Local 12-hour clock text, e.g. `2:30 PM`.
    pub fn clock_time(&self, instant: DateTime<Utc>) -> String {
        self.local(instant).format("%-I:%M %p").to_string()
    }
}

impl Default for LocalClock {
    fn default() -> Self {
        Self::utc()
    }
}

/// English name of a day of week (0 = Sunday).
pub fn day_name(day_of_week: u8) -> &'static str {
    DAY_NAMES[(day_of_week % 7) as usize]
}

/// Length of the run of consecutive calendar dates that contains `day`.
///
/// Dates one day apart are contiguous; any larger gap ends the run.
/// Returns 0 when `day` is not in `dates`.
pub fn consecutive_run_containing(dates: &BTreeSet<NaiveDate>, day: NaiveDate) -> u32 {
    if !dates.contains(&day) {
        return 0;
    }

    let mut run = 1;
    let mut cursor = day;
    while let Some(prev) = cursor.pred_opt() {
        if !dates.contains(&prev) {
            break;
        }
        run += 1;
        cursor = prev;
    }

    cursor = day;
    while let Some(next) = cursor.succ_opt() {
        if !dates.contains(&next) {
            break;
        }
        run += 1;
        cursor = next;
    }

    run
}
