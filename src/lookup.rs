//! Tabulated Prayer Times Module
//!
//! Interface for localities that publish an official timetable instead of
//! deriving times from astronomy, and an in-memory table implementing it.

use std::collections::BTreeMap;

use chrono::{DateTime, LocalResult, NaiveDate, NaiveTime, TimeDelta, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::{PrayerError, Result};
use crate::prayer::Prayer;
use crate::time::parse_clock_time;

// ===================== TABULATED DAY =====================

/// One timetable row, local wall-clock times as "HH:MM".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TabulatedDay {
    pub fajr: String,
    /// Timetables without a sunrise column fall back to astronomical sunrise
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sunrise: Option<String>,
    pub dhuhr: String,
    pub asr: String,
    pub maghrib: String,
    pub isha: String,
}

/// A timetable row resolved to UTC instants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TabulatedTimes {
    pub fajr: DateTime<Utc>,
    pub sunrise: Option<DateTime<Utc>>,
    pub dhuhr: DateTime<Utc>,
    pub asr: DateTime<Utc>,
    pub maghrib: DateTime<Utc>,
    pub isha: DateTime<Utc>,
}

impl TabulatedDay {
    pub fn new(
        fajr: &str,
        sunrise: Option<&str>,
        dhuhr: &str,
        asr: &str,
        maghrib: &str,
        isha: &str,
    ) -> Self {
        Self {
            fajr: fajr.to_string(),
            sunrise: sunrise.map(str::to_string),
            dhuhr: dhuhr.to_string(),
            asr: asr.to_string(),
            maghrib: maghrib.to_string(),
            isha: isha.to_string(),
        }
    }

    /// Interpret the row as local times on `date` in `timezone`.
    ///
    /// # Errors
    /// [`PrayerError::InvalidTabulatedTime`] for a malformed entry,
    /// [`PrayerError::NonexistentLocalTime`] if a time cannot be placed
    pub fn resolve(&self, date: NaiveDate, timezone: Tz) -> Result<TabulatedTimes> {
        let at = |prayer: Prayer, value: &str| -> Result<DateTime<Utc>> {
            let time = parse_clock_time(value).ok_or_else(|| PrayerError::InvalidTabulatedTime {
                date,
                prayer,
                value: value.to_string(),
            })?;
            local_to_utc(date, time, timezone)
        };

        Ok(TabulatedTimes {
            fajr: at(Prayer::Fajr, &self.fajr)?,
            sunrise: self.sunrise.as_deref().map(|s| at(Prayer::Sunrise, s)).transpose()?,
            dhuhr: at(Prayer::Dhuhr, &self.dhuhr)?,
            asr: at(Prayer::Asr, &self.asr)?,
            maghrib: at(Prayer::Maghrib, &self.maghrib)?,
            isha: at(Prayer::Isha, &self.isha)?,
        })
    }
}

/// Place a wall-clock time on `date` in `timezone`.
///
/// Ambiguous times (clocks going back) take the earlier instant; times in a
/// gap (clocks going forward) are shifted forward by an hour.
pub fn local_to_utc(date: NaiveDate, time: NaiveTime, timezone: Tz) -> Result<DateTime<Utc>> {
    let naive = date.and_time(time);
    let local = match timezone.from_local_datetime(&naive) {
        LocalResult::Single(t) => Some(t),
        LocalResult::Ambiguous(earlier, _) => Some(earlier),
        LocalResult::None => {
            timezone.from_local_datetime(&(naive + TimeDelta::hours(1))).earliest()
        }
    };
    local.map(|t| t.with_timezone(&Utc)).ok_or_else(|| PrayerError::NonexistentLocalTime {
        date,
        time,
        timezone: timezone.name().to_string(),
    })
}

// ===================== PROVIDER =====================

/// Source of pre-computed prayer times for one locality.
///
/// Shared between threads behind an `Arc` and never mutated after
/// construction.
pub trait PrayerTimeProvider: Send + Sync {
    /// Zone the tabulated wall-clock times are expressed in.
    fn timezone(&self) -> Tz;

    /// Row for `date`, or `None` if the table does not cover it.
    fn lookup(&self, date: NaiveDate) -> Option<TabulatedDay>;
}

/// In-memory timetable keyed by date.
#[derive(Debug, Clone, PartialEq)]
pub struct LookupTable {
    timezone: Tz,
    days: BTreeMap<NaiveDate, TabulatedDay>,
}

impl LookupTable {
    pub fn new(timezone: Tz) -> Self {
        Self { timezone, days: BTreeMap::new() }
    }

    pub fn from_days(timezone: Tz, days: BTreeMap<NaiveDate, TabulatedDay>) -> Self {
        Self { timezone, days }
    }

    /// Parse a JSON object of `"YYYY-MM-DD"` keys to rows.
    ///
    /// ```json
    /// { "2024-01-15": { "fajr": "06:26", "sunrise": "08:05", "dhuhr": "12:09",
    ///                   "asr": "13:52", "maghrib": "16:15", "isha": "17:49" } }
    /// ```
    pub fn from_json_str(timezone: Tz, json: &str) -> Result<Self> {
        let days: BTreeMap<NaiveDate, TabulatedDay> = serde_json::from_str(json)?;
        Ok(Self::from_days(timezone, days))
    }

    pub fn with_day(mut self, date: NaiveDate, day: TabulatedDay) -> Self {
        self.days.insert(date, day);
        self
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// First and last covered dates.
    pub fn range(&self) -> Option<(NaiveDate, NaiveDate)> {
        let first = self.days.keys().next()?;
        let last = self.days.keys().next_back()?;
        Some((*first, *last))
    }
}

impl PrayerTimeProvider for LookupTable {
    fn timezone(&self) -> Tz {
        self.timezone
    }

    fn lookup(&self, date: NaiveDate) -> Option<TabulatedDay> {
        self.days.get(&date).cloned()
    }
}

// ===================== TESTS =====================
