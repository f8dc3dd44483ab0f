//! Polar Circle Resolution Module
//!
//! Finds usable solar events for dates on which the sun does not rise or set
//! at the observer's latitude, by borrowing them from the nearest latitude or
//! the nearest day that has both.

use chrono::{DateTime, NaiveDate, Utc};
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::error::{PrayerError, Result};
use crate::geo::Coordinates;
use crate::params::CalculationParameters;
use crate::solar::{SolarTime, to_instant};

/// Latitude below which midnight sun and polar night cannot occur
const UNSAFE_LATITUDE: f64 = 65.0;

/// Degrees moved toward the equator per step
const LATITUDE_STEP: f64 = 0.5;

/// Furthest day searched in either direction
const MAX_DAY_OFFSET: i64 = 183;

/// Strategy for dates without sunrise or sunset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolarCircleResolution {
    /// Nearest latitude with a sunrise and sunset
    #[default]
    AqrabBalad,
    /// Nearest day with a sunrise and sunset, same latitude
    AqrabYaum,
    /// Report the date as unresolvable
    Unresolved,
}

// ===================== SOLAR DAY =====================

/// Solar events for a date and the day after, with sunrise and sunset
/// guaranteed to exist on both and a night of positive length between them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolarDay {
    /// Requested date; all instants are placed on it
    pub date: NaiveDate,
    /// Coordinates the events were computed for
    pub coordinates: Coordinates,
    pub today: SolarTime,
    pub tomorrow: SolarTime,
    sunrise: f64,
    sunset: f64,
    next_sunrise: f64,
}

impl SolarDay {
    /// Solar events for `date`, applying the polar resolution of `params`
    /// when the date has no sunrise or sunset.
    pub fn resolve(
        date: NaiveDate,
        coordinates: Coordinates,
        params: &CalculationParameters,
    ) -> Result<Self> {
        if let Some(day) = Self::at(date, date, coordinates) {
            return Ok(day);
        }

        let resolved = match params.polar_circle_resolution {
            PolarCircleResolution::AqrabBalad => aqrab_balad(date, coordinates),
            PolarCircleResolution::AqrabYaum => aqrab_yaum(date, coordinates),
            PolarCircleResolution::Unresolved => None,
        };
        resolved.ok_or(PrayerError::PolarCircle { date, coordinates, method: params.method })
    }

    /// Events of `source` and the day after, placed on `date`.
    ///
    /// `None` when either day lacks a sunrise or sunset, or when the events
    /// are out of order, as happens a few minutes either side of the midnight
    /// sun where sunset can be computed after the next sunrise.
    fn at(date: NaiveDate, source: NaiveDate, coordinates: Coordinates) -> Option<Self> {
        let today = SolarTime::new(source, coordinates);
        let tomorrow = SolarTime::new(next_day(source), coordinates);
        let sunrise = today.sunrise?;
        let sunset = today.sunset?;
        let next_sunrise = tomorrow.sunrise?;

        // Tomorrow's hours are counted from its own midnight
        if !(sunrise < today.transit && today.transit < sunset && sunset < next_sunrise + 24.0) {
            debug!("Solar events out of order at {} on {}", coordinates, source);
            return None;
        }
        Some(Self { date, coordinates, today, tomorrow, sunrise, sunset, next_sunrise })
    }

    /// Place solver hours on the requested date.
    pub fn instant(&self, hours: f64) -> DateTime<Utc> {
        to_instant(self.date, hours)
    }

    pub fn sunrise(&self) -> DateTime<Utc> {
        self.instant(self.sunrise)
    }

    pub fn sunset(&self) -> DateTime<Utc> {
        self.instant(self.sunset)
    }

    /// Sunrise on the day after the requested date.
    pub fn next_sunrise(&self) -> DateTime<Utc> {
        to_instant(next_day(self.date), self.next_sunrise)
    }
}

// ===================== STRATEGIES =====================

fn aqrab_balad(date: NaiveDate, coordinates: Coordinates) -> Option<SolarDay> {
    let mut latitude = coordinates.latitude;
    while latitude.abs() >= UNSAFE_LATITUDE {
        latitude -= latitude.signum() * LATITUDE_STEP;
        let shifted = coordinates.with_latitude(latitude);
        if let Some(day) = SolarDay::at(date, date, shifted) {
            info!(
                "No sunrise/sunset at latitude {:.2} on {}, using latitude {:.2}",
                coordinates.latitude, date, latitude
            );
            return Some(day);
        }
    }
    debug!("Latitude resolution exhausted for {} on {}", coordinates, date);
    None
}

fn aqrab_yaum(date: NaiveDate, coordinates: Coordinates) -> Option<SolarDay> {
    for offset in 1..=MAX_DAY_OFFSET {
        for signed in [offset, -offset] {
            let Some(source) = date.checked_add_signed(chrono::TimeDelta::days(signed)) else {
                continue;
            };
            if let Some(day) = SolarDay::at(date, source, coordinates) {
                info!(
                    "No sunrise/sunset at {} on {}, using solar times of {}",
                    coordinates, date, source
                );
                return Some(day);
            }
        }
    }
    debug!("Day resolution exhausted for {} on {}", coordinates, date);
    None
}

/// Following date; the last representable date maps to itself.
fn next_day(date: NaiveDate) -> NaiveDate {
    date.succ_opt().unwrap_or(date)
}

// ===================== TESTS =====================
