//! Prayer Time Engine Module
//!
//! Turns solar events into the six daily times: safeguards, method and user
//! adjustments, rounding, then conversion to the output zone. Tabulated
//! methods take their raw times from a lookup provider instead and share the
//! rest of the pipeline.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, FixedOffset, NaiveDate, TimeDelta, TimeZone, Utc};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::config::PrayerConfig;
use crate::error::{PrayerError, Result};
use crate::geo::Coordinates;
use crate::lookup::PrayerTimeProvider;
use crate::params::{CalculationParameters, IshaRule, Method};
use crate::polar::SolarDay;
use crate::safeguard::{Night, TwilightSafeguard};
use crate::solar::{SolarTime, to_instant};
use crate::time::{OutputZone, resolve_timezone, round_to_minute, system_timezone};

// ===================== PRAYER =====================

/// The six daily times, in chronological order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Prayer {
    Fajr,
    Sunrise,
    Dhuhr,
    Asr,
    Maghrib,
    Isha,
}

impl Prayer {
    pub const ALL: [Prayer; 6] =
        [Prayer::Fajr, Prayer::Sunrise, Prayer::Dhuhr, Prayer::Asr, Prayer::Maghrib, Prayer::Isha];

    pub fn name(self) -> &'static str {
        match self {
            Prayer::Fajr => "Fajr",
            Prayer::Sunrise => "Sunrise",
            Prayer::Dhuhr => "Dhuhr",
            Prayer::Asr => "Asr",
            Prayer::Maghrib => "Maghrib",
            Prayer::Isha => "Isha",
        }
    }
}

impl fmt::Display for Prayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ===================== PRAYER TIMES =====================

/// Prayer times for one date and location, whole minutes in the output zone.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PrayerTimes {
    pub fajr: DateTime<FixedOffset>,
    pub sunrise: DateTime<FixedOffset>,
    pub dhuhr: DateTime<FixedOffset>,
    pub asr: DateTime<FixedOffset>,
    pub maghrib: DateTime<FixedOffset>,
    pub isha: DateTime<FixedOffset>,
    pub coordinates: Coordinates,
    pub date: NaiveDate,
}

impl PrayerTimes {
    /// Astronomical prayer times in the host's local zone.
    ///
    /// # Errors
    /// See [`PrayerTimeEngine::calculate`]
    pub fn new(
        coordinates: Coordinates,
        date: NaiveDate,
        parameters: &CalculationParameters,
    ) -> Result<Self> {
        PrayerTimeEngine::new(*parameters).calculate(coordinates, date)
    }

    pub fn time_for_prayer(&self, prayer: Prayer) -> DateTime<FixedOffset> {
        match prayer {
            Prayer::Fajr => self.fajr,
            Prayer::Sunrise => self.sunrise,
            Prayer::Dhuhr => self.dhuhr,
            Prayer::Asr => self.asr,
            Prayer::Maghrib => self.maghrib,
            Prayer::Isha => self.isha,
        }
    }

    /// All six times in order.
    pub fn iter(&self) -> impl Iterator<Item = (Prayer, DateTime<FixedOffset>)> + '_ {
        Prayer::ALL.into_iter().map(|p| (p, self.time_for_prayer(p)))
    }

    /// Latest prayer whose time has arrived at `at`, `None` before fajr.
    pub fn current_prayer<Tz: TimeZone>(&self, at: DateTime<Tz>) -> Option<Prayer> {
        Prayer::ALL.into_iter().rev().find(|&p| at >= self.time_for_prayer(p))
    }

    /// First prayer still ahead of `at`, `None` after isha.
    pub fn next_prayer<Tz: TimeZone>(&self, at: DateTime<Tz>) -> Option<Prayer> {
        Prayer::ALL.into_iter().find(|&p| at < self.time_for_prayer(p))
    }
}

/// Unadjusted UTC instants, before rounding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RawTimes {
    fajr: DateTime<Utc>,
    sunrise: DateTime<Utc>,
    dhuhr: DateTime<Utc>,
    asr: DateTime<Utc>,
    maghrib: DateTime<Utc>,
    isha: DateTime<Utc>,
}

impl RawTimes {
    fn time_for(&self, prayer: Prayer) -> DateTime<Utc> {
        match prayer {
            Prayer::Fajr => self.fajr,
            Prayer::Sunrise => self.sunrise,
            Prayer::Dhuhr => self.dhuhr,
            Prayer::Asr => self.asr,
            Prayer::Maghrib => self.maghrib,
            Prayer::Isha => self.isha,
        }
    }
}

// ===================== ENGINE =====================

/// Calculator bound to one set of parameters, an optional timetable and an
/// output zone. Cheap to clone and safe to share between threads.
#[derive(Clone)]
pub struct PrayerTimeEngine {
    parameters: CalculationParameters,
    provider: Option<Arc<dyn PrayerTimeProvider>>,
    output_zone: OutputZone,
}

impl fmt::Debug for PrayerTimeEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrayerTimeEngine")
            .field("parameters", &self.parameters)
            .field("provider", &self.provider.as_ref().map(|p| p.timezone()))
            .field("output_zone", &self.output_zone)
            .finish()
    }
}

impl PrayerTimeEngine {
    pub fn new(parameters: CalculationParameters) -> Self {
        Self { parameters, provider: None, output_zone: OutputZone::default() }
    }

    /// Engine for a parsed configuration file.
    ///
    /// Tabulated methods still need [`with_provider`](Self::with_provider).
    pub fn from_config(config: &PrayerConfig) -> Result<Self> {
        Ok(Self::new(config.parameters()).with_output_zone(config.output_zone()?))
    }

    pub fn with_provider(mut self, provider: Arc<dyn PrayerTimeProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn with_output_zone(mut self, output_zone: OutputZone) -> Self {
        self.output_zone = output_zone;
        self
    }

    pub fn parameters(&self) -> &CalculationParameters {
        &self.parameters
    }

    pub fn output_zone(&self) -> OutputZone {
        self.output_zone
    }

    /// Prayer times for `date` at `coordinates`.
    ///
    /// # Errors
    /// * [`PrayerError::PolarCircle`] - no sunrise or sunset and no resolution
    /// * [`PrayerError::NoSolution`] - asr never occurs
    /// * [`PrayerError::MissingProvider`] / [`PrayerError::DataUnavailable`] -
    ///   tabulated method without a provider or without a row for `date`
    pub fn calculate(&self, coordinates: Coordinates, date: NaiveDate) -> Result<PrayerTimes> {
        let raw = match self.parameters.method {
            Method::Tabulated => self.tabulated(coordinates, date)?,
            _ => self.astronomical(coordinates, date)?,
        };
        Ok(self.finalize(raw, coordinates, date))
    }

    fn astronomical(&self, coordinates: Coordinates, date: NaiveDate) -> Result<RawTimes> {
        let params = &self.parameters;
        let day = SolarDay::resolve(date, coordinates, params)?;
        let solar = &day.today;

        let sunrise = day.sunrise();
        let sunset = day.sunset();
        let night = Night::new(sunrise, sunset, day.next_sunrise());
        let safeguard = TwilightSafeguard::from_parameters(params);

        let dhuhr = day.instant(solar.transit);
        let asr = solar
            .afternoon(params.madhab.shadow_length())
            .map(|h| day.instant(h))
            .ok_or(PrayerError::NoSolution {
                prayer: Prayer::Asr,
                date,
                coordinates,
                method: params.method,
            })?;

        let fajr_raw = solar.hour_angle(-params.fajr_angle, false).map(|h| day.instant(h));
        let fajr = safeguard.fajr(fajr_raw, &night, &day.coordinates, date);

        let isha = match params.isha {
            IshaRule::Interval(minutes) => sunset + TimeDelta::minutes(i64::from(minutes)),
            IshaRule::Angle(angle) => {
                let raw = solar.hour_angle(-angle, true).map(|h| day.instant(h));
                safeguard.isha(raw, &night, &day.coordinates, date)
            }
        };

        let maghrib_angle = params.maghrib_angle.and_then(|angle| solar.hour_angle(-angle, true));
        let maghrib = match maghrib_angle.map(|h| day.instant(h)) {
            Some(t) if sunset < t && t < isha => t,
            Some(t) => {
                debug!(
                    "Maghrib angle time {} falls outside sunset..isha on {}, using sunset",
                    t, date
                );
                sunset
            }
            None => sunset,
        };

        Ok(RawTimes { fajr, sunrise, dhuhr, asr, maghrib, isha })
    }

    fn tabulated(&self, coordinates: Coordinates, date: NaiveDate) -> Result<RawTimes> {
        let method = self.parameters.method;
        let provider = self.provider.as_ref().ok_or(PrayerError::MissingProvider { method })?;

        let Some(row) = provider.lookup(date) else {
            warn!("No tabulated prayer times for {} at {}", date, coordinates);
            return Err(PrayerError::DataUnavailable { date, coordinates, method });
        };
        let times = row.resolve(date, provider.timezone())?;

        let sunrise = match times.sunrise {
            Some(t) => t,
            None => {
                let hours = SolarTime::new(date, coordinates).sunrise.ok_or(
                    PrayerError::NoSolution { prayer: Prayer::Sunrise, date, coordinates, method },
                )?;
                to_instant(date, hours)
            }
        };

        Ok(RawTimes {
            fajr: times.fajr,
            sunrise,
            dhuhr: times.dhuhr,
            asr: times.asr,
            maghrib: times.maghrib,
            isha: times.isha,
        })
    }

    /// Adjust, round and convert.
    ///
    /// Astronomical times are then kept in strict order: a time that does not
    /// follow its predecessor is moved to one minute after it. Tabulated
    /// times are published values and are never reordered.
    fn finalize(&self, raw: RawTimes, coordinates: Coordinates, date: NaiveDate) -> PrayerTimes {
        let adjustments = self.parameters.total_adjustments();
        let rounding = self.parameters.rounding;

        let mut times = Prayer::ALL.map(|prayer| {
            let adjusted = raw.time_for(prayer) + TimeDelta::minutes(adjustments.minutes(prayer));
            round_to_minute(adjusted, rounding)
        });
        if self.parameters.method != Method::Tabulated {
            keep_in_order(&mut times, date);
        }

        // One zone lookup per calculation
        let zone = match self.output_zone {
            OutputZone::System => OutputZone::Named(system_timezone()),
            OutputZone::Location => {
                OutputZone::Named(resolve_timezone(coordinates.longitude, coordinates.latitude))
            }
            other => other,
        };
        let [fajr, sunrise, dhuhr, asr, maghrib, isha] =
            times.map(|t| zone.convert(t, &coordinates));

        PrayerTimes { fajr, sunrise, dhuhr, asr, maghrib, isha, coordinates, date }
    }
}

/// Move each time that is not after its predecessor to one minute past it.
fn keep_in_order(times: &mut [DateTime<Utc>; 6], date: NaiveDate) {
    for i in 1..times.len() {
        let earliest = times[i - 1] + TimeDelta::minutes(1);
        if times[i] < earliest {
            debug!(
                "{} at {} does not follow {} on {}, moved to {}",
                Prayer::ALL[i],
                times[i],
                Prayer::ALL[i - 1],
                date,
                earliest
            );
            times[i] = earliest;
        }
    }
}

// ===================== TESTS =====================
