//! Twilight Safeguard Module
//!
//! Bounds that keep fajr and isha inside the night when the twilight angle
//! is reached very early, very late or not at all. A calculation picks one
//! policy up front: a fixed portion of the night, or the seasonal model of
//! the Moonsighting Committee.

use chrono::{DateTime, Datelike, NaiveDate, TimeDelta, Utc};
use log::debug;

use crate::astronomy::is_leap_year;
use crate::geo::Coordinates;
use crate::params::{CalculationParameters, HighLatitudeRule, Shafaq};

/// Latitude from which the seasonal method replaces raw twilight times by a
/// seventh of the night.
pub const SEASONAL_OVERRIDE_LATITUDE: f64 = 55.0;

/// Latitude the seasonal constants are scaled against
const SEASONAL_REFERENCE_LATITUDE: f64 = 55.0;

// ===================== NIGHT =====================

/// Sunset-to-sunrise span a safeguard is measured against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Night {
    /// Sunrise on the date being calculated
    pub sunrise: DateTime<Utc>,
    /// Sunset on the date being calculated
    pub sunset: DateTime<Utc>,
    /// Next day's sunrise minus this day's sunset
    pub length: TimeDelta,
}

impl Night {
    pub fn new(sunrise: DateTime<Utc>, sunset: DateTime<Utc>, next_sunrise: DateTime<Utc>) -> Self {
        Self { sunrise, sunset, length: next_sunrise - sunset }
    }

    /// `portion` of the night, to the millisecond.
    pub fn fraction(&self, portion: f64) -> TimeDelta {
        let millis = self.length.num_milliseconds() as f64 * portion;
        TimeDelta::milliseconds(millis.round() as i64)
    }
}

// ===================== POLICIES =====================

/// Fractions of the night that bound fajr and isha.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NightPortions {
    pub fajr: f64,
    pub isha: f64,
}

impl NightPortions {
    pub fn new(rule: HighLatitudeRule, fajr_angle: f64, isha_angle: f64) -> Self {
        match rule {
            HighLatitudeRule::MiddleOfTheNight => Self { fajr: 1.0 / 2.0, isha: 1.0 / 2.0 },
            HighLatitudeRule::SeventhOfTheNight => Self { fajr: 1.0 / 7.0, isha: 1.0 / 7.0 },
            HighLatitudeRule::TwilightAngle => {
                Self { fajr: fajr_angle / 60.0, isha: isha_angle / 60.0 }
            }
        }
    }
}

/// Safeguard policy for one calculation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TwilightSafeguard {
    NightPortion(NightPortions),
    Seasonal { shafaq: Shafaq },
}

impl TwilightSafeguard {
    pub fn from_parameters(params: &CalculationParameters) -> Self {
        if params.method.uses_seasonal_safeguard() {
            TwilightSafeguard::Seasonal { shafaq: params.shafaq }
        } else {
            TwilightSafeguard::NightPortion(NightPortions::new(
                params.high_latitude_rule,
                params.fajr_angle,
                params.isha_angle(),
            ))
        }
    }

    /// Earliest acceptable fajr.
    pub fn morning_bound(
        &self,
        night: &Night,
        coordinates: &Coordinates,
        date: NaiveDate,
    ) -> DateTime<Utc> {
        let offset = match self {
            TwilightSafeguard::NightPortion(portions) => night.fraction(portions.fajr),
            TwilightSafeguard::Seasonal { .. } => {
                seasonal_morning_offset(coordinates.latitude, date.ordinal(), date.year())
            }
        };
        night.sunrise - offset
    }

    /// Latest acceptable isha.
    pub fn evening_bound(
        &self,
        night: &Night,
        coordinates: &Coordinates,
        date: NaiveDate,
    ) -> DateTime<Utc> {
        let offset = match self {
            TwilightSafeguard::NightPortion(portions) => night.fraction(portions.isha),
            TwilightSafeguard::Seasonal { shafaq } => {
                seasonal_evening_offset(coordinates.latitude, date.ordinal(), date.year(), *shafaq)
            }
        };
        night.sunset + offset
    }

    /// Final fajr: the later of the raw crossing and the morning bound.
    ///
    /// # Arguments
    /// * `raw` - Fajr from the twilight angle, `None` if the sun never gets that low
    pub fn fajr(
        &self,
        raw: Option<DateTime<Utc>>,
        night: &Night,
        coordinates: &Coordinates,
        date: NaiveDate,
    ) -> DateTime<Utc> {
        let raw = match self {
            TwilightSafeguard::Seasonal { .. }
                if coordinates.latitude >= SEASONAL_OVERRIDE_LATITUDE =>
            {
                Some(night.sunrise - night.fraction(1.0 / 7.0))
            }
            _ => raw,
        };
        let bound = self.morning_bound(night, coordinates, date);

        match raw {
            Some(t) if t >= bound => t,
            other => {
                debug!("Fajr on {} bounded by safeguard {:?} (raw {:?})", date, self, other);
                bound
            }
        }
    }

    /// Final isha: the earlier of the raw crossing and the evening bound.
    ///
    /// # Arguments
    /// * `raw` - Isha from the twilight angle, `None` if the sun never gets that low
    pub fn isha(
        &self,
        raw: Option<DateTime<Utc>>,
        night: &Night,
        coordinates: &Coordinates,
        date: NaiveDate,
    ) -> DateTime<Utc> {
        let raw = match self {
            TwilightSafeguard::Seasonal { .. }
                if coordinates.latitude >= SEASONAL_OVERRIDE_LATITUDE =>
            {
                Some(night.sunset + night.fraction(1.0 / 7.0))
            }
            _ => raw,
        };
        let bound = self.evening_bound(night, coordinates, date);

        match raw {
            Some(t) if t <= bound => t,
            other => {
                debug!("Isha on {} bounded by safeguard {:?} (raw {:?})", date, self, other);
                bound
            }
        }
    }
}

// ===================== SEASONAL MODEL =====================

/// Days elapsed since the hemisphere's winter solstice.
///
/// # Arguments
/// * `day_of_year` - 1-based ordinal day
/// * `year` - Calendar year, for the year length
/// * `latitude` - Sign selects the hemisphere
pub fn days_since_solstice(day_of_year: u32, year: i32, latitude: f64) -> u32 {
    let days_in_year: i64 = if is_leap_year(year) { 366 } else { 365 };
    let d = i64::from(day_of_year);

    let days = if latitude >= 0.0 {
        let days = d + 10;
        if days >= days_in_year { days - days_in_year } else { days }
    } else {
        let southern_offset = if is_leap_year(year) { 173 } else { 172 };
        let days = d - southern_offset;
        if days < 0 { days + days_in_year } else { days }
    };
    days as u32
}

/// Minutes before sunrise at which morning twilight begins.
pub fn seasonal_morning_offset(latitude: f64, day_of_year: u32, year: i32) -> TimeDelta {
    let scale = latitude.abs() / SEASONAL_REFERENCE_LATITUDE;
    let a = 75.0 + 28.65 * scale;
    let b = 75.0 + 19.44 * scale;
    let c = 75.0 + 32.74 * scale;
    let d = 75.0 + 48.10 * scale;

    let dyy = days_since_solstice(day_of_year, year, latitude);
    minutes_to_delta(interpolate_season(a, b, c, d, dyy))
}

/// Minutes after sunset at which evening twilight ends for `shafaq`.
pub fn seasonal_evening_offset(
    latitude: f64,
    day_of_year: u32,
    year: i32,
    shafaq: Shafaq,
) -> TimeDelta {
    let scale = latitude.abs() / SEASONAL_REFERENCE_LATITUDE;
    let (a, b, c, d) = match shafaq {
        Shafaq::General => (
            75.0 + 25.60 * scale,
            75.0 + 2.05 * scale,
            75.0 - 9.21 * scale,
            75.0 + 6.14 * scale,
        ),
        Shafaq::Ahmer => (
            62.0 + 17.40 * scale,
            62.0 - 7.16 * scale,
            62.0 + 5.12 * scale,
            62.0 + 19.44 * scale,
        ),
        Shafaq::Abyad => (
            75.0 + 25.60 * scale,
            75.0 + 7.16 * scale,
            75.0 + 36.84 * scale,
            75.0 + 81.84 * scale,
        ),
    };

    let dyy = days_since_solstice(day_of_year, year, latitude);
    minutes_to_delta(interpolate_season(a, b, c, d, dyy))
}

/// Piecewise-linear path a → b → c → d → c → b → a over the year.
fn interpolate_season(a: f64, b: f64, c: f64, d: f64, dyy: u32) -> f64 {
    let t = f64::from(dyy);
    match dyy {
        0..91 => a + (b - a) / 91.0 * t,
        91..137 => b + (c - b) / 46.0 * (t - 91.0),
        137..183 => c + (d - c) / 46.0 * (t - 137.0),
        183..229 => d + (c - d) / 46.0 * (t - 183.0),
        229..275 => c + (b - c) / 46.0 * (t - 229.0),
        _ => b + (a - b) / 91.0 * (t - 275.0),
    }
}

fn minutes_to_delta(minutes: f64) -> TimeDelta {
    TimeDelta::seconds((minutes * 60.0).round() as i64)
}

// ===================== TESTS =====================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::Method;

    fn utc(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample_night() -> Night {
        Night::new(
            utc("2024-03-01T06:00:00Z"),
            utc("2024-03-01T18:00:00Z"),
            utc("2024-03-02T06:00:00Z"),
        )
    }

    #[test]
    fn test_days_since_solstice() {
        assert_eq!(days_since_solstice(1, 2023, 10.0), 11);
        assert_eq!(days_since_solstice(1, 2023, -10.0), 194);
        assert_eq!(days_since_solstice(355, 2023, 10.0), 0);
        assert_eq!(days_since_solstice(366, 2024, 10.0), 10);
        assert_eq!(days_since_solstice(1, 2024, -10.0), 194);
        assert_eq!(days_since_solstice(173, 2024, -10.0), 0);
        assert_eq!(days_since_solstice(172, 2023, -10.0), 0);
    }

    #[test]
    fn test_seasonal_offsets_at_equator_are_constant() {
        for day in [1, 60, 100, 150, 200, 250, 300, 365] {
            assert_eq!(seasonal_morning_offset(0.0, day, 2023), TimeDelta::minutes(75));
            for (shafaq, minutes) in
                [(Shafaq::General, 75), (Shafaq::Abyad, 75), (Shafaq::Ahmer, 62)]
            {
                let offset = seasonal_evening_offset(0.0, day, 2023, shafaq);
                assert_eq!(offset, TimeDelta::minutes(minutes));
            }
        }
    }

    #[test]
    fn test_seasonal_offset_at_reference_latitude() {
        // Winter solstice in the north: dyy = 0, so the first constant applies in full.
        let morning = seasonal_morning_offset(55.0, 355, 2023);
        assert_eq!(morning, TimeDelta::seconds((103.65_f64 * 60.0).round() as i64));

        let evening = seasonal_evening_offset(55.0, 355, 2023, Shafaq::General);
        assert_eq!(evening, TimeDelta::seconds((100.6_f64 * 60.0).round() as i64));
    }

    #[test]
    fn test_seasonal_curve_is_continuous() {
        let (a, b, c, d) = (1.0, 2.0, 3.0, 4.0);
        assert_eq!(interpolate_season(a, b, c, d, 0), a);
        assert!((interpolate_season(a, b, c, d, 91) - b).abs() < 1e-12);
        assert!((interpolate_season(a, b, c, d, 137) - c).abs() < 1e-12);
        assert!((interpolate_season(a, b, c, d, 183) - d).abs() < 1e-12);
        assert!((interpolate_season(a, b, c, d, 229) - c).abs() < 1e-12);
        assert!((interpolate_season(a, b, c, d, 275) - b).abs() < 1e-12);
        assert!((interpolate_season(a, b, c, d, 366) - a).abs() < 1e-12);
    }

    #[test]
    fn test_night_portions() {
        let middle = NightPortions::new(HighLatitudeRule::MiddleOfTheNight, 18.0, 17.0);
        assert_eq!(middle, NightPortions { fajr: 0.5, isha: 0.5 });

        let seventh = NightPortions::new(HighLatitudeRule::SeventhOfTheNight, 18.0, 17.0);
        assert_eq!(seventh, NightPortions { fajr: 1.0 / 7.0, isha: 1.0 / 7.0 });

        let angle = NightPortions::new(HighLatitudeRule::TwilightAngle, 18.0, 15.0);
        assert_eq!(angle, NightPortions { fajr: 0.3, isha: 0.25 });
    }

    #[test]
    fn test_policy_selection() {
        let mc = TwilightSafeguard::from_parameters(&Method::MoonsightingCommittee.parameters());
        assert_eq!(mc, TwilightSafeguard::Seasonal { shafaq: Shafaq::General });

        let params = Method::MuslimWorldLeague
            .parameters()
            .with_high_latitude_rule(HighLatitudeRule::SeventhOfTheNight);
        assert!(matches!(
            TwilightSafeguard::from_parameters(&params),
            TwilightSafeguard::NightPortion(NightPortions { fajr, .. }) if fajr == 1.0 / 7.0
        ));
    }

    #[test]
    fn test_night_portion_bounds() {
        let night = sample_night();
        let coords = Coordinates::new_unchecked(45.0, 0.0);
        let policy = TwilightSafeguard::NightPortion(NightPortions { fajr: 0.5, isha: 0.5 });

        let day = date(2024, 3, 1);
        assert_eq!(policy.morning_bound(&night, &coords, day), utc("2024-03-01T00:00:00Z"));
        assert_eq!(policy.evening_bound(&night, &coords, day), utc("2024-03-02T00:00:00Z"));
    }

    #[test]
    fn test_raw_time_kept_when_inside_bounds() {
        let night = sample_night();
        let coords = Coordinates::new_unchecked(45.0, 0.0);
        let policy =
            TwilightSafeguard::NightPortion(NightPortions { fajr: 1.0 / 7.0, isha: 1.0 / 7.0 });
        let day = date(2024, 3, 1);

        let raw_fajr = utc("2024-03-01T04:30:00Z");
        let raw_isha = utc("2024-03-01T19:30:00Z");
        assert_eq!(policy.fajr(Some(raw_fajr), &night, &coords, day), raw_fajr);
        assert_eq!(policy.isha(Some(raw_isha), &night, &coords, day), raw_isha);
    }

    #[test]
    fn test_bound_replaces_late_or_missing_raw() {
        let night = sample_night();
        let coords = Coordinates::new_unchecked(45.0, 0.0);
        let policy =
            TwilightSafeguard::NightPortion(NightPortions { fajr: 1.0 / 7.0, isha: 1.0 / 7.0 });
        let day = date(2024, 3, 1);
        let seventh = night.fraction(1.0 / 7.0);
        assert_eq!(seventh.num_seconds(), 12 * 3600 / 7);

        // Raw fajr too early, raw isha too late
        let early = utc("2024-03-01T02:00:00Z");
        let late = utc("2024-03-01T23:00:00Z");
        assert_eq!(policy.fajr(Some(early), &night, &coords, day), night.sunrise - seventh);
        assert_eq!(policy.isha(Some(late), &night, &coords, day), night.sunset + seventh);

        assert_eq!(policy.fajr(None, &night, &coords, day), night.sunrise - seventh);
        assert_eq!(policy.isha(None, &night, &coords, day), night.sunset + seventh);
    }

    #[test]
    fn test_seasonal_override_above_55() {
        // Short summer night: sunset 21:00, sunrise 03:00, six hours.
        let night = Night::new(
            utc("2024-06-20T03:00:00Z"),
            utc("2024-06-20T21:00:00Z"),
            utc("2024-06-21T03:00:00Z"),
        );
        let coords = Coordinates::new_unchecked(60.0, 0.0);
        let policy = TwilightSafeguard::Seasonal { shafaq: Shafaq::General };
        let day = date(2024, 6, 20);
        let seventh = night.fraction(1.0 / 7.0);

        let fajr = policy.fajr(None, &night, &coords, day);
        let isha = policy.isha(None, &night, &coords, day);
        assert_eq!(fajr, night.sunrise - seventh);
        assert_eq!(isha, night.sunset + seventh);
    }

    #[test]
    fn test_seasonal_below_55_uses_raw_or_bound() {
        let night = sample_night();
        let coords = Coordinates::new_unchecked(0.0, 0.0);
        let policy = TwilightSafeguard::Seasonal { shafaq: Shafaq::General };
        let day = date(2024, 3, 1);

        assert_eq!(policy.fajr(None, &night, &coords, day), night.sunrise - TimeDelta::minutes(75));
        assert_eq!(policy.isha(None, &night, &coords, day), night.sunset + TimeDelta::minutes(75));

        let raw = utc("2024-03-01T05:00:00Z");
        assert_eq!(policy.fajr(Some(raw), &night, &coords, day), raw);
    }
}
