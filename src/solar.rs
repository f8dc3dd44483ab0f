//! Solar Time Module
//!
//! Solar transit, sunrise/sunset and generalized hour-angle crossings for one
//! date and observer. Times are fractional hours after 0h UT of the date and
//! may fall slightly outside `[0, 24)` for observers far from Greenwich.

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, TimeDelta, Utc};

use crate::astronomy::{
    altitude_of_celestial_body, julian_day, normalize_to_scale, quadrant_shifted_angle,
    unwind_angle,
};
use crate::coordinates::SolarCoordinates;
use crate::geo::{Coordinates, SUNRISE_ALTITUDE_DEG};

// ===================== CONSTANTS =====================

/// Sidereal degrees per mean solar day
const SIDEREAL_RATE: f64 = 360.985_647;

/// Refinement passes applied to the transit estimate
const TRANSIT_CORRECTIONS: usize = 2;

// ===================== SOLAR TIME =====================

/// Solar events for one date and observer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolarTime {
    pub date: NaiveDate,
    pub coordinates: Coordinates,
    /// Sun positions for the day before, the day itself and the day after
    pub window: SolarCoordinates,
    /// Solar noon in hours
    pub transit: f64,
    /// Sunrise in hours, `None` during polar day or night
    pub sunrise: Option<f64>,
    /// Sunset in hours, `None` during polar day or night
    pub sunset: Option<f64>,
    /// Uncorrected transit as a fraction of the day; base of every crossing
    approximate_transit: f64,
}

impl SolarTime {
    pub fn new(date: NaiveDate, coordinates: Coordinates) -> Self {
        let jd = julian_day(date.year(), date.month(), date.day(), 0.0);
        let window = SolarCoordinates::new(jd);

        let approximate_transit = approximate_transit(
            coordinates.longitude,
            window.current.apparent_sidereal_time,
            window.current.right_ascension,
        );
        let transit = corrected_transit(approximate_transit, coordinates.longitude, &window);

        let mut solar = Self {
            date,
            coordinates,
            window,
            transit,
            sunrise: None,
            sunset: None,
            approximate_transit,
        };
        solar.sunrise = solar.hour_angle(SUNRISE_ALTITUDE_DEG, false);
        solar.sunset = solar.hour_angle(SUNRISE_ALTITUDE_DEG, true);
        solar
    }

    /// Whether both sunrise and sunset exist on this date.
    pub fn has_sunrise_and_sunset(&self) -> bool {
        self.sunrise.is_some() && self.sunset.is_some()
    }

    /// Time at which the sun's center reaches `angle` degrees of altitude
    /// (negative below the horizon), before or after transit.
    ///
    /// # Returns
    /// Hours after 0h UT, strictly before transit for a morning crossing and
    /// strictly after it for an evening one, or `None` if the sun never
    /// reaches that altitude
    pub fn hour_angle(&self, angle: f64, after_transit: bool) -> Option<f64> {
        corrected_hour_angle(
            self.approximate_transit,
            self.transit,
            angle,
            &self.coordinates,
            after_transit,
            &self.window,
        )
    }

    /// Afternoon time at which an object's shadow equals its noon shadow plus
    /// `shadow_length` times its height.
    pub fn afternoon(&self, shadow_length: f64) -> Option<f64> {
        let zenith = (self.coordinates.latitude - self.window.current.declination).abs();
        let inverse = shadow_length + zenith.to_radians().tan();
        let angle = (1.0 / inverse).atan().to_degrees();
        self.hour_angle(angle, true)
    }

    /// Convert solver hours into a UTC instant on this date.
    pub fn instant(&self, hours: f64) -> DateTime<Utc> {
        to_instant(self.date, hours)
    }
}

/// UTC instant `hours` after 0h UT of `date`, to the millisecond.
pub fn to_instant(date: NaiveDate, hours: f64) -> DateTime<Utc> {
    let midnight = date.and_time(NaiveTime::MIN).and_utc();
    midnight + TimeDelta::milliseconds((hours * 3_600_000.0).round() as i64)
}

// ===================== SOLVER =====================

/// First transit estimate as a fraction of the day (Meeus 15.2).
fn approximate_transit(longitude: f64, sidereal_time: f64, right_ascension: f64) -> f64 {
    let west_longitude = -longitude;
    normalize_to_scale((right_ascension + west_longitude - sidereal_time) / 360.0, 1.0)
}

/// Transit in hours, refining the estimate against the local hour angle.
fn corrected_transit(m0: f64, longitude: f64, window: &SolarCoordinates) -> f64 {
    let west_longitude = -longitude;
    let sidereal_time = window.current.apparent_sidereal_time;

    let mut m = m0;
    for _ in 0..TRANSIT_CORRECTIONS {
        let theta = unwind_angle(sidereal_time + SIDEREAL_RATE * m);
        let alpha = window.right_ascension_at(m);
        let local_hour_angle = quadrant_shifted_angle(theta - west_longitude - alpha);
        m -= local_hour_angle / 360.0;
    }
    m * 24.0
}

/// Rising or setting crossing of `angle` (Meeus 15.1 with one correction).
///
/// A corrected crossing that lands on the wrong side of `transit`, or that
/// moves further than the hour angle itself, is replaced by the uncorrected
/// hour angle measured from the refined transit.
fn corrected_hour_angle(
    m0: f64,
    transit: f64,
    angle: f64,
    coordinates: &Coordinates,
    after_transit: bool,
    window: &SolarCoordinates,
) -> Option<f64> {
    let west_longitude = -coordinates.longitude;
    let phi = coordinates.latitude.to_radians();
    let dec = window.current.declination.to_radians();

    let cos_h0 = (angle.to_radians().sin() - phi.sin() * dec.sin()) / (phi.cos() * dec.cos());
    if !(-1.0..=1.0).contains(&cos_h0) {
        return None;
    }
    let h0 = cos_h0.acos().to_degrees();

    let m = if after_transit { m0 + h0 / 360.0 } else { m0 - h0 / 360.0 };
    let theta = unwind_angle(window.current.apparent_sidereal_time + SIDEREAL_RATE * m);
    let alpha = window.right_ascension_at(m);
    let delta = window.declination_at(m);

    let local_hour_angle = theta - west_longitude - alpha;
    let altitude = altitude_of_celestial_body(coordinates.latitude, delta, local_hour_angle);
    let dm = (altitude - angle)
        / (360.0 * delta.to_radians().cos() * phi.cos() * local_hour_angle.to_radians().sin());

    let hours = (m + dm) * 24.0;
    let past_transit = if after_transit { hours - transit } else { transit - hours };
    if hours.is_finite() && past_transit > 0.0 && dm.abs() * 360.0 <= h0 {
        return Some(hours);
    }

    let offset = h0 / 15.0;
    if offset <= 0.0 {
        return None;
    }
    Some(if after_transit { transit + offset } else { transit - offset })
}

// ===================== TESTS =====================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::astronomy::equation_of_time;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_transit_follows_equation_of_time() {
        let greenwich = Coordinates::new_unchecked(51.4769, 0.0);
        for (m, d) in [(2, 11), (5, 14), (7, 26), (11, 3)] {
            let solar = SolarTime::new(date(2024, m, d), greenwich);
            let eot = equation_of_time(julian_day(2024, m, d, 12.0));
            let expected = 12.0 - eot / 60.0;
            assert!(
                (solar.transit - expected).abs() < 1.0 / 60.0,
                "transit {} vs {} on {}-{}",
                solar.transit,
                expected,
                m,
                d
            );
        }
    }

    #[test]
    fn test_transit_shifts_with_longitude() {
        let day = date(2024, 3, 1);
        let west = SolarTime::new(day, Coordinates::new_unchecked(30.0, -90.0));
        let zero = SolarTime::new(day, Coordinates::new_unchecked(30.0, 0.0));
        // 90 degrees west is six hours later, give or take the equation of time drift
        assert!((west.transit - zero.transit - 6.0).abs() < 0.01);
    }

    #[test]
    fn test_events_are_ordered() {
        let raleigh = Coordinates::new_unchecked(35.7750, -78.6336);
        let solar = SolarTime::new(date(2015, 7, 12), raleigh);

        let sunrise = solar.sunrise.unwrap();
        let sunset = solar.sunset.unwrap();
        let fajr = solar.hour_angle(-18.0, false).unwrap();
        let isha = solar.hour_angle(-18.0, true).unwrap();
        let asr = solar.afternoon(1.0).unwrap();
        let asr_hanafi = solar.afternoon(2.0).unwrap();

        assert!(fajr < sunrise && sunrise < solar.transit);
        assert!(solar.transit < asr && asr < asr_hanafi && asr_hanafi < sunset);
        assert!(sunset < isha);

        // 06:08 EDT sunrise is 10:08 UTC
        assert!((sunrise - (10.0 + 8.0 / 60.0)).abs() < 2.0 / 60.0, "sunrise {}", sunrise);
    }

    #[test]
    fn test_equator_never_has_polar_night() {
        let equator = Coordinates::new_unchecked(0.0, 0.0);
        let mut day = date(2025, 1, 1);
        while day.year() == 2025 {
            let solar = SolarTime::new(day, equator);
            assert!(solar.has_sunrise_and_sunset(), "Missing sunrise/sunset at equator on {}", day);
            day = day.succ_opt().unwrap();
        }
    }

    #[test]
    fn test_midnight_sun_and_polar_night_in_tromso() {
        let tromso = Coordinates::new_unchecked(69.6492, 18.9553);

        let summer = SolarTime::new(date(2025, 6, 21), tromso);
        assert!(summer.sunrise.is_none() && summer.sunset.is_none());
        // Twilight angles have no solution either, but noon still exists.
        assert!(summer.hour_angle(-18.0, false).is_none());
        assert!(summer.transit.is_finite());

        let winter = SolarTime::new(date(2025, 12, 21), tromso);
        assert!(winter.sunrise.is_none() && winter.sunset.is_none());
    }

    #[test]
    fn test_day_length_continuity_across_centuries() {
        let coords = Coordinates::new_unchecked(45.0, 0.0);
        for year in [1000, 1600, 1900, 2000, 2001, 2100, 3000] {
            let solar = SolarTime::new(date(year, 6, 21), coords);
            let day_len = solar.sunset.unwrap() - solar.sunrise.unwrap();
            assert!(day_len > 15.0 && day_len < 16.0, "day length {} in {}", day_len, year);
        }
    }

    #[test]
    fn test_afternoon_after_transit_near_polar_circle() {
        // Transit falls late in the UT day here and the shadow crossing grazes noon
        let coords = Coordinates::new_unchecked(-65.75, -170.0);
        let solar = SolarTime::new(date(2024, 6, 9), coords);
        let asr = solar.afternoon(1.0).unwrap();
        assert!(asr > solar.transit, "asr {} not after transit {}", asr, solar.transit);
    }

    #[test]
    fn test_crossings_keep_their_side_of_transit() {
        let mut sites = Vec::new();
        for step in 0..=8 {
            let lat = 64.0 + step as f64 * 0.25;
            for lon in [170.0, -170.0] {
                sites.push(Coordinates::new_unchecked(lat, lon));
                sites.push(Coordinates::new_unchecked(-lat, lon));
            }
        }

        for coords in sites {
            let mut day = date(2024, 1, 1);
            while day.year() == 2024 {
                let solar = SolarTime::new(day, coords);
                let noon = solar.transit;
                for angle in [SUNRISE_ALTITUDE_DEG, -12.0, -18.0] {
                    let morning = solar.hour_angle(angle, false);
                    let evening = solar.hour_angle(angle, true);
                    assert!(morning.is_none_or(|h| h < noon), "{} at {} on {}", angle, coords, day);
                    assert!(evening.is_none_or(|h| h > noon), "{} at {} on {}", angle, coords, day);
                }
                for shadow in [1.0, 2.0] {
                    let asr = solar.afternoon(shadow);
                    assert!(asr.is_none_or(|h| h > noon), "asr {} at {} {}", shadow, coords, day);
                }
                day = day.checked_add_days(chrono::Days::new(7)).unwrap();
            }
        }
    }

    #[test]
    fn test_instant_from_hours() {
        let solar = SolarTime::new(date(2024, 1, 15), Coordinates::new_unchecked(0.0, 0.0));
        let t = solar.instant(12.5);
        assert_eq!(t.to_rfc3339(), "2024-01-15T12:30:00+00:00");
        let before = solar.instant(-0.25);
        assert_eq!(before.to_rfc3339(), "2024-01-14T23:45:00+00:00");
    }
}
