//! Solar Coordinates Module
//!
//! Equatorial position of the sun for a day and its two neighbours, so the
//! solver can interpolate right ascension and declination within the day.

use crate::astronomy::{
    self, declination, interpolate, interpolate_angles, right_ascension, unwind_angle,
};

// ===================== SOLAR POSITION =====================

/// Apparent equatorial position of the sun at one Julian day.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolarPosition {
    /// Declination in degrees
    pub declination: f64,
    /// Right ascension in degrees, `[0, 360)`
    pub right_ascension: f64,
    /// Apparent ecliptic longitude in degrees
    pub apparent_longitude: f64,
    /// Apparent sidereal time at Greenwich in degrees
    pub apparent_sidereal_time: f64,
}

impl SolarPosition {
    pub fn new(jd: f64) -> Self {
        let e = astronomy::solar_elements(jd);
        let true_obliquity = (e.mean_obliquity + e.nutation_obliquity).to_radians();

        // Equation of the equinoxes converts mean to apparent sidereal time.
        let apparent_sidereal_time =
            e.mean_sidereal_time + (e.nutation_longitude * 3600.0 * true_obliquity.cos()) / 3600.0;

        Self {
            declination: declination(e.apparent_longitude, e.apparent_obliquity),
            right_ascension: right_ascension(e.apparent_longitude, e.apparent_obliquity),
            apparent_longitude: e.apparent_longitude,
            apparent_sidereal_time,
        }
    }
}

// ===================== THREE-DAY WINDOW =====================

/// Solar positions at 0h UT of yesterday, today and tomorrow.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolarCoordinates {
    pub previous: SolarPosition,
    pub current: SolarPosition,
    pub next: SolarPosition,
}

impl SolarCoordinates {
    /// Positions around `jd`, which should fall on 0h UT of the day of interest.
    pub fn new(jd: f64) -> Self {
        Self {
            previous: SolarPosition::new(jd - 1.0),
            current: SolarPosition::new(jd),
            next: SolarPosition::new(jd + 1.0),
        }
    }

    /// Right ascension at fraction `n` of a day after the central epoch.
    pub fn right_ascension_at(&self, n: f64) -> f64 {
        unwind_angle(interpolate_angles(
            self.current.right_ascension,
            self.previous.right_ascension,
            self.next.right_ascension,
            n,
        ))
    }

    /// Declination at fraction `n` of a day after the central epoch.
    pub fn declination_at(&self, n: f64) -> f64 {
        interpolate(self.current.declination, self.previous.declination, self.next.declination, n)
    }
}

// ===================== TESTS =====================
