//! Geographic Coordinates Module
//!
//! Observer location and the horizon constants used by the sunrise/sunset
//! solver.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{PrayerError, Result};

// ===================== CONSTANTS =====================

/// Solar apparent radius in degrees (angular semi-diameter)
pub const SOLAR_RADIUS_DEG: f64 = 16.0 / 60.0;

/// Standard atmospheric refraction at the horizon in degrees
pub const REFRACTION_DEG: f64 = 34.0 / 60.0;

/// Altitude of the sun's center at sunrise and sunset (-50 arcminutes)
pub const SUNRISE_ALTITUDE_DEG: f64 = -(SOLAR_RADIUS_DEG + REFRACTION_DEG);

// ===================== COORDINATES =====================

/// Observer position on the Earth's surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    /// Latitude in degrees, north positive (-90 to 90)
    pub latitude: f64,
    /// Longitude in degrees, east positive (-180 to 180)
    pub longitude: f64,
}

impl Coordinates {
    /// Create validated coordinates.
    ///
    /// # Errors
    /// Returns [`PrayerError::InvalidLatitude`] or [`PrayerError::InvalidLongitude`]
    /// when a value is outside its range (or not a number).
    pub fn new(latitude: f64, longitude: f64) -> Result<Self> {
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(PrayerError::InvalidLatitude(latitude));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(PrayerError::InvalidLongitude(longitude));
        }
        Ok(Self { latitude, longitude })
    }

    /// Create coordinates without range checks.
    pub const fn new_unchecked(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Same longitude, different latitude.
    pub fn with_latitude(self, latitude: f64) -> Self {
        Self { latitude, ..self }
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "lat={:.6}, lon={:.6}", self.latitude, self.longitude)
    }
}

// ===================== TESTS =====================
