//! Configuration Module
//!
//! TOML configuration for a prayer time engine: a method preset plus
//! optional overrides and the output time zone.
//!
//! ```toml
//! method = "moonsighting_committee"
//! madhab = "hanafi"
//! shafaq = "ahmer"
//! timezone = "America/New_York"
//!
//! [adjustments]
//! fajr = 2
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::params::{
    CalculationParameters, HighLatitudeRule, IshaRule, Madhab, Method, PrayerAdjustments, Shafaq,
};
use crate::polar::PolarCircleResolution;
use crate::time::{OutputZone, Rounding};

fn default_timezone() -> String {
    "system".to_string()
}

/// Engine settings as read from a file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PrayerConfig {
    pub method: Method,
    pub madhab: Option<Madhab>,
    pub high_latitude_rule: Option<HighLatitudeRule>,
    pub shafaq: Option<Shafaq>,
    pub rounding: Option<Rounding>,
    pub polar_circle_resolution: Option<PolarCircleResolution>,
    /// Degrees, replaces the preset fajr angle
    pub fajr_angle: Option<f64>,
    /// Degrees, replaces the preset isha rule
    pub isha_angle: Option<f64>,
    /// Minutes after sunset; wins over `isha_angle` when both are set
    pub isha_interval: Option<u32>,
    pub maghrib_angle: Option<f64>,
    #[serde(default)]
    pub adjustments: PrayerAdjustments,
    /// "system", "location", "utc", an IANA name or a "+HH:MM" offset
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

impl PrayerConfig {
    /// Configuration using `method` with no overrides.
    pub fn new(method: Method) -> Self {
        Self {
            method,
            madhab: None,
            high_latitude_rule: None,
            shafaq: None,
            rounding: None,
            polar_circle_resolution: None,
            fajr_angle: None,
            isha_angle: None,
            isha_interval: None,
            maghrib_angle: None,
            adjustments: PrayerAdjustments::default(),
            timezone: default_timezone(),
        }
    }

    pub fn from_toml_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Arguments
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    /// * `Ok(PrayerConfig)` if successful
    /// * `Err(PrayerError)` if the file cannot be read or parsed
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    /// Method preset with every configured override applied.
    pub fn parameters(&self) -> CalculationParameters {
        let mut params = self.method.parameters().with_adjustments(self.adjustments);

        if let Some(madhab) = self.madhab {
            params = params.with_madhab(madhab);
        }
        if let Some(rule) = self.high_latitude_rule {
            params = params.with_high_latitude_rule(rule);
        }
        if let Some(shafaq) = self.shafaq {
            params = params.with_shafaq(shafaq);
        }
        if let Some(rounding) = self.rounding {
            params = params.with_rounding(rounding);
        }
        if let Some(resolution) = self.polar_circle_resolution {
            params = params.with_polar_circle_resolution(resolution);
        }
        if let Some(angle) = self.fajr_angle {
            params = params.with_fajr_angle(angle);
        }
        if let Some(angle) = self.maghrib_angle {
            params = params.with_maghrib_angle(Some(angle));
        }
        match (self.isha_interval, self.isha_angle) {
            (Some(minutes), _) => params.with_isha_rule(IshaRule::Interval(minutes)),
            (None, Some(angle)) => params.with_isha_rule(IshaRule::Angle(angle)),
            (None, None) => params,
        }
    }

    /// Parsed `timezone` setting.
    pub fn output_zone(&self) -> Result<OutputZone> {
        self.timezone.parse()
    }
}

// ===================== TESTS =====================
